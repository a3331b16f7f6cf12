//! Error handling module for the catalog concierge
//!
//! This module provides the error taxonomy shared by the resolver pipeline,
//! the conversation session and the configuration layer.

mod error;

// Re-export the main error types and utilities
pub use error::{ConciergeError, Result};
