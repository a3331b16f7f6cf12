//! Catalog Concierge - answers questions about a service catalog
//!
//! Given a natural language question, the concierge asks an OpenAI-compatible
//! chat completions endpoint for a short answer and for the indices of the
//! most relevant catalog entries, then validates that output before handing
//! back `{answer, relevantServices}`.
//!
//! The pipeline lives in [`discovery`]; [`session`] wraps it for interactive
//! use.

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod display;
pub mod error;
pub mod session;

pub use catalog::CatalogEntry;
pub use config::Config;
pub use discovery::{Credentials, ResolveResult, ServiceResolver};
pub use error::{ConciergeError, Result};
pub use session::{ConversationMessage, ConversationSession};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "concierge.yaml";
