//! Service Discovery Module
//!
//! This module implements the resolver pipeline that turns a natural language
//! question into a short answer plus the most relevant catalog entries, by
//! delegating the reasoning to an OpenAI-compatible chat completions endpoint
//! and validating whatever comes back.

pub mod completion;
pub mod parser;
pub mod prompt;
pub mod resolver;
pub mod service;
pub mod types;

pub use completion::*;
pub use parser::*;
pub use prompt::*;
pub use resolver::*;
pub use service::*;
pub use types::*;
