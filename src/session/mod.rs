//! Conversation session
//!
//! Caller-side owner of the transcript. It gates submissions so that at most
//! one resolve call is in flight, and turns every failure into an assistant
//! message instead of an error state.

pub mod conversation;
pub mod message;

pub use conversation::*;
pub use message::*;
