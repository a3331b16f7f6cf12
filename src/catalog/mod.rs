//! Service catalog
//!
//! The catalog is the static list of offerable services exported upstream as
//! a JSON array. It is loaded once, shared read-only, and filtered down to the
//! entries with a usable title before anything is shown to the model.

pub mod entry;
pub mod filter;
pub mod loader;

pub use entry::*;
pub use filter::*;
pub use loader::*;
