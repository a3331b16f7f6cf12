//! Catalog filtering
//!
//! The filtered sequence is the index space the model sees: index `i` in every
//! later pipeline step refers to position `i` here, not in the raw catalog.

use super::CatalogEntry;

/// Keep only entries with a usable title, preserving relative order
pub fn filter_catalog(catalog: &[CatalogEntry]) -> Vec<&CatalogEntry> {
    catalog
        .iter()
        .filter(|entry| entry.usable_title().is_some())
        .collect()
}
