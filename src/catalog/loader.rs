//! Catalog source: reads the upstream JSON export once at startup

use std::path::Path;
use tracing::{debug, info};

use super::{filter_catalog, CatalogEntry};
use crate::error::{ConciergeError, Result};

/// Load the raw catalog from a JSON array file.
///
/// The returned sequence is unfiltered; filtering happens per resolve call.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>> {
    let path = path.as_ref();
    debug!("Loading service catalog from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConciergeError::catalog(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let catalog = parse_catalog(&content)
        .map_err(|e| ConciergeError::catalog(format!("{}: {}", path.display(), e)))?;

    info!(
        "Loaded {} catalog entries ({} with a usable title) from {}",
        catalog.len(),
        filter_catalog(&catalog).len(),
        path.display()
    );
    Ok(catalog)
}

/// Parse catalog JSON text
pub fn parse_catalog(content: &str) -> Result<Vec<CatalogEntry>> {
    serde_json::from_str(content)
        .map_err(|e| ConciergeError::catalog(format!("Failed to parse catalog JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"URL": "https://example.com/a", "Title": "Email AI Agent", "Snippet": "NaN"}},
                {{"URL": "https://example.com/b", "Title": "NaN"}}
            ]"#
        )
        .unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].snippet, None);
        assert_eq!(filter_catalog(&catalog).len(), 1);
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let err = load_catalog("/definitely/not/here/services.json").unwrap_err();
        assert_eq!(err.category(), "catalog");
    }

    #[test]
    fn test_parse_catalog_rejects_non_array() {
        let err = parse_catalog(r#"{"Title": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("Failed to parse catalog JSON"));
    }
}
