//! Catalog entry type and the `"NaN"` sentinel handling of the upstream export

use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder the upstream spreadsheet export writes for empty cells
pub const NAN_SENTINEL: &str = "NaN";

/// One service from the catalog.
///
/// Field names on the wire follow the upstream export (`URL`, `Title`,
/// `Long_description`, ...). Every field is optional at the type level so that
/// raw exports deserialize; the sentinel `"NaN"` is read as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Landing page of the service
    #[serde(
        rename = "URL",
        default,
        deserialize_with = "absent_if_sentinel",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,

    /// Display title; entries without one never reach the model
    #[serde(
        rename = "Title",
        default,
        deserialize_with = "absent_if_sentinel",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,

    /// Card image URL
    #[serde(
        rename = "Image",
        default,
        deserialize_with = "absent_if_sentinel",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,

    /// One-line pitch
    #[serde(
        rename = "Snippet",
        default,
        deserialize_with = "absent_if_sentinel",
        skip_serializing_if = "Option::is_none"
    )]
    pub snippet: Option<String>,

    /// Full description
    #[serde(
        rename = "Long_description",
        default,
        deserialize_with = "absent_if_sentinel",
        skip_serializing_if = "Option::is_none"
    )]
    pub long_description: Option<String>,

    /// Free-form remark
    #[serde(
        rename = "Note",
        default,
        deserialize_with = "absent_if_sentinel",
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<String>,
}

impl CatalogEntry {
    /// Create an entry with just a title
    pub fn titled<S: Into<String>>(title: S) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_snippet<S: Into<String>>(mut self, snippet: S) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_long_description<S: Into<String>>(mut self, description: S) -> Self {
        self.long_description = Some(description.into());
        self
    }

    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }

    /// The title if it is usable: non-empty and not the sentinel.
    ///
    /// Whitespace-only titles are kept; they still occupy an index the model
    /// can refer to.
    pub fn usable_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .filter(|v| !v.is_empty() && *v != NAN_SENTINEL)
    }

    pub fn display_url(&self) -> Option<&str> {
        present(&self.url)
    }

    pub fn display_image(&self) -> Option<&str> {
        present(&self.image)
    }

    pub fn display_snippet(&self) -> Option<&str> {
        present(&self.snippet)
    }

    pub fn display_long_description(&self) -> Option<&str> {
        present(&self.long_description)
    }
}

/// Treat missing, blank and sentinel values identically for display.
///
/// Entries built in code bypass deserialization, so the sentinel is checked
/// again here.
fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty() && *v != NAN_SENTINEL)
}

fn absent_if_sentinel<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| v != NAN_SENTINEL))
}
