//! Grounding prompt construction
//!
//! The whole filtered catalog is embedded in every system prompt. Nothing is
//! truncated or chunked, so prompt size grows linearly with the catalog.

use tracing::debug;

use crate::catalog::CatalogEntry;
use crate::error::Result;

/// System and user texts for one completion request, in send order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessages {
    pub system: String,
    pub user: String,
}

/// Build the grounding prompt for `question` over the filtered catalog.
///
/// Indices in the embedded catalog are positions in `catalog`, which must be
/// the filtered sequence used for the rest of the call.
pub fn build_prompt(catalog: &[&CatalogEntry], question: &str) -> Result<PromptMessages> {
    let catalog_json = serde_json::to_string_pretty(catalog)?;

    let system = format!(
        r#"You are an AI assistant helping clients discover and understand the AI services in our catalog.

INSTRUCTIONS:
1. Analyze the user's question against our complete services catalog (provided as JSON data)
2. Provide a short, precise answer (2-3 sentences maximum) that directly addresses their question
3. Identify the 1-3 most relevant services from our catalog that match their needs
4. Use the service titles, snippets, descriptions, and any available metadata to make accurate matches
5. Consider synonyms and related concepts (e.g., "email management" relates to "Email AI Agent")

COMPLETE SERVICES CATALOG (JSON):
{catalog_json}

RESPONSE FORMAT:
You must respond in this exact JSON format:
{{
  "answer": "Your short, helpful answer here",
  "serviceIds": [array of indices corresponding to relevant services from the catalog, starting from 0]
}}

EXAMPLE:
If user asks about email management and services at indices 1 and 10 are relevant:
{{
  "answer": "We offer comprehensive email management solutions that automate processing, classification, and response generation.",
  "serviceIds": [1, 10]
}}"#,
        catalog_json = catalog_json
    );

    debug!(
        "Built grounding prompt: {} catalog entries, {} bytes",
        catalog.len(),
        system.len()
    );

    Ok(PromptMessages {
        system,
        user: question.to_string(),
    })
}
