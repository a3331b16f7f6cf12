//! Terminal rendering of answers, service cards and transcripts

use crate::catalog::CatalogEntry;
use crate::session::{ConversationMessage, MessageRole};

/// Example questions offered when a conversation is empty
pub const EXAMPLE_QUESTIONS: [&str; 3] = [
    "What do you offer for ticket management?",
    "How can you help with email processing?",
    "What research tools do you provide?",
];

/// Render one service as a text card. Absent fields are skipped.
pub fn format_service_card(position: usize, entry: &CatalogEntry) -> String {
    let mut lines = vec![format!(
        "{}. {}",
        position + 1,
        entry.usable_title().unwrap_or("(untitled)")
    )];
    if let Some(snippet) = entry.display_snippet() {
        lines.push(format!("   {}", snippet));
    }
    if let Some(description) = entry.display_long_description() {
        lines.push(format!("   {}", description));
    }
    if let Some(url) = entry.display_url() {
        lines.push(format!("   {}", url));
    }
    if let Some(image) = entry.display_image() {
        lines.push(format!("   image: {}", image));
    }
    lines.join("\n")
}

/// Render the relevant services block, or nothing when there are none
pub fn format_service_cards(services: &[CatalogEntry]) -> Option<String> {
    if services.is_empty() {
        return None;
    }
    let cards: Vec<String> = services
        .iter()
        .enumerate()
        .map(|(i, entry)| format_service_card(i, entry))
        .collect();
    Some(format!("Relevant services:\n{}", cards.join("\n")))
}

/// Render a transcript line with its local time
pub fn format_message(message: &ConversationMessage) -> String {
    let speaker = match message.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
    };
    format!(
        "[{}] {}: {}",
        message.created_at.with_timezone(&chrono::Local).format("%H:%M:%S"),
        speaker,
        message.content
    )
}
