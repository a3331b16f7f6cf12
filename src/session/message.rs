//! Transcript messages

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::CatalogEntry;

/// Author of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One immutable transcript entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_services: Option<Vec<CatalogEntry>>,
    pub created_at: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(MessageRole::User, content.into(), None)
    }

    pub fn assistant<S: Into<String>>(content: S, relevant_services: Vec<CatalogEntry>) -> Self {
        Self::new(MessageRole::Assistant, content.into(), Some(relevant_services))
    }

    /// Assistant message for a failed resolve call; carries no services
    pub fn assistant_error<E: std::fmt::Display>(error: &E) -> Self {
        Self::new(
            MessageRole::Assistant,
            format!(
                "Sorry, I encountered an error: {}. Please check your API configuration.",
                error
            ),
            None,
        )
    }

    fn new(role: MessageRole, content: String, relevant_services: Option<Vec<CatalogEntry>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            relevant_services,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConciergeError;

    #[test]
    fn test_error_message_wording() {
        let msg = ConversationMessage::assistant_error(&ConciergeError::upstream_http(401, "nope"));
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(
            msg.content,
            "Sorry, I encountered an error: API Error (401): nope. Please check your API configuration."
        );
        assert!(msg.relevant_services.is_none());
    }

    #[test]
    fn test_messages_get_distinct_ids() {
        let a = ConversationMessage::user("hi");
        let b = ConversationMessage::user("hi");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serialized_shape() {
        let msg = ConversationMessage::assistant("ok", vec![CatalogEntry::titled("Ticket Bot")]);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["relevantServices"][0]["Title"], "Ticket Bot");
        assert!(value["createdAt"].is_string());
    }
}
