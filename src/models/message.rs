use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AnswerConfidence, MessageRole};

/// One transcript entry.
///
/// Assistant messages are created as empty streaming placeholders;
/// `content` grows append-only while `is_streaming` is true. Sources
/// and confidence are attached only at finalization, so a message is
/// never observed with a partially-filled citation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    #[serde(default)]
    pub confidence: Option<AnswerConfidence>,
    #[serde(default)]
    pub is_streaming: bool,
}

impl Message {
    /// A finished user message carrying the (already trimmed) question.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: MessageRole::User,
            content: text.into(),
            timestamp: chrono::Local::now().naive_local(),
            sources: Vec::new(),
            confidence: None,
            is_streaming: false,
        }
    }

    /// An empty assistant placeholder awaiting its stream.
    pub fn assistant_placeholder() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: MessageRole::Assistant,
            content: String::new(),
            timestamp: chrono::Local::now().naive_local(),
            sources: Vec::new(),
            confidence: None,
            is_streaming: true,
        }
    }
}

/// A citation linking part of an answer back to a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub document_id: String,
    pub filename: String,
    #[serde(default)]
    pub page_number: Option<u32>,
    /// Retrieval relevance in [0, 1].
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_is_not_streaming() {
        let msg = Message::user("What is the expense approval threshold?");
        assert_eq!(msg.role, MessageRole::User);
        assert!(!msg.is_streaming);
        assert!(msg.sources.is_empty());
        assert!(msg.confidence.is_none());
    }

    #[test]
    fn placeholder_starts_empty_and_streaming() {
        let msg = Message::assistant_placeholder();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.is_streaming);
        assert!(msg.content.is_empty());
    }

    #[test]
    fn placeholder_ids_are_unique() {
        let a = Message::assistant_placeholder();
        let b = Message::assistant_placeholder();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn source_ref_decodes_with_optional_fields_missing() {
        let json = r#"{"document_id": "d-17", "filename": "onboarding.pdf"}"#;
        let source: SourceRef = serde_json::from_str(json).unwrap();
        assert_eq!(source.filename, "onboarding.pdf");
        assert!(source.page_number.is_none());
        assert!(source.url.is_none());
        assert_eq!(source.score, 0.0);
        assert!(source.excerpt.is_empty());
    }

    #[test]
    fn source_ref_decodes_full_payload() {
        let json = r#"{
            "document_id": "d-42",
            "filename": "security-policy.pdf",
            "page_number": 12,
            "score": 0.87,
            "excerpt": "Badge access is revoked within 24 hours.",
            "url": "https://docs.example.com/security-policy#p12"
        }"#;
        let source: SourceRef = serde_json::from_str(json).unwrap();
        assert_eq!(source.page_number, Some(12));
        assert!((source.score - 0.87).abs() < f32::EPSILON);
        assert!(source.url.is_some());
    }
}
