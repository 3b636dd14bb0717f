use serde::{Deserialize, Serialize};

use super::message::SourceRef;

/// Conversation summary as returned by the backend's conversation list.
/// Fields are derived server-side from the stored exchange history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub message_count: u32,
    /// First 80 characters of the most recent question.
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub started_at: String,
    #[serde(default)]
    pub last_activity: String,
}

/// Full stored history of one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHistory {
    pub conversation_id: String,
    #[serde(default)]
    pub messages: Vec<ConversationExchange>,
}

/// One persisted question/answer pair.
///
/// The backend stores completed exchanges, not individual streaming
/// messages; a live transcript is rebuilt from these on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationExchange {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    /// Unix epoch seconds, as the backend records it.
    #[serde(default)]
    pub timestamp: f64,
}
