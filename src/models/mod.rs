pub mod conversation;
pub mod enums;
pub mod message;

pub use conversation::{ConversationExchange, ConversationHistory, ConversationSummary};
pub use enums::{AnswerConfidence, MessageFeedback, MessageRole};
pub use message::{Message, SourceRef};
