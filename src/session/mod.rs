//! Conversation session management.
//!
//! One [`ChatSession`] governs one conversation's exchanges: the
//! transcript, the conversation identity, and the single in-flight
//! answer stream with its cancellation token.

pub mod controller;
pub mod regenerate;
pub mod transcript;

pub use controller::{ChatSession, ExchangeOutcome, StopHandle, ANSWER_FAILURE_TEXT};
pub use transcript::Transcript;
