//! Outbound collaborator seams.
//!
//! The session controller never renders anything itself; it signals
//! these two collaborators and moves on. Neither carries retry
//! semantics.

/// Keeps the host application's conversation-list view fresh.
///
/// Told exactly once per session, when the backend assigns the
/// conversation its identifier.
pub trait ConversationListCache: Send + Sync {
    fn invalidate(&self);
}

/// Presentation-only failure channel (toast, status line, log).
pub trait StreamNotifier: Send + Sync {
    fn answer_failed(&self, message: &str);
}

/// Discards all signals. The default wiring for headless use.
pub struct NoopCollaborators;

impl ConversationListCache for NoopCollaborators {
    fn invalidate(&self) {}
}

impl StreamNotifier for NoopCollaborators {
    fn answer_failed(&self, _message: &str) {}
}

/// Routes signals to the log; useful until a host UI takes over.
pub struct LogCollaborators;

impl ConversationListCache for LogCollaborators {
    fn invalidate(&self) {
        tracing::debug!("Conversation list cache invalidated");
    }
}

impl StreamNotifier for LogCollaborators {
    fn answer_failed(&self, message: &str) {
        tracing::warn!(message, "Answer stream failed");
    }
}
