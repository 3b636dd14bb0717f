//! Ordered message store backing one conversation view.
//!
//! Append-only, with two sanctioned exceptions: targeted in-place
//! update of the currently streaming message, and truncation for reset
//! and regeneration. Mutators are `pub(crate)`: only the session
//! controller drives them; everyone else reads.

use uuid::Uuid;

use crate::models::{AnswerConfidence, Message, SourceRef};

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Read surface ─────────────────────────────────────

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == *id)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    // ── Controller-only mutation ─────────────────────────

    pub(crate) fn push(&mut self, message: Message) -> Uuid {
        let id = message.id;
        self.messages.push(message);
        id
    }

    fn get_mut(&mut self, id: &Uuid) -> Option<&mut Message> {
        let found = self.messages.iter_mut().find(|m| m.id == *id);
        if found.is_none() {
            tracing::warn!(message_id = %id, "Transcript update targeted a missing message");
        }
        found
    }

    /// Append a fragment to the streaming message's content.
    pub(crate) fn append_content(&mut self, id: &Uuid, fragment: &str) -> bool {
        match self.get_mut(id) {
            Some(message) if message.is_streaming => {
                message.content.push_str(fragment);
                true
            }
            _ => false,
        }
    }

    /// Commit a completed answer: staged citations and confidence land
    /// together, and the message stops streaming.
    pub(crate) fn finalize(
        &mut self,
        id: &Uuid,
        sources: Vec<SourceRef>,
        confidence: Option<AnswerConfidence>,
    ) -> bool {
        match self.get_mut(id) {
            Some(message) if message.is_streaming => {
                message.sources = sources;
                message.confidence = confidence;
                message.is_streaming = false;
                true
            }
            _ => false,
        }
    }

    /// Stop streaming, keeping whatever content accumulated. No
    /// citations are attached; this is a clean partial answer, not a failure.
    pub(crate) fn finalize_partial(&mut self, id: &Uuid) -> bool {
        match self.get_mut(id) {
            Some(message) if message.is_streaming => {
                message.is_streaming = false;
                true
            }
            _ => false,
        }
    }

    /// Terminal failure: the visible content is replaced wholesale by
    /// the given text and nothing staged is committed.
    pub(crate) fn fail(&mut self, id: &Uuid, text: &str) -> bool {
        match self.get_mut(id) {
            Some(message) if message.is_streaming => {
                message.content = text.to_string();
                message.sources = Vec::new();
                message.confidence = None;
                message.is_streaming = false;
                true
            }
            _ => false,
        }
    }

    /// Keep only the first `len` messages. Used by regeneration to
    /// drop everything after the last user turn.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    fn with_streaming_placeholder() -> (Transcript, Uuid) {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("question"));
        let id = transcript.push(Message::assistant_placeholder());
        (transcript, id)
    }

    #[test]
    fn append_grows_content_in_order() {
        let (mut transcript, id) = with_streaming_placeholder();
        assert!(transcript.append_content(&id, "The answer "));
        assert!(transcript.append_content(&id, "is 42."));
        assert_eq!(transcript.get(&id).unwrap().content, "The answer is 42.");
        assert!(transcript.get(&id).unwrap().is_streaming);
    }

    #[test]
    fn finalize_commits_sources_and_stops_streaming() {
        let (mut transcript, id) = with_streaming_placeholder();
        transcript.append_content(&id, "done");
        let sources = vec![SourceRef {
            document_id: "d1".to_string(),
            filename: "faq.pdf".to_string(),
            page_number: None,
            score: 0.8,
            excerpt: String::new(),
            url: None,
        }];
        assert!(transcript.finalize(&id, sources, Some(AnswerConfidence::High)));

        let message = transcript.get(&id).unwrap();
        assert!(!message.is_streaming);
        assert_eq!(message.sources.len(), 1);
        assert_eq!(message.confidence, Some(AnswerConfidence::High));
    }

    #[test]
    fn finalize_partial_keeps_content_attaches_nothing() {
        let (mut transcript, id) = with_streaming_placeholder();
        transcript.append_content(&id, "half an ans");
        assert!(transcript.finalize_partial(&id));

        let message = transcript.get(&id).unwrap();
        assert!(!message.is_streaming);
        assert_eq!(message.content, "half an ans");
        assert!(message.sources.is_empty());
        assert!(message.confidence.is_none());
    }

    #[test]
    fn fail_replaces_content_entirely() {
        let (mut transcript, id) = with_streaming_placeholder();
        transcript.append_content(&id, "partial text that must vanish");
        assert!(transcript.fail(&id, "Something went wrong."));

        let message = transcript.get(&id).unwrap();
        assert_eq!(message.content, "Something went wrong.");
        assert!(!message.is_streaming);
        assert!(message.sources.is_empty());
    }

    #[test]
    fn updates_after_finalization_are_rejected() {
        let (mut transcript, id) = with_streaming_placeholder();
        assert!(transcript.finalize_partial(&id));

        assert!(!transcript.append_content(&id, "late token"));
        assert!(!transcript.finalize(&id, Vec::new(), None));
        assert!(!transcript.finalize_partial(&id));
        assert!(!transcript.fail(&id, "late failure"));
        assert!(transcript.get(&id).unwrap().content.is_empty());
    }

    #[test]
    fn updates_to_unknown_id_are_rejected() {
        let (mut transcript, _) = with_streaming_placeholder();
        let ghost = Uuid::new_v4();
        assert!(!transcript.append_content(&ghost, "x"));
        assert!(!transcript.finalize_partial(&ghost));
    }

    #[test]
    fn truncate_drops_trailing_messages() {
        let (mut transcript, _) = with_streaming_placeholder();
        assert_eq!(transcript.len(), 2);
        transcript.truncate(1);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].role, MessageRole::User);
    }

    #[test]
    fn clear_empties_the_store() {
        let (mut transcript, _) = with_streaming_placeholder();
        transcript.clear();
        assert!(transcript.is_empty());
        assert!(transcript.last().is_none());
    }
}
