//! Regeneration policy: derive a retry from transcript history.
//!
//! Pure derivation with no state of its own. This is the only path that
//! may re-drive an exchange without fresh caller input.

use crate::models::{Message, MessageRole};

/// Locate the last user turn by reverse scan.
///
/// Returns the index of that message and its text. `None` on a
/// transcript with no user message; regeneration is then a no-op.
pub fn last_user_turn(messages: &[Message]) -> Option<(usize, &str)> {
    messages
        .iter()
        .enumerate()
        .rev()
        .find(|(_, m)| m.role == MessageRole::User)
        .map(|(index, m)| (index, m.content.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(text: &str) -> Message {
        Message::user(text)
    }

    fn assistant(text: &str) -> Message {
        let mut message = Message::assistant_placeholder();
        message.content = text.to_string();
        message.is_streaming = false;
        message
    }

    #[test]
    fn finds_last_user_turn_behind_assistant_reply() {
        let transcript = vec![user("Q1"), assistant("A1")];
        let (index, text) = last_user_turn(&transcript).unwrap();
        assert_eq!(index, 0);
        assert_eq!(text, "Q1");
    }

    #[test]
    fn picks_most_recent_of_several_user_turns() {
        let transcript = vec![user("Q1"), assistant("A1"), user("Q2"), assistant("A2")];
        let (index, text) = last_user_turn(&transcript).unwrap();
        assert_eq!(index, 2);
        assert_eq!(text, "Q2");
    }

    #[test]
    fn user_turn_may_be_the_last_message() {
        let transcript = vec![user("Q1"), assistant("A1"), user("Q2")];
        let (index, _) = last_user_turn(&transcript).unwrap();
        assert_eq!(index, 2);
    }

    #[test]
    fn empty_transcript_has_no_turn() {
        assert!(last_user_turn(&[]).is_none());
    }

    #[test]
    fn assistant_only_transcript_has_no_turn() {
        let transcript = vec![assistant("orphan")];
        assert!(last_user_turn(&transcript).is_none());
    }
}
