//! Typed events decoded from answer stream records.

use serde::{Deserialize, Serialize};

use crate::models::{AnswerConfidence, SourceRef};

/// Payload marking the end of the stream (not a JSON record).
pub const END_SENTINEL: &str = "[DONE]";

/// One decoded record from the answer stream.
///
/// Closed set: the fold over these is exhaustive, so a new record kind
/// added here is a compile-time-visible change everywhere it matters.
/// Wire form is `{"type": "<kind>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AnswerEvent {
    /// Conversation identifier assigned to this exchange. Emitted
    /// before the first token; at most the first one counts.
    #[serde(rename = "conv_id")]
    Conversation(String),
    /// Incremental answer fragment to append.
    Token(String),
    /// Final citation list for the current answer.
    Sources(Vec<SourceRef>),
    /// Backend's confidence judgement for the finished answer.
    Confidence(AnswerConfidence),
    /// Producer-signaled terminal failure.
    Error(String),
    /// Explicit completion record, emitted just before the sentinel.
    Done(bool),
}

/// Whether a record payload is the end-of-stream sentinel.
pub fn is_end_sentinel(payload: &str) -> bool {
    payload.trim() == END_SENTINEL
}

/// Decode one record payload.
///
/// `None` means the record is malformed (unparseable JSON or an
/// unrecognized kind). Callers skip those: one bad frame must not
/// abort an otherwise healthy answer.
pub fn decode_record(payload: &str) -> Option<AnswerEvent> {
    serde_json::from_str(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_token_record() {
        let event = decode_record(r#"{"type": "token", "data": "Hello"}"#).unwrap();
        assert_eq!(event, AnswerEvent::Token("Hello".to_string()));
    }

    #[test]
    fn decodes_conversation_record() {
        let event = decode_record(r#"{"type": "conv_id", "data": "abc-123"}"#).unwrap();
        assert_eq!(event, AnswerEvent::Conversation("abc-123".to_string()));
    }

    #[test]
    fn decodes_sources_record() {
        let payload = r#"{
            "type": "sources",
            "data": [
                {"document_id": "d1", "filename": "hr-policy.pdf", "score": 0.91,
                 "excerpt": "Annual leave accrues monthly."},
                {"document_id": "d2", "filename": "benefits.pdf", "page_number": 3}
            ]
        }"#;
        match decode_record(payload).unwrap() {
            AnswerEvent::Sources(sources) => {
                assert_eq!(sources.len(), 2);
                assert_eq!(sources[0].filename, "hr-policy.pdf");
                assert_eq!(sources[1].page_number, Some(3));
            }
            other => panic!("Expected Sources, got: {other:?}"),
        }
    }

    #[test]
    fn decodes_confidence_record() {
        let event = decode_record(r#"{"type": "confidence", "data": "high"}"#).unwrap();
        assert_eq!(event, AnswerEvent::Confidence(AnswerConfidence::High));
    }

    #[test]
    fn decodes_error_record() {
        let event = decode_record(r#"{"type": "error", "data": "model overloaded"}"#).unwrap();
        assert_eq!(event, AnswerEvent::Error("model overloaded".to_string()));
    }

    #[test]
    fn decodes_done_record() {
        let event = decode_record(r#"{"type": "done", "data": true}"#).unwrap();
        assert_eq!(event, AnswerEvent::Done(true));
    }

    #[test]
    fn malformed_json_is_none() {
        assert!(decode_record("not-json").is_none());
        assert!(decode_record(r#"{"type": "token""#).is_none());
    }

    #[test]
    fn unknown_kind_is_none() {
        assert!(decode_record(r#"{"type": "usage", "data": {"tokens": 12}}"#).is_none());
    }

    #[test]
    fn mismatched_payload_shape_is_none() {
        // A sources record whose payload is not a list.
        assert!(decode_record(r#"{"type": "sources", "data": "oops"}"#).is_none());
    }

    #[test]
    fn sentinel_detection() {
        assert!(is_end_sentinel("[DONE]"));
        assert!(is_end_sentinel("  [DONE] "));
        assert!(!is_end_sentinel(r#"{"type": "done", "data": true}"#));
    }
}
