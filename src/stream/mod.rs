//! Answer stream decoding.
//!
//! The answering backend replies to a streamed question with a
//! server-push response: newline-delimited `data:` records, each
//! carrying a JSON event payload, closed by a `data: [DONE]` sentinel.
//! This module turns that byte stream into typed [`AnswerEvent`]s:
//!
//! - `frame` buffers bytes and assembles one payload per record
//! - `event` holds the closed event type and its JSON decoding
//! - `decoder` is the lazy, single-pass event stream fed to the session

pub mod decoder;
pub mod event;
pub mod frame;

use std::pin::Pin;

use futures_util::Stream;
use thiserror::Error;

pub use decoder::AnswerEventStream;
pub use event::AnswerEvent;
pub use frame::DataFrameStream;

/// Errors surfaced by the answer stream.
///
/// Malformed individual records are not errors: they are skipped so a
/// single bad frame cannot abort an otherwise healthy answer. Only the
/// transport itself failing ends up here.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Transport failure while reading answer stream: {0}")]
    Transport(String),
}

/// Type-erased decoded event stream, as handed to the session controller.
pub type BoxedAnswerStream = Pin<Box<dyn Stream<Item = Result<AnswerEvent, StreamError>> + Send>>;
