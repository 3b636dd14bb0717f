//! Lazy decoded-event stream over raw answer bytes.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

use super::event::{decode_record, is_end_sentinel, AnswerEvent};
use super::frame::DataFrameStream;
use super::StreamError;

/// Single-pass adapter from a byte stream to [`AnswerEvent`]s.
///
/// Leniency policy: a record that fails to decode is skipped (logged at
/// debug) and the stream continues. An `error` record is the opposite:
/// it is yielded and the stream is terminal afterwards, as is the
/// `[DONE]` sentinel and any transport failure.
pub struct AnswerEventStream<S> {
    frames: DataFrameStream<S>,
    done: bool,
}

impl<S> AnswerEventStream<S> {
    pub fn new(bytes: S) -> Self {
        Self {
            frames: DataFrameStream::new(bytes),
            done: false,
        }
    }
}

impl<S, E> Stream for AnswerEventStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    type Item = Result<AnswerEvent, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        loop {
            match Pin::new(&mut self.frames).poll_next(cx) {
                Poll::Ready(Some(Ok(payload))) => {
                    if is_end_sentinel(&payload) {
                        self.done = true;
                        return Poll::Ready(None);
                    }
                    match decode_record(&payload) {
                        Some(event) => {
                            if matches!(event, AnswerEvent::Error(_)) {
                                self.done = true;
                            }
                            return Poll::Ready(Some(Ok(event)));
                        }
                        None => {
                            tracing::debug!(
                                record = %truncate_for_log(&payload),
                                "Skipping malformed answer stream record"
                            );
                        }
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    self.done = true;
                    return Poll::Ready(Some(Err(StreamError::Transport(e.to_string()))));
                }
                Poll::Ready(None) => {
                    self.done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Bound log output for skipped records; payloads can be arbitrarily large.
fn truncate_for_log(payload: &str) -> &str {
    let mut end = payload.len().min(120);
    while end > 0 && !payload.is_char_boundary(end) {
        end -= 1;
    }
    &payload[..end]
}
