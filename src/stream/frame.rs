//! Record framing for the server-push answer stream.
//!
//! The producer emits `data: <payload>` lines separated by blank lines
//! (the text/event-stream convention, restricted to data-only records).
//! This adapter handles byte buffering, UTF-8 conversion, `\n` / `\r\n`
//! endings, chunk boundaries that split a record, and keep-alive
//! comment lines, yielding one assembled payload string per record.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

/// Stream adapter: raw bytes in, one payload string per record out.
///
/// A record's payload is the concatenation of its `data:` lines joined
/// with `\n`. Comment lines (leading `:`) and unknown fields are
/// skipped. A final record without a trailing blank line is flushed at
/// end of stream.
pub struct DataFrameStream<S> {
    inner: S,
    buffer: String,
    pending: Vec<String>,
    done: bool,
}

impl<S> DataFrameStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: String::new(),
            pending: Vec::new(),
            done: false,
        }
    }

    /// Consume one line, returning an assembled payload when the line
    /// completes a record.
    fn accept_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.pending.is_empty() {
                return None;
            }
            return Some(self.pending.drain(..).collect::<Vec<_>>().join("\n"));
        }

        if let Some(data) = line.strip_prefix("data:") {
            let data = data.strip_prefix(' ').unwrap_or(data);
            self.pending.push(data.to_string());
        }
        // Comments (leading ':') and any other field are keep-alive
        // noise for this producer; skip them.
        None
    }

    fn flush_pending(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.drain(..).collect::<Vec<_>>().join("\n"))
        }
    }
}

impl<S, E> Stream for DataFrameStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<String, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        loop {
            // Drain complete lines already buffered.
            while let Some(line_end) = self.buffer.find('\n') {
                let mut line = self.buffer[..line_end].to_string();
                self.buffer.drain(..=line_end);
                if line.ends_with('\r') {
                    line.pop();
                }
                if let Some(payload) = self.accept_line(&line) {
                    return Poll::Ready(Some(Ok(payload)));
                }
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    if let Ok(text) = std::str::from_utf8(&bytes) {
                        self.buffer.push_str(text);
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    self.done = true;
                    // A last line without trailing newline still counts.
                    if !self.buffer.is_empty() {
                        let line = std::mem::take(&mut self.buffer);
                        let line = line.strip_suffix('\r').unwrap_or(&line).to_string();
                        if let Some(payload) = self.accept_line(&line) {
                            return Poll::Ready(Some(Ok(payload)));
                        }
                    }
                    return Poll::Ready(self.flush_pending().map(Ok));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::convert::Infallible;

    fn byte_stream(chunks: Vec<&str>) -> impl Stream<Item = Result<Bytes, Infallible>> + Unpin {
        futures_util::stream::iter(
            chunks
                .into_iter()
                .map(|s| Ok(Bytes::from(s.to_string())))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect(chunks: Vec<&str>) -> Vec<String> {
        DataFrameStream::new(byte_stream(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await
    }

    #[tokio::test]
    async fn yields_one_payload_per_record() {
        let payloads = collect(vec!["data: first\n\n", "data: second\n\n"]).await;
        assert_eq!(payloads, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn reassembles_record_split_across_chunks() {
        let payloads = collect(vec!["dat", "a: {\"type\"", ": \"token\"}\n\n"]).await;
        assert_eq!(payloads, vec!["{\"type\": \"token\"}"]);
    }

    #[tokio::test]
    async fn handles_crlf_endings() {
        let payloads = collect(vec!["data: hello\r\n\r\n"]).await;
        assert_eq!(payloads, vec!["hello"]);
    }

    #[tokio::test]
    async fn joins_multi_line_data() {
        let payloads = collect(vec!["data: part one\ndata: part two\n\n"]).await;
        assert_eq!(payloads, vec!["part one\npart two"]);
    }

    #[tokio::test]
    async fn skips_comment_lines() {
        let payloads = collect(vec![": keep-alive\ndata: real\n\n"]).await;
        assert_eq!(payloads, vec!["real"]);
    }

    #[tokio::test]
    async fn payload_without_space_after_prefix() {
        let payloads = collect(vec!["data:[DONE]\n\n"]).await;
        assert_eq!(payloads, vec!["[DONE]"]);
    }

    #[tokio::test]
    async fn flushes_final_record_without_blank_line() {
        let payloads = collect(vec!["data: trailing"]).await;
        assert_eq!(payloads, vec!["trailing"]);
    }

    #[tokio::test]
    async fn empty_stream_yields_nothing() {
        let payloads = collect(vec![]).await;
        assert!(payloads.is_empty());
    }

    #[tokio::test]
    async fn blank_lines_without_data_are_skipped() {
        let payloads = collect(vec!["\n\ndata: only\n\n\n"]).await;
        assert_eq!(payloads, vec!["only"]);
    }

    #[tokio::test]
    async fn transport_error_is_passed_through() {
        #[derive(Debug)]
        struct Boom;
        let chunks: Vec<Result<Bytes, Boom>> =
            vec![Ok(Bytes::from("data: ok\n\n")), Err(Boom)];
        let mut frames = DataFrameStream::new(futures_util::stream::iter(chunks));

        assert_eq!(frames.next().await.unwrap().unwrap(), "ok");
        assert!(frames.next().await.unwrap().is_err());
    }
}
