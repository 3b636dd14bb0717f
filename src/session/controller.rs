//! Session controller: one streamed exchange at a time.
//!
//! `ChatSession` owns the transcript and the single live cancellation
//! token. `submit` appends the user turn plus an empty assistant
//! placeholder, opens the answer stream, and folds decoded events into
//! the placeholder until a terminal state: completed, stopped, or
//! failed. Folding is synchronous; the loop suspends only while
//! waiting for the next network chunk or a cancellation signal.
//!
//! Failure policy: cancellation is not an error (the partial answer
//! stays visible); a producer-signaled error or a transport failure
//! replaces the partial content with a fixed notice and informs the
//! notifier. Citations and confidence are staged during the stream and
//! committed only at successful finalization, so a message is never
//! seen with a half-filled source list.

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::client::{AnswerRequest, AnswerService};
use crate::models::{AnswerConfidence, Message, SourceRef};
use crate::notify::{ConversationListCache, NoopCollaborators, StreamNotifier};
use crate::stream::AnswerEvent;

use super::regenerate::last_user_turn;
use super::transcript::Transcript;

/// Shown in place of an answer when the stream fails terminally.
/// The producer's own error text is logged, never rendered.
pub const ANSWER_FAILURE_TEXT: &str =
    "Sorry, something went wrong while generating this answer. Please try again.";

/// How one exchange resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Stream completed; staged citations and confidence committed.
    Answered,
    /// Cancelled by the caller; partial content kept, nothing attached.
    Stopped,
    /// Producer error or transport failure; fixed notice shown.
    Failed,
    /// Nothing to do (blank input, or regeneration without a user turn).
    Ignored,
}

/// Cancels the in-flight exchange from outside the fold loop.
///
/// Cheap to clone and safe to hold across exchanges: it always targets
/// the session's current token, and is a no-op when nothing is
/// streaming. Finalization stays with the fold loop; the handle only
/// signals.
#[derive(Clone)]
pub struct StopHandle {
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl StopHandle {
    pub fn stop(&self) {
        if let Some(token) = self.current.lock().unwrap().as_ref() {
            token.cancel();
        }
    }
}

struct ActiveExchange {
    message_id: Uuid,
    token: CancellationToken,
    staged_sources: Option<Vec<SourceRef>>,
    staged_confidence: Option<AnswerConfidence>,
}

/// The state of one conversation's exchanges against the answering
/// backend. Create one per visible chat; drop it to discard the view.
pub struct ChatSession<A> {
    client: A,
    transcript: Transcript,
    conversation_id: Option<String>,
    department_filter: Option<String>,
    active: Option<ActiveExchange>,
    current_token: Arc<Mutex<Option<CancellationToken>>>,
    cache: Arc<dyn ConversationListCache>,
    notifier: Arc<dyn StreamNotifier>,
}

impl<A: AnswerService> ChatSession<A> {
    pub fn new(client: A) -> Self {
        Self {
            client,
            transcript: Transcript::new(),
            conversation_id: None,
            department_filter: None,
            active: None,
            current_token: Arc::new(Mutex::new(None)),
            cache: Arc::new(NoopCollaborators),
            notifier: Arc::new(NoopCollaborators),
        }
    }

    /// Collaborator told when the backend assigns this conversation
    /// its identifier.
    pub fn with_conversation_cache(mut self, cache: Arc<dyn ConversationListCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Collaborator told about user-visible stream failures.
    pub fn with_notifier(mut self, notifier: Arc<dyn StreamNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Restrict retrieval to one department's documents for every
    /// exchange in this session.
    pub fn with_department_filter(mut self, department: impl Into<String>) -> Self {
        self.department_filter = Some(department.into());
        self
    }

    // ── Read surface ─────────────────────────────────────

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Whether an exchange is in flight (or left stale by a dropped
    /// `submit` future; the next operation cleans that up).
    pub fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    /// Handle for cancelling the current exchange from another task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            current: Arc::clone(&self.current_token),
        }
    }

    // ── Operations ───────────────────────────────────────

    /// Submit a question and drive its answer stream to a terminal
    /// state. Blank input is ignored; a previous in-flight exchange is
    /// cancelled and finalized as a clean partial before the new user
    /// turn is appended.
    pub async fn submit(&mut self, text: &str) -> ExchangeOutcome {
        let text = text.trim();
        if text.is_empty() {
            return ExchangeOutcome::Ignored;
        }

        self.abort_stale_exchange();
        self.transcript.push(Message::user(text));
        self.run_exchange(text.to_string()).await
    }

    /// Cancel the in-flight exchange, keeping its partial content.
    /// No-op when nothing is streaming.
    pub fn stop(&mut self) {
        self.abort_stale_exchange();
    }

    /// Stop, then clear the transcript and the conversation identity.
    pub fn reset(&mut self) {
        self.abort_stale_exchange();
        self.transcript.clear();
        self.conversation_id = None;
    }

    /// Re-ask the last user question: trailing messages after that
    /// turn are removed and a fresh exchange runs without duplicating
    /// the user message. No-op when no user turn exists.
    pub async fn regenerate(&mut self) -> ExchangeOutcome {
        self.abort_stale_exchange();

        let Some((index, text)) = last_user_turn(self.transcript.messages()) else {
            return ExchangeOutcome::Ignored;
        };
        let text = text.to_string();
        self.transcript.truncate(index + 1);
        self.run_exchange(text).await
    }

    // ── Exchange lifecycle ───────────────────────────────

    async fn run_exchange(&mut self, text: String) -> ExchangeOutcome {
        let message_id = self.transcript.push(Message::assistant_placeholder());
        let token = CancellationToken::new();
        *self.current_token.lock().unwrap() = Some(token.clone());
        self.active = Some(ActiveExchange {
            message_id,
            token: token.clone(),
            staged_sources: None,
            staged_confidence: None,
        });

        let request = AnswerRequest {
            message: text,
            conversation_id: self.conversation_id.clone(),
            department_filter: self.department_filter.clone(),
            stream: true,
        };

        let mut events = match self.client.open_stream(&request).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open answer stream");
                return self.finish_failed();
            }
        };

        loop {
            tokio::select! {
                _ = token.cancelled() => return self.finish_stopped(),
                next = events.next() => match next {
                    Some(Ok(event)) => {
                        if let Some(outcome) = self.fold(event) {
                            return outcome;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Answer stream transport failure");
                        return self.finish_failed();
                    }
                    None => return self.finish_completed(),
                },
            }
        }
    }

    /// Fold one decoded event into the streaming message. Returns the
    /// terminal outcome when the event ends the exchange.
    fn fold(&mut self, event: AnswerEvent) -> Option<ExchangeOutcome> {
        match event {
            AnswerEvent::Token(fragment) => {
                if let Some(active) = &self.active {
                    let id = active.message_id;
                    self.transcript.append_content(&id, &fragment);
                }
                None
            }
            AnswerEvent::Sources(sources) => {
                if let Some(active) = self.active.as_mut() {
                    active.staged_sources = Some(sources);
                }
                None
            }
            AnswerEvent::Confidence(confidence) => {
                if let Some(active) = self.active.as_mut() {
                    active.staged_confidence = Some(confidence);
                }
                None
            }
            AnswerEvent::Conversation(id) => {
                // First writer wins; later assignments are ignored.
                if self.conversation_id.is_none() {
                    tracing::debug!(conversation_id = %id, "Conversation identifier assigned");
                    self.conversation_id = Some(id);
                    self.cache.invalidate();
                }
                None
            }
            AnswerEvent::Error(producer_message) => {
                tracing::warn!(error = %producer_message, "Producer signaled answer failure");
                Some(self.finish_failed())
            }
            AnswerEvent::Done(_) => Some(self.finish_completed()),
        }
    }

    fn finish_completed(&mut self) -> ExchangeOutcome {
        if let Some(active) = self.active.take() {
            let sources = active.staged_sources.unwrap_or_default();
            self.transcript
                .finalize(&active.message_id, sources, active.staged_confidence);
        }
        self.clear_token();
        ExchangeOutcome::Answered
    }

    fn finish_stopped(&mut self) -> ExchangeOutcome {
        if let Some(active) = self.active.take() {
            self.transcript.finalize_partial(&active.message_id);
        }
        self.clear_token();
        ExchangeOutcome::Stopped
    }

    fn finish_failed(&mut self) -> ExchangeOutcome {
        if let Some(active) = self.active.take() {
            self.transcript.fail(&active.message_id, ANSWER_FAILURE_TEXT);
        }
        self.notifier.answer_failed(ANSWER_FAILURE_TEXT);
        self.clear_token();
        ExchangeOutcome::Failed
    }

    /// Cancel and finalize an exchange whose driving future is gone
    /// (or is about to be superseded). The streaming message becomes a
    /// clean partial before anything new is appended.
    fn abort_stale_exchange(&mut self) {
        if let Some(active) = self.active.take() {
            active.token.cancel();
            self.transcript.finalize_partial(&active.message_id);
        }
        self.clear_token();
    }

    fn clear_token(&mut self) {
        *self.current_token.lock().unwrap() = None;
    }
}
