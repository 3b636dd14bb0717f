//! HTTP client for the answering backend.
//!
//! One call per submitted question opens the streamed answer; the rest
//! of the surface (conversation list, history, feedback) is plain
//! request/response. Everything is authenticated with a bearer token
//! from the [`TokenProvider`] seam.

use std::future::Future;

use futures_util::StreamExt;
use serde::Serialize;
use thiserror::Error;

use crate::auth::{AuthError, TokenProvider};
use crate::config::Settings;
use crate::models::{ConversationHistory, ConversationSummary, MessageFeedback};
use crate::stream::{AnswerEventStream, BoxedAnswerStream};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Cannot reach answering backend at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Request body for one streamed exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_filter: Option<String>,
    pub stream: bool,
}

impl AnswerRequest {
    pub fn new(message: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id,
            department_filter: None,
            stream: true,
        }
    }

    /// Restrict retrieval to one department's documents.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department_filter = Some(department.into());
        self
    }
}

/// Feedback payload for a finished answer, addressed by its position
/// in the stored conversation.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRequest {
    pub conversation_id: String,
    pub message_index: u32,
    pub feedback: MessageFeedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// The session controller's view of the answering backend: open one
/// server-push answer stream per submitted question.
pub trait AnswerService: Send + Sync {
    fn open_stream(
        &self,
        request: &AnswerRequest,
    ) -> impl Future<Output = Result<BoxedAnswerStream, ClientError>> + Send;
}

// ═══════════════════════════════════════════════════════════
// HTTP implementation
// ═══════════════════════════════════════════════════════════

/// Backend client over HTTP, streaming answers via chunked responses.
pub struct HttpAnswerClient<T> {
    base_url: String,
    http: reqwest::Client,
    tokens: T,
    timeout_secs: u64,
}

impl<T: TokenProvider> HttpAnswerClient<T> {
    pub fn new(settings: &Settings, tokens: T) -> Self {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: settings.backend_url.trim_end_matches('/').to_string(),
            http,
            tokens,
            timeout_secs: settings.request_timeout_secs,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_connect() {
            ClientError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::Http(e.to_string())
        }
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Backend {
            status: status.as_u16(),
            body,
        })
    }

    /// List the caller's conversations, most recently active first.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ClientError> {
        let url = format!("{}/chat/conversations", self.base_url);
        let token = self.tokens.bearer_token()?;

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ResponseParsing(e.to_string()))
    }

    /// Fetch the stored exchange history of one conversation.
    pub async fn conversation_history(
        &self,
        conversation_id: &str,
    ) -> Result<ConversationHistory, ClientError> {
        let url = format!("{}/chat/conversations/{conversation_id}", self.base_url);
        let token = self.tokens.bearer_token()?;

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ResponseParsing(e.to_string()))
    }

    /// Delete a conversation and its stored history.
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<(), ClientError> {
        let url = format!("{}/chat/conversations/{conversation_id}", self.base_url);
        let token = self.tokens.bearer_token()?;

        let response = self
            .http
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Self::ensure_success(response).await.map(|_| ())
    }

    /// Record user feedback on a finished answer.
    pub async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<(), ClientError> {
        let url = format!("{}/chat/feedback", self.base_url);
        let token = self.tokens.bearer_token()?;

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(feedback)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Self::ensure_success(response).await.map(|_| ())
    }
}

impl<T: TokenProvider> AnswerService for HttpAnswerClient<T> {
    async fn open_stream(
        &self,
        request: &AnswerRequest,
    ) -> Result<BoxedAnswerStream, ClientError> {
        let url = format!("{}/chat/stream", self.base_url);
        let token = self.tokens.bearer_token()?;

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let response = Self::ensure_success(response).await?;
        let bytes = Box::pin(response.bytes_stream());
        Ok(Box::pin(AnswerEventStream::new(bytes)))
    }
}

// ═══════════════════════════════════════════════════════════
// Mock service for tests and offline development
// ═══════════════════════════════════════════════════════════

/// Scripted answering service: plays back configured streams and
/// records every request it receives.
pub struct MockAnswerService {
    scripts: std::sync::Mutex<std::collections::VecDeque<MockScript>>,
    requests: std::sync::Mutex<Vec<AnswerRequest>>,
}

type ScriptedEvents = Vec<Result<crate::stream::AnswerEvent, crate::stream::StreamError>>;

enum MockScript {
    /// Yield these events, then end the stream.
    Events(ScriptedEvents),
    /// Yield these events, then stay pending forever (a stalled
    /// producer, for exercising cancellation).
    EventsThenHang(ScriptedEvents),
    /// Fail the `open_stream` call itself.
    OpenFailure(ClientError),
}

impl MockAnswerService {
    pub fn new() -> Self {
        Self {
            scripts: std::sync::Mutex::new(std::collections::VecDeque::new()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Queue a stream of events for the next `open_stream` call.
    pub fn push_stream(&self, events: Vec<crate::stream::AnswerEvent>) {
        let script = events.into_iter().map(Ok).collect();
        self.scripts
            .lock()
            .unwrap()
            .push_back(MockScript::Events(script));
    }

    /// Queue a stream that never ends: the given events, then silence.
    pub fn push_stream_then_hang(&self, events: Vec<crate::stream::AnswerEvent>) {
        let script = events.into_iter().map(Ok).collect();
        self.scripts
            .lock()
            .unwrap()
            .push_back(MockScript::EventsThenHang(script));
    }

    /// Queue a stream that fails mid-flight after the given events.
    pub fn push_stream_then_transport_failure(
        &self,
        events: Vec<crate::stream::AnswerEvent>,
        failure: &str,
    ) {
        let mut script: ScriptedEvents = events.into_iter().map(Ok).collect();
        script.push(Err(crate::stream::StreamError::Transport(
            failure.to_string(),
        )));
        self.scripts
            .lock()
            .unwrap()
            .push_back(MockScript::Events(script));
    }

    /// Queue a connection-level failure for the next `open_stream` call.
    pub fn push_open_failure(&self, error: ClientError) {
        self.scripts
            .lock()
            .unwrap()
            .push_back(MockScript::OpenFailure(error));
    }

    /// All requests seen so far, in order.
    pub fn requests(&self) -> Vec<AnswerRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockAnswerService {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerService for MockAnswerService {
    async fn open_stream(
        &self,
        request: &AnswerRequest,
    ) -> Result<BoxedAnswerStream, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockScript::Events(Vec::new()));
        match script {
            MockScript::Events(events) => Ok(Box::pin(futures_util::stream::iter(events))),
            MockScript::EventsThenHang(events) => Ok(Box::pin(
                futures_util::stream::iter(events).chain(futures_util::stream::pending()),
            )),
            MockScript::OpenFailure(error) => Err(error),
        }
    }
}

/// Shared-ownership passthrough so a session can hold `Arc<impl
/// AnswerService>` while tests keep a handle for scripting.
impl<A: AnswerService> AnswerService for std::sync::Arc<A> {
    async fn open_stream(
        &self,
        request: &AnswerRequest,
    ) -> Result<BoxedAnswerStream, ClientError> {
        (**self).open_stream(request).await
    }
}
