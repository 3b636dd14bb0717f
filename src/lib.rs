//! Docent: streaming conversation session manager for a
//! documentation chatbot.
//!
//! The backend answers questions over documents; this crate manages
//! the client side of one conversation: submitting a question, folding
//! the server-push answer stream into a transcript, cancelling
//! mid-flight, recovering from partial failures, and regenerating the
//! last answer. Retrieval, inference, identity, and ingestion are the
//! backend's business and appear here only as interfaces.

pub mod auth;
pub mod client;
pub mod config;
pub mod models;
pub mod notify;
pub mod session;
pub mod stream;

pub use client::{AnswerRequest, AnswerService, HttpAnswerClient, MockAnswerService};
pub use session::{ChatSession, ExchangeOutcome, StopHandle};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for hosts that do not install their own
/// subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
