use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Docent";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "info,docent=debug"
}

/// Client settings, environment-first like the backend's own config.
///
/// - `DOCENT_BACKEND_URL`: base URL of the answering backend's API
/// - `DOCENT_REQUEST_TIMEOUT_SECS`: whole-request deadline, streams
///   included; a stalled stream is terminated here, not by the session
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000/api/v1".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_url: std::env::var("DOCENT_BACKEND_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.backend_url),
            request_timeout_secs: std::env::var("DOCENT_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| parse_timeout_secs(&v))
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Accept only sane positive values; anything else falls back to the default.
fn parse_timeout_secs(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|v| *v > 0)
}
