//! Bearer-credential seam.
//!
//! Token issuance belongs to the external identity broker; this crate
//! only needs a current bearer token per request. Implementations wrap
//! whatever the host application uses (SSO library, keychain, env).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No bearer token available: {0}")]
    Missing(String),
}

/// Supplies the bearer credential attached to every backend request.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Result<String, AuthError>;
}

/// Fixed token, handed over by the host application after sign-in.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }
}

/// Reads the token from an environment variable on every call, so a
/// rotated credential is picked up without restarting.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvTokenProvider {
    fn bearer_token(&self) -> Result<String, AuthError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(AuthError::Missing(format!(
                "environment variable {} is unset or empty",
                self.var
            ))),
        }
    }
}
