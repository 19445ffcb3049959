//! Error types for the LLM assistant.

use thiserror::Error;

/// Errors that can occur while asking the completion API for a reply.
#[derive(Debug, Error, Clone)]
pub enum AssistantError {
    /// No API key was configured
    #[error("Assistant is not configured")]
    NotConfigured,

    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// Upstream returned a status or body we could not use
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// Circuit breaker is open due to repeated failures
    #[error("Circuit breaker open after repeated failures, retry in {retry_after_secs}s")]
    CircuitBreakerOpen { retry_after_secs: u64 },

    /// The caller's conversation could not be sent as-is
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Configured base URL could not be joined with the endpoint path
    #[error("URL error: {message}")]
    UrlError { message: String },
}

impl AssistantError {
    /// Returns true if this error is potentially transient and retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AssistantError::Network { .. } | AssistantError::UnexpectedResponse { .. }
        )
    }

    /// Returns true if the assistant cannot serve requests right now.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AssistantError::NotConfigured | AssistantError::CircuitBreakerOpen { .. }
        )
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        AssistantError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for AssistantError {
    fn from(err: url::ParseError) -> Self {
        AssistantError::UrlError {
            message: err.to_string(),
        }
    }
}
