use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod groq;

pub use groq::GroqClient;

/// A single-prompt request to the completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Prompt sent as one user-role message
    pub prompt: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Cap on generated tokens
    pub max_tokens: u32,
}

/// Errors surfaced by a completion service
#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    /// The service asked us to slow down
    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        /// Seconds suggested by a `retry-after` header, if any
        retry_after: Option<u64>,
    },

    #[error("API responded with error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion service returned no content")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CompletionError {
    /// Server-suggested wait in seconds, when the service sent one
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            CompletionError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Whether this failure should be treated as rate limiting.
    ///
    /// Besides the typed cases this looks for `429` / "rate limit" in the message,
    /// since some gateways wrap the upstream error in a generic one.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            CompletionError::RateLimited { .. } => true,
            CompletionError::Api { status: 429, .. } => true,
            other => {
                let message = other.to_string();
                message.contains("429") || message.to_lowercase().contains("rate limit")
            }
        }
    }
}

/// Trait for completion service clients
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion and return the raw generated text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
