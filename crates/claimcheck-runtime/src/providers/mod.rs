//! LLM backend abstractions.
//!
//! This module defines the trait the reasoning loop drives and the
//! Gemini implementation behind it.
//!
//! ## Security
//!
//! All backends use the [`secrets`] module for credential handling. See
//! [`ApiCredential`] for the patterns.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

mod gemini;
pub mod secrets;

pub use gemini::{GeminiBackend, GOOGLE_API_KEY_ENV};
pub use secrets::{ApiCredential, CredentialSource};

/// Errors from LLM backends.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Empty completion: the backend returned no text")]
    EmptyCompletion,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether a retry at the transport level can plausibly succeed.
    ///
    /// Parse and configuration errors never retry; a rate limit, timeout,
    /// or dropped connection may clear.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::HttpError(_)
                | ProviderError::RateLimited { .. }
                | ProviderError::Timeout(_)
        )
    }
}

/// Configuration for a single generation request.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model to use.
    pub model: String,

    /// Maximum tokens to generate.
    pub max_output_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_MODEL.to_string(),
            max_output_tokens: 1024,
            temperature: 0.2,
            timeout: Duration::from_secs(25),
        }
    }
}

impl GenerationConfig {
    /// Derive a generation config from the runtime config.
    pub fn from_runtime(config: &crate::config::RuntimeConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            timeout: config.llm_timeout,
        }
    }
}

/// Backend abstraction allows swapping LLM vendors.
///
/// The reasoning loop is the only caller; one prompt in, unconstrained
/// free text out. Batch responses suffice; no streaming.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a completion for the accumulated prompt.
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError>;

    /// Check if the backend is usable.
    async fn health_check(&self) -> bool;

    /// Backend name for logs and metrics.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::HttpError("connection reset".into()).is_transient());
        assert!(ProviderError::Timeout(Duration::from_secs(25)).is_transient());
        assert!(ProviderError::RateLimited { retry_after: None }.is_transient());

        assert!(!ProviderError::ParseError("bad json".into()).is_transient());
        assert!(!ProviderError::NotConfigured("no key".into()).is_transient());
        assert!(!ProviderError::ApiError {
            status: 400,
            message: "bad request".into()
        }
        .is_transient());
    }

    #[test]
    fn test_generation_config_from_runtime() {
        let runtime = crate::config::RuntimeConfig::default();
        let config = GenerationConfig::from_runtime(&runtime);
        assert_eq!(config.model, runtime.model);
        assert_eq!(config.timeout, runtime.llm_timeout);
    }
}
