//! Runtime configuration.
//!
//! Every knob has a default matching the reference deployment; the
//! environment can override any of them. Durations are parsed from
//! human-readable strings ("25s", "1m 30s").

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default model driving the reasoning loop.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid duration in {var}: {source}")]
    InvalidDuration {
        var: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("invalid integer in {var}: {source}")]
    InvalidInteger {
        var: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Configuration for a verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Model name passed to the LLM backend.
    pub model: String,

    /// Sampling temperature for the backend.
    pub temperature: f32,

    /// Maximum tokens the backend may generate per turn.
    pub max_output_tokens: u32,

    /// Timeout for one LLM call.
    #[serde(with = "duration_secs")]
    pub llm_timeout: Duration,

    /// Timeout for one capability call.
    #[serde(with = "duration_secs")]
    pub capability_timeout: Duration,

    /// Iteration budget: turns before the run fails as non-compliant.
    pub max_turns: u32,

    /// Transport-level retries for an LLM call (parse failures never
    /// retry at this level).
    pub max_transport_retries: u32,

    /// Consecutive malformed turns tolerated before the run fails.
    pub max_parse_retries: u32,

    /// Capacity of the per-process search-result cache; 0 disables it.
    pub search_cache_capacity: u64,

    /// Time-to-live for cached search results.
    #[serde(with = "duration_secs")]
    pub search_cache_ttl: Duration,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_output_tokens: 1024,
            llm_timeout: Duration::from_secs(25),
            capability_timeout: Duration::from_secs(15),
            max_turns: 10,
            max_transport_retries: 2,
            max_parse_retries: 3,
            search_cache_capacity: 1_000,
            search_cache_ttl: Duration::from_secs(300),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the environment, falling back to defaults
    /// for anything unset.
    ///
    /// Recognized variables: `CLAIMCHECK_MODEL`, `CLAIMCHECK_LLM_TIMEOUT`,
    /// `CLAIMCHECK_CAPABILITY_TIMEOUT`, `CLAIMCHECK_MAX_TURNS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("CLAIMCHECK_MODEL") {
            if !model.trim().is_empty() {
                config.model = model.trim().to_string();
            }
        }
        if let Some(timeout) = env_duration("CLAIMCHECK_LLM_TIMEOUT")? {
            config.llm_timeout = timeout;
        }
        if let Some(timeout) = env_duration("CLAIMCHECK_CAPABILITY_TIMEOUT")? {
            config.capability_timeout = timeout;
        }
        if let Ok(turns) = std::env::var("CLAIMCHECK_MAX_TURNS") {
            config.max_turns = turns
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidInteger {
                    var: "CLAIMCHECK_MAX_TURNS".to_string(),
                    source,
                })?;
        }

        Ok(config)
    }
}

fn env_duration(var: &str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => humantime::parse_duration(raw.trim())
            .map(Some)
            .map_err(|source| ConfigError::InvalidDuration {
                var: var.to_string(),
                source,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = RuntimeConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_turns, 10);
        assert_eq!(config.llm_timeout, Duration::from_secs(25));
        assert_eq!(config.capability_timeout, Duration::from_secs(15));
        assert_eq!(config.max_transport_retries, 2);
    }

    #[test]
    fn test_duration_round_trips_through_serde() {
        let config = RuntimeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.llm_timeout, config.llm_timeout);
        assert_eq!(back.search_cache_ttl, config.search_cache_ttl);
    }

    #[test]
    fn test_humantime_parsing() {
        assert_eq!(
            humantime::parse_duration("25s").unwrap(),
            Duration::from_secs(25)
        );
        assert_eq!(
            humantime::parse_duration("1m 30s").unwrap(),
            Duration::from_secs(90)
        );
    }
}
