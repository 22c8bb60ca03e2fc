//! The verification orchestrator facade.
//!
//! An [`Orchestrator`] owns the collaborator handles (LLM backend, the
//! two search capabilities) and exposes the single entry point
//! [`Orchestrator::verify`]. Every call creates its own loop state and
//! drops it on every exit path; nothing is shared across concurrent
//! claims, so callers may verify in parallel without a global lock.

use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use claimcheck_core::{Claim, VerificationResult};

use crate::capabilities::{CapabilitySet, NewsApiSearch, SearchCache, SerperWebSearch};
use crate::config::RuntimeConfig;
use crate::controller::{ReasoningLoop, RunOutcome};
use crate::providers::{GeminiBackend, LlmBackend, ProviderError};

/// Caller-visible failures from a verification run.
///
/// Every variant is distinguishable from a legitimate `Uncertain`
/// verdict: a caller never receives a [`VerificationResult`] from a
/// non-compliant run.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("claim is empty after trimming")]
    InvalidClaim,

    #[error("LLM backend unavailable: {0}")]
    BackendUnavailable(#[from] ProviderError),

    #[error("mandatory-capability policy not satisfied after {turns} turns (used: {capabilities_used:?})")]
    PolicyNotSatisfied {
        turns: u32,
        capabilities_used: Vec<String>,
    },

    #[error("model produced {attempts} consecutive malformed turns")]
    ParseRetriesExhausted { attempts: u32 },

    #[error("verification was cancelled")]
    Cancelled,
}

/// The orchestrator: collaborator handles plus configuration.
pub struct Orchestrator {
    backend: Arc<dyn LlmBackend>,
    capabilities: CapabilitySet,
    config: RuntimeConfig,
}

impl Orchestrator {
    /// Start building an orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Build the reference deployment from the environment: Gemini
    /// backend, Serper web search, NewsAPI news search.
    ///
    /// Requires `GOOGLE_API_KEY`, `SERPAPI_API_KEY`, and
    /// `NEWSAPI_API_KEY`; configuration knobs come from `CLAIMCHECK_*`
    /// variables where set.
    pub fn from_env() -> Result<Self, VerifyError> {
        let config = RuntimeConfig::from_env()
            .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;
        Self::from_env_with_config(config)
    }

    /// Like [`Orchestrator::from_env`], with an explicit configuration
    /// (CLI flags and the like win over environment variables).
    pub fn from_env_with_config(config: RuntimeConfig) -> Result<Self, VerifyError> {
        let web = SerperWebSearch::from_env()
            .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;
        let news = NewsApiSearch::from_env()
            .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;

        let mut capabilities =
            CapabilitySet::new(Arc::new(web), Arc::new(news), config.capability_timeout);
        if config.search_cache_capacity > 0 {
            capabilities = capabilities.with_cache(SearchCache::new(
                config.search_cache_capacity,
                config.search_cache_ttl,
            ));
        }

        Ok(Self {
            backend: Arc::new(GeminiBackend::from_env()?),
            capabilities,
            config,
        })
    }

    /// Verify one claim.
    pub async fn verify(&self, claim: &str) -> Result<VerificationResult, VerifyError> {
        self.verify_with_cancel(claim, CancellationToken::new())
            .await
    }

    /// Verify one claim under an external cancellation token.
    pub async fn verify_with_cancel(
        &self,
        claim: &str,
        cancel: CancellationToken,
    ) -> Result<VerificationResult, VerifyError> {
        self.verify_detailed(claim, cancel)
            .await
            .map(|outcome| outcome.result)
    }

    /// Verify one claim and return the run's usage detail alongside the
    /// result.
    pub async fn verify_detailed(
        &self,
        claim: &str,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, VerifyError> {
        let claim = Claim::new(claim);
        if claim.is_empty() {
            return Err(VerifyError::InvalidClaim);
        }

        tracing::info!(claim = %claim, backend = self.backend.name(), "verification started");

        let reasoning = ReasoningLoop::new(
            self.backend.as_ref(),
            &self.capabilities,
            &self.config,
            cancel,
        );
        let outcome = reasoning.run(&claim).await;

        match &outcome {
            Ok(run) => tracing::info!(
                verdict = %run.result.verdict,
                turns = run.turns_taken,
                llm_calls = run.usage.llm_calls,
                "verification finished"
            ),
            Err(e) => tracing::warn!(error = %e, "verification failed"),
        }

        outcome
    }

    /// The active configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    backend: Option<Arc<dyn LlmBackend>>,
    capabilities: Option<CapabilitySet>,
    config: RuntimeConfig,
}

impl OrchestratorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            backend: None,
            capabilities: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM backend.
    pub fn backend(mut self, backend: Arc<dyn LlmBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the capability set.
    pub fn capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<Orchestrator, VerifyError> {
        let backend = self.backend.ok_or_else(|| {
            VerifyError::BackendUnavailable(ProviderError::NotConfigured(
                "no LLM backend set".to_string(),
            ))
        })?;
        let capabilities = self.capabilities.ok_or_else(|| {
            VerifyError::BackendUnavailable(ProviderError::NotConfigured(
                "no capability set configured".to_string(),
            ))
        })?;

        Ok(Orchestrator {
            backend,
            capabilities,
            config: self.config,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
