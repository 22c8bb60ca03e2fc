//! The reasoning loop controller.
//!
//! Drives the reason→act→observe protocol for one claim:
//! prompt the backend, parse the turn, dispatch capability requests,
//! and gate termination on the mandatory-usage policy.
//!
//! # State machine
//!
//! AWAITING_MODEL → PARSING → {INVOKING_CAPABILITY | CHECKING_TERMINATION}
//! → AWAITING_MODEL (loop) | TERMINATED
//!
//! The loop is strictly sequential: each turn's model call and capability
//! invocation complete (or time out) before the next turn begins, because
//! the next prompt depends on the prior observation. The model call and
//! the capability call are the only suspension points; both honor the
//! run's cancellation token.

use backon::{ExponentialBuilder, Retryable};
use tokio_util::sync::CancellationToken;

use claimcheck_core::{
    classify, normalize, parse_turn, Capability, CapabilityUsage, Claim, ParsedTurn, Transcript,
    Turn, VerificationResult,
};

use crate::capabilities::CapabilitySet;
use crate::config::RuntimeConfig;
use crate::meter::{RunUsage, UsageMeter};
use crate::orchestrator::VerifyError;
use crate::prompts;
use crate::providers::{GenerationConfig, LlmBackend, ProviderError};

/// Result of a completed run, with usage detail.
#[derive(Debug)]
pub struct RunOutcome {
    /// The verification result.
    pub result: VerificationResult,

    /// What the run cost to produce.
    pub usage: RunUsage,

    /// Turns consumed, corrective turns included.
    pub turns_taken: u32,
}

/// One reasoning loop over one claim.
///
/// Owns no collaborator handles: the orchestrator lends them per run, so
/// concurrent `verify` calls share backends but nothing else.
pub struct ReasoningLoop<'a> {
    backend: &'a dyn LlmBackend,
    capabilities: &'a CapabilitySet,
    config: &'a RuntimeConfig,
    cancel: CancellationToken,
}

impl<'a> ReasoningLoop<'a> {
    /// Create a loop over borrowed collaborators.
    pub fn new(
        backend: &'a dyn LlmBackend,
        capabilities: &'a CapabilitySet,
        config: &'a RuntimeConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            backend,
            capabilities,
            config,
            cancel,
        }
    }

    /// Run the loop to termination, the iteration budget, or failure.
    pub async fn run(&self, claim: &Claim) -> Result<RunOutcome, VerifyError> {
        let meter = UsageMeter::new();
        let mut transcript = Transcript::new();
        let mut usage = CapabilityUsage::new();
        let mut observations: Vec<(Capability, String)> = Vec::new();
        let mut consecutive_parse_failures = 0u32;
        let generation = GenerationConfig::from_runtime(self.config);

        for turn_index in 1..=self.config.max_turns {
            let prompt = prompts::render_prompt(claim, &transcript);
            let raw = self.model_call(&prompt, &generation, &meter).await?;

            match parse_turn(&raw) {
                Ok(ParsedTurn::Action { thought, call }) => {
                    consecutive_parse_failures = 0;
                    meter.record_invocation(call.capability);

                    let invocation = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Err(VerifyError::Cancelled),
                        invocation = self.capabilities.invoke(call.capability, &call.query) => invocation,
                    };

                    if invocation.succeeded {
                        usage.record(call.capability);
                    }
                    tracing::info!(
                        turn = turn_index,
                        capability = %call.capability,
                        succeeded = invocation.succeeded,
                        "capability turn completed"
                    );
                    observations.push((call.capability, invocation.observation.clone()));
                    transcript.push_turn(Turn::acted(thought, call, invocation.observation));
                }
                Ok(ParsedTurn::Final { thought, answer }) => {
                    consecutive_parse_failures = 0;

                    if !usage.is_satisfied() {
                        // The policy is never silently downgraded: reject
                        // the answer and steer the model back to the
                        // missing capability.
                        meter.record_rejected_final();
                        let missing = usage.missing();
                        tracing::warn!(
                            turn = turn_index,
                            missing = ?missing,
                            "final answer rejected: mandatory capabilities unused"
                        );
                        transcript.push_guidance(prompts::missing_capability_note(&missing));
                        continue;
                    }

                    let verdict = classify(&answer);
                    let sources = normalize(&observations);
                    transcript.push_turn(Turn::finished(thought, answer.clone()));
                    tracing::info!(
                        turn = turn_index,
                        verdict = %verdict,
                        sources = sources.len(),
                        "run terminated"
                    );

                    let result = VerificationResult {
                        verdict,
                        explanation: answer,
                        sources,
                        capabilities_used: usage
                            .used()
                            .iter()
                            .map(|c| c.action_name().to_string())
                            .collect(),
                    };
                    return Ok(RunOutcome {
                        result,
                        usage: meter.snapshot(),
                        turns_taken: turn_index,
                    });
                }
                Err(err) => {
                    consecutive_parse_failures += 1;
                    meter.record_parse_failure();
                    tracing::warn!(
                        turn = turn_index,
                        error = %err,
                        consecutive = consecutive_parse_failures,
                        "malformed model turn"
                    );
                    if consecutive_parse_failures > self.config.max_parse_retries {
                        return Err(VerifyError::ParseRetriesExhausted {
                            attempts: consecutive_parse_failures,
                        });
                    }
                    transcript.push_guidance(prompts::format_reminder());
                }
            }
        }

        Err(VerifyError::PolicyNotSatisfied {
            turns: self.config.max_turns,
            capabilities_used: usage
                .used()
                .iter()
                .map(|c| c.action_name().to_string())
                .collect(),
        })
    }

    /// One LLM call: timeout-bounded, retried on transient transport
    /// failure, cancellable.
    async fn model_call(
        &self,
        prompt: &str,
        generation: &GenerationConfig,
        meter: &UsageMeter,
    ) -> Result<String, VerifyError> {
        let attempt = || async {
            meter.record_llm_call();
            match tokio::time::timeout(generation.timeout, self.backend.generate(prompt, generation))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(generation.timeout)),
            }
        };

        let retried = attempt
            .retry(
                ExponentialBuilder::default()
                    .with_max_times(self.config.max_transport_retries as usize),
            )
            .when(ProviderError::is_transient)
            .notify(|err: &ProviderError, backoff: std::time::Duration| {
                tracing::warn!(error = %err, backoff = ?backoff, "retrying LLM call");
            });

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(VerifyError::Cancelled),
            result = retried => result.map_err(VerifyError::BackendUnavailable),
        }
    }
}
