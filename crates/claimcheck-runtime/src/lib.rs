//! # claimcheck-runtime
//!
//! The reasoning-loop runtime for Claimcheck.
//!
//! This crate owns every external collaborator: the LLM backend that
//! drives the reason→act→observe loop, and the two evidence-retrieval
//! capabilities (web search, news search) the loop must consult before a
//! verdict is accepted.
//!
//! The deterministic pieces (turn parsing, evidence normalization,
//! verdict classification) live in `claimcheck-core` and never make
//! network calls.
//!
//! ## Example
//!
//! ```rust,ignore
//! use claimcheck_runtime::Orchestrator;
//!
//! let orchestrator = Orchestrator::from_env()?;
//! let result = orchestrator.verify("The Earth is flat.").await?;
//! println!("{}: {}", result.verdict, result.explanation);
//! ```

pub mod capabilities;
pub mod config;
pub mod controller;
pub mod meter;
pub mod orchestrator;
pub mod prompts;
pub mod providers;

// Re-export main types at crate root
pub use capabilities::{CapabilityError, CapabilitySet, SearchBackend, SearchHit};
pub use config::RuntimeConfig;
pub use controller::{ReasoningLoop, RunOutcome};
pub use meter::{RunUsage, UsageMeter};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, VerifyError};
pub use providers::{GenerationConfig, LlmBackend, ProviderError};
