//! # claimcheck-core
//!
//! Deterministic engine for evidence-gathering claim verification.
//!
//! This crate provides the parts of Claimcheck that never touch the
//! network, answering:
//! - What did the model just say? (turn parsing)
//! - What evidence did the run collect? (record normalization)
//! - What does the final explanation amount to? (verdict classification)
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No LLM calls, no I/O**: Everything here is pure computation
//! 3. **Tagged results**: Parsing returns `ParsedTurn` variants, never
//!    sentinel strings
//! 4. **Bounded output**: Normalized evidence is duplicate-free and capped
//!
//! ## Example
//!
//! ```rust,ignore
//! use claimcheck_core::{parse_turn, ParsedTurn};
//!
//! let turn = parse_turn("Thought: check the web\nAction: web_search\nAction Input: earth shape")?;
//! match turn {
//!     ParsedTurn::Action { call, .. } => println!("invoke {}", call.capability),
//!     ParsedTurn::Final { answer, .. } => println!("done: {}", answer),
//! }
//! ```

pub mod evidence;
pub mod parser;
pub mod transcript;
pub mod types;
pub mod verdict;

// Re-export main types at crate root
pub use evidence::{normalize, prune_records, EvidenceRecord, MAX_SOURCES};
pub use parser::{parse_turn, ActionCall, ParseError, ParsedTurn};
pub use transcript::{Transcript, TranscriptEntry, Turn};
pub use types::{Capability, CapabilityUsage, Claim, VerificationResult};
pub use verdict::{classify, Verdict};
