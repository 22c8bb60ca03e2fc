//! Run usage metering.
//!
//! Counts what a verification run actually did: model calls, capability
//! invocations per capability, corrective re-prompts. The meter is
//! shared with the loop internals behind cheap locks and snapshotted
//! into the detailed outcome at termination.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

use claimcheck_core::Capability;

/// Accumulated usage for one verification run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunUsage {
    /// Number of LLM calls made (retries included).
    pub llm_calls: u32,

    /// Web-search invocations attempted.
    pub web_invocations: u32,

    /// News-search invocations attempted.
    pub news_invocations: u32,

    /// Malformed turns that triggered a corrective re-prompt.
    pub parse_failures: u32,

    /// Final answers rejected by the mandatory-usage policy.
    pub rejected_finals: u32,
}

impl RunUsage {
    /// Total capability invocations across both capabilities.
    pub fn capability_invocations(&self) -> u32 {
        self.web_invocations + self.news_invocations
    }
}

/// Meter collecting [`RunUsage`] during a run.
#[derive(Debug, Default)]
pub struct UsageMeter {
    llm_calls: AtomicU32,
    parse_failures: AtomicU32,
    rejected_finals: AtomicU32,
    invocations: RwLock<[u32; 2]>,
}

impl UsageMeter {
    /// Create an empty meter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one LLM call.
    pub fn record_llm_call(&self) {
        self.llm_calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Record one capability invocation attempt.
    pub fn record_invocation(&self, capability: Capability) {
        let mut counts = self.invocations.write();
        match capability {
            Capability::Web => counts[0] += 1,
            Capability::News => counts[1] += 1,
        }
    }

    /// Record a malformed turn.
    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a policy-rejected final answer.
    pub fn record_rejected_final(&self) {
        self.rejected_finals.fetch_add(1, Ordering::SeqCst);
    }

    /// Snapshot the current counts.
    pub fn snapshot(&self) -> RunUsage {
        let counts = *self.invocations.read();
        RunUsage {
            llm_calls: self.llm_calls.load(Ordering::SeqCst),
            web_invocations: counts[0],
            news_invocations: counts[1],
            parse_failures: self.parse_failures.load(Ordering::SeqCst),
            rejected_finals: self.rejected_finals.load(Ordering::SeqCst),
        }
    }
}
