//! Shared data model for a verification run.

use serde::{Deserialize, Serialize};

use crate::evidence::EvidenceRecord;
use crate::verdict::Verdict;

/// The claim under verification.
///
/// Input is trimmed on construction; no further normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claim(String);

impl Claim {
    /// Create a claim from raw input, trimming surrounding whitespace.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(text.as_ref().trim().to_string())
    }

    /// The claim text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the claim is empty after trimming.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Claim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An evidence-retrieval capability.
///
/// This is a closed set: action names outside it are rejected at parse
/// time, never looked up at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// General web search.
    Web,

    /// Recent news-article search.
    News,
}

impl Capability {
    /// All capabilities, in registration order.
    pub const ALL: [Capability; 2] = [Capability::Web, Capability::News];

    /// The action name the model uses to request this capability.
    pub fn action_name(&self) -> &'static str {
        match self {
            Capability::Web => "web_search",
            Capability::News => "news_search",
        }
    }

    /// Resolve a model-emitted action name. Unknown names are `None`;
    /// the parser turns that into a typed error.
    pub fn from_action_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "web_search" => Some(Capability::Web),
            "news_search" => Some(Capability::News),
            _ => None,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action_name())
    }
}

/// Which capabilities have been successfully invoked during a run.
///
/// A run may only terminate successfully once every capability has been
/// used at least once. Order of first use is not tracked; only the set
/// matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityUsage {
    web: bool,
    news: bool,
}

impl CapabilityUsage {
    /// Create an empty usage set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful invocation.
    pub fn record(&mut self, capability: Capability) {
        match capability {
            Capability::Web => self.web = true,
            Capability::News => self.news = true,
        }
    }

    /// Whether a capability has been used.
    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::Web => self.web,
            Capability::News => self.news,
        }
    }

    /// Whether the mandatory-usage policy is satisfied.
    pub fn is_satisfied(&self) -> bool {
        self.web && self.news
    }

    /// Capabilities not yet used, in registration order.
    pub fn missing(&self) -> Vec<Capability> {
        Capability::ALL
            .iter()
            .copied()
            .filter(|c| !self.contains(*c))
            .collect()
    }

    /// Capabilities used so far, in registration order.
    pub fn used(&self) -> Vec<Capability> {
        Capability::ALL
            .iter()
            .copied()
            .filter(|c| self.contains(*c))
            .collect()
    }
}

/// The outcome of a completed verification run.
///
/// Built once at loop termination and immutable thereafter. A result is
/// only ever constructed with the full capability set satisfied; partial
/// runs surface as typed failures instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// The classified verdict.
    pub verdict: Verdict,

    /// The model's final explanation, verbatim.
    pub explanation: String,

    /// Deduplicated evidence records, discovery order, at most
    /// [`MAX_SOURCES`](crate::evidence::MAX_SOURCES).
    pub sources: Vec<EvidenceRecord>,

    /// Action names of the capabilities consulted during the run.
    pub capabilities_used: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_trims_input() {
        let claim = Claim::new("  The Earth is flat.  \n");
        assert_eq!(claim.as_str(), "The Earth is flat.");
        assert!(!claim.is_empty());
    }

    #[test]
    fn test_claim_empty_after_trim() {
        assert!(Claim::new("   \t\n").is_empty());
    }

    #[test]
    fn test_capability_action_names_round_trip() {
        for cap in Capability::ALL {
            assert_eq!(Capability::from_action_name(cap.action_name()), Some(cap));
        }
    }

    #[test]
    fn test_capability_unknown_name_rejected() {
        assert_eq!(Capability::from_action_name("wikipedia_search"), None);
        assert_eq!(Capability::from_action_name(""), None);
    }

    #[test]
    fn test_capability_name_case_insensitive() {
        assert_eq!(
            Capability::from_action_name(" Web_Search "),
            Some(Capability::Web)
        );
    }

    #[test]
    fn test_usage_requires_both() {
        let mut usage = CapabilityUsage::new();
        assert!(!usage.is_satisfied());
        assert_eq!(usage.missing(), vec![Capability::Web, Capability::News]);

        usage.record(Capability::Web);
        assert!(!usage.is_satisfied());
        assert_eq!(usage.missing(), vec![Capability::News]);

        usage.record(Capability::News);
        assert!(usage.is_satisfied());
        assert!(usage.missing().is_empty());
        assert_eq!(usage.used(), vec![Capability::Web, Capability::News]);
    }

    #[test]
    fn test_usage_repeat_invocations_idempotent() {
        let mut usage = CapabilityUsage::new();
        usage.record(Capability::News);
        usage.record(Capability::News);
        assert_eq!(usage.used(), vec![Capability::News]);
    }
}
