//! Verdict classification from final-answer text.
//!
//! This is a best-effort textual heuristic, not semantic entailment: a
//! case-insensitive scan for the verdict phrases, with "likely false"
//! taking precedence when both appear. Contradicting evidence should not
//! be overridden by an incidental "likely true" mention elsewhere in the
//! explanation.

use serde::{Deserialize, Serialize};

/// The classified outcome of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Likely True")]
    LikelyTrue,

    #[serde(rename = "Likely False")]
    LikelyFalse,

    #[serde(rename = "Uncertain")]
    Uncertain,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Verdict::LikelyTrue => "Likely True",
            Verdict::LikelyFalse => "Likely False",
            Verdict::Uncertain => "Uncertain",
        };
        f.write_str(label)
    }
}

/// Classify a final explanation into a verdict.
///
/// "likely false" wins over "likely true" when both phrases appear;
/// absence of either yields [`Verdict::Uncertain`].
pub fn classify(explanation: &str) -> Verdict {
    let lowered = explanation.to_lowercase();
    if lowered.contains("likely false") {
        Verdict::LikelyFalse
    } else if lowered.contains("likely true") {
        Verdict::LikelyTrue
    } else {
        Verdict::Uncertain
    }
}
