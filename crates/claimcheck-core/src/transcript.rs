//! The run transcript: completed turns plus injected guidance.
//!
//! A transcript is append-only and owned by exactly one reasoning loop.
//! It renders back to ReAct scratchpad text so the model sees its own
//! prior reasoning, the observations it earned, and any corrective
//! guidance the controller injected.

use serde::{Deserialize, Serialize};

use crate::parser::ActionCall;

/// One completed cycle of the reasoning loop.
///
/// Exactly one of `action` or `final_answer` is present; the
/// constructors are the only way to build a turn, so the invariant holds
/// by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// The model's reasoning for this turn.
    pub thought: String,

    /// The capability request, if this was an acting turn.
    pub action: Option<ActionCall>,

    /// The observation returned for `action`.
    pub observation: Option<String>,

    /// The final answer, if this was the terminal turn.
    pub final_answer: Option<String>,
}

impl Turn {
    /// A turn that invoked a capability and observed its output.
    pub fn acted(thought: impl Into<String>, call: ActionCall, observation: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            action: Some(call),
            observation: Some(observation.into()),
            final_answer: None,
        }
    }

    /// The terminal turn carrying the final answer.
    pub fn finished(thought: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            action: None,
            observation: None,
            final_answer: Some(answer.into()),
        }
    }
}

/// One transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TranscriptEntry {
    /// A completed turn.
    Turn(Turn),

    /// A synthetic observation injected by the controller: a corrective
    /// note after a rejected final answer or a malformed turn. Rendered
    /// as an observation so the model reads it like tool output.
    Guidance(String),
}

/// Ordered, append-only record of a verification run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed turn.
    pub fn push_turn(&mut self, turn: Turn) {
        self.entries.push(TranscriptEntry::Turn(turn));
    }

    /// Append a synthetic guidance observation.
    pub fn push_guidance(&mut self, note: impl Into<String>) {
        self.entries.push(TranscriptEntry::Guidance(note.into()));
    }

    /// All entries, in order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the scratchpad text appended to the prompt each turn.
    pub fn render_scratchpad(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                TranscriptEntry::Turn(turn) => {
                    if !turn.thought.is_empty() {
                        out.push_str("Thought: ");
                        out.push_str(&turn.thought);
                        out.push('\n');
                    }
                    if let Some(call) = &turn.action {
                        out.push_str("Action: ");
                        out.push_str(call.capability.action_name());
                        out.push('\n');
                        out.push_str("Action Input: ");
                        out.push_str(&call.query);
                        out.push('\n');
                    }
                    if let Some(obs) = &turn.observation {
                        out.push_str("Observation: ");
                        out.push_str(obs);
                        out.push('\n');
                    }
                    if let Some(answer) = &turn.final_answer {
                        out.push_str("Final Answer: ");
                        out.push_str(answer);
                        out.push('\n');
                    }
                }
                TranscriptEntry::Guidance(note) => {
                    out.push_str("Observation: ");
                    out.push_str(note);
                    out.push('\n');
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Capability;

    #[test]
    fn test_acted_turn_holds_invariant() {
        let turn = Turn::acted(
            "check the web",
            ActionCall {
                capability: Capability::Web,
                query: "earth shape".to_string(),
            },
            "Observation data",
        );
        assert!(turn.action.is_some());
        assert!(turn.final_answer.is_none());
    }

    #[test]
    fn test_finished_turn_holds_invariant() {
        let turn = Turn::finished("done", "VERDICT: Uncertain");
        assert!(turn.action.is_none());
        assert!(turn.observation.is_none());
        assert!(turn.final_answer.is_some());
    }

    #[test]
    fn test_scratchpad_rendering_order() {
        let mut transcript = Transcript::new();
        transcript.push_turn(Turn::acted(
            "search first",
            ActionCall {
                capability: Capability::Web,
                query: "acme layoffs".to_string(),
            },
            "{\"results\": []}",
        ));
        transcript.push_guidance("You must still call news_search.");

        let rendered = transcript.render_scratchpad();
        let action_pos = rendered.find("Action: web_search").unwrap();
        let obs_pos = rendered.find("Observation: {\"results\": []}").unwrap();
        let guidance_pos = rendered.find("Observation: You must still call news_search.").unwrap();
        assert!(action_pos < obs_pos);
        assert!(obs_pos < guidance_pos);
    }

    #[test]
    fn test_empty_transcript_renders_empty() {
        assert_eq!(Transcript::new().render_scratchpad(), "");
        assert!(Transcript::new().is_empty());
    }
}
