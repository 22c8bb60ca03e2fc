//! Turn parsing: structured actions out of free-form model text.
//!
//! One model turn is expected to follow the line-oriented grammar
//!
//! ```text
//! Thought: <reasoning, may span lines>
//! Action: <action name>
//! Action Input: <query>
//! ```
//!
//! or, on the terminal turn,
//!
//! ```text
//! Thought: <reasoning>
//! Final Answer: <explanation, may span lines>
//! ```
//!
//! Marker keywords are matched case-insensitively and tolerate trailing
//! whitespace. Models sometimes monologue past their turn boundary and
//! emit several candidate blocks; the first well-formed block wins and
//! everything after it is ignored. Text with no recognizable marker is a
//! [`ParseError`], never an empty action.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Capability;

lazy_static! {
    /// Matches a marker line and captures its keyword and inline content.
    /// `final answer` and `action input` must be tried before `action`.
    static ref MARKER_RE: Regex = Regex::new(
        r"(?i)^\s*(?P<marker>final\s+answer|action\s+input|action|thought)\s*:\s*(?P<rest>.*?)\s*$"
    )
    .expect("marker regex is valid");
}

/// Errors from parsing one model turn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no action marker and no final-answer marker found in turn text")]
    MissingMarkers,

    #[error("unknown action name: '{name}'")]
    UnknownAction { name: String },

    #[error("action '{name}' is missing an input")]
    MissingActionInput { name: String },
}

/// A parsed capability request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCall {
    /// Which capability to invoke.
    pub capability: Capability,

    /// The search query to pass to it.
    pub query: String,
}

/// The structured content of one model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTurn {
    /// The model requested a capability invocation.
    Action { thought: String, call: ActionCall },

    /// The model produced its final answer.
    Final { thought: String, answer: String },
}

/// One recognized marker keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Thought,
    Action,
    ActionInput,
    FinalAnswer,
}

/// Classify a line; `None` means plain continuation text.
fn classify(line: &str) -> Option<(Marker, &str)> {
    let caps = MARKER_RE.captures(line)?;
    let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");
    let keyword = caps
        .name("marker")
        .expect("marker group always present")
        .as_str()
        .to_ascii_lowercase();
    let marker = match keyword.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
        "thought" => Marker::Thought,
        "action" => Marker::Action,
        "action input" => Marker::ActionInput,
        "final answer" => Marker::FinalAnswer,
        _ => return None,
    };
    Some((marker, rest))
}

/// Parse one turn of model output.
///
/// Scans line by line for the first well-formed block: either a complete
/// `Action` + `Action Input` pair or a `Final Answer`. A well-formed
/// action block naming an unregistered capability fails the parse; an
/// `Action` with no input is malformed and scanning continues.
pub fn parse_turn(text: &str) -> Result<ParsedTurn, ParseError> {
    let mut thought_parts: Vec<String> = Vec::new();
    let mut pending_action: Option<String> = None;
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        match classify(line) {
            Some((Marker::Thought, rest)) => {
                if !rest.is_empty() {
                    thought_parts.push(rest.to_string());
                }
            }
            Some((Marker::Action, rest)) => {
                // A second Action before any input abandons the first.
                pending_action = Some(rest.to_string());
            }
            Some((Marker::ActionInput, rest)) => {
                let Some(name) = pending_action.take() else {
                    // Input with no preceding action; ignore and keep scanning.
                    continue;
                };
                let mut input_parts = vec![rest.to_string()];
                while let Some(next) = lines.peek() {
                    if classify(next).is_some() {
                        break;
                    }
                    input_parts.push(lines.next().expect("peeked line").trim().to_string());
                }
                let query = input_parts.join(" ").trim().to_string();
                if query.is_empty() {
                    // Malformed block; keep scanning for a later candidate.
                    continue;
                }
                let capability = Capability::from_action_name(&name)
                    .ok_or(ParseError::UnknownAction { name: name.clone() })?;
                return Ok(ParsedTurn::Action {
                    thought: thought_parts.join("\n"),
                    call: ActionCall { capability, query },
                });
            }
            Some((Marker::FinalAnswer, rest)) => {
                let mut answer_parts = vec![rest.to_string()];
                // The answer runs until the next marker line: anything past
                // that is the model continuing beyond its turn.
                while let Some(next) = lines.peek() {
                    if classify(next).is_some() {
                        break;
                    }
                    answer_parts.push(lines.next().expect("peeked line").to_string());
                }
                return Ok(ParsedTurn::Final {
                    thought: thought_parts.join("\n"),
                    answer: answer_parts.join("\n").trim().to_string(),
                });
            }
            None => {
                // Continuation of the running thought, if any.
                let trimmed = line.trim();
                if !trimmed.is_empty() && pending_action.is_none() {
                    thought_parts.push(trimmed.to_string());
                }
            }
        }
    }

    match pending_action {
        Some(name) => Err(ParseError::MissingActionInput { name }),
        None => Err(ParseError::MissingMarkers),
    }
}
