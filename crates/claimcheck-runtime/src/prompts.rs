//! Prompt templates for the reasoning loop.
//!
//! One fixed instruction template seeds every run. It names the two
//! capabilities, states the hard both-before-final constraint, and pins
//! the line-oriented turn format the parser expects. The dynamic tail
//! (claim + scratchpad) is appended per turn.

use claimcheck_core::{Capability, Claim, Transcript};

/// Base instructions for the fact-checking loop.
///
/// The framing is deliberately rigid: the model gathers evidence and
/// reports; the mandatory-usage policy is enforced by the controller, so
/// the template states it as a hard rule rather than a suggestion.
pub const INSTRUCTION_TEMPLATE: &str = r#"You are an expert fact-checking assistant with access to search tools.

Your task is to verify a factual claim by gathering evidence from multiple sources.

## Tools

- web_search: search the general web for evidence about the claim
- news_search: search recent news articles for evidence about the claim

## Hard Rules

1. You MUST call web_search at least once before giving a final answer
2. You MUST call news_search at least once before giving a final answer
3. Do NOT provide a final answer until BOTH tools have returned results
4. If a tool returns an error or no results, you may retry it with a different query, but both tools must still be consulted

## Verdict Classifications

- "Likely True": strong supporting evidence from multiple sources, minimal contradictions
- "Likely False": strong contradicting evidence from credible sources
- "Uncertain": mixed evidence, conflicting information, or insufficient data

## Turn Format

Use exactly this format on every turn:

Thought: your reasoning about what to do next
Action: the tool to call, one of [web_search, news_search]
Action Input: the search query

When both tools have been consulted and you are ready to conclude:

Thought: I now have results from both web_search and news_search
Final Answer: VERDICT: [Likely True | Likely False | Uncertain]
EXPLANATION: your detailed reasoning based on the evidence from both tools
"#;

/// Render the full prompt for one turn: instructions, claim, and the
/// scratchpad accumulated so far.
pub fn render_prompt(claim: &Claim, transcript: &Transcript) -> String {
    let mut prompt = String::with_capacity(INSTRUCTION_TEMPLATE.len() + 256);
    prompt.push_str(INSTRUCTION_TEMPLATE);
    prompt.push_str("\nClaim: ");
    prompt.push_str(claim.as_str());
    prompt.push('\n');
    let scratchpad = transcript.render_scratchpad();
    if !scratchpad.is_empty() {
        prompt.push('\n');
        prompt.push_str(&scratchpad);
    }
    prompt.push_str("\nThought:");
    prompt
}

/// Corrective observation injected when the model attempts a final
/// answer before consulting every capability.
pub fn missing_capability_note(missing: &[Capability]) -> String {
    let names: Vec<&str> = missing.iter().map(|c| c.action_name()).collect();
    format!(
        "Your final answer was not accepted: you must still call {} before concluding. \
         Continue with an Action line.",
        names.join(" and ")
    )
}

/// Corrective observation injected after a malformed turn.
pub fn format_reminder() -> String {
    "Your last response did not follow the turn format. Reply with either \
     'Thought: ...' then 'Action: <web_search|news_search>' and 'Action Input: <query>', \
     or 'Thought: ...' then 'Final Answer: ...'."
        .to_string()
}
