//! Evidence record normalization.
//!
//! Capability observations come back in two raw shapes: structured JSON
//! (`{"results": [...]}` or a bare array of records) and line-prefixed
//! free text (`- <title> (<url>)`). Both are folded into a uniform,
//! duplicate-free record sequence. Malformed lines and records are
//! skipped, not fatal: the model already saw the raw text, so nothing is
//! lost by dropping what does not normalize.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::types::Capability;

/// Hard cap on normalized records per run, across both categories.
pub const MAX_SOURCES: usize = 10;

lazy_static! {
    /// A syntactically plausible URL: recognized scheme, no whitespace.
    static ref URL_RE: Regex = Regex::new(r"^https?://\S+$").expect("url regex is valid");
}

/// A normalized piece of evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// Result title, "Untitled" when the source carried none.
    pub title: String,

    /// The source URL; non-empty and syntactically a URL.
    pub url: String,

    /// Which capability produced the record.
    pub category: Capability,
}

/// Normalize a run's observations into a capped, deduplicated record
/// sequence, preserving discovery order.
pub fn normalize(observations: &[(Capability, String)]) -> Vec<EvidenceRecord> {
    let mut records = Vec::new();
    for (capability, raw) in observations {
        extract_records(*capability, raw, &mut records);
    }
    let extracted = records.len();
    let pruned = prune_records(records);
    if pruned.len() < extracted {
        tracing::debug!(
            extracted,
            kept = pruned.len(),
            "dropped duplicate or over-cap evidence records"
        );
    }
    pruned
}

/// Deduplicate by exact URL string (first occurrence wins) and cap at
/// [`MAX_SOURCES`]. Already-pruned input passes through unchanged, so
/// the operation is stable under repeated application.
pub fn prune_records(records: Vec<EvidenceRecord>) -> Vec<EvidenceRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for record in records {
        if out.len() >= MAX_SOURCES {
            break;
        }
        if seen.insert(record.url.clone()) {
            out.push(record);
        }
    }
    out
}

/// Extract records from one observation, trying JSON first and falling
/// back to the line-prefixed text shape.
fn extract_records(capability: Capability, raw: &str, out: &mut Vec<EvidenceRecord>) {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        let items = match &value {
            Value::Object(map) => map.get("results").and_then(Value::as_array),
            Value::Array(_) => value.as_array(),
            _ => None,
        };
        if let Some(items) = items {
            for item in items {
                if let Some(record) = record_from_json(capability, item) {
                    out.push(record);
                }
            }
            return;
        }
        // JSON without a recognizable record list (e.g. an error payload)
        // contributes nothing.
        return;
    }

    for line in raw.lines() {
        if let Some(record) = record_from_line(capability, line) {
            out.push(record);
        }
    }
}

/// A structured record: requires a syntactically valid `url`.
fn record_from_json(capability: Capability, item: &Value) -> Option<EvidenceRecord> {
    let url = item.get("url").and_then(Value::as_str)?.trim();
    if !URL_RE.is_match(url) {
        return None;
    }
    let title = item
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Untitled");
    Some(EvidenceRecord {
        title: title.to_string(),
        url: url.to_string(),
        category: capability,
    })
}

/// A free-text record of the form `- <title> (<url>)`.
///
/// The URL is located at the *last* parenthesis group so titles may
/// themselves contain parentheses; the group is accepted only when it
/// opens with a recognized URL scheme.
fn record_from_line(capability: Capability, line: &str) -> Option<EvidenceRecord> {
    let trimmed = line.trim();
    let body = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))?
        .trim();

    let rest = body.strip_suffix(')')?;
    let open = rest.rfind('(')?;
    let url = rest[open + 1..].trim();
    if !URL_RE.is_match(url) {
        return None;
    }

    let title = rest[..open].trim();
    Some(EvidenceRecord {
        title: if title.is_empty() { "Untitled" } else { title }.to_string(),
        url: url.to_string(),
        category: capability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn web_obs(raw: &str) -> (Capability, String) {
        (Capability::Web, raw.to_string())
    }

    #[test]
    fn test_line_format_round_trip() {
        let records = normalize(&[web_obs("- Acme Corp Responds (https://example.com/a)")]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Acme Corp Responds");
        assert_eq!(records[0].url, "https://example.com/a");
        assert_eq!(records[0].category, Capability::Web);
    }

    #[test]
    fn test_title_containing_parentheses() {
        let records = normalize(&[web_obs("- Acme (formerly Ajax) Responds (https://example.com/b)")]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Acme (formerly Ajax) Responds");
        assert_eq!(records[0].url, "https://example.com/b");
    }

    #[test]
    fn test_parenthesis_group_without_url_scheme_skipped() {
        let records = normalize(&[web_obs("- Acme Corp Responds (an aside, not a link)")]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_json_results_object() {
        let raw = r#"{"results": [
            {"title": "Flat Earth Debunked", "url": "https://example.com/debunk", "snippet": "..."},
            {"title": "", "url": "https://example.com/untitled"},
            {"title": "No URL here"}
        ], "count": 3}"#;
        let records = normalize(&[(Capability::News, raw.to_string())]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Flat Earth Debunked");
        assert_eq!(records[1].title, "Untitled");
        assert!(records.iter().all(|r| r.category == Capability::News));
    }

    #[test]
    fn test_json_top_level_array() {
        let raw = r#"[{"title": "A", "url": "https://example.com/a"}]"#;
        let records = normalize(&[web_obs(raw)]);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_json_error_payload_yields_nothing() {
        let raw = r#"{"error": "news_search error: request timed out", "results": []}"#;
        assert!(normalize(&[(Capability::News, raw.to_string())]).is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped_not_fatal() {
        let raw = "- Good Record (https://example.com/ok)\nnot a record at all\n- Broken (\n- Also Good (http://example.com/ok2)";
        let records = normalize(&[web_obs(raw)]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://example.com/ok");
        assert_eq!(records[1].url, "http://example.com/ok2");
    }

    #[test]
    fn test_dedup_is_first_occurrence_wins_across_run() {
        let records = normalize(&[
            web_obs("- First Title (https://example.com/shared)"),
            (
                Capability::News,
                r#"{"results": [{"title": "Second Title", "url": "https://example.com/shared"}]}"#.to_string(),
            ),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "First Title");
        assert_eq!(records[0].category, Capability::Web);
    }

    #[test]
    fn test_no_url_normalization_for_dedup() {
        // Trailing-slash variants are distinct keys; collapsing them is
        // deliberately not attempted.
        let records = normalize(&[web_obs(
            "- A (https://example.com/page)\n- B (https://example.com/page/)",
        )]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_output_capped_at_max_sources() {
        let lines: Vec<String> = (0..25)
            .map(|i| format!("- Result {} (https://example.com/{})", i, i))
            .collect();
        let records = normalize(&[web_obs(&lines.join("\n"))]);
        assert_eq!(records.len(), MAX_SOURCES);
        assert_eq!(records[0].url, "https://example.com/0");
        assert_eq!(records[9].url, "https://example.com/9");
    }

    #[test]
    fn test_prune_is_idempotent() {
        let records: Vec<EvidenceRecord> = (0..15)
            .map(|i| EvidenceRecord {
                title: format!("r{}", i),
                url: format!("https://example.com/{}", i % 12),
                category: Capability::Web,
            })
            .collect();
        let once = prune_records(records);
        let twice = prune_records(once.clone());
        assert_eq!(once, twice);
    }

    proptest! {
        #[test]
        fn prop_pruned_records_unique_and_capped(
            urls in proptest::collection::vec("[a-z]{1,6}", 0..40)
        ) {
            let records: Vec<EvidenceRecord> = urls
                .iter()
                .map(|u| EvidenceRecord {
                    title: u.clone(),
                    url: format!("https://example.com/{}", u),
                    category: Capability::Web,
                })
                .collect();

            let pruned = prune_records(records);

            prop_assert!(pruned.len() <= MAX_SOURCES);
            let mut seen = std::collections::HashSet::new();
            for record in &pruned {
                prop_assert!(seen.insert(record.url.clone()), "duplicate url survived pruning");
            }

            // Stable under repeated application.
            prop_assert_eq!(prune_records(pruned.clone()), pruned);
        }
    }
}
