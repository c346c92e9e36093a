use std::sync::OnceLock;

use kiosk_core::recommendations::{OracleReply, OracleSuggestion};
use regex::Regex;
use serde_json::Value;

/// Greedy bracket span. `(?s)` lets it cross newlines, so the match runs
/// from the first `[` to the last `]` in the whole reply.
fn json_array_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").ok()).as_ref()
}

/// Extracts `{name, reason}` objects from free-form model text.
///
/// Prose around the array is ignored. A missing span, invalid JSON or a
/// non-array value all yield [`OracleReply::Empty`]. Array elements without
/// a string `name` are skipped; a missing `reason` becomes empty text.
pub fn parse_reply(text: &str) -> OracleReply {
    let Some(span) = json_array_regex().and_then(|re| re.find(text)) else {
        return OracleReply::Empty;
    };

    let Ok(items) = serde_json::from_str::<Vec<Value>>(span.as_str()) else {
        return OracleReply::Empty;
    };

    let suggestions: Vec<OracleSuggestion> = items
        .into_iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?.to_string();
            let reason = match item.get("reason") {
                Some(Value::String(reason)) => reason.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            Some(OracleSuggestion { name, reason })
        })
        .collect();

    OracleReply::Parsed(suggestions)
}
