//! Text normalization and price parsing shared by ranking and grouping.

use serde_json::Value;
use std::collections::HashSet;

/// Normalizes free text: lowercase, non-alphanumerics to spaces, collapsed
/// whitespace, trimmed. Idempotent.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a query into normalized tokens, dropping single-character noise.
pub fn query_tokens(query: &str) -> Vec<String> {
    normalize(query).split_whitespace().filter(|t| t.len() > 1).map(String::from).collect()
}

/// Builds the full token set of a text, single-character tokens included.
pub fn token_set(text: &str) -> HashSet<String> {
    normalize(text).split_whitespace().map(String::from).collect()
}

/// Returns true if `text` contains `token` as a whole normalized word.
pub fn has_token(text: &str, token: &str) -> bool {
    token_set(text).contains(token)
}

/// Extracts a finite price from a JSON value.
///
/// Numbers pass through; strings are stripped to digits, dots and minus
/// signs and must then parse whole ("$3.50" is 3.5, "2 for $5" collapses
/// to 25, stray dots make it no price at all). Everything else is no
/// price.
pub fn parse_price_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let cleaned: String =
                s.chars().filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-').collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}
