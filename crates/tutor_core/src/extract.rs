//! crates/tutor_core/src/extract.rs
//!
//! Pulls the JSON payload out of free-form model output.
//!
//! The model is told to answer with JSON only, but it often wraps the payload
//! in prose or code fences. The span taken runs from the first `{` (or `[`) to
//! the last `}` (or `]`) anywhere in the text; when neither form is present the
//! whole text is parsed as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::ports::{PortError, PortResult};

// Leftmost match wins; at the same start position the object form is tried first.
static JSON_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}|\[.*\]").expect("static JSON span pattern"));

/// Returns the greedy `{...}` / `[...]` span of `text`, if any.
pub fn json_span(text: &str) -> Option<&str> {
    JSON_SPAN.find(text).map(|m| m.as_str())
}

/// Parses the JSON embedded in `text`.
pub fn extract_json(text: &str) -> PortResult<Value> {
    let candidate = json_span(text).unwrap_or(text);
    serde_json::from_str(candidate).map_err(|e| {
        PortError::ModelResponse(format!("could not parse JSON from model output: {}", e))
    })
}
