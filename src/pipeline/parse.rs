//! Response recovery: find the question array in whatever the model said.
//!
//! Models are told to answer with a bare JSON array, and mostly do. The rest
//! of the time the array arrives wrapped in prose ("Here you go: [...]"),
//! inside a ```json fence, or cut off by the token ceiling. Recovery runs in
//! two passes:
//!
//! 1. parse the whole response as JSON;
//! 2. otherwise locate the first `[` or `{`, scan to its matching closer and
//!    parse that span.
//!
//! The scanner in [`find_json_span`] tracks string literals and escapes, so a
//! bracket inside `"Choose [correct] one"` never moves the depth counter. A
//! plain bracket counter stops at the first `]` inside question text and hands
//! back a truncated, unparseable span.
//!
//! Either pass accepts a top-level array, or an object whose `questions`
//! member is an array. Anything else is a [`QuizError::UnparseableResponse`]
//! carrying the untouched raw text; no placeholder questions are ever
//! invented.

use crate::error::QuizError;
use serde_json::Value;
use tracing::{debug, warn};

/// Recover the JSON array of question objects from `raw`.
pub fn parse_response(raw: &str) -> Result<Vec<Value>, QuizError> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        if let Some(items) = into_question_array(value) {
            debug!("Model response parsed directly ({} items)", items.len());
            return Ok(items);
        }
    }

    let reason = match find_json_span(raw) {
        Some(span) => match serde_json::from_str::<Value>(span) {
            Ok(value) => match into_question_array(value) {
                Some(items) => {
                    debug!(
                        "Recovered JSON array from {}-byte span of {}-byte response",
                        span.len(),
                        raw.len()
                    );
                    return Ok(items);
                }
                None => "the recovered JSON is not an array of questions".to_string(),
            },
            Err(e) => format!("the recovered JSON span is invalid: {e}"),
        },
        None => "no complete JSON array found in the response".to_string(),
    };

    warn!("Could not parse model response: {}", reason);
    Err(QuizError::UnparseableResponse {
        reason,
        raw: raw.to_string(),
    })
}

/// Accept an array, or an object wrapping one under `questions`.
fn into_question_array(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Find the first balanced JSON array or object in `text`.
///
/// Starts at whichever of `[` and `{` comes first and returns the slice up to
/// and including the bracket that brings the depth back to zero. Only the
/// opening bracket's own kind is counted. Characters inside double-quoted
/// strings are skipped, and a backslash escapes the next character so `\"`
/// does not end a string. Returns `None` when no start exists or the text
/// ends before the depth closes.
pub fn find_json_span(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let bytes = text.as_bytes();
    let (open, close) = if bytes[start] == b'[' {
        (b'[', b']')
    } else {
        (b'{', b'}')
    };

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    // Every delimiter is ASCII, so byte offsets always land on char boundaries.
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                let end = start + offset + 1;
                return Some(&text[start..end]);
            }
        }
    }

    None
}
