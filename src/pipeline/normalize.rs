//! Normalisation: loosely-typed model output → canonical [`Question`]s.
//!
//! Models drift between encodings of the same idea. The correct answer has
//! been seen as an index (`"answer": 2`) and as a letter (`"answer": "C"`);
//! the statement sometimes comes as `prompt` instead of `question`; ids are
//! often missing. [`normalize_questions`] folds all of that into one shape so
//! nothing downstream ever sees a letter answer.
//!
//! Field rules, per element in order:
//!
//! | Field         | Source                          | Fallback             |
//! |---------------|---------------------------------|----------------------|
//! | `id`          | `id` (string or number)         | `q<position+1>`      |
//! | `question`    | `question`, then `prompt`       | empty string         |
//! | `options`     | `options` array                 | empty                |
//! | `answerIndex` | `answerIndex`, then `answer`    | `0`                  |
//! | `explanation` | `explanation`                   | absent               |
//!
//! Elements that still violate [`Question::validate`] afterwards are dropped
//! with a warning, and the result is capped at `max_questions`.

use crate::error::QuizError;
use crate::question::Question;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Normalise a single element. `position` is its 0-based index in the array.
pub fn normalize_question(item: &Value, position: usize) -> Question {
    let id = item
        .get("id")
        .and_then(scalar_to_string)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| generated_id(position));

    let question = item
        .get("question")
        .and_then(Value::as_str)
        .or_else(|| item.get("prompt").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    let options = item
        .get("options")
        .and_then(Value::as_array)
        .map(|opts| opts.iter().filter_map(scalar_to_string).collect())
        .unwrap_or_default();

    let answer_index = item
        .get("answerIndex")
        .or_else(|| item.get("answer"))
        .map(answer_to_index)
        .unwrap_or(0);

    let explanation = item
        .get("explanation")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    Question {
        id,
        question,
        options,
        answer_index,
        explanation,
    }
}

/// Normalise `items`, drop invalid questions, and keep at most `max_questions`.
///
/// `raw` is the model output the items came from; it is attached to the
/// error when nothing usable remains.
pub fn normalize_questions(
    items: &[Value],
    max_questions: usize,
    raw: &str,
) -> Result<Vec<Question>, QuizError> {
    let mut seen_ids = HashSet::new();
    let mut questions = Vec::with_capacity(items.len().min(max_questions));

    for (position, item) in items.iter().enumerate() {
        if questions.len() == max_questions {
            debug!(
                "Dropping {} questions beyond the limit of {}",
                items.len() - position,
                max_questions
            );
            break;
        }

        let mut question = normalize_question(item, position);
        if let Err(reason) = question.validate() {
            warn!("Discarding question {}: {}", position + 1, reason);
            continue;
        }

        if !seen_ids.insert(question.id.clone()) {
            question.id = unique_id(position, &seen_ids);
            seen_ids.insert(question.id.clone());
        }
        questions.push(question);
    }

    if questions.is_empty() {
        return Err(QuizError::UnparseableResponse {
            reason: format!(
                "none of the {} returned items is a usable question",
                items.len()
            ),
            raw: raw.to_string(),
        });
    }

    Ok(questions)
}

fn generated_id(position: usize) -> String {
    format!("q{}", position + 1)
}

fn unique_id(position: usize, taken: &HashSet<String>) -> String {
    let base = generated_id(position);
    if !taken.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(base)
}

/// Numbers directly; a single letter A–D (either case) by offset from `A`;
/// anything else is 0.
fn answer_to_index(value: &Value) -> usize {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|n| n as usize)
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                    .map(|f| f as usize)
            })
            // Negative indices can never be valid; push them out of range so
            // validation rejects the question.
            .unwrap_or(usize::MAX),
        Value::String(s) => {
            let mut chars = s.trim().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if ('A'..='D').contains(&c.to_ascii_uppercase()) => {
                    (c.to_ascii_uppercase() as u8 - b'A') as usize
                }
                _ => 0,
            }
        }
        _ => 0,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
