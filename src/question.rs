//! The canonical question schema.

use serde::{Deserialize, Serialize};

/// Number of answer options every rendered question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// One multiple-choice question, ready to render and grade.
///
/// The answer is always an index into `options`; letter-encoded answers are
/// converted by [`crate::pipeline::normalize`] before a `Question` exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique within one generated batch.
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index of the correct option.
    pub answer_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Check the render invariant: a non-empty statement, exactly
    /// [`OPTIONS_PER_QUESTION`] options, and an answer index inside them.
    ///
    /// Returns the reason on failure so callers can log it.
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("empty question text".into());
        }
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(format!(
                "expected {} options, got {}",
                OPTIONS_PER_QUESTION,
                self.options.len()
            ));
        }
        if self.answer_index >= self.options.len() {
            return Err(format!("answer index {} out of range", self.answer_index));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question {
            id: "q1".into(),
            question: "What is 2 + 2?".into(),
            options: vec!["3".into(), "4".into(), "5".into(), "22".into()],
            answer_index: 1,
            explanation: None,
        }
    }

    #[test]
    fn valid_question_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn wrong_option_count_fails() {
        let mut q = sample();
        q.options.pop();
        assert!(q.validate().unwrap_err().contains("expected 4 options"));
    }

    #[test]
    fn answer_out_of_range_fails() {
        let mut q = sample();
        q.answer_index = 4;
        assert!(q.validate().is_err());
    }

    #[test]
    fn blank_statement_fails() {
        let mut q = sample();
        q.question = "   ".into();
        assert!(q.validate().is_err());
    }

    #[test]
    fn serializes_camel_case_without_empty_explanation() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["answerIndex"], 1);
        assert!(json.get("explanation").is_none());
    }
}
