//! The result envelope handed back to the caller.
//!
//! [`GenerationResult`] is all-or-nothing: `Success` always holds a full,
//! validated question set and `Failure` never holds any questions. Its serde
//! form is the transport body the web client expects:
//!
//! ```text
//! success  {"questions": [ ... ]}
//! failure  {"error": "...", "stage": "parsing", "raw": "..."}
//! ```

use crate::error::QuizError;
use crate::question::Question;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pipeline stage, used both for progress reporting and to attribute
/// failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Request validation, before the pipeline starts.
    Input,
    /// Process resources the pipeline needs to run at all (async runtime).
    Setup,
    Fetching,
    Extracting,
    Bounding,
    Prompting,
    AwaitingModel,
    Parsing,
    Normalizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Setup => "setup",
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Bounding => "bounding",
            Stage::Prompting => "prompting",
            Stage::AwaitingModel => "awaiting model",
            Stage::Parsing => "parsing",
            Stage::Normalizing => "normalizing",
        };
        f.write_str(name)
    }
}

/// Outcome of one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationResult {
    Success {
        questions: Vec<Question>,
    },
    Failure {
        stage: Stage,
        #[serde(rename = "error")]
        message: String,
        #[serde(rename = "raw", default, skip_serializing_if = "Option::is_none")]
        raw_output: Option<String>,
    },
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }

    /// The questions of a successful result.
    pub fn questions(&self) -> Option<&[Question]> {
        match self {
            GenerationResult::Success { questions } => Some(questions),
            GenerationResult::Failure { .. } => None,
        }
    }

    /// The stage a failed result stopped at.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            GenerationResult::Success { .. } => None,
            GenerationResult::Failure { stage, .. } => Some(*stage),
        }
    }

    /// Convert into a `Result`, for callers that prefer `?`.
    pub fn into_result(self) -> Result<Vec<Question>, (Stage, String)> {
        match self {
            GenerationResult::Success { questions } => Ok(questions),
            GenerationResult::Failure { stage, message, .. } => Err((stage, message)),
        }
    }
}

impl From<QuizError> for GenerationResult {
    fn from(err: QuizError) -> Self {
        GenerationResult::Failure {
            stage: err.stage(),
            raw_output: err.raw_output().map(str::to_string),
            message: err.to_string(),
        }
    }
}

impl From<Vec<Question>> for GenerationResult {
    fn from(questions: Vec<Question>) -> Self {
        GenerationResult::Success { questions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_serializes_as_questions_body() {
        let result = GenerationResult::from(vec![Question {
            id: "q1".into(),
            question: "Q".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            answer_index: 3,
            explanation: Some("because".into()),
        }]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["questions"][0]["answerIndex"], 3);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn parse_failure_keeps_raw_output() {
        let result = GenerationResult::from(QuizError::UnparseableResponse {
            reason: "no JSON array found".into(),
            raw: "I cannot process this.".into(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["stage"], "parsing");
        assert_eq!(json["raw"], "I cannot process this.");
        assert!(json["error"].as_str().unwrap().contains("no JSON array"));
    }

    #[test]
    fn earlier_failures_have_no_raw_field() {
        let result = GenerationResult::from(QuizError::NoExtractableText);
        assert_eq!(result.failed_stage(), Some(Stage::Extracting));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("raw").is_none());
        assert_eq!(json["stage"], "extracting");
    }

    #[test]
    fn runtime_failure_is_not_an_input_error() {
        let result = GenerationResult::from(QuizError::RuntimeUnavailable("no threads".into()));
        assert_eq!(result.failed_stage(), Some(Stage::Setup));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["stage"], "setup");
    }

    #[test]
    fn failure_round_trips_through_transport_form() {
        let body = r#"{"error":"LLM returned an empty response","stage":"awaiting_model"}"#;
        let result: GenerationResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.failed_stage(), Some(Stage::AwaitingModel));
        assert!(result.questions().is_none());
    }
}
