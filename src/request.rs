//! The inbound request accepted by the pipeline.

use crate::error::QuizError;
use reqwest::Url;
use serde::Deserialize;

/// Question count used when the caller does not ask for one.
pub const DEFAULT_MAX_QUESTIONS: usize = 10;

/// A validated request to generate one quiz from one document.
///
/// Construct with [`GenerationRequest::new`] or deserialize the transport body
/// and call [`GenerationRequest::from_body`]; either way the URL has been
/// parsed and the question count is at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub document_url: Url,
    pub max_questions: usize,
}

/// The raw request body as it arrives over the wire.
///
/// `pdfUrl` is accepted as an alias for `documentUrl`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequestBody {
    #[serde(default, alias = "pdfUrl")]
    pub document_url: Option<String>,
    #[serde(default)]
    pub max_questions: Option<usize>,
}

impl GenerationRequest {
    pub fn new(document_url: &str, max_questions: usize) -> Result<Self, QuizError> {
        let document_url = parse_document_url(document_url)?;
        if max_questions == 0 {
            return Err(QuizError::InvalidQuestionCount { got: 0 });
        }
        Ok(Self {
            document_url,
            max_questions,
        })
    }

    /// Validate a transport body, filling `maxQuestions` with `default_max`.
    pub fn from_body(body: GenerationRequestBody, default_max: usize) -> Result<Self, QuizError> {
        let url = body.document_url.unwrap_or_default();
        Self::new(&url, body.max_questions.unwrap_or(default_max))
    }
}

fn parse_document_url(input: &str) -> Result<Url, QuizError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(QuizError::InvalidUrl {
            input: input.to_string(),
            reason: "documentUrl is required".into(),
        });
    }

    let url = Url::parse(trimmed).map_err(|e| QuizError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(QuizError::InvalidUrl {
            input: input.to_string(),
            reason: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}
