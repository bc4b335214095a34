//! Error types for the pdf2quiz library.
//!
//! Every failure is a [`QuizError`], and every variant belongs to exactly one
//! pipeline [`Stage`]. The grouping below follows the pipeline order, so the
//! stage of a variant is the section it sits in.
//!
//! Errors never carry partial results. The one exception to "message only" is
//! [`QuizError::UnparseableResponse`], which keeps the model's raw text
//! verbatim: a prompt-contract drift is the one failure an operator can
//! diagnose and fix from the output alone.

use crate::output::Stage;
use thiserror::Error;

/// All errors returned by the pdf2quiz library.
#[derive(Debug, Error)]
pub enum QuizError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The document reference is empty or not an HTTP/HTTPS URL.
    #[error("Invalid document URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    /// `maxQuestions` was zero.
    #[error("maxQuestions must be at least 1, got {got}")]
    InvalidQuestionCount { got: usize },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Setup errors ──────────────────────────────────────────────────────
    /// The tokio runtime behind the blocking entry point could not start.
    #[error("Failed to start the async runtime: {0}")]
    RuntimeUnavailable(String),

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// Network failure or non-2xx response while downloading the document.
    ///
    /// `status` is set when the server answered with an HTTP error status.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed {
        url: String,
        reason: String,
        status: Option<u16>,
    },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --fetch-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The response body is larger than `max_document_bytes`.
    #[error("Document at '{url}' exceeds the {limit}-byte download limit\nIncrease --max-document-mb.")]
    DocumentTooLarge { url: String, limit: u64 },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The downloaded bytes do not start with the `%PDF` signature.
    #[error("Document is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { magic: Vec<u8> },

    /// pdfium could not open or read the document.
    #[error("PDF could not be read: {detail}")]
    CorruptPdf { detail: String },

    /// pdfium opened the document but it contains no extractable text.
    #[error("No text could be extracted from the PDF (it may be scanned or empty)")]
    NoExtractableText,

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (or --pdfium-lib) to use a specific copy,\n\
or install libpdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Model errors ──────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an authentication error (401/403).
    #[error("Authentication error from provider '{provider}': {detail}")]
    AuthError { provider: String, detail: String },

    /// The LLM API returned HTTP 429.
    #[error("Rate limit exceeded for provider '{provider}': {detail}")]
    RateLimitExceeded { provider: String, detail: String },

    /// The LLM call did not complete within `api_timeout_secs`.
    #[error("LLM call timed out after {secs}s")]
    ModelTimeout { secs: u64 },

    /// The LLM answered with no text at all.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// Any other LLM API failure.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    // ── Parse errors ──────────────────────────────────────────────────────
    /// No question array could be recovered from the model output.
    ///
    /// `raw` is the model's literal response, never trimmed or rewritten.
    #[error("Failed to parse questions from the model response: {reason}")]
    UnparseableResponse { reason: String, raw: String },
}

impl QuizError {
    /// The pipeline stage this error is attributed to.
    pub fn stage(&self) -> Stage {
        match self {
            QuizError::InvalidUrl { .. }
            | QuizError::InvalidQuestionCount { .. }
            | QuizError::InvalidConfig(_) => Stage::Input,

            QuizError::RuntimeUnavailable(_) => Stage::Setup,

            QuizError::DownloadFailed { .. }
            | QuizError::DownloadTimeout { .. }
            | QuizError::DocumentTooLarge { .. } => Stage::Fetching,

            QuizError::NotAPdf { .. }
            | QuizError::CorruptPdf { .. }
            | QuizError::NoExtractableText
            | QuizError::PdfiumBindingFailed(_) => Stage::Extracting,

            QuizError::ProviderNotConfigured { .. }
            | QuizError::AuthError { .. }
            | QuizError::RateLimitExceeded { .. }
            | QuizError::ModelTimeout { .. }
            | QuizError::EmptyResponse
            | QuizError::LlmApiError { .. } => Stage::AwaitingModel,

            QuizError::UnparseableResponse { .. } => Stage::Parsing,
        }
    }

    /// The verbatim model output, present only for parse failures.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            QuizError::UnparseableResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Whether repeating the same call might succeed.
    ///
    /// Only transient fetch and model failures qualify. A response that could
    /// not be parsed will not parse on a second identical prompt, and
    /// credential or size problems do not go away on their own. HTTP 4xx
    /// answers are permanent except 408 and 429.
    pub fn is_retryable(&self) -> bool {
        match self {
            QuizError::DownloadFailed {
                status: Some(code), ..
            } => !(400..500).contains(code) || *code == 408 || *code == 429,
            _ => matches!(
                self,
                QuizError::DownloadFailed { .. }
                    | QuizError::DownloadTimeout { .. }
                    | QuizError::RateLimitExceeded { .. }
                    | QuizError::ModelTimeout { .. }
                    | QuizError::EmptyResponse
                    | QuizError::LlmApiError { .. }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stage_is_reachable() {
        let cases = [
            (
                QuizError::InvalidQuestionCount { got: 0 },
                Stage::Input,
            ),
            (QuizError::RuntimeUnavailable("no threads".into()), Stage::Setup),
            (
                QuizError::DocumentTooLarge {
                    url: "https://x/y.pdf".into(),
                    limit: 10,
                },
                Stage::Fetching,
            ),
            (QuizError::NoExtractableText, Stage::Extracting),
            (QuizError::EmptyResponse, Stage::AwaitingModel),
            (
                QuizError::UnparseableResponse {
                    reason: "no JSON".into(),
                    raw: "nope".into(),
                },
                Stage::Parsing,
            ),
        ];
        for (err, stage) in cases {
            assert_eq!(err.stage(), stage, "{err}");
        }
    }

    #[test]
    fn raw_output_only_for_parse_errors() {
        let parse = QuizError::UnparseableResponse {
            reason: "no JSON".into(),
            raw: "  I cannot process this. ".into(),
        };
        assert_eq!(parse.raw_output(), Some("  I cannot process this. "));
        assert_eq!(QuizError::EmptyResponse.raw_output(), None);
        assert_eq!(QuizError::NoExtractableText.raw_output(), None);
    }

    #[test]
    fn parse_errors_are_never_retried() {
        let parse = QuizError::UnparseableResponse {
            reason: "x".into(),
            raw: String::new(),
        };
        assert!(!parse.is_retryable());
        assert!(!QuizError::AuthError {
            provider: "openai".into(),
            detail: "bad key".into()
        }
        .is_retryable());
        assert!(QuizError::ModelTimeout { secs: 60 }.is_retryable());
        assert!(QuizError::DownloadTimeout {
            url: "u".into(),
            secs: 5
        }
        .is_retryable());
    }

    #[test]
    fn client_error_statuses_are_permanent() {
        let failed = |status| QuizError::DownloadFailed {
            url: "https://example.com/a.pdf".into(),
            reason: "HTTP error".into(),
            status,
        };
        assert!(!failed(Some(404)).is_retryable());
        assert!(!failed(Some(403)).is_retryable());
        assert!(failed(Some(408)).is_retryable());
        assert!(failed(Some(429)).is_retryable());
        assert!(failed(Some(503)).is_retryable());
        assert!(failed(None).is_retryable());
    }

    #[test]
    fn parse_error_display_omits_raw_text() {
        let e = QuizError::UnparseableResponse {
            reason: "no JSON array found".into(),
            raw: "SECRET RAW".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("no JSON array found"), "got: {msg}");
        assert!(!msg.contains("SECRET RAW"));
    }

    #[test]
    fn download_timeout_display() {
        let e = QuizError::DownloadTimeout {
            url: "https://example.com/a.pdf".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
        assert!(e.to_string().contains("example.com"));
    }
}
