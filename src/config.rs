//! Configuration types for quiz generation.
//!
//! Everything the pipeline needs beyond the request itself lives in
//! [`QuizConfig`]: model selection, sampling parameters, the character
//! budget, timeouts and download limits. A config is built once at process
//! start, shared read-only between concurrent requests, and never mutated.
//!
//! Credentials are not stored here. The provider layer reads them from the
//! environment (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, …) when the provider
//! is constructed.

use crate::error::QuizError;
use crate::progress::ProgressCallback;
use crate::request::DEFAULT_MAX_QUESTIONS;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default character budget for the text sent to the model.
pub const DEFAULT_MAX_CHARS: usize = 30_000;

/// Default model when neither the config nor the environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default download cap: 25 MiB.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 25 * 1024 * 1024;

/// Configuration for quiz generation.
///
/// Built via [`QuizConfig::builder()`] or using [`QuizConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2quiz::QuizConfig;
///
/// let config = QuizConfig::builder()
///     .model("gpt-4o-mini")
///     .max_chars(20_000)
///     .language("Spanish")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct QuizConfig {
    /// LLM model identifier, e.g. "gpt-4o-mini". If None, uses [`DEFAULT_MODEL`]
    /// unless `EDGEQUAKE_MODEL` is set.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Near-deterministic: the same document should yield much the same quiz,
    /// and low temperatures keep models closer to the JSON-only contract.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 2000.
    ///
    /// Ten questions with explanations fit comfortably; a ceiling that is too
    /// low truncates the JSON array and the response will fail to parse.
    pub max_tokens: usize,

    /// Character budget for extracted text. Default: [`DEFAULT_MAX_CHARS`].
    ///
    /// Fixed per process, not per request. Text beyond the budget is never
    /// shown to the model.
    pub max_chars: usize,

    /// Question count used when a request body omits `maxQuestions`. Default: 10.
    pub default_max_questions: usize,

    /// Language the questions should be written in. If None, the model
    /// follows the document.
    pub language: Option<String>,

    /// Download timeout in seconds. Default: 60.
    pub fetch_timeout_secs: u64,

    /// Per-LLM-call timeout in seconds. Default: 90.
    pub api_timeout_secs: u64,

    /// Largest document accepted, in bytes. Default: [`DEFAULT_MAX_DOCUMENT_BYTES`].
    pub max_document_bytes: u64,

    /// Retry attempts on transient fetch/model failures. Default: 0.
    ///
    /// Parse failures are never retried regardless of this value.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Explicit path to the pdfium shared library. If None, falls back to
    /// `PDFIUM_LIB_PATH`, then the system library search path.
    pub pdfium_library_path: Option<PathBuf>,

    /// Receives state transitions for every request run with this config.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 2000,
            max_chars: DEFAULT_MAX_CHARS,
            default_max_questions: DEFAULT_MAX_QUESTIONS,
            language: None,
            fetch_timeout_secs: 60,
            api_timeout_secs: 90,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            max_retries: 0,
            retry_backoff_ms: 500,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_chars", &self.max_chars)
            .field("default_max_questions", &self.default_max_questions)
            .field("language", &self.language)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_document_bytes", &self.max_document_bytes)
            .field("max_retries", &self.max_retries)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn QuizProgressCallback>"),
            )
            .finish()
    }
}

impl QuizConfig {
    /// Create a new builder for `QuizConfig`.
    pub fn builder() -> QuizConfigBuilder {
        QuizConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`QuizConfig`].
pub struct QuizConfigBuilder {
    config: QuizConfig,
}

impl fmt::Debug for QuizConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl QuizConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_chars(mut self, n: usize) -> Self {
        self.config.max_chars = n;
        self
    }

    pub fn default_max_questions(mut self, n: usize) -> Self {
        self.config.default_max_questions = n.max(1);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = Some(language.into());
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_document_bytes(mut self, bytes: u64) -> Self {
        self.config.max_document_bytes = bytes;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QuizConfig, QuizError> {
        let c = &self.config;
        if c.max_chars == 0 {
            return Err(QuizError::InvalidConfig("max_chars must be ≥ 1".into()));
        }
        if c.max_tokens == 0 {
            return Err(QuizError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.max_document_bytes == 0 {
            return Err(QuizError::InvalidConfig(
                "max_document_bytes must be ≥ 1".into(),
            ));
        }
        if c.fetch_timeout_secs == 0 || c.api_timeout_secs == 0 {
            return Err(QuizError::InvalidConfig(format!(
                "timeouts must be ≥ 1s, got fetch={}s api={}s",
                c.fetch_timeout_secs, c.api_timeout_secs
            )));
        }
        if matches!(c.language.as_deref(), Some(l) if l.trim().is_empty()) {
            return Err(QuizError::InvalidConfig("language must not be blank".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = QuizConfig::builder().build().unwrap();
        assert_eq!(config.max_chars, DEFAULT_MAX_CHARS);
        assert_eq!(config.default_max_questions, 10);
        assert_eq!(config.max_retries, 0);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn temperature_is_clamped() {
        let config = QuizConfig::builder().temperature(7.5).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn zero_budget_is_rejected() {
        let err = QuizConfig::builder().max_chars(0).build().unwrap_err();
        assert!(matches!(err, QuizError::InvalidConfig(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(QuizConfig::builder().api_timeout_secs(0).build().is_err());
        assert!(QuizConfig::builder().fetch_timeout_secs(0).build().is_err());
    }

    #[test]
    fn blank_language_is_rejected() {
        assert!(QuizConfig::builder().language("  ").build().is_err());
    }

    #[test]
    fn debug_hides_provider_object() {
        let dbg = format!("{:?}", QuizConfig::default());
        assert!(dbg.contains("max_chars: 30000"), "got: {dbg}");
    }
}
