//! Quiz generation entry points.
//!
//! [`QuizPipeline`] runs one request through every stage in order:
//!
//! ```text
//! fetch ──▶ extract ──▶ bound ──▶ prompt ──▶ model ──▶ parse ──▶ normalize
//! ```
//!
//! Each stage consumes the previous stage's output, so there is nothing to run
//! in parallel within a request. Separate requests may share one pipeline
//! concurrently: it holds only the read-only config and stateless
//! collaborators behind `Arc`s.
//!
//! The future returned by [`QuizPipeline::generate`] owns all in-flight work.
//! Dropping it (caller disconnect, outer timeout) cancels the download or the
//! model call that is currently running.

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::output::{GenerationResult, Stage};
use crate::pipeline::extract::{extract_text, PdfiumExtractor, TextExtractor};
use crate::pipeline::fetch::{DocumentFetcher, HttpFetcher};
use crate::pipeline::llm::{GenerationClient, ModelSettings, ProviderClient};
use crate::pipeline::{bound, normalize, parse, retry};
use crate::progress::StateTracker;
use crate::prompts::build_prompt;
use crate::question::Question;
use crate::request::{GenerationRequest, GenerationRequestBody};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The document-to-quiz pipeline with its collaborators.
///
/// # Example
/// ```rust,no_run
/// use pdf2quiz::{GenerationRequest, QuizConfig, QuizPipeline};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = QuizPipeline::new(QuizConfig::default())?;
/// let request = GenerationRequest::new("https://example.com/notes.pdf", 5)?;
/// let result = pipeline.generate(&request).await;
/// println!("{}", serde_json::to_string_pretty(&result)?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QuizPipeline {
    config: QuizConfig,
    settings: ModelSettings,
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<dyn TextExtractor>,
    client: Arc<dyn GenerationClient>,
}

impl QuizPipeline {
    /// Build a pipeline with the default HTTP fetcher, pdfium extractor and
    /// provider-backed model client.
    pub fn new(config: QuizConfig) -> Result<Self, QuizError> {
        let fetcher = Arc::new(HttpFetcher::from_config(&config)?);
        let extractor = Arc::new(PdfiumExtractor::from_config(&config));
        let client = Arc::new(ProviderClient::from_config(&config));
        Ok(Self {
            settings: ModelSettings::from_config(&config),
            config,
            fetcher,
            extractor,
            client,
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_client(mut self, client: Arc<dyn GenerationClient>) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn model_settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Generate a quiz for one validated request.
    ///
    /// Never panics and never returns partial results: any stage failure is
    /// reported as [`GenerationResult::Failure`] naming that stage.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let mut tracker = StateTracker::new(self.config.progress_callback.clone());
        let outcome = self.run(request, &mut tracker).await;
        self.finish(outcome, &mut tracker)
    }

    /// Validate a raw request body, then generate.
    ///
    /// Invalid bodies come back as a failure at [`Stage::Input`].
    pub async fn generate_from_body(&self, body: GenerationRequestBody) -> GenerationResult {
        match GenerationRequest::from_body(body, self.config.default_max_questions) {
            Ok(request) => self.generate(&request).await,
            Err(e) => {
                warn!("Rejected request: {}", e);
                e.into()
            }
        }
    }

    /// Generate from document bytes already in memory, skipping the fetch.
    ///
    /// The bytes are held to the same `max_document_bytes` limit as a
    /// download.
    pub async fn generate_from_bytes(&self, bytes: Vec<u8>, max_questions: usize) -> GenerationResult {
        if max_questions == 0 {
            return QuizError::InvalidQuestionCount { got: 0 }.into();
        }
        let mut tracker = StateTracker::new(self.config.progress_callback.clone());
        let outcome = if bytes.len() as u64 > self.config.max_document_bytes {
            tracker.enter(Stage::Fetching);
            Err(QuizError::DocumentTooLarge {
                url: "<in-memory document>".to_string(),
                limit: self.config.max_document_bytes,
            })
        } else {
            self.run_from_bytes(bytes, max_questions, &mut tracker).await
        };
        self.finish(outcome, &mut tracker)
    }

    fn finish(
        &self,
        outcome: Result<Vec<Question>, QuizError>,
        tracker: &mut StateTracker,
    ) -> GenerationResult {
        let result = match outcome {
            Ok(questions) => {
                tracker.done();
                questions.into()
            }
            Err(e) => {
                let stage = e.stage();
                if let Some(active) = tracker.current_stage().filter(|s| *s != stage) {
                    debug!("{} error surfaced while {}", stage, active);
                }
                warn!("Generation failed while {}: {}", stage, e);
                tracker.fail(stage);
                e.into()
            }
        };
        debug!("Request finished: {}", tracker.state());
        result
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        tracker: &mut StateTracker,
    ) -> Result<Vec<Question>, QuizError> {
        info!(
            "Generating up to {} questions from {}",
            request.max_questions, request.document_url
        );

        // ── Step 1: Fetch ────────────────────────────────────────────────
        tracker.enter(Stage::Fetching);
        let fetcher = &self.fetcher;
        let url = &request.document_url;
        let bytes = retry::with_retry(
            "fetch",
            self.config.max_retries,
            self.config.retry_backoff_ms,
            move || fetcher.fetch(url),
        )
        .await?;

        self.run_from_bytes(bytes, request.max_questions, tracker).await
    }

    async fn run_from_bytes(
        &self,
        bytes: Vec<u8>,
        max_questions: usize,
        tracker: &mut StateTracker,
    ) -> Result<Vec<Question>, QuizError> {
        let total_start = Instant::now();

        // ── Step 2: Extract text ─────────────────────────────────────────
        tracker.enter(Stage::Extracting);
        let text = extract_text(self.extractor.as_ref(), bytes).await?;

        // ── Step 3: Bound ────────────────────────────────────────────────
        tracker.enter(Stage::Bounding);
        let bounded = bound::bound_text(&text, self.config.max_chars);

        // ── Step 4: Build prompt ─────────────────────────────────────────
        tracker.enter(Stage::Prompting);
        let prompt = build_prompt(bounded, max_questions, self.config.language.as_deref());

        // ── Step 5: Call the model ───────────────────────────────────────
        tracker.enter(Stage::AwaitingModel);
        let llm_start = Instant::now();
        let client = &self.client;
        let prompt = &prompt;
        let settings = &self.settings;
        let response = retry::with_retry(
            "model",
            self.config.max_retries,
            self.config.retry_backoff_ms,
            move || client.generate(prompt, settings),
        )
        .await?;
        tracker.model_usage(response.prompt_tokens, response.completion_tokens);
        info!(
            "Model answered in {}ms ({} tokens in / {} out)",
            llm_start.elapsed().as_millis(),
            response.prompt_tokens,
            response.completion_tokens
        );

        // ── Step 6: Parse ────────────────────────────────────────────────
        tracker.enter(Stage::Parsing);
        let items = parse::parse_response(&response.content)?;

        // ── Step 7: Normalise ────────────────────────────────────────────
        tracker.enter(Stage::Normalizing);
        let questions = normalize::normalize_questions(&items, max_questions, &response.content)?;

        info!(
            "Generated {} questions in {}ms",
            questions.len(),
            total_start.elapsed().as_millis()
        );
        Ok(questions)
    }
}

/// Generate a quiz with the default collaborators for `config`.
///
/// Convenience for one-off calls; long-running services should build one
/// [`QuizPipeline`] and reuse it.
pub async fn generate_quiz(request: &GenerationRequest, config: &QuizConfig) -> GenerationResult {
    match QuizPipeline::new(config.clone()) {
        Ok(pipeline) => pipeline.generate(request).await,
        Err(e) => e.into(),
    }
}

/// Synchronous wrapper around [`generate_quiz`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_quiz_sync(request: &GenerationRequest, config: &QuizConfig) -> GenerationResult {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(generate_quiz(request, config)),
        Err(e) => {
            error!("Could not create a tokio runtime: {}", e);
            QuizError::RuntimeUnavailable(e.to_string()).into()
        }
    }
}
