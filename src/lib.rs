//! # pdf2quiz
//!
//! Turn a PDF at a URL into a multiple-choice quiz using a chat LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL
//!  │
//!  ├─ 1. Fetch      download the document (timeout + size cap)
//!  ├─ 2. Extract    text layer via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Bound      keep the first `max_chars` characters
//!  ├─ 4. Prompt     system + user messages describing the JSON contract
//!  ├─ 5. Model      one chat call to gpt-4o-mini / claude / gemini / …
//!  ├─ 6. Parse      recover the JSON array from the raw answer
//!  ├─ 7. Normalize  canonical questions, capped at `max_questions`
//!  └─ 8. Result     {"questions": [...]} or {"error", "stage", "raw"}
//! ```
//!
//! Every request ends in a [`GenerationResult`]: either the full question
//! set, or a failure naming the stage that failed. Questions are never
//! invented to fill a gap.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2quiz::{generate_quiz, GenerationRequest, QuizConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = QuizConfig::default();
//!     let request = GenerationRequest::new("https://example.com/lecture.pdf", 5)?;
//!     let result = generate_quiz(&request, &config).await;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2quiz` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2quiz = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod question;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{QuizConfig, QuizConfigBuilder, DEFAULT_MAX_CHARS, DEFAULT_MODEL};
pub use error::QuizError;
pub use generate::{generate_quiz, generate_quiz_sync, QuizPipeline};
pub use output::{GenerationResult, Stage};
pub use pipeline::extract::{PdfiumExtractor, TextExtractor};
pub use pipeline::fetch::{DocumentFetcher, HttpFetcher};
pub use pipeline::llm::{GenerationClient, ModelResponse, ModelSettings, ProviderClient};
pub use progress::{NoopProgressCallback, PipelineState, ProgressCallback, QuizProgressCallback};
pub use prompts::{build_prompt, PromptPair};
pub use question::Question;
pub use request::{GenerationRequest, GenerationRequestBody, DEFAULT_MAX_QUESTIONS};
