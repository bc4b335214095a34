//! CLI binary for pdf2quiz.
//!
//! A thin shim over the library crate that maps CLI flags to `QuizConfig`,
//! runs one request and prints the result envelope as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2quiz::{
    GenerationRequest, GenerationResult, PipelineState, ProgressCallback, QuizConfig,
    QuizPipeline, QuizProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner whose message follows the current
/// stage, and a final status line once the request settles.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Instant,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Quiz");
        bar.set_message("starting…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Instant::now(),
        })
    }
}

impl QuizProgressCallback for CliProgressCallback {
    fn on_state(&self, state: PipelineState) {
        match state {
            PipelineState::Idle => {}
            PipelineState::Active(stage) => self.bar.set_message(format!("{stage}…")),
            PipelineState::Done => {
                self.bar.finish_and_clear();
                eprintln!(
                    "{} quiz ready {}",
                    green("✔"),
                    dim(&format!("{:.1}s", self.started.elapsed().as_secs_f64()))
                );
            }
            PipelineState::Failed(stage) => {
                self.bar.finish_and_clear();
                eprintln!("{} failed while {}", red("✘"), stage);
            }
        }
    }

    fn on_model_usage(&self, prompt_tokens: usize, completion_tokens: usize) {
        self.bar.println(format!(
            "  {}",
            dim(&format!("{prompt_tokens} tokens in  /  {completion_tokens} tokens out"))
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Ten questions (the default) from a lecture handout
  pdf2quiz https://example.com/lecture.pdf

  # Five questions in French, pretty-printed
  pdf2quiz --max-questions 5 --language French --pretty https://example.com/cours.pdf

  # Use a specific model
  pdf2quiz --model claude-sonnet-4-20250514 --provider anthropic https://example.com/paper.pdf

OUTPUT:
  stdout receives exactly one JSON document:
    {"questions": [{"id", "question", "options", "answerIndex", "explanation"?}, ...]}
  or, when any stage fails (exit code 1):
    {"error": "...", "stage": "parsing", "raw": "..."?}

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium
"#;

/// Generate a multiple-choice quiz from a PDF URL using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2quiz",
    version,
    about = "Generate a multiple-choice quiz from a PDF URL using an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTTP/HTTPS URL of the PDF document.
    url: String,

    /// Maximum number of questions to return.
    #[arg(short = 'n', long, env = "PDF2QUIZ_MAX_QUESTIONS", default_value_t = pdf2quiz::DEFAULT_MAX_QUESTIONS)]
    max_questions: usize,

    /// LLM model ID (e.g. gpt-4o-mini, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Language to write the questions in (default: the document's).
    #[arg(long, env = "PDF2QUIZ_LANGUAGE")]
    language: Option<String>,

    /// Characters of document text sent to the model.
    #[arg(long, env = "PDF2QUIZ_MAX_CHARS", default_value_t = pdf2quiz::DEFAULT_MAX_CHARS)]
    max_chars: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF2QUIZ_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "PDF2QUIZ_MAX_TOKENS", default_value_t = 2000)]
    max_tokens: usize,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2QUIZ_FETCH_TIMEOUT", default_value_t = 60)]
    fetch_timeout: u64,

    /// LLM call timeout in seconds.
    #[arg(long, env = "PDF2QUIZ_API_TIMEOUT", default_value_t = 90)]
    api_timeout: u64,

    /// Largest document accepted, in MiB.
    #[arg(long, env = "PDF2QUIZ_MAX_DOCUMENT_MB", default_value_t = 25)]
    max_document_mb: u64,

    /// Retries for transient download/model failures.
    #[arg(long, env = "PDF2QUIZ_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Path to an existing libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDF2QUIZ_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2QUIZ_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the JSON result.
    #[arg(short, long, env = "PDF2QUIZ_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already reports stage changes; keep INFO logs out of its way.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Run ──────────────────────────────────────────────────────────────
    let result = match GenerationRequest::new(&cli.url, cli.max_questions) {
        Ok(request) => {
            let progress_cb: Option<ProgressCallback> = if show_progress {
                Some(CliProgressCallback::new() as Arc<dyn QuizProgressCallback>)
            } else {
                None
            };
            let config = build_config(&cli, progress_cb)?;
            let pipeline = QuizPipeline::new(config).context("Failed to set up the pipeline")?;
            pipeline.generate(&request).await
        }
        Err(e) => GenerationResult::from(e),
    };

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("Failed to serialise result")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}").context("Failed to write to stdout")?;

    if result.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Map CLI args to `QuizConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<QuizConfig> {
    let mut builder = QuizConfig::builder()
        .max_chars(cli.max_chars)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .fetch_timeout_secs(cli.fetch_timeout)
        .api_timeout_secs(cli.api_timeout)
        .max_document_bytes(cli.max_document_mb.saturating_mul(1024 * 1024))
        .max_retries(cli.max_retries);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref language) = cli.language {
        builder = builder.language(language);
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
