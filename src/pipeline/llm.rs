//! LLM interaction: send the prompt pair and return the model's raw text.
//!
//! This module is deliberately thin. Prompt wording lives in
//! [`crate::prompts`] and response recovery in [`crate::pipeline::parse`];
//! here we only build the chat request, bound it with a timeout, and map
//! provider failures onto [`QuizError`] model variants.
//!
//! ## No shared client
//!
//! Nothing is initialised at module load. [`ModelSettings`] travels with
//! every call, and the pipeline holds an `Arc<dyn GenerationClient>` that
//! tests replace with a fake.

use crate::config::{QuizConfig, DEFAULT_MODEL};
use crate::error::QuizError;
use crate::prompts::PromptPair;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::Duration;
use tracing::{debug, info};

/// Per-call model parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
}

impl ModelSettings {
    /// Model name precedence: config → `EDGEQUAKE_MODEL` → [`DEFAULT_MODEL`].
    pub fn from_config(config: &QuizConfig) -> Self {
        let model = config
            .model
            .clone()
            .or_else(|| {
                std::env::var("EDGEQUAKE_MODEL")
                    .ok()
                    .filter(|m| !m.is_empty())
            })
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.api_timeout_secs,
        }
    }
}

/// The model's answer plus token accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    /// The literal response text, untouched.
    pub content: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

/// Invokes a chat-style model once per call.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &PromptPair,
        settings: &ModelSettings,
    ) -> Result<ModelResponse, QuizError>;
}

/// [`GenerationClient`] backed by an `edgequake_llm` provider.
#[derive(Clone, Default)]
pub struct ProviderClient {
    provider: Option<Arc<dyn LLMProvider>>,
    provider_name: Option<String>,
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("provider_name", &self.provider_name)
            .finish()
    }
}

impl ProviderClient {
    pub fn from_config(config: &QuizConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            provider_name: config.provider_name.clone(),
        }
    }

    /// Use an already-constructed provider for every call.
    pub fn with_provider(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider: Some(provider),
            provider_name: None,
        }
    }

    /// Resolve the provider, from most-specific to least-specific:
    ///
    /// 1. the pre-built provider, used as-is;
    /// 2. the named provider, created with `settings.model`;
    /// 3. `EDGEQUAKE_LLM_PROVIDER` from the environment;
    /// 4. OpenAI when `OPENAI_API_KEY` is set;
    /// 5. whatever [`ProviderFactory::from_env`] detects.
    ///
    /// Returns the provider and a label for error messages.
    fn resolve(
        &self,
        settings: &ModelSettings,
    ) -> Result<(Arc<dyn LLMProvider>, String), QuizError> {
        if let Some(ref provider) = self.provider {
            return Ok((Arc::clone(provider), "custom".to_string()));
        }

        if let Some(ref name) = self.provider_name {
            return create_provider(name, &settings.model);
        }

        if let Ok(name) = std::env::var("EDGEQUAKE_LLM_PROVIDER") {
            if !name.is_empty() {
                return create_provider(&name, &settings.model);
            }
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                return create_provider("openai", &settings.model);
            }
        }

        let (llm_provider, _embedding) =
            ProviderFactory::from_env().map_err(|e| QuizError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: format!(
                    "No LLM provider could be auto-detected from environment.\n\
                    Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                    Error: {}",
                    e
                ),
            })?;

        Ok((llm_provider, "auto".to_string()))
    }
}

fn create_provider(
    name: &str,
    model: &str,
) -> Result<(Arc<dyn LLMProvider>, String), QuizError> {
    let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        QuizError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    Ok((provider, name.to_string()))
}

#[async_trait]
impl GenerationClient for ProviderClient {
    async fn generate(
        &self,
        prompt: &PromptPair,
        settings: &ModelSettings,
    ) -> Result<ModelResponse, QuizError> {
        let (provider, label) = self.resolve(settings)?;

        let messages = vec![
            ChatMessage::system(prompt.system.as_str()),
            ChatMessage::user(prompt.user.as_str()),
        ];
        let options = build_options(settings);

        info!("Requesting questions from '{}' ({})", label, settings.model);
        let start = Instant::now();

        let response = tokio::time::timeout(
            Duration::from_secs(settings.timeout_secs),
            provider.chat(&messages, Some(&options)),
        )
        .await
        .map_err(|_| QuizError::ModelTimeout {
            secs: settings.timeout_secs,
        })?
        .map_err(|e| classify_provider_error(&label, &e.to_string(), settings.timeout_secs))?;

        debug!(
            "{} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.trim().is_empty() {
            return Err(QuizError::EmptyResponse);
        }

        Ok(ModelResponse {
            content: response.content,
            prompt_tokens: response.prompt_tokens as usize,
            completion_tokens: response.completion_tokens as usize,
        })
    }
}

/// Build `CompletionOptions` from the model settings.
fn build_options(settings: &ModelSettings) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(settings.temperature),
        max_tokens: Some(settings.max_tokens),
        ..Default::default()
    }
}

/// Map a provider error message onto the model error taxonomy.
///
/// Providers surface HTTP failures as text, so classification goes by the
/// status codes and phrases they embed.
pub fn classify_provider_error(provider: &str, detail: &str, timeout_secs: u64) -> QuizError {
    let lower = detail.to_lowercase();

    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("forbidden")
        || lower.contains("invalid api key")
        || lower.contains("authentication")
    {
        QuizError::AuthError {
            provider: provider.to_string(),
            detail: detail.to_string(),
        }
    } else if lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("too many requests")
    {
        QuizError::RateLimitExceeded {
            provider: provider.to_string(),
            detail: detail.to_string(),
        }
    } else if lower.contains("timed out") || lower.contains("timeout") {
        QuizError::ModelTimeout { secs: timeout_secs }
    } else {
        QuizError::LlmApiError {
            message: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let settings = ModelSettings::from_config(&QuizConfig::default());
        let opts = build_options(&settings);
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(2000));
    }

    #[test]
    fn explicit_model_wins() {
        let config = QuizConfig::builder().model("gpt-4.1-nano").build().unwrap();
        assert_eq!(ModelSettings::from_config(&config).model, "gpt-4.1-nano");
    }

    #[test]
    fn classifies_auth_failures() {
        let e = classify_provider_error("openai", "HTTP 401 Unauthorized: invalid api key", 60);
        assert!(matches!(e, QuizError::AuthError { .. }));
        assert!(!e.is_retryable());
    }

    #[test]
    fn classifies_rate_limits() {
        let e = classify_provider_error("openai", "429 Too Many Requests", 60);
        assert!(matches!(e, QuizError::RateLimitExceeded { .. }));
        assert!(e.is_retryable());
    }

    #[test]
    fn classifies_timeouts() {
        let e = classify_provider_error("anthropic", "request timed out", 45);
        assert!(matches!(e, QuizError::ModelTimeout { secs: 45 }));
    }

    #[test]
    fn other_failures_are_api_errors() {
        let e = classify_provider_error("gemini", "500 internal server error", 60);
        assert!(matches!(e, QuizError::LlmApiError { .. }));
        assert_eq!(e.stage(), crate::output::Stage::AwaitingModel);
    }
}
