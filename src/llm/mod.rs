//! Chat model capability interface and provider registry.
//!
//! Orchestration code only sees the [`ChatModel`] trait; one adapter
//! exists per provider and is selected by name through [`create_model`].
//! New providers slot in without touching the executor.

mod anthropic;
mod openai;

pub use anthropic::AnthropicModel;
pub use openai::OpenAiModel;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::config::LlmConfig;
use crate::error::{AppError, AppResult};
use crate::models::UsageDelta;

/// Result of one chat model invocation.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: UsageDelta,
}

/// Capability interface for invoking a chat model with a plain prompt.
#[async_trait]
pub trait ChatModel: Send + Sync + std::fmt::Debug {
    /// Send `prompt` as a single user message and return the reply with
    /// its token usage.
    async fn invoke(&self, prompt: &str) -> AppResult<Completion>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com",
            Self::Anthropic => "https://api.anthropic.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(AppError::Configuration {
                key: "provider".to_string(),
                source: anyhow::anyhow!("unsupported provider '{}'", other),
            }),
        }
    }
}

/// Resolved connection settings for one model invocation.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: u64,
}

/// Build a model adapter for `provider`/`model` from the configured
/// credentials.
///
/// # Errors
///
/// `AppError::Configuration` when the provider is unknown or its API key
/// is not configured; the executor reports this inline in the prompt's
/// result instead of failing the batch.
pub fn create_model(
    provider: &str,
    model: &str,
    config: &LlmConfig,
) -> AppResult<Arc<dyn ChatModel>> {
    let provider = Provider::from_str(provider)?;
    let creds = match provider {
        Provider::OpenAi => &config.openai,
        Provider::Anthropic => &config.anthropic,
    };
    if creds.api_key.is_empty() {
        return Err(AppError::Configuration {
            key: format!("llm.{}.api_key", provider.as_str()),
            source: anyhow::anyhow!("no API key configured for provider '{}'", provider.as_str()),
        });
    }

    let settings = ModelSettings {
        provider,
        base_url: creds
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string()),
        api_key: creds.api_key.clone(),
        model: model.to_string(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        request_timeout: config.request_timeout,
    };

    Ok(match provider {
        Provider::OpenAi => Arc::new(OpenAiModel::new(settings)),
        Provider::Anthropic => Arc::new(AnthropicModel::new(settings)),
    })
}

/// Price per million tokens in cents, (input, output), longest prefix wins.
const MODEL_PRICES: &[(&str, i64, i64)] = &[
    ("gpt-4o-mini", 15, 60),
    ("gpt-4o", 250, 1000),
    ("gpt-4.1-mini", 40, 160),
    ("gpt-4.1", 200, 800),
    ("claude-haiku", 100, 500),
    ("claude-sonnet", 300, 1500),
    ("claude-opus", 1500, 7500),
];

/// Estimate the dollar cost of a completion from the price table.
///
/// Unknown models price at zero; accounting still records their token
/// counts.
pub fn estimate_cost(model: &str, prompt_tokens: i64, completion_tokens: i64) -> BigDecimal {
    let price = MODEL_PRICES
        .iter()
        .filter(|(prefix, _, _)| model.starts_with(prefix))
        .max_by_key(|(prefix, _, _)| prefix.len());

    match price {
        Some((_, input, output)) => {
            // cents-per-mtok * tokens has an implicit scale of 10^8 dollars.
            let units = prompt_tokens * input + completion_tokens * output;
            BigDecimal::new(units.into(), 8)
        }
        None => BigDecimal::from(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!(Provider::from_str("OpenAI").unwrap(), Provider::OpenAi);
        assert_eq!(Provider::from_str("anthropic").unwrap(), Provider::Anthropic);
        assert!(Provider::from_str("cohere").is_err());
    }

    #[test]
    fn registry_selects_adapter_by_provider() {
        let mut config = LlmConfig::default();
        config.openai.api_key = "sk-test".to_string();
        config.anthropic.api_key = "sk-ant-test".to_string();

        let model = create_model("openai", "gpt-4o", &config).unwrap();
        assert_eq!(model.name(), "openai");

        let model = create_model("anthropic", "claude-sonnet-4-5", &config).unwrap();
        assert_eq!(model.name(), "anthropic");
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let config = LlmConfig::default();
        let err = create_model("openai", "gpt-4o", &config).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn cost_uses_longest_matching_prefix() {
        // 1M input tokens of gpt-4o-mini cost $0.15, not gpt-4o's $2.50.
        let cost = estimate_cost("gpt-4o-mini", 1_000_000, 0);
        assert_eq!(cost, BigDecimal::from_str("0.15").unwrap());

        let cost = estimate_cost("gpt-4o", 1_000_000, 0);
        assert_eq!(cost, BigDecimal::from_str("2.50").unwrap());
    }

    #[test]
    fn cost_combines_input_and_output() {
        // 1000 in + 1000 out on claude-sonnet: 0.003 + 0.015 dollars.
        let cost = estimate_cost("claude-sonnet-4-5", 1000, 1000);
        assert_eq!(cost, BigDecimal::from_str("0.018").unwrap());
    }

    #[test]
    fn unknown_model_prices_at_zero() {
        assert_eq!(estimate_cost("mystery-model", 5000, 5000), BigDecimal::from(0));
    }
}
