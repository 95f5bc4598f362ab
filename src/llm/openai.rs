//! OpenAI chat completions adapter.
//!
//! Also serves OpenAI-compatible gateways through the base URL override.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{estimate_cost, ChatModel, Completion, ModelSettings};
use crate::error::{AppError, AppResult};
use crate::external::client::HTTP_CLIENT;
use crate::models::UsageDelta;

#[derive(Debug)]
pub struct OpenAiModel {
    settings: ModelSettings,
}

impl OpenAiModel {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: i64,
    #[serde(default)]
    completion_tokens: i64,
    #[serde(default)]
    total_tokens: i64,
    #[serde(default)]
    prompt_tokens_details: Option<PromptTokensDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct PromptTokensDetails {
    #[serde(default)]
    cached_tokens: i64,
}

#[async_trait]
impl ChatModel for OpenAiModel {
    async fn invoke(&self, prompt: &str) -> AppResult<Completion> {
        let body = json!({
            "model": self.settings.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
        });

        let response = HTTP_CLIENT
            .post(self.api_url())
            .bearer_auth(&self.settings.api_key)
            .timeout(Duration::from_secs(self.settings.request_timeout))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream {
                service: "openai".to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                service: "openai".to_string(),
                message: format!("HTTP {}: {}", status.as_u16(), detail),
            });
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(|e| AppError::Upstream {
                service: "openai".to_string(),
                message: format!("invalid response body: {}", e),
            })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let usage = parsed.usage.unwrap_or_default();
        let cached = usage
            .prompt_tokens_details
            .map(|d| d.cached_tokens)
            .unwrap_or(0);
        let total = if usage.total_tokens > 0 {
            usage.total_tokens
        } else {
            usage.prompt_tokens + usage.completion_tokens
        };

        Ok(Completion {
            text,
            usage: UsageDelta {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                cached_tokens: cached,
                total_tokens: total,
                model: self.settings.model.clone(),
                cost: estimate_cost(
                    &self.settings.model,
                    usage.prompt_tokens,
                    usage.completion_tokens,
                ),
            },
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_extracts_text_and_usage() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Revenue is up 4%."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150,
                      "prompt_tokens_details": {"cached_tokens": 100}}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Revenue is up 4%.")
        );
        let usage = parsed.usage.unwrap();
        assert_eq!(usage.total_tokens, 150);
        assert_eq!(usage.prompt_tokens_details.unwrap().cached_tokens, 100);
    }

    #[test]
    fn missing_usage_defaults_to_zero() {
        let raw = r#"{"choices": [{"message": {"content": "hi"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage.is_none());
    }
}
