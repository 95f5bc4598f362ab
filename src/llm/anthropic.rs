//! Anthropic Messages API adapter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{estimate_cost, ChatModel, Completion, ModelSettings};
use crate::error::{AppError, AppResult};
use crate::external::client::HTTP_CLIENT;
use crate::models::UsageDelta;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug)]
pub struct AnthropicModel {
    settings: ModelSettings,
}

impl AnthropicModel {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    fn api_url(&self) -> String {
        format!("{}/v1/messages", self.settings.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: i64,
    #[serde(default)]
    output_tokens: i64,
    #[serde(default)]
    cache_read_input_tokens: i64,
}

#[async_trait]
impl ChatModel for AnthropicModel {
    async fn invoke(&self, prompt: &str) -> AppResult<Completion> {
        let body = json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = HTTP_CLIENT
            .post(self.api_url())
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(Duration::from_secs(self.settings.request_timeout))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream {
                service: "anthropic".to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                service: "anthropic".to_string(),
                message: format!("HTTP {}: {}", status.as_u16(), detail),
            });
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| AppError::Upstream {
            service: "anthropic".to_string(),
            message: format!("invalid response body: {}", e),
        })?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let usage = parsed.usage;
        Ok(Completion {
            text,
            usage: UsageDelta {
                prompt_tokens: usage.input_tokens,
                completion_tokens: usage.output_tokens,
                cached_tokens: usage.cache_read_input_tokens,
                total_tokens: usage.input_tokens + usage.output_tokens,
                model: self.settings.model.clone(),
                cost: estimate_cost(
                    &self.settings.model,
                    usage.input_tokens,
                    usage.output_tokens,
                ),
            },
        })
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_joins_text_blocks() {
        let raw = r#"{
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "Orders rose "},
                {"type": "tool_use", "id": "t1", "name": "noop", "input": {}},
                {"type": "text", "text": "sharply."}
            ],
            "usage": {"input_tokens": 200, "output_tokens": 48, "cache_read_input_tokens": 64}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();
        assert_eq!(text, "Orders rose sharply.");
        assert_eq!(parsed.usage.input_tokens, 200);
        assert_eq!(parsed.usage.cache_read_input_tokens, 64);
    }

    #[test]
    fn empty_response_defaults() {
        let parsed: MessagesResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.content.is_empty());
        assert_eq!(parsed.usage.output_tokens, 0);
    }
}
