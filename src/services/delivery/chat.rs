//! Chat delivery channel.
//!
//! Posts the execution output into the chat service, either as a direct
//! message to the recipient or into their assistant thread. Both targets
//! speak the same API shape, so one implementation covers the `chat` and
//! `ai_chat` delivery flags.

use async_trait::async_trait;
use serde_json::json;
use std::time::{Duration, Instant};

use super::channel::{DeliveryChannel, DeliveryMessage, DeliveryReceipt, Recipient};
use crate::error::AppResult;
use crate::external::client::HTTP_CLIENT;

/// Which surface of the chat service receives the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTarget {
    /// Direct chat message to the recipient
    Direct,
    /// The recipient's assistant (AI chat) thread
    Assistant,
}

pub struct ChatChannel {
    url: String,
    target: ChatTarget,
    timeout: Duration,
}

impl ChatChannel {
    pub fn new(url: String, target: ChatTarget, timeout_seconds: u64) -> Self {
        Self {
            url,
            target,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait]
impl DeliveryChannel for ChatChannel {
    async fn deliver(
        &self,
        recipient: &Recipient,
        message: &DeliveryMessage,
    ) -> AppResult<DeliveryReceipt> {
        let start = Instant::now();

        let response = HTTP_CLIENT
            .post(&self.url)
            .timeout(self.timeout)
            .json(&json!({
                "user_id": recipient.user_id,
                "title": message.title,
                "body": message.body,
                "source_prompt_id": message.prompt_id,
            }))
            .send()
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match response {
            Ok(resp) => {
                let status_code = resp.status().as_u16();
                let success = resp.status().is_success();
                let detail = resp.text().await.ok();
                Ok(DeliveryReceipt {
                    success,
                    status_code: Some(status_code),
                    detail,
                    duration_ms,
                })
            }
            // Network errors become failed receipts so the attempt is
            // still counted and logged per recipient.
            Err(e) => Ok(DeliveryReceipt {
                success: false,
                status_code: None,
                detail: Some(e.to_string()),
                duration_ms,
            }),
        }
    }

    fn name(&self) -> &'static str {
        match self.target {
            ChatTarget::Direct => "chat",
            ChatTarget::Assistant => "ai_chat",
        }
    }
}
