//! Notification push channel.
//!
//! Sends a per-recipient push through the configured notification
//! endpoint, optionally authenticated with a bearer token.

use async_trait::async_trait;
use serde_json::json;
use std::time::{Duration, Instant};

use super::channel::{DeliveryChannel, DeliveryMessage, DeliveryReceipt, Recipient};
use crate::error::AppResult;
use crate::external::client::HTTP_CLIENT;

pub struct NotifierChannel {
    url: String,
    token: Option<String>,
    timeout: Duration,
}

impl NotifierChannel {
    pub fn new(url: String, token: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            url,
            token,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait]
impl DeliveryChannel for NotifierChannel {
    async fn deliver(
        &self,
        recipient: &Recipient,
        message: &DeliveryMessage,
    ) -> AppResult<DeliveryReceipt> {
        let start = Instant::now();

        let mut request = HTTP_CLIENT
            .post(&self.url)
            .timeout(self.timeout)
            .json(&json!({
                "user_id": recipient.user_id,
                "title": message.title,
                "body": message.body,
            }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await;
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
            Err(e) => Ok(DeliveryReceipt {
                success: false,
                status_code: None,
                detail: Some(e.to_string()),
                duration_ms,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "notifier"
    }
}
