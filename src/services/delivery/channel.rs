//! Core delivery channel trait and types.
//!
//! A channel is one mechanism through which an execution's output reaches
//! a recipient (chat message, assistant thread, notification push, email).
//! All channels are independent: one recipient-channel failure never
//! blocks the others.

use crate::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A resolved delivery recipient from the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub user_id: i32,
    pub username: String,
    pub email: String,
}

/// Message produced by one prompt execution, fanned out per recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryMessage {
    /// Originating prompt id, for traceability on the receiving side
    pub prompt_id: i32,
    /// Message title/subject
    pub title: String,
    /// Model output body
    pub body: String,
}

/// Result of a single delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Whether the delivery succeeded
    pub success: bool,
    /// HTTP status code from the downstream service, when one was received
    pub status_code: Option<u16>,
    /// Response body or error message
    pub detail: Option<String>,
    /// Time taken for the operation in milliseconds
    pub duration_ms: u64,
}

/// Trait for delivery channels.
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// Downstream failures are returned as unsuccessful receipts rather than
/// errors so the caller can record them per recipient-channel pair;
/// `Err` is reserved for local misuse (e.g. malformed configuration).
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Deliver `message` to a single recipient.
    async fn deliver(
        &self,
        recipient: &Recipient,
        message: &DeliveryMessage,
    ) -> AppResult<DeliveryReceipt>;

    /// Channel name used in logs and recorded error strings
    fn name(&self) -> &'static str;
}
