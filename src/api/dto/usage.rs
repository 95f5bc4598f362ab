//! Token usage query DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::TokenUsage;

/// Query parameters for the token usage endpoint.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
pub struct UsageQuery {
    /// Chat thread id; omitted means "all scopes"
    pub thread_id: Option<String>,
}

/// Running totals for one scope.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenUsageResponse {
    pub scope: String,
    pub total_tokens: i64,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub cached_tokens: i64,
    /// Accumulated dollar cost as a decimal string
    pub total_cost: String,
    /// Per-model accumulated cost
    #[schema(value_type = Object)]
    pub model_costs: JsonValue,
    pub updated_at: DateTime<Utc>,
}

impl From<TokenUsage> for TokenUsageResponse {
    fn from(usage: TokenUsage) -> Self {
        Self {
            scope: usage.scope,
            total_tokens: usage.total_tokens,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            cached_tokens: usage.cached_tokens,
            total_cost: usage.total_cost.normalized().to_string(),
            model_costs: usage.model_costs,
            updated_at: usage.updated_at,
        }
    }
}

/// Usage for one thread scope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ThreadUsageResponse {
    pub thread_id: String,
    pub token_usage: TokenUsageResponse,
}

/// Usage for every known scope, keyed by scope name.
#[derive(Debug, Serialize, ToSchema)]
pub struct AllUsageResponse {
    #[schema(value_type = Object)]
    pub token_usage: BTreeMap<String, TokenUsageResponse>,
}
