//! Execution trigger DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::scheduling::models::ScheduledPrompt;
use crate::scheduling::types::{ExecutionStatus, PromptExecutionResult};

/// Optional body for the execution trigger. With a `prompt_id` that one
/// prompt runs regardless of due-ness (explicit run); without one, all
/// currently due prompts run.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExecuteRequest {
    pub prompt_id: Option<i32>,
}

/// One prompt's execution outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecutionResultResponse {
    pub prompt_id: i32,
    pub success_count: u32,
    pub failure_count: u32,
    pub errors: Vec<String>,
    pub executed_at: DateTime<Utc>,
}

impl From<PromptExecutionResult> for ExecutionResultResponse {
    fn from(result: PromptExecutionResult) -> Self {
        Self {
            prompt_id: result.prompt_id,
            success_count: result.success_count,
            failure_count: result.failure_count,
            errors: result.errors,
            executed_at: result.executed_at,
        }
    }
}

/// Batch totals across all executed prompts.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecuteSummary {
    pub total_prompts: usize,
    pub total_success: u32,
    pub total_failures: u32,
    pub total_errors: usize,
    pub executed_at: DateTime<Utc>,
}

/// Successful trigger response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecuteResponse {
    pub success: bool,
    pub summary: ExecuteSummary,
    pub results: Vec<ExecutionResultResponse>,
}

impl ExecuteResponse {
    pub fn from_results(results: Vec<PromptExecutionResult>, executed_at: DateTime<Utc>) -> Self {
        let summary = ExecuteSummary {
            total_prompts: results.len(),
            total_success: results.iter().map(|r| r.success_count).sum(),
            total_failures: results.iter().map(|r| r.failure_count).sum(),
            total_errors: results.iter().map(|r| r.errors.len()).sum(),
            executed_at,
        };
        Self {
            success: true,
            summary,
            results: results.into_iter().map(ExecutionResultResponse::from).collect(),
        }
    }
}

/// Fatal trigger failure envelope, paired with HTTP 500.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecuteErrorResponse {
    pub success: bool,
    pub error: String,
    pub executed_at: DateTime<Utc>,
}

impl ExecuteErrorResponse {
    pub fn new(error: impl Into<String>, executed_at: DateTime<Utc>) -> Self {
        Self {
            success: false,
            error: error.into(),
            executed_at,
        }
    }
}

/// One due prompt in the dry-run listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct DuePromptResponse {
    pub id: i32,
    pub title: String,
    pub next_execution: Option<DateTime<Utc>>,
    pub execution_status: ExecutionStatus,
}

impl From<ScheduledPrompt> for DuePromptResponse {
    fn from(prompt: ScheduledPrompt) -> Self {
        Self {
            id: prompt.id,
            title: prompt.title,
            next_execution: prompt.next_execution,
            execution_status: prompt.execution_status,
        }
    }
}

/// Dry-run response: what would execute now, without executing it.
#[derive(Debug, Serialize, ToSchema)]
pub struct DueCheckResponse {
    pub due_prompts: Vec<DuePromptResponse>,
    pub count: usize,
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_totals_across_results() {
        let now = Utc::now();
        let results = vec![
            PromptExecutionResult {
                prompt_id: 1,
                success_count: 5,
                failure_count: 1,
                errors: vec!["email -> user 2: bad gateway".to_string()],
                executed_at: now,
            },
            PromptExecutionResult::skipped(2, "not due", now),
        ];

        let response = ExecuteResponse::from_results(results, now);
        assert!(response.success);
        assert_eq!(response.summary.total_prompts, 2);
        assert_eq!(response.summary.total_success, 5);
        assert_eq!(response.summary.total_failures, 1);
        assert_eq!(response.summary.total_errors, 2);
        assert_eq!(response.results.len(), 2);
    }
}
