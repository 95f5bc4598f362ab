use chrono::{DateTime, Utc};
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Recurrence frequency of a scheduled prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::Frequency")]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Special,
}

/// Execution state machine: idle -> running -> completed|failed -> idle.
///
/// The transition into `Running` is performed as an atomic conditional
/// update so two concurrent triggers cannot double-run one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ExecutionStatus")]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Idle,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Idle => write!(f, "idle"),
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Soft-delete lifecycle state. Prompts are never hard-deleted so the
/// execution log keeps valid references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::PromptState")]
#[serde(rename_all = "lowercase")]
pub enum PromptState {
    Active,
    Deleted,
}

/// Outcome of one execution attempt for a single prompt.
///
/// Skipped executions (not found, not due, already running, malformed
/// schedule) are reported through `errors` with zero counts rather than
/// as hard failures, so a batch run always yields one result per prompt.
#[derive(Debug, Clone, Serialize)]
pub struct PromptExecutionResult {
    pub prompt_id: i32,
    pub success_count: u32,
    pub failure_count: u32,
    pub errors: Vec<String>,
    pub executed_at: DateTime<Utc>,
}

impl PromptExecutionResult {
    /// A run that never attempted delivery, with a descriptive reason.
    pub fn skipped(prompt_id: i32, reason: impl Into<String>, executed_at: DateTime<Utc>) -> Self {
        Self {
            prompt_id,
            success_count: 0,
            failure_count: 0,
            errors: vec![reason.into()],
            executed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_status_display_matches_db_labels() {
        assert_eq!(ExecutionStatus::Idle.to_string(), "idle");
        assert_eq!(ExecutionStatus::Running.to_string(), "running");
        assert_eq!(ExecutionStatus::Completed.to_string(), "completed");
        assert_eq!(ExecutionStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn frequency_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Frequency::Monthly).unwrap(),
            "\"monthly\""
        );
        assert_eq!(
            serde_json::from_str::<Frequency>("\"special\"").unwrap(),
            Frequency::Special
        );
    }

    #[test]
    fn skipped_result_carries_reason() {
        let result = PromptExecutionResult::skipped(7, "not due", Utc::now());
        assert_eq!(result.prompt_id, 7);
        assert_eq!(result.success_count, 0);
        assert_eq!(result.failure_count, 0);
        assert_eq!(result.errors, vec!["not due".to_string()]);
    }
}
