//! Execution log query DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::scheduling::models::ExecutionLog;
use crate::scheduling::types::ExecutionStatus;
use crate::utils::window::TimeFilter;

fn default_limit() -> i64 {
    50
}

/// Query parameters for the execution log listing.
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct ExecutionLogQuery {
    /// Restrict to one prompt (must be owned by the caller)
    pub prompt_id: Option<i32>,

    /// Restrict to one outcome status
    pub status: Option<ExecutionStatus>,

    /// Calendar window containing "now"; defaults to `all`
    #[serde(default)]
    pub time_filter: TimeFilter,

    /// Timezone the window boundaries are computed in; defaults to UTC
    pub timezone: Option<String>,

    #[validate(range(min = 1, max = 500, message = "Limit must be between 1 and 500"))]
    #[serde(default = "default_limit")]
    pub limit: i64,

    #[validate(range(min = 0, message = "Offset must not be negative"))]
    #[serde(default)]
    pub offset: i64,
}

/// One execution attempt record.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecutionLogResponse {
    pub id: i64,
    pub prompt_id: i32,
    pub status: ExecutionStatus,
    pub success_count: i32,
    pub failure_count: i32,
    pub recipient_count: i32,
    pub errors: Vec<String>,
    pub executed_at: DateTime<Utc>,
}

impl From<ExecutionLog> for ExecutionLogResponse {
    fn from(log: ExecutionLog) -> Self {
        Self {
            id: log.id,
            prompt_id: log.prompt_id,
            status: log.status,
            success_count: log.success_count,
            failure_count: log.failure_count,
            recipient_count: log.recipient_count,
            errors: log.errors,
            executed_at: log.executed_at,
        }
    }
}

/// Execution log listing, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecutionLogsResponse {
    pub logs: Vec<ExecutionLogResponse>,
    pub count: usize,
}
