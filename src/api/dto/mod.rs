//! Request and response DTOs for the HTTP API.

mod auth;
mod error;
mod execute;
mod health;
mod logs;
mod prompt;
mod usage;

pub use auth::{LoginRequest, LoginResponse};
pub use error::ErrorResponse;
pub use execute::{
    DueCheckResponse, DuePromptResponse, ExecuteErrorResponse, ExecuteRequest, ExecuteResponse,
    ExecuteSummary, ExecutionResultResponse,
};
pub use health::HealthResponse;
pub use logs::{ExecutionLogQuery, ExecutionLogResponse, ExecutionLogsResponse};
pub use prompt::{CreatePromptRequest, PromptResponse, UpdatePromptRequest};
pub use usage::{AllUsageResponse, ThreadUsageResponse, TokenUsageResponse, UsageQuery};
