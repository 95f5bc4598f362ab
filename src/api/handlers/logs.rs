//! Execution log query handlers.

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::LOG_TAG;
use crate::api::dto::{ExecutionLogQuery, ExecutionLogResponse, ExecutionLogsResponse};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::repositories::ExecutionLogFilter;
use crate::state::AppState;
use crate::utils::validate::ValidatedQuery;
use crate::utils::window::window_start;

/// Creates execution log routes.
pub fn log_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(list_execution_logs))
}

/// GET /api/execution-logs - Execution history for the caller's prompts
///
/// The `time_filter` window (today/week/month/year/all) is resolved in
/// the caller-supplied `timezone`, UTC by default. Results are newest
/// first and scoped to prompts the caller owns.
#[utoipa::path(
    get,
    path = "/",
    tag = LOG_TAG,
    params(ExecutionLogQuery),
    responses(
        (status = 200, description = "Execution log entries", body = ExecutionLogsResponse),
        (status = 400, description = "Invalid filter")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_execution_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(query): ValidatedQuery<ExecutionLogQuery>,
) -> AppResult<Json<ExecutionLogsResponse>> {
    let timezone = query.timezone.as_deref().unwrap_or("UTC");
    let since = window_start(query.time_filter, Utc::now(), timezone)?;

    let filter = ExecutionLogFilter {
        prompt_id: query.prompt_id,
        status: query.status,
        since,
        limit: query.limit,
        offset: query.offset,
    };

    let logs = state
        .services
        .execution_logs
        .list_for_user(user.user_id, filter)
        .await?;

    let logs: Vec<ExecutionLogResponse> = logs.into_iter().map(Into::into).collect();
    Ok(Json(ExecutionLogsResponse {
        count: logs.len(),
        logs,
    }))
}
