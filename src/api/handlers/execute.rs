//! Execution trigger handlers.
//!
//! These endpoints are driven by an external cron-like service holding
//! the shared trigger secret. POST executes (one prompt explicitly, or
//! all due prompts); GET is a dry-run listing of what would execute.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::TRIGGER_TAG;
use crate::api::dto::{
    DueCheckResponse, ExecuteErrorResponse, ExecuteRequest, ExecuteResponse,
};
use crate::error::AppResult;
use crate::state::AppState;

/// Creates the execution trigger routes.
pub fn execute_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(trigger_execution, list_due_prompts))
}

/// POST /api/prompts/execute - Run one prompt or all due prompts
///
/// With `prompt_id` in the body the due-ness gate is skipped (explicit
/// run). Partial failure still yields a 200 with per-prompt errors; only
/// infrastructure failure produces the 500 envelope.
#[utoipa::path(
    post,
    path = "/execute",
    tag = TRIGGER_TAG,
    request_body(content = ExecuteRequest, description = "Optional explicit prompt id"),
    responses(
        (status = 200, description = "Execution summary", body = ExecuteResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Fatal infrastructure failure", body = ExecuteErrorResponse)
    ),
    security(
        ("apiKeyAuth" = [])
    )
)]
async fn trigger_execution(
    State(state): State<AppState>,
    body: Option<Json<ExecuteRequest>>,
) -> Response {
    let started = Utc::now();
    let prompt_id = body.and_then(|Json(request)| request.prompt_id);

    let outcome = match prompt_id {
        Some(id) => state
            .executor
            .execute_scheduled_prompt(id, true)
            .await
            .map(|result| vec![result]),
        None => state.executor.run_due().await,
    };

    match outcome {
        Ok(results) => {
            let response = ExecuteResponse::from_results(results, started);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Execution batch failed");
            let response = ExecuteErrorResponse::new(e.to_string(), started);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

/// GET /api/prompts/execute - List currently due prompts without executing
#[utoipa::path(
    get,
    path = "/execute",
    tag = TRIGGER_TAG,
    responses(
        (status = 200, description = "Due prompts", body = DueCheckResponse),
        (status = 401, description = "Missing or invalid API key")
    ),
    security(
        ("apiKeyAuth" = [])
    )
)]
async fn list_due_prompts(State(state): State<AppState>) -> AppResult<Json<DueCheckResponse>> {
    let due = state.executor.get_due_prompts().await?;
    let due_prompts: Vec<_> = due.into_iter().map(Into::into).collect();
    Ok(Json(DueCheckResponse {
        count: due_prompts.len(),
        due_prompts,
        checked_at: Utc::now(),
    }))
}
