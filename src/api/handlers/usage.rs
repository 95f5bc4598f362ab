//! Token usage query handlers.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USAGE_TAG;
use crate::api::dto::{AllUsageResponse, ThreadUsageResponse, TokenUsageResponse, UsageQuery};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate::ValidatedQuery;

/// Creates token usage routes.
pub fn usage_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(get_token_usage))
}

/// GET /api/agent/token-usage - Usage totals for one thread or all scopes
///
/// With `thread_id`, returns that thread's totals or 404 when the scope
/// has never recorded usage. Without it, returns every known scope.
#[utoipa::path(
    get,
    path = "/",
    tag = USAGE_TAG,
    params(UsageQuery),
    responses(
        (status = 200, description = "Token usage totals"),
        (status = 404, description = "No usage recorded for the thread")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn get_token_usage(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<UsageQuery>,
) -> AppResult<Response> {
    match query.thread_id {
        Some(thread_id) => {
            let scope = format!("thread:{}", thread_id);
            let usage = state
                .services
                .usage
                .get(&scope)
                .await?
                .ok_or_else(|| AppError::NotFound {
                    entity: "TokenUsage".to_string(),
                    field: "thread_id".to_string(),
                    value: thread_id.clone(),
                })?;
            Ok(Json(ThreadUsageResponse {
                thread_id,
                token_usage: TokenUsageResponse::from(usage),
            })
            .into_response())
        }
        None => {
            let all = state.services.usage.get_all().await?;
            let token_usage: BTreeMap<String, TokenUsageResponse> = all
                .into_iter()
                .map(|usage| (usage.scope.clone(), TokenUsageResponse::from(usage)))
                .collect();
            Ok(Json(AllUsageResponse { token_usage }).into_response())
        }
    }
}
