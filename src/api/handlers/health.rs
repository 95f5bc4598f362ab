//! Health check handlers.

use axum::{extract::State, Json};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::HealthResponse;
use crate::state::AppState;

/// Creates health check routes.
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health))
}

/// GET /health - Liveness and database reachability
#[utoipa::path(
    get,
    path = "/",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db_pool.get().await {
        Ok(_) => "up",
        Err(e) => {
            tracing::warn!(error = %e, "Health check cannot reach database");
            "down"
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        name: state.app_name.clone(),
        version: crate::pkg_version().to_string(),
        database: database.to_string(),
    })
}
