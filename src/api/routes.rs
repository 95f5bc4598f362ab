//! Router configuration for the API.
//!
//! Route groups carry their own authentication: the execution trigger is
//! guarded by the shared `x-api-key` secret, user-facing groups by JWT,
//! login and health are public.

use std::time::Duration;

use axum::{middleware, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    api_key_middleware, auth_middleware, logging_middleware, request_id_middleware,
};
use crate::state::AppState;
use utoipa::OpenApi;

/// Creates the main application router with all routes and middleware.
///
/// Middleware is applied in reverse order of declaration (last added runs
/// first): request IDs are assigned before logging so every log line
/// carries one.
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.request_timeout);

    let trigger_routes = handlers::execute::execute_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), api_key_middleware),
    );
    let prompt_routes = handlers::prompts::prompt_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), auth_middleware),
    );
    let usage_routes = handlers::usage::usage_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), auth_middleware),
    );
    let log_routes = handlers::logs::log_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), auth_middleware),
    );

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/prompts", trigger_routes.merge(prompt_routes))
        .nest("/api/agent/token-usage", usage_routes)
        .nest("/api/execution-logs", log_routes)
        .nest("/api/auth", handlers::auth::auth_routes())
        .nest("/health", handlers::health::health_routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
