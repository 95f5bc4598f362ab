//! Prompt management request handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PROMPT_TAG;
use crate::api::dto::{CreatePromptRequest, PromptResponse, UpdatePromptRequest};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates prompt management routes.
pub fn prompt_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_prompts, create_prompt))
        .routes(routes!(get_prompt, update_prompt, delete_prompt))
}

/// GET /api/prompts - List the caller's prompts
#[utoipa::path(
    get,
    path = "/",
    tag = PROMPT_TAG,
    responses(
        (status = 200, description = "List of prompts", body = Vec<PromptResponse>)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_prompts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<PromptResponse>>> {
    let prompts = state.services.prompts.list_for_user(user.user_id).await?;
    Ok(Json(prompts.into_iter().map(PromptResponse::from).collect()))
}

/// POST /api/prompts - Create a new scheduled prompt
#[utoipa::path(
    post,
    path = "/",
    tag = PROMPT_TAG,
    request_body = CreatePromptRequest,
    responses(
        (status = 201, description = "Prompt created", body = PromptResponse),
        (status = 400, description = "Invalid request")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn create_prompt(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<CreatePromptRequest>,
) -> AppResult<(StatusCode, Json<PromptResponse>)> {
    let new_prompt = request.into_new_prompt(user.user_id)?;
    let prompt = state.services.prompts.create(new_prompt).await?;
    Ok((StatusCode::CREATED, Json(PromptResponse::from(prompt))))
}

/// GET /api/prompts/:id - Get one of the caller's prompts
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PROMPT_TAG,
    params(
        ("id" = i32, Path, description = "Prompt ID")
    ),
    responses(
        (status = 200, description = "Prompt found", body = PromptResponse),
        (status = 404, description = "Prompt not found")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn get_prompt(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<PromptResponse>> {
    let prompt = state.services.prompts.get_owned(id, user.user_id).await?;
    Ok(Json(PromptResponse::from(prompt)))
}

/// PUT /api/prompts/:id - Update one of the caller's prompts
#[utoipa::path(
    put,
    path = "/{id}",
    tag = PROMPT_TAG,
    params(
        ("id" = i32, Path, description = "Prompt ID")
    ),
    request_body = UpdatePromptRequest,
    responses(
        (status = 200, description = "Prompt updated", body = PromptResponse),
        (status = 404, description = "Prompt not found")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn update_prompt(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdatePromptRequest>,
) -> AppResult<Json<PromptResponse>> {
    let update = request.into_update()?;
    let prompt = state
        .services
        .prompts
        .update(id, user.user_id, update)
        .await?;
    Ok(Json(PromptResponse::from(prompt)))
}

/// DELETE /api/prompts/:id - Soft-delete one of the caller's prompts
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PROMPT_TAG,
    params(
        ("id" = i32, Path, description = "Prompt ID")
    ),
    responses(
        (status = 204, description = "Prompt deleted"),
        (status = 404, description = "Prompt not found")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn delete_prompt(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.prompts.delete(id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
