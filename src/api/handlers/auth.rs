//! Authentication handlers.

use axum::{extract::State, Json};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{LoginRequest, LoginResponse};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::jwt::generate_access_token;
use crate::utils::validate::ValidatedJson;

/// Creates authentication routes.
pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(login))
}

/// POST /api/auth/login - Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;

    let access_token = generate_access_token(
        user.id,
        user.email,
        user.username,
        &state.jwt.secret,
        state.jwt.access_token_expiration,
    )?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.access_token_expiration * 3600,
    }))
}
