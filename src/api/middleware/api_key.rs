//! Shared-secret authentication for the execution trigger.
//!
//! The external cron-like service that drives execution authenticates
//! with a static `x-api-key` header rather than a user token.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the trigger shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Validates `x-api-key` against the configured trigger secret.
///
/// # Errors
/// Returns 401 Unauthorized when the header is missing or wrong, or when
/// no secret is configured (a misconfigured deployment must not accept
/// unauthenticated triggers).
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !api_key_matches(&state.trigger.api_key, provided) {
        return Err(AppError::Unauthorized {
            message: "Invalid or missing API key".to_string(),
        });
    }

    Ok(next.run(request).await)
}

fn api_key_matches(expected: &str, provided: Option<&str>) -> bool {
    if expected.is_empty() {
        return false;
    }
    provided == Some(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_key_is_accepted() {
        assert!(api_key_matches("secret", Some("secret")));
    }

    #[test]
    fn wrong_or_missing_key_is_rejected() {
        assert!(!api_key_matches("secret", Some("other")));
        assert!(!api_key_matches("secret", None));
    }

    #[test]
    fn empty_configured_key_rejects_everything() {
        assert!(!api_key_matches("", Some("")));
        assert!(!api_key_matches("", None));
    }
}
