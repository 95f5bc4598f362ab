use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Token type enumeration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token for API authentication (short-lived)
    Access,
    /// Refresh token for obtaining new access tokens (long-lived)
    Refresh,
}

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Username
    pub username: String,
    /// Token type (access or refresh)
    pub token_type: TokenType,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user
    pub fn new(
        user_id: i32,
        email: String,
        username: String,
        token_type: TokenType,
        expiration_hours: i64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: user_id.to_string(),
            email,
            username,
            token_type,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// Generates a signed JWT for a user
pub fn generate_token(
    user_id: i32,
    email: String,
    username: String,
    token_type: TokenType,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let claims = Claims::new(user_id, email, username, token_type, expiration_hours);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

/// Generates an access token (short-lived)
pub fn generate_access_token(
    user_id: i32,
    email: String,
    username: String,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    generate_token(
        user_id,
        email,
        username,
        TokenType::Access,
        secret,
        expiration_hours,
    )
}

/// Validates an access token and returns its claims
///
/// # Errors
/// Returns `AppError::Unauthorized` for expired, malformed or
/// wrong-type tokens.
pub fn validate_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized {
        message: format!("Invalid token: {}", e),
    })?;

    if data.claims.token_type != TokenType::Access {
        return Err(AppError::Unauthorized {
            message: "Expected an access token".to_string(),
        });
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_at_least_32_characters_long";

    #[test]
    fn access_token_roundtrip() {
        let token = generate_access_token(
            7,
            "ops@example.com".to_string(),
            "ops".to_string(),
            SECRET,
            1,
        )
        .unwrap();

        let claims = validate_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "ops");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn refresh_token_is_rejected_as_access() {
        let token = generate_token(
            7,
            "ops@example.com".to_string(),
            "ops".to_string(),
            TokenType::Refresh,
            SECRET,
            1,
        )
        .unwrap();

        assert!(validate_access_token(&token, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(
            7,
            "ops@example.com".to_string(),
            "ops".to_string(),
            SECRET,
            1,
        )
        .unwrap();

        assert!(validate_access_token(&token, "another_secret_of_sufficient_len").is_err());
    }
}
