//! User authentication service.

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::repositories::UserRepository;
use crate::utils::password::verify_password;

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Verify credentials against the directory. Inactive accounts fail
    /// with the same message as bad credentials.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let unauthorized = || AppError::Unauthorized {
            message: "Invalid username or password".to_string(),
        };

        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or_else(unauthorized)?;

        if !user.active || !verify_password(password, &user.password)? {
            return Err(unauthorized());
        }

        Ok(user)
    }
}
