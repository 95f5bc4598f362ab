use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::schema::users;

#[derive(Clone)]
pub struct UserRepository {
    pool: AsyncDbPool,
}

impl UserRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        users::table
            .filter(users::username.eq(username))
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Full active-user set, used to expand `target_all_users`.
    pub async fn list_active(&self) -> AppResult<Vec<User>> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        users::table
            .filter(users::active.eq(true))
            .order(users::id.asc())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Active users among an explicit id list; unknown or inactive ids
    /// are silently dropped from recipient resolution.
    pub async fn find_active_by_ids(&self, ids: &[i32]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        users::table
            .filter(users::id.eq_any(ids))
            .filter(users::active.eq(true))
            .order(users::id.asc())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
