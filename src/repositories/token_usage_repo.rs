use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewTokenUsage, TokenUsage, UsageMerge};
use crate::schema::token_usage;

#[derive(Clone)]
pub struct TokenUsageRepository {
    pool: AsyncDbPool,
}

impl TokenUsageRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_scope(&self, scope: &str) -> AppResult<Option<TokenUsage>> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        token_usage::table
            .filter(token_usage::scope.eq(scope))
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn list_all(&self) -> AppResult<Vec<TokenUsage>> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        token_usage::table
            .order(token_usage::scope.asc())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// First-write path. Returns `None` when another writer created the
    /// scope concurrently; the caller then retries on the merge path.
    pub async fn insert_new(&self, row: NewTokenUsage) -> AppResult<Option<TokenUsage>> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        diesel::insert_into(token_usage::table)
            .values(&row)
            .on_conflict(token_usage::scope)
            .do_nothing()
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Optimistic merge: applies the changeset only when the row still
    /// carries the `updated_at` the caller observed. Returns `None` on a
    /// lost race so the caller can re-read and retry, never losing a delta.
    pub async fn update_if_unchanged(
        &self,
        id: i32,
        seen_updated_at: DateTime<Utc>,
        merge: UsageMerge,
    ) -> AppResult<Option<TokenUsage>> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        diesel::update(
            token_usage::table
                .find(id)
                .filter(token_usage::updated_at.eq(seen_updated_at)),
        )
        .set(&merge)
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(AppError::from)
    }
}
