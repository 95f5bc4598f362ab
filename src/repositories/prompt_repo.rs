use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::schema::{scheduled_prompts, users};
use crate::scheduling::models::{NewScheduledPrompt, ScheduledPrompt, UpdateScheduledPrompt};
use crate::scheduling::types::{ExecutionStatus, PromptState};

#[derive(Clone)]
pub struct PromptRepository {
    pool: AsyncDbPool,
}

impl PromptRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, prompt: NewScheduledPrompt) -> AppResult<ScheduledPrompt> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        diesel::insert_into(scheduled_prompts::table)
            .values(&prompt)
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Non-deleted prompt by id, regardless of owner. Used by the
    /// trigger path where authorization is the shared secret.
    pub async fn find_active(&self, id: i32) -> AppResult<Option<ScheduledPrompt>> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        scheduled_prompts::table
            .find(id)
            .filter(scheduled_prompts::state.eq(PromptState::Active))
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Non-deleted prompt owned by `user_id`.
    pub async fn get_owned(&self, id: i32, user_id: i32) -> AppResult<ScheduledPrompt> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        scheduled_prompts::table
            .find(id)
            .filter(scheduled_prompts::user_id.eq(user_id))
            .filter(scheduled_prompts::state.eq(PromptState::Active))
            .first(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => AppError::NotFound {
                    entity: "ScheduledPrompt".to_string(),
                    field: "id".to_string(),
                    value: id.to_string(),
                },
                _ => AppError::from(e),
            })
    }

    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<ScheduledPrompt>> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        scheduled_prompts::table
            .filter(scheduled_prompts::user_id.eq(user_id))
            .filter(scheduled_prompts::state.eq(PromptState::Active))
            .order(scheduled_prompts::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// All scheduled, non-deleted prompts whose owners are active users.
    /// The evaluator filters this candidate set down to the due ones.
    pub async fn list_due_candidates(&self) -> AppResult<Vec<ScheduledPrompt>> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        scheduled_prompts::table
            .inner_join(users::table)
            .filter(users::active.eq(true))
            .filter(scheduled_prompts::is_scheduled.eq(true))
            .filter(scheduled_prompts::state.eq(PromptState::Active))
            .select(ScheduledPrompt::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn update(
        &self,
        id: i32,
        user_id: i32,
        update: UpdateScheduledPrompt,
    ) -> AppResult<ScheduledPrompt> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        diesel::update(
            scheduled_prompts::table
                .find(id)
                .filter(scheduled_prompts::user_id.eq(user_id))
                .filter(scheduled_prompts::state.eq(PromptState::Active)),
        )
        .set((&update, scheduled_prompts::updated_at.eq(Utc::now())))
        .get_result(&mut conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::NotFound => AppError::NotFound {
                entity: "ScheduledPrompt".to_string(),
                field: "id".to_string(),
                value: id.to_string(),
            },
            _ => AppError::from(e),
        })
    }

    /// Soft delete: flips the lifecycle state, never removes the row, so
    /// execution logs keep a valid prompt reference.
    pub async fn soft_delete(&self, id: i32, user_id: i32) -> AppResult<()> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        let updated = diesel::update(
            scheduled_prompts::table
                .find(id)
                .filter(scheduled_prompts::user_id.eq(user_id))
                .filter(scheduled_prompts::state.eq(PromptState::Active)),
        )
        .set((
            scheduled_prompts::state.eq(PromptState::Deleted),
            scheduled_prompts::is_scheduled.eq(false),
            scheduled_prompts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await
        .map_err(AppError::from)?;

        if updated == 0 {
            Err(AppError::NotFound {
                entity: "ScheduledPrompt".to_string(),
                field: "id".to_string(),
                value: id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Claim-before-execute: atomically move idle -> running.
    ///
    /// Returns false when another trigger already holds the claim; the
    /// conditional update is the guard against double-running.
    pub async fn claim(&self, id: i32) -> AppResult<bool> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        let claimed = diesel::update(
            scheduled_prompts::table
                .find(id)
                .filter(scheduled_prompts::execution_status.ne(ExecutionStatus::Running)),
        )
        .set((
            scheduled_prompts::execution_status.eq(ExecutionStatus::Running),
            scheduled_prompts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await
        .map_err(AppError::from)?;

        Ok(claimed == 1)
    }

    /// Release a claim after a run attempt, recording the outcome and the
    /// recomputed advisory next execution.
    pub async fn finish(
        &self,
        id: i32,
        status: ExecutionStatus,
        executed_at: DateTime<Utc>,
        next_execution: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        diesel::update(scheduled_prompts::table.find(id))
            .set((
                scheduled_prompts::execution_status.eq(status),
                scheduled_prompts::last_executed.eq(Some(executed_at)),
                scheduled_prompts::next_execution.eq(next_execution),
                scheduled_prompts::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    /// Release a claim without recording an execution, used when the
    /// claimed run turns out to be a no-op (e.g. claim raced a delete).
    pub async fn release(&self, id: i32, status: ExecutionStatus) -> AppResult<()> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        diesel::update(scheduled_prompts::table.find(id))
            .set((
                scheduled_prompts::execution_status.eq(status),
                scheduled_prompts::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }
}
