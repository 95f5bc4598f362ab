use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::schema::{execution_logs, scheduled_prompts};
use crate::scheduling::models::{ExecutionLog, NewExecutionLog};
use crate::scheduling::types::ExecutionStatus;

/// Query filter for the execution log listing.
///
/// `since` is the lower window boundary already resolved to an instant by
/// the caller (today/week/month/year in the caller's calendar).
#[derive(Debug, Clone, Default)]
pub struct ExecutionLogFilter {
    pub prompt_id: Option<i32>,
    pub status: Option<ExecutionStatus>,
    pub since: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct ExecutionLogRepository {
    pool: AsyncDbPool,
}

impl ExecutionLogRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Append one immutable record for an execution attempt. There is no
    /// update path by design of the audit trail.
    pub async fn create(&self, entry: NewExecutionLog) -> AppResult<ExecutionLog> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        diesel::insert_into(execution_logs::table)
            .values(&entry)
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Newest-first log rows for prompts owned by `user_id`.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        filter: ExecutionLogFilter,
    ) -> AppResult<Vec<ExecutionLog>> {
        let mut conn = self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

        let mut query = execution_logs::table
            .inner_join(scheduled_prompts::table)
            .filter(scheduled_prompts::user_id.eq(user_id))
            .select(ExecutionLog::as_select())
            .into_boxed();

        if let Some(prompt_id) = filter.prompt_id {
            query = query.filter(execution_logs::prompt_id.eq(prompt_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(execution_logs::status.eq(status));
        }
        if let Some(since) = filter.since {
            query = query.filter(execution_logs::executed_at.ge(since));
        }

        query
            .order(execution_logs::executed_at.desc())
            .limit(filter.limit)
            .offset(filter.offset)
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
