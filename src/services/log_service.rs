//! Execution log query service.

use crate::error::AppResult;
use crate::repositories::{ExecutionLogFilter, ExecutionLogRepository};
use crate::scheduling::models::ExecutionLog;

#[derive(Clone)]
pub struct ExecutionLogService {
    repo: ExecutionLogRepository,
}

impl ExecutionLogService {
    pub fn new(repo: ExecutionLogRepository) -> Self {
        Self { repo }
    }

    /// Newest-first execution log rows, scoped to prompts the requesting
    /// user owns.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        filter: ExecutionLogFilter,
    ) -> AppResult<Vec<ExecutionLog>> {
        self.repo.list_for_user(user_id, filter).await
    }
}
