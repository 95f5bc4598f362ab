//! Prompt management service.

use crate::error::AppResult;
use crate::repositories::PromptRepository;
use crate::scheduling::models::{NewScheduledPrompt, ScheduledPrompt, UpdateScheduledPrompt};

/// Business logic around scheduled prompt CRUD. Execution state fields
/// (`last_executed`, `next_execution`, `execution_status`) are owned by
/// the executor and never touched here.
#[derive(Clone)]
pub struct PromptService {
    repo: PromptRepository,
}

impl PromptService {
    pub fn new(repo: PromptRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, prompt: NewScheduledPrompt) -> AppResult<ScheduledPrompt> {
        self.repo.create(prompt).await
    }

    pub async fn get_owned(&self, id: i32, user_id: i32) -> AppResult<ScheduledPrompt> {
        self.repo.get_owned(id, user_id).await
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<ScheduledPrompt>> {
        self.repo.list_by_user(user_id).await
    }

    pub async fn update(
        &self,
        id: i32,
        user_id: i32,
        update: UpdateScheduledPrompt,
    ) -> AppResult<ScheduledPrompt> {
        self.repo.update(id, user_id, update).await
    }

    /// Soft delete; the row and its execution logs survive.
    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<()> {
        self.repo.soft_delete(id, user_id).await
    }
}
