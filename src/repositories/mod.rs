//! Repository layer for data access operations.
//!
//! Provides async CRUD operations for all domain entities.

mod execution_log_repo;
mod prompt_repo;
mod token_usage_repo;
mod user_repo;

pub use execution_log_repo::{ExecutionLogFilter, ExecutionLogRepository};
pub use prompt_repo::PromptRepository;
pub use token_usage_repo::TokenUsageRepository;
pub use user_repo::UserRepository;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Since `AsyncDbPool` uses `Arc` internally, cloning is cheap.
#[derive(Clone)]
pub struct Repositories {
    pub prompts: PromptRepository,
    pub execution_logs: ExecutionLogRepository,
    pub token_usage: TokenUsageRepository,
    pub users: UserRepository,
}

impl Repositories {
    /// Creates a new Repositories instance with all repositories initialized.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            prompts: PromptRepository::new(pool.clone()),
            execution_logs: ExecutionLogRepository::new(pool.clone()),
            token_usage: TokenUsageRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }
}
