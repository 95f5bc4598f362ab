//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

pub mod delivery;
mod log_service;
mod prompt_service;
pub mod usage;
mod user_service;

pub use log_service::ExecutionLogService;
pub use prompt_service::PromptService;
pub use usage::TokenUsageService;
pub use user_service::UserService;

use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since underlying pools use `Arc` internally.
#[derive(Clone)]
pub struct Services {
    pub prompts: PromptService,
    pub usage: TokenUsageService,
    pub execution_logs: ExecutionLogService,
    pub users: UserService,
}

impl Services {
    /// Creates a new Services instance from Repositories.
    pub fn new(repos: Repositories) -> Self {
        Self {
            prompts: PromptService::new(repos.prompts),
            usage: TokenUsageService::new(repos.token_usage),
            execution_logs: ExecutionLogService::new(repos.execution_logs),
            users: UserService::new(repos.users),
        }
    }
}
