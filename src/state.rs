//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use crate::config::{JwtConfig, Settings, TriggerConfig};
use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::scheduling::executor::PromptExecutor;
use crate::services::delivery::ChannelRegistry;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Designed for Axum's State extractor. Cloning is cheap since services,
/// the executor and the pool all use Arc internally.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Prompt execution orchestrator
    pub executor: PromptExecutor,
    /// Direct access to the database connection pool
    pub db_pool: AsyncDbPool,
    /// JWT configuration for token generation and validation
    pub jwt: JwtConfig,
    /// Shared-secret configuration for the execution trigger
    pub trigger: TriggerConfig,
    /// Application name reported by the health endpoint
    pub app_name: String,
    /// Request timeout in seconds applied at the router
    pub request_timeout: u64,
}

impl AppState {
    /// Creates the application state from a connection pool and settings,
    /// wiring repositories, services, delivery channels and the executor.
    pub fn new(pool: AsyncDbPool, settings: &Settings) -> Self {
        let repos = Repositories::new(pool.clone());
        let services = Services::new(repos.clone());
        let channels = ChannelRegistry::from_config(&settings.delivery);

        let executor = PromptExecutor::new(
            repos.prompts,
            repos.users,
            repos.execution_logs,
            services.usage.clone(),
            channels,
            settings.llm.clone(),
            settings.executor.clone(),
        );

        Self {
            services,
            executor,
            db_pool: pool,
            jwt: settings.jwt.clone(),
            trigger: settings.trigger.clone(),
            app_name: settings.application.name.clone(),
            request_timeout: settings.server.request_timeout,
        }
    }
}
