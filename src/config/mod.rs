//! Layered configuration for herald-rs.
//!
//! Configuration is loaded from `config/default.toml`, an optional
//! environment-specific file, an optional `local.toml`, and finally
//! `HERALD__*` environment variables.

mod environment;
mod error;
mod loader;
pub mod settings;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    DatabaseConfig, DeliveryConfig, ExecutorConfig, JwtConfig, LlmConfig, ProviderConfig,
    ServerConfig, Settings, TriggerConfig,
};
