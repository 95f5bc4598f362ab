//! Configuration settings structures for herald-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::LoggerConfig;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "herald-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_keep_alive_timeout() -> u64 {
    75
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_access_token_expiration() -> i64 {
    1 // 1 hour
}

fn default_refresh_token_expiration() -> i64 {
    168 // 7 days (168 hours)
}

fn default_max_parallel() -> usize {
    4
}

fn default_dispatch_timeout() -> u64 {
    30
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keep_alive_timeout")]
    pub keep_alive_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            keep_alive_timeout: default_keep_alive_timeout(),
        }
    }
}

// ============================================================================
// Database Configuration
// ============================================================================

/// Diesel database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Whether to automatically run pending migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout: default_connection_timeout(),
            auto_migrate: false,
        }
    }
}

// ============================================================================
// JWT Configuration
// ============================================================================

/// JWT token configuration for the user-facing query endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret used to sign tokens; must be at least 32 characters
    #[serde(default)]
    pub secret: String,

    /// Access token validity in hours
    #[serde(default = "default_access_token_expiration")]
    pub access_token_expiration: i64,

    /// Refresh token validity in hours
    #[serde(default = "default_refresh_token_expiration")]
    pub refresh_token_expiration: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_expiration: default_access_token_expiration(),
            refresh_token_expiration: default_refresh_token_expiration(),
        }
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < 32 {
            return Err(ConfigError::invalid(
                "jwt.secret",
                "must be at least 32 characters",
            ));
        }
        if self.access_token_expiration <= 0 || self.refresh_token_expiration <= 0 {
            return Err(ConfigError::invalid(
                "jwt.access_token_expiration",
                "token expirations must be positive",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Trigger Configuration
// ============================================================================

/// Shared-secret configuration for the external execution trigger.
///
/// The `/api/prompts/execute` endpoints authenticate with a static
/// `x-api-key` header instead of a user token; an external cron-like
/// service holds this secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Shared secret expected in the `x-api-key` header
    #[serde(default)]
    pub api_key: String,
}

impl TriggerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::invalid(
                "trigger.api_key",
                "must be configured for the execution trigger",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Executor Configuration
// ============================================================================

/// Prompt executor tuning knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum number of prompts executed concurrently in a batch run
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Per-delivery timeout in seconds
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            dispatch_timeout: default_dispatch_timeout(),
        }
    }
}

// ============================================================================
// LLM Configuration
// ============================================================================

/// Per-provider credentials and base URL override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for the provider; empty means the provider is unavailable
    #[serde(default)]
    pub api_key: String,

    /// Base URL override, useful for OpenAI-compatible gateways
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Chat model invocation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub openai: ProviderConfig,

    #[serde(default)]
    pub anthropic: ProviderConfig,

    /// Maximum tokens requested per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout for provider calls in seconds
    #[serde(default = "default_llm_timeout")]
    pub request_timeout: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai: ProviderConfig::default(),
            anthropic: ProviderConfig::default(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout: default_llm_timeout(),
        }
    }
}

// ============================================================================
// Delivery Configuration
// ============================================================================

/// Endpoints for the delivery channels.
///
/// A channel is only registered when its endpoint is configured; prompts
/// requesting an unconfigured channel get a configuration error recorded
/// in their execution result instead of a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Direct chat-message service endpoint
    #[serde(default)]
    pub chat_url: Option<String>,

    /// Assistant-thread (AI chat) service endpoint
    #[serde(default)]
    pub assistant_url: Option<String>,

    /// Notification push endpoint
    #[serde(default)]
    pub notifier_url: Option<String>,

    /// Bearer token for the notification endpoint
    #[serde(default)]
    pub notifier_token: Option<String>,

    /// HTTP mail API endpoint
    #[serde(default)]
    pub email_url: Option<String>,

    /// Bearer token for the mail API
    #[serde(default)]
    pub email_token: Option<String>,

    /// Sender address used for email deliveries
    #[serde(default)]
    pub email_from: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_dispatch_timeout")]
    pub timeout_seconds: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            chat_url: None,
            assistant_url: None,
            notifier_url: None,
            notifier_token: None,
            email_url: None,
            email_token: None,
            email_from: None,
            timeout_seconds: default_dispatch_timeout(),
        }
    }
}

// ============================================================================
// Root Settings
// ============================================================================

/// Root settings aggregating every configuration section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logger: LoggerConfig,

    #[serde(default)]
    pub jwt: JwtConfig,

    #[serde(default)]
    pub trigger: TriggerConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,
}

impl Settings {
    /// Structural validation applied at load time.
    ///
    /// Secrets (JWT, trigger key) are validated separately when the server
    /// starts so that offline commands like `migrate` don't require them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.executor.max_parallel == 0 {
            return Err(ConfigError::invalid(
                "executor.max_parallel",
                "must be at least 1",
            ));
        }
        if self.server.request_timeout == 0 {
            return Err(ConfigError::invalid(
                "server.request_timeout",
                "must be at least 1 second",
            ));
        }
        Ok(())
    }
}
