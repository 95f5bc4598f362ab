//! Herald
//!
//! Scheduled prompt execution and token accounting service: timezone-aware
//! recurrence evaluation, bounded-concurrency prompt execution with
//! multi-channel delivery fan-out, per-scope token usage totals, and an
//! append-only execution log, behind an HTTP trigger boundary.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod external;
pub mod llm;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod scheduling;
pub mod server;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
