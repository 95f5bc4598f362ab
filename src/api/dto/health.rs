//! Health check DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub name: String,
    pub version: String,
    /// Database reachability: "up" or "down"
    pub database: String,
}
