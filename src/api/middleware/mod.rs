//! HTTP middleware: request IDs, request logging, JWT auth for user
//! endpoints, and shared-secret auth for the execution trigger.

mod api_key;
mod auth;
mod error_handler;
mod logging;
mod request_id;

pub use api_key::api_key_middleware;
pub use auth::{auth_middleware, AuthUser};
pub use logging::logging_middleware;
pub use request_id::{request_id_middleware, RequestId};
