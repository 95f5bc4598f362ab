//! HTTP API: routing, handlers, middleware, DTOs and OpenAPI docs.

pub mod doc;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
