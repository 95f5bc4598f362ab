//! Shared utilities: JWT handling, password hashing, request validation,
//! and calendar-window resolution for log queries.

pub mod jwt;
pub mod password;
pub mod validate;
pub mod window;
