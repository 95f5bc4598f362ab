//! Application error types and conversions.

mod app_error;

pub use app_error::{AppError, AppResult};
