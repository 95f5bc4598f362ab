//! Domain models shared across repositories and services.

mod usage;
mod user;

pub use usage::{merge_model_costs, NewTokenUsage, TokenUsage, UsageDelta, UsageMerge};
pub use user::User;
