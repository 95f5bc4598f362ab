//! Scheduled prompt domain: recurrence evaluation and execution.
//!
//! The evaluator decides due-ness in the prompt's own IANA timezone; the
//! executor orchestrates claim, model invocation, delivery fan-out, usage
//! accounting and execution logging for one prompt or a whole due batch.

pub mod evaluator;
pub mod executor;
pub mod models;
pub mod types;
