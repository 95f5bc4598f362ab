//! Database connection management.

mod pool;

pub use pool::{establish_async_connection_pool, AsyncDbPool};
