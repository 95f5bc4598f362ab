//! Outbound HTTP infrastructure shared by providers and delivery channels.

pub mod client;
