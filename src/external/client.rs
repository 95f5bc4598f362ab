use std::sync::LazyLock;
use std::time::Duration;

/// Global HTTP client instance shared by LLM providers and delivery channels.
///
/// This client is initialized lazily on first access and reused across the
/// application for connection pooling and DNS caching. Per-request timeouts
/// are applied at call sites from the relevant configuration section; the
/// client-level timeout is a backstop.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(10))
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        // Security
        .use_rustls_tls()
        .user_agent(concat!("herald-rs/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to build HTTP client")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_initialization() {
        // Access the client to ensure it initializes without panicking
        let _ = &*HTTP_CLIENT;
    }
}
