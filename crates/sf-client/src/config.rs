//! Client configuration.

use crate::retry::RetryConfig;
use std::time::Duration;

/// Configuration for the HTTP client.
///
/// The defaults suit bulk workloads: generous pooling for paged result
/// downloads, compressed responses accepted, and no automatic retries.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Retry configuration. `None` by default: job creation and batch
    /// submission are not idempotent, so automatic retries are opt-in.
    pub retry: Option<RetryConfig>,
    /// Compression configuration.
    pub compression: CompressionConfig,
    /// Request timeout, covering the full body download.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Pool idle timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether to enable request/response tracing.
    pub enable_tracing: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry: None,
            compression: CompressionConfig::default(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: crate::USER_AGENT.to_string(),
            enable_tracing: true,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Install a retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = Some(retry);
        self
    }

    /// Remove any retry configuration.
    pub fn without_retry(mut self) -> Self {
        self.config.retry = None;
        self
    }

    /// Accept or refuse compressed response bodies.
    pub fn with_compression(mut self, accept: bool) -> Self {
        self.config.compression.accept_compressed = accept;
        self
    }

    /// Set compression configuration.
    pub fn with_compression_config(mut self, config: CompressionConfig) -> Self {
        self.config.compression = config;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set pool idle timeout.
    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    pub fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Configuration for response compression.
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// Accept gzip/deflate encoded response bodies. Result files are highly
    /// repetitive text and compress well, so this is on by default.
    pub accept_compressed: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            accept_compressed: true,
        }
    }
}

impl CompressionConfig {
    /// Refuse compressed responses. Useful when a proxy in the path
    /// mangles encoded bodies.
    pub fn disabled() -> Self {
        Self {
            accept_compressed: false,
        }
    }
}
