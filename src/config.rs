//! Configuration for the proxy pool and the translation client.

use crate::error::ConfigError;

use std::time::Duration;

/// Default upstream translation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.deeplx.org/translate";

/// Configuration for the proxy pool.
#[derive(Debug, Clone)]
pub struct ProxyPoolConfig {
    /// Files or URLs to load proxy lists from, one address per line.
    pub sources: Vec<String>,
    /// Translation endpoint every attempt is sent to.
    pub endpoint: String,
    /// Timeout for a single translation attempt.
    pub attempt_timeout: Duration,
    /// Maximum requests per second per proxy, unlimited when `None`.
    pub max_requests_per_second: Option<f64>,
}

impl ProxyPoolConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProxyPoolConfigBuilder {
        ProxyPoolConfigBuilder::new()
    }

    /// Read the configuration from the process environment.
    ///
    /// `PROXY_FILE` is required. `DEEPLX_URL`, `ATTEMPT_TIMEOUT_SECS` and
    /// `MAX_REQUESTS_PER_SECOND` are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let proxy_file = lookup("PROXY_FILE").ok_or(ConfigError::MissingVar("PROXY_FILE"))?;
        let mut builder = Self::builder().sources(vec![proxy_file]);

        if let Some(endpoint) = lookup("DEEPLX_URL") {
            builder = builder.endpoint(endpoint);
        }
        if let Some(value) = lookup("ATTEMPT_TIMEOUT_SECS") {
            let secs = value.parse::<u64>().map_err(|_| ConfigError::InvalidVar {
                name: "ATTEMPT_TIMEOUT_SECS",
                value: value.clone(),
            })?;
            builder = builder.attempt_timeout(Duration::from_secs(secs));
        }
        if let Some(value) = lookup("MAX_REQUESTS_PER_SECOND") {
            let rps = value
                .parse::<f64>()
                .ok()
                .filter(|rps| *rps > 0.0)
                .ok_or_else(|| ConfigError::InvalidVar {
                    name: "MAX_REQUESTS_PER_SECOND",
                    value: value.clone(),
                })?;
            builder = builder.max_requests_per_second(rps);
        }

        Ok(builder.build())
    }
}

/// Builder for `ProxyPoolConfig`.
pub struct ProxyPoolConfigBuilder {
    sources: Vec<String>,
    endpoint: Option<String>,
    attempt_timeout: Option<Duration>,
    max_requests_per_second: Option<f64>,
}

impl ProxyPoolConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            endpoint: None,
            attempt_timeout: None,
            max_requests_per_second: None,
        }
    }

    /// Set the files or URLs to load proxy lists from.
    pub fn sources(mut self, sources: Vec<impl Into<String>>) -> Self {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Set the translation endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the timeout for a single translation attempt.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Set the maximum requests per second per proxy.
    pub fn max_requests_per_second(mut self, rps: f64) -> Self {
        self.max_requests_per_second = Some(rps);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ProxyPoolConfig {
        ProxyPoolConfig {
            sources: self.sources,
            endpoint: self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            attempt_timeout: self.attempt_timeout.unwrap_or(Duration::from_secs(30)),
            max_requests_per_second: self.max_requests_per_second,
        }
    }
}

impl Default for ProxyPoolConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
