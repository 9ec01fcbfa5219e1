//! Error types for the deeplx-proxy-pool crate.

use thiserror::Error;

/// Error returned when the pool has no candidate to hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No proxy available in pool")]
pub struct NoProxyAvailable;

/// Terminal outcome of a relay run. Per-attempt failures never surface here.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    NoProxyAvailable(#[from] NoProxyAvailable),

    #[error("Retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u64 },
}

/// Classified failure of a single attempt, produced by a `TranslationClient`.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    /// The proxy itself is unreachable or broken. The proxy gets evicted.
    #[error("proxy failure: {cause}")]
    HardProxyFailure { cause: anyhow::Error },

    /// Transient failure. The proxy loses one point of score.
    #[error("transient failure: {cause}")]
    SoftFailure { cause: anyhow::Error },
}

impl AttemptFailure {
    /// Failure blamed on the proxy itself.
    pub fn hard(cause: impl Into<anyhow::Error>) -> Self {
        Self::HardProxyFailure { cause: cause.into() }
    }

    /// Transient failure not blamed on the proxy.
    pub fn soft(cause: impl Into<anyhow::Error>) -> Self {
        Self::SoftFailure { cause: cause.into() }
    }

    /// Whether this failure evicts the proxy.
    pub fn is_hard(&self) -> bool {
        matches!(self, Self::HardProxyFailure { .. })
    }
}

/// A retry count that is neither `-1` nor non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid retry budget {0}, expected -1 (unlimited) or a non-negative count")]
pub struct InvalidRetryBudget(pub i64);

/// Failure while loading a proxy list source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to fetch proxy list: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read proxy list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Failure while constructing a translation client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}
