//! # deeplx-proxy-pool
//!
//! Relay translation requests through a self-ranking pool of proxies.
//!
//! Every proxy carries a bounded score. Each attempt picks one of the best
//! ranked proxies at random, weighted by score, and reports the outcome back
//! to the pool. Proxies that never worked and turn out unreachable are evicted
//! for good. The retry loop keeps going until an attempt succeeds, the
//! request's budget runs out or the pool is empty.

pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pool;
pub mod proxy;
pub mod request;
mod utils;

pub use client::{DeepLxClient, Translation, TranslationClient};
pub use config::{ProxyPoolConfig, ProxyPoolConfigBuilder};
pub use error::{AttemptFailure, NoProxyAvailable, RelayError};
pub use orchestrator::RetryOrchestrator;
pub use pool::ProxyPool;
pub use proxy::Proxy;
pub use request::{RetryBudget, TranslateRequest};
