//! Retry loop relaying one request over the proxy pool.

use crate::client::{Translation, TranslationClient};
use crate::error::{AttemptFailure, NoProxyAvailable, RelayError};
use crate::pool::ProxyPool;
use crate::proxy::Proxy;
use crate::request::TranslateRequest;

use log::{info, warn};
use std::sync::Arc;

/// Drives attempts for a request until one succeeds or its budget is spent.
///
/// Every attempt feeds its outcome back into the shared pool: success raises
/// the proxy's score, a soft failure lowers it and a hard failure evicts it.
/// Dropping the future returned by [`run`](Self::run) stops further attempts.
#[derive(Clone)]
pub struct RetryOrchestrator<C> {
    /// The proxy pool.
    pool: Arc<ProxyPool>,
    /// Performs the actual network calls.
    client: C,
}

impl<C: TranslationClient> RetryOrchestrator<C> {
    /// Create an orchestrator relaying through `pool` with `client`.
    pub fn new(pool: Arc<ProxyPool>, client: C) -> Self {
        Self { pool, client }
    }

    /// The shared proxy pool.
    pub fn pool(&self) -> &Arc<ProxyPool> {
        &self.pool
    }

    /// Relay one request.
    ///
    /// Only `NoProxyAvailable` and `RetriesExhausted` reach the caller.
    pub async fn run(&self, request: &TranslateRequest) -> Result<Translation, RelayError> {
        let mut budget = request.retry_budget;
        let mut pinned: Option<Proxy> = None;
        let mut attempts: u64 = 0;

        while budget.consume() {
            let proxy = match &request.pinned_proxy {
                Some(address) => match pinned.clone() {
                    Some(proxy) => proxy,
                    None => {
                        let proxy = self.pool.get(address).ok_or_else(|| {
                            warn!("Pinned proxy {} is not in the pool", address);
                            NoProxyAvailable
                        })?;
                        pinned = Some(proxy.clone());
                        proxy
                    }
                },
                None => self.select(request.candidate_set_size)?,
            };

            attempts += 1;
            proxy.until_ready().await;
            info!("Using proxy: {} (attempt {})", proxy.address, attempts);

            let outcome = self
                .client
                .attempt(
                    &request.text,
                    &request.source_lang,
                    &request.target_lang,
                    &proxy.address,
                )
                .await;

            match outcome {
                Ok(translation) => {
                    self.pool.record_success(&proxy.address);
                    return Ok(translation);
                }
                Err(AttemptFailure::HardProxyFailure { cause }) => {
                    warn!("Proxy {} is not accessible: {:#}", proxy.address, cause);
                    if self.pool.evict(&proxy.address) {
                        info!("Proxy {} evicted, {} left in pool", proxy.address, self.pool.len());
                    }
                }
                Err(AttemptFailure::SoftFailure { cause }) => {
                    warn!("Proxy {} failed temporarily: {:#}", proxy.address, cause);
                    self.pool.record_failure(&proxy.address);
                }
            }
        }

        warn!("Retries exhausted after {} attempts", attempts);
        Err(RelayError::RetriesExhausted { attempts })
    }

    fn select(&self, k: usize) -> Result<Proxy, NoProxyAvailable> {
        self.pool.select_one(k).inspect_err(|_| {
            let (total, working) = self.pool.get_stats();
            warn!("No proxy available. Total: {}, Working: {}", total, working);
        })
    }
}
