//! Core proxy pool implementation.

use crate::config::ProxyPoolConfig;
use crate::error::{NoProxyAvailable, SourceError};
use crate::proxy::Proxy;
use crate::utils;

use futures::future;
use log::{debug, info, warn};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;

/// Minimum selection weight of any candidate once scores differ.
const WEIGHT_FLOOR: f64 = 5.0;
/// Weight units shared among candidates in proportion to their score lead.
const WEIGHT_SCALE: f64 = 1000.0;

/// A pool of proxies ranked by score.
///
/// All operations take one internal lock, so concurrent selections, score
/// updates and evictions never interleave.
pub struct ProxyPool {
    /// All live proxies, ranked by score on every selection.
    proxies: Mutex<Vec<Proxy>>,
}

impl ProxyPool {
    /// Create a pool from a list of addresses.
    ///
    /// Addresses are trimmed, blanks and `#` comments are skipped and
    /// duplicates are collapsed onto their first occurrence.
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_rate_limit(addresses, None)
    }

    /// Create a pool whose proxies are each limited to `max_rps` requests per second.
    pub fn with_rate_limit<I, S>(addresses: I, max_rps: Option<f64>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let proxies = utils::normalize_addresses(addresses)
            .into_iter()
            .map(|address| match max_rps {
                Some(rps) => Proxy::with_rate_limit(address, rps),
                None => Proxy::new(address),
            })
            .collect::<Vec<_>>();

        if proxies.is_empty() {
            warn!("Proxy pool seeded with no proxies");
        } else if let Some(rps) = max_rps {
            info!("Limiting each of {} proxies to {} requests per second", proxies.len(), rps);
        }

        Self {
            proxies: Mutex::new(proxies),
        }
    }

    /// Create a pool by loading every source in the configuration.
    pub async fn from_config(config: &ProxyPoolConfig) -> Result<Arc<Self>, SourceError> {
        info!("Initializing proxy pool from {} sources", config.sources.len());

        let lists = future::try_join_all(
            config
                .sources
                .iter()
                .map(|source| utils::fetch_proxies_from_source(source)),
        )
        .await?;

        for (source, list) in config.sources.iter().zip(&lists) {
            info!("Loaded {} proxies from {}", list.len(), source);
        }

        let pool = Self::with_rate_limit(lists.into_iter().flatten(), config.max_requests_per_second);
        info!("Total {} proxies have been registered", pool.len());
        Ok(Arc::new(pool))
    }

    /// Number of proxies currently in the pool.
    pub fn len(&self) -> usize {
        self.proxies.lock().len()
    }

    /// Whether every proxy has been evicted, or none was seeded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sort the pool by descending score. Ties keep their current order.
    pub fn rank(&self) {
        rank(&mut self.proxies.lock());
    }

    /// The `k` best-ranked proxies, or fewer if the pool is smaller.
    pub fn top_k(&self, k: usize) -> Vec<Proxy> {
        let mut proxies = self.proxies.lock();
        rank(&mut proxies);
        let n = k.min(proxies.len());
        proxies[..n].to_vec()
    }

    /// Pick one of the `k` best-ranked proxies at random, weighted by score.
    pub fn select_one(&self, k: usize) -> Result<Proxy, NoProxyAvailable> {
        self.select_one_with(k, &mut rand::rng())
    }

    /// Same as [`select_one`](Self::select_one) with a caller-supplied random source.
    pub fn select_one_with<R: Rng>(&self, k: usize, rng: &mut R) -> Result<Proxy, NoProxyAvailable> {
        let mut proxies = self.proxies.lock();
        rank(&mut proxies);

        let candidates = &proxies[..k.min(proxies.len())];
        if candidates.is_empty() {
            return Err(NoProxyAvailable);
        }

        let scores: Vec<i32> = candidates.iter().map(|p| p.score).collect();
        let idx = match selection_weights(&scores) {
            Some(weights) => {
                debug!("Selection weights over top {}: {:?}", candidates.len(), weights);
                let total: u64 = weights.iter().sum();
                pick_weighted(&weights, rng.random_range(0..total))
            }
            None => rng.random_range(0..candidates.len()),
        };

        Ok(candidates[idx].clone())
    }

    /// Snapshot of the proxy with the given address.
    pub fn get(&self, address: &str) -> Option<Proxy> {
        self.proxies.lock().iter().find(|p| p.address == address).cloned()
    }

    /// Ranked snapshot of every proxy in the pool.
    pub fn snapshot(&self) -> Vec<Proxy> {
        let mut proxies = self.proxies.lock();
        rank(&mut proxies);
        proxies.clone()
    }

    /// Report a successful request through a proxy.
    pub fn record_success(&self, address: &str) {
        let mut proxies = self.proxies.lock();
        if let Some(proxy) = proxies.iter_mut().find(|p| p.address == address) {
            if !proxy.is_working {
                info!("Proxy {} is working", proxy.address);
            }
            proxy.add_success();
        }
    }

    /// Report a transient failure through a proxy.
    pub fn record_failure(&self, address: &str) {
        let mut proxies = self.proxies.lock();
        if let Some(proxy) = proxies.iter_mut().find(|p| p.address == address) {
            proxy.add_failure();
        }
    }

    /// Permanently remove a proxy that has never worked.
    ///
    /// Returns `false` without touching the pool if the proxy has worked
    /// before or is not a member.
    pub fn evict(&self, address: &str) -> bool {
        let mut proxies = self.proxies.lock();
        match proxies.iter().position(|p| p.address == address) {
            Some(idx) if !proxies[idx].is_working => {
                proxies.remove(idx);
                true
            }
            _ => false,
        }
    }

    /// Get statistics about the proxy pool as `(total, working)`.
    pub fn get_stats(&self) -> (usize, usize) {
        let proxies = self.proxies.lock();
        let total = proxies.len();
        let working = proxies.iter().filter(|p| p.is_working).count();
        (total, working)
    }
}

fn rank(proxies: &mut [Proxy]) {
    proxies.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Integer weights for weighted selection, or `None` when every score is equal.
fn selection_weights(scores: &[i32]) -> Option<Vec<u64>> {
    let min_score = *scores.iter().min()?;
    let total_shift: i64 = scores.iter().map(|&s| i64::from(s - min_score)).sum();
    if total_shift == 0 {
        return None;
    }

    let weights = scores
        .iter()
        .map(|&s| {
            let share = f64::from(s - min_score) / total_shift as f64 * WEIGHT_SCALE;
            share.max(WEIGHT_FLOOR).ceil() as u64
        })
        .collect();
    Some(weights)
}

/// Index of the weight bucket containing `roll`, where `roll < weights.sum()`.
fn pick_weighted(weights: &[u64], mut roll: u64) -> usize {
    for (idx, &weight) in weights.iter().enumerate() {
        if roll < weight {
            return idx;
        }
        roll -= weight;
    }
    weights.len() - 1
}
