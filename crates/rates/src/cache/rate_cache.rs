use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;

use super::freshness::{FreshnessPolicy, RateCacheConfig};
use crate::clock::{Clock, SystemClock};
use crate::errors::RatesError;
use crate::models::{Rates, RateTable};
use crate::provider::RateProvider;
use crate::store::{cache_key, CacheStore, CACHE_KEY_PREFIX};
use crate::transport::HttpTransport;

/// Result of pre-fetching one base currency.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrefetchOutcome {
    pub currency: String,
    pub success: bool,
}

/// What the persistent cache currently holds.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheSummary {
    pub cached_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Freshness-aware cache of [`RateTable`]s with ordered provider fallback.
///
/// Resolution for one base currency is serialized by a per-base async mutex,
/// so the check-fetch-write sequence never interleaves with another resolve
/// of the same base. Different bases proceed independently.
pub struct RateCache {
    providers: Vec<Arc<dyn RateProvider>>,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    config: RwLock<RateCacheConfig>,
    locks: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl RateCache {
    /// Create a cache over `providers`, tried in ascending priority.
    pub fn new(
        mut providers: Vec<Arc<dyn RateProvider>>,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        providers.sort_by_key(|p| p.priority());
        Self {
            providers,
            transport,
            store,
            clock: Arc::new(SystemClock),
            config: RwLock::new(RateCacheConfig::default()),
            locks: DashMap::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(self, config: RateCacheConfig) -> Self {
        if let Ok(mut current) = self.config.write() {
            *current = config;
        }
        self
    }

    fn config(&self) -> RateCacheConfig {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_else(|p| p.into_inner().clone())
    }

    /// Replace the freshness window, e.g. after the auto-update setting changed.
    pub fn set_freshness(&self, policy: FreshnessPolicy) {
        let mut config = self.config.write().unwrap_or_else(|p| p.into_inner());
        if config.freshness != policy {
            debug!("Freshness window set to {:?}", policy.window());
            config.freshness = policy;
        }
    }

    pub fn freshness(&self) -> FreshnessPolicy {
        self.config().freshness
    }

    fn lock_for(&self, base: &str) -> Arc<AsyncMutex<()>> {
        self.locks
            .entry(base.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Rates relative to `base`.
    ///
    /// Returns the cached table while it is fresh (no network access) unless
    /// `force_refresh` is set. Otherwise tries every provider in order and
    /// caches the first usable answer. `None` means no provider produced
    /// usable data; the previous entry, if any, is left as it was. Callers
    /// should treat `None` as transient.
    pub async fn resolve(&self, base: &str, force_refresh: bool) -> Option<RateTable> {
        let base = base.trim().to_ascii_uppercase();
        if base.is_empty() {
            return None;
        }

        let lock = self.lock_for(&base);
        let table = {
            let _guard = lock.lock().await;
            self.resolve_locked(&base, force_refresh).await
        };
        drop(lock);
        self.release_lock(&base);
        table
    }

    async fn resolve_locked(&self, base: &str, force_refresh: bool) -> Option<RateTable> {
        if !force_refresh {
            if let Some(table) = self.cached(base).await {
                let window = self.freshness().window();
                if table.is_fresh(self.clock.now(), window) {
                    debug!("Using cached rates for {}", base);
                    return Some(table);
                }
                debug!(
                    "Cached rates for {} are stale (fetched at {})",
                    base, table.fetched_at
                );
            }
        }

        self.fetch_from_providers(base).await
    }

    /// Forget the lock for `base` once nobody holds or awaits it, so the map
    /// only holds bases with a resolve in flight.
    fn release_lock(&self, base: &str) {
        self.locks
            .remove_if(base, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// The stored table for `base` regardless of its age.
    pub async fn cached(&self, base: &str) -> Option<RateTable> {
        let key = cache_key(base);
        let mut values = match self.store.get(Some(std::slice::from_ref(&key))).await {
            Ok(values) => values,
            Err(e) => {
                error!("Cache check failed for {}: {}", base, e);
                return None;
            }
        };

        let value = values.remove(&key)?;
        match serde_json::from_value::<RateTable>(value) {
            Ok(table) => Some(table),
            Err(e) => {
                warn!("Discarding unreadable cache entry for {}: {}", base, e);
                None
            }
        }
    }

    async fn fetch_from_providers(&self, base: &str) -> Option<RateTable> {
        for provider in &self.providers {
            info!("Fetching {} rates from {}...", base, provider.id());

            match self.attempt(provider.as_ref(), base).await {
                Ok(rates) => {
                    let table = RateTable::new(base, rates, self.clock.now());
                    if let Err(e) = self.persist(&table).await {
                        error!("Failed to cache {} rates: {}", base, e);
                    }
                    info!(
                        "Successfully fetched {} rates from {} ({} currencies)",
                        base,
                        provider.id(),
                        table.rates.len()
                    );
                    return Some(table);
                }
                Err(e) => {
                    warn!("{} failed for {}: {}", provider.id(), base, e);
                }
            }
        }

        error!("All providers failed for {}", base);
        None
    }

    async fn attempt(&self, provider: &dyn RateProvider, base: &str) -> Result<Rates, RatesError> {
        let url = provider.url(base);
        let timeout = self.config().provider_timeout;

        let body = tokio::time::timeout(timeout, self.transport.get_json(&url))
            .await
            .map_err(|_| RatesError::Timeout {
                provider: provider.id().to_string(),
            })??;

        provider.parse(base, body)
    }

    async fn persist(&self, table: &RateTable) -> Result<(), RatesError> {
        let mut entries = HashMap::new();
        entries.insert(
            cache_key(&table.base_currency),
            serde_json::to_value(table)?,
        );
        self.store.set(entries).await
    }

    /// Resolve every base in `currencies`, pausing between requests so the
    /// free upstream endpoints do not rate-limit us.
    pub async fn prefetch<S: AsRef<str>>(
        &self,
        currencies: &[S],
        force_refresh: bool,
    ) -> Vec<PrefetchOutcome> {
        info!("Updating rates for {} currencies...", currencies.len());
        let pause = self.config().prefetch_pause;
        let mut outcomes = Vec::with_capacity(currencies.len());

        for (index, currency) in currencies.iter().enumerate() {
            let currency = currency.as_ref();
            let success = self.resolve(currency, force_refresh).await.is_some();
            outcomes.push(PrefetchOutcome {
                currency: currency.to_string(),
                success,
            });

            if index + 1 < currencies.len() && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        let successful = outcomes.iter().filter(|o| o.success).count();
        info!(
            "Rate update complete: {}/{} successful",
            successful,
            outcomes.len()
        );
        outcomes
    }

    /// Count of cached bases and the most recent fetch time.
    pub async fn summary(&self) -> Result<CacheSummary, RatesError> {
        let entries = self.store.get(None).await?;
        let tables: Vec<RateTable> = entries
            .into_iter()
            .filter(|(key, _)| key.starts_with(CACHE_KEY_PREFIX))
            .filter_map(|(_, value)| serde_json::from_value(value).ok())
            .collect();

        Ok(CacheSummary {
            cached_count: tables.len(),
            last_updated: tables.iter().map(|t| t.fetched_at).max(),
        })
    }

    /// Drop every cached table.
    pub async fn clear(&self) -> Result<(), RatesError> {
        info!("Clearing rate cache");
        self.store.clear().await
    }
}
