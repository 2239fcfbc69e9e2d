//! Persistent key/value store for cached rate tables.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::RatesError;

/// Prefix of every rate-table key.
pub const CACHE_KEY_PREFIX: &str = "rates_";

/// Store key for the table of `base`.
pub fn cache_key(base: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, base)
}

/// Key/value persistence decoupled from any storage technology.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Values for `keys`, or every entry when `keys` is `None`.
    /// Missing keys are simply absent from the result.
    async fn get(&self, keys: Option<&[String]>) -> Result<HashMap<String, Value>, RatesError>;

    /// Insert or replace entries.
    async fn set(&self, entries: HashMap<String, Value>) -> Result<(), RatesError>;

    /// Remove every entry.
    async fn clear(&self) -> Result<(), RatesError>;
}

/// Process-local store.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, keys: Option<&[String]>) -> Result<HashMap<String, Value>, RatesError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| RatesError::Store(e.to_string()))?;

        Ok(match keys {
            None => entries.clone(),
            Some(keys) => keys
                .iter()
                .filter_map(|k| entries.get(k).map(|v| (k.clone(), v.clone())))
                .collect(),
        })
    }

    async fn set(&self, new_entries: HashMap<String, Value>) -> Result<(), RatesError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| RatesError::Store(e.to_string()))?;
        entries.extend(new_entries);
        Ok(())
    }

    async fn clear(&self) -> Result<(), RatesError> {
        self.entries
            .write()
            .map_err(|e| RatesError::Store(e.to_string()))?
            .clear();
        Ok(())
    }
}
