use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::model::RateCacheEntryDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::rate_cache::dsl::*;
use fxlens_rates::{CacheStore, RatesError};

/// [`CacheStore`] backed by the `rate_cache` table.
pub struct SqliteCacheStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteCacheStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SqliteCacheStore { pool, writer }
    }

    fn load(&self, keys: Option<&[String]>) -> Result<HashMap<String, Value>, StorageError> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<RateCacheEntryDB> = match keys {
            None => rate_cache.select(RateCacheEntryDB::as_select()).load(&mut conn)?,
            Some(keys) => rate_cache
                .filter(cache_key.eq_any(keys))
                .select(RateCacheEntryDB::as_select())
                .load(&mut conn)?,
        };

        rows.into_iter()
            .map(|row| -> Result<(String, Value), StorageError> {
                Ok((row.cache_key, serde_json::from_str(&row.cache_value)?))
            })
            .collect()
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get(&self, keys: Option<&[String]>) -> Result<HashMap<String, Value>, RatesError> {
        Ok(self.load(keys)?)
    }

    async fn set(&self, entries: HashMap<String, Value>) -> Result<(), RatesError> {
        let now = Utc::now().to_rfc3339();
        let rows = entries
            .into_iter()
            .map(|(key, value)| -> Result<RateCacheEntryDB, serde_json::Error> {
                Ok(RateCacheEntryDB {
                    cache_key: key,
                    cache_value: serde_json::to_string(&value)?,
                    updated_at: now.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.writer
            .exec(move |conn| {
                for row in &rows {
                    diesel::replace_into(rate_cache).values(row).execute(conn)?;
                }
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), RatesError> {
        self.writer
            .exec(|conn| {
                diesel::delete(rate_cache).execute(conn)?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use fxlens_rates::{cache_key as key_for, InMemoryCacheStore, RateTable};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> SqliteCacheStore {
        let path = dir.path().join("cache.db");
        let (pool, writer) = db::open(path.to_str().unwrap()).unwrap();
        SqliteCacheStore::new(pool, writer)
    }

    #[tokio::test]
    async fn test_set_get_replace_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let mut entries = HashMap::new();
        entries.insert(key_for("USD"), json!({ "v": 1 }));
        entries.insert(key_for("EUR"), json!({ "v": 2 }));
        store.set(entries).await.unwrap();

        let mut replacement = HashMap::new();
        replacement.insert(key_for("USD"), json!({ "v": 3 }));
        store.set(replacement).await.unwrap();

        let usd = store
            .get(Some(&[key_for("USD"), key_for("GBP")]))
            .await
            .unwrap();
        assert_eq!(usd.len(), 1);
        assert_eq!(usd[&key_for("USD")], json!({ "v": 3 }));
        assert_eq!(store.get(None).await.unwrap().len(), 2);

        store.clear().await.unwrap();
        assert!(store.get(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_table_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let table = RateTable::new(
            "USD",
            [("EUR".to_string(), dec!(0.92))].into_iter().collect(),
            Utc::now(),
        );
        {
            let store = store(&dir);
            let mut entries = HashMap::new();
            entries.insert(key_for("USD"), serde_json::to_value(&table).unwrap());
            store.set(entries).await.unwrap();
        }

        let reopened = store(&dir);
        let stored = reopened.get(Some(&[key_for("USD")])).await.unwrap();
        let decoded: RateTable = serde_json::from_value(stored[&key_for("USD")].clone()).unwrap();
        assert_eq!(decoded.rate("EUR"), Some(dec!(0.92)));
        assert_eq!(decoded.fetched_at, table.fetched_at);

        // Same contract as the in-memory store.
        let memory = InMemoryCacheStore::new();
        memory.set(stored).await.unwrap();
        assert_eq!(memory.len(), 1);
    }
}
