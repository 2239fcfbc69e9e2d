//! Database model for cached rate tables.

use diesel::prelude::*;

/// One cached value, stored as JSON text.
#[derive(Queryable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::rate_cache)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RateCacheEntryDB {
    pub cache_key: String,
    pub cache_value: String,
    pub updated_at: String,
}
