use std::sync::Arc;

use chrono::{DateTime, Utc};
use fxlens_core::conversion::ConversionResolver;
use fxlens_core::settings::{SettingsService, SettingsStore};
use fxlens_rates::{
    default_providers, FreshnessPolicy, HttpTransport, RateCache, RateCacheConfig,
    ReqwestTransport,
};
use fxlens_storage_sqlite::{db, SettingsRepository, SqliteCacheStore};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub settings_service: Arc<SettingsService>,
    pub rate_cache: Arc<RateCache>,
    pub resolver: Arc<ConversionResolver>,
    pub db_path: String,
    pub started_at: DateTime<Utc>,
}

pub fn init_tracing() {
    let log_format = std::env::var("FXLENS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    build_state_with(config, Arc::new(ReqwestTransport::new())).await
}

/// Wire the services over `transport`. Must run inside a tokio runtime.
pub async fn build_state_with(
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> anyhow::Result<Arc<AppState>> {
    let (pool, writer) = db::open(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let settings_repo = Arc::new(SettingsRepository::new(pool.clone(), writer.clone()));
    let settings_service = Arc::new(SettingsService::new(settings_repo)?);
    let settings = settings_service.get();

    let cache_store = Arc::new(SqliteCacheStore::new(pool.clone(), writer.clone()));
    let rate_cache = Arc::new(
        RateCache::new(default_providers(), transport, cache_store).with_config(
            RateCacheConfig {
                freshness: FreshnessPolicy::for_auto_update(settings.auto_update),
                provider_timeout: config.provider_timeout,
                ..RateCacheConfig::default()
            },
        ),
    );
    let resolver = Arc::new(ConversionResolver::new(rate_cache.clone()));

    Ok(Arc::new(AppState {
        settings_service,
        rate_cache,
        resolver,
        db_path: config.db_path.clone(),
        started_at: Utc::now(),
    }))
}
