//! Background scheduler for periodic rate updates.
//!
//! Pre-fetches the major currencies once at startup (forced), then every hour
//! while the `auto_update` setting is on.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

use fxlens_core::settings::SettingsStore;
use fxlens_rates::{RateCache, MAJOR_CURRENCIES};

/// Update interval: 1 hour
const UPDATE_INTERVAL_SECS: u64 = 60 * 60;

/// Starts the background rate update scheduler.
pub fn start_rate_update_scheduler(
    rate_cache: Arc<RateCache>,
    settings: Arc<dyn SettingsStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Rate update scheduler started (1-hour interval)");

        run_update(&rate_cache, true).await;

        let mut update_interval = interval(Duration::from_secs(UPDATE_INTERVAL_SECS));
        // The first tick completes immediately; startup already fetched.
        update_interval.tick().await;

        loop {
            update_interval.tick().await;
            if !settings.get().auto_update {
                debug!("Scheduled rate update skipped: auto-update is off");
                continue;
            }
            run_update(&rate_cache, false).await;
        }
    })
}

/// Runs a single pre-fetch of every major currency.
async fn run_update(rate_cache: &RateCache, force: bool) {
    info!("Running rate update (force={})...", force);
    let outcomes = rate_cache.prefetch(MAJOR_CURRENCIES, force).await;
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| !o.success)
        .map(|o| o.currency.as_str())
        .collect();
    if !failed.is_empty() {
        debug!("No rates obtained for: {}", failed.join(", "));
    }
}
