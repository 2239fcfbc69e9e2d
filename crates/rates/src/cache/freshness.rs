use chrono::Duration;
use std::time::Duration as StdDuration;

/// Freshness window with automatic updates enabled.
pub const AUTO_UPDATE_WINDOW_MINUTES: i64 = 60;

/// Freshness window with automatic updates disabled.
pub const MANUAL_UPDATE_WINDOW_MINUTES: i64 = 24 * 60;

/// Maximum age a cached table may have before a fetch is required.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreshnessPolicy {
    window: Duration,
}

impl FreshnessPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// One hour when rates are kept updated in the background, a day otherwise.
    pub fn for_auto_update(auto_update: bool) -> Self {
        let minutes = if auto_update {
            AUTO_UPDATE_WINDOW_MINUTES
        } else {
            MANUAL_UPDATE_WINDOW_MINUTES
        };
        Self::new(Duration::minutes(minutes))
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::for_auto_update(true)
    }
}

/// Tunables of a [`RateCache`](super::RateCache).
#[derive(Clone, Debug)]
pub struct RateCacheConfig {
    pub freshness: FreshnessPolicy,
    /// Upper bound on a single provider attempt.
    pub provider_timeout: StdDuration,
    /// Pause between bases during bulk pre-fetch.
    pub prefetch_pause: StdDuration,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            freshness: FreshnessPolicy::default(),
            provider_timeout: StdDuration::from_secs(10),
            prefetch_pause: StdDuration::from_millis(200),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows() {
        assert_eq!(
            FreshnessPolicy::for_auto_update(true).window(),
            Duration::hours(1)
        );
        assert_eq!(
            FreshnessPolicy::for_auto_update(false).window(),
            Duration::hours(24)
        );
    }
}
