use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Upper bound on one rate provider attempt.
    pub provider_timeout: Duration,
}

fn millis_from_env(key: &str, default: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Duration::from_millis(ms)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("FXLENS_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid FXLENS_LISTEN_ADDR")?;
        let db_path =
            std::env::var("FXLENS_DB_PATH").unwrap_or_else(|_| "./db/fxlens.db".into());
        let cors_allow = std::env::var("FXLENS_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: millis_from_env("FXLENS_REQUEST_TIMEOUT_MS", 30_000),
            provider_timeout: millis_from_env("FXLENS_PROVIDER_TIMEOUT_MS", 10_000),
        })
    }
}
