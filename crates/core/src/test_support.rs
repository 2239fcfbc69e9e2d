//! Fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use fxlens_rates::RateTable;
use rust_decimal::Decimal;
use tokio::sync::Notify;

use crate::conversion::RateLookup;

/// In-memory rate tables with a lookup counter. A gated instance blocks
/// every lookup until the gate is notified.
#[derive(Default)]
pub struct StaticRates {
    tables: RwLock<HashMap<String, RateTable>>,
    lookups: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl StaticRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, base: &str, rates: &[(&str, Decimal)]) -> Self {
        self.set(base, rates);
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set(&self, base: &str, rates: &[(&str, Decimal)]) {
        let rates = rates.iter().map(|(c, r)| (c.to_string(), *r)).collect();
        self.tables
            .write()
            .unwrap()
            .insert(base.to_string(), RateTable::new(base, rates, Utc::now()));
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateLookup for StaticRates {
    async fn rates_for(&self, base: &str) -> Option<RateTable> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.tables.read().unwrap().get(base).cloned()
    }
}
