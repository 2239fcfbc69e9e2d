//! Extension settings model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::conversion::MAX_DECIMAL_PLACES;
use crate::errors::{Error, Result};

/// How conversions are surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// Annotate the document in place and keep it annotated.
    #[default]
    Auto,
    /// Show a tooltip for selected text only.
    Selection,
    /// No conversions; existing annotations are removed.
    Manual,
}

/// User preferences consumed read-only by the annotation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionSettings {
    pub mode: ConversionMode,
    pub target_currency: String,
    /// Implied currency of bare numbers in selections.
    pub base_currency: String,
    pub decimal_places: u32,
    pub rate_offset_percent: Decimal,
    pub extension_enabled: bool,
    /// Keep rates updated in the background; also picks the freshness window.
    pub auto_update: bool,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            mode: ConversionMode::Auto,
            target_currency: "USD".to_string(),
            base_currency: "USD".to_string(),
            decimal_places: 2,
            rate_offset_percent: Decimal::ZERO,
            extension_enabled: true,
            auto_update: true,
        }
    }
}

impl ExtensionSettings {
    pub fn validate(&self) -> Result<()> {
        for (field, code) in [
            ("targetCurrency", &self.target_currency),
            ("baseCurrency", &self.base_currency),
        ] {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(Error::InvalidSetting(format!(
                    "{} must be a 3-letter uppercase code, got '{}'",
                    field, code
                )));
            }
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(Error::InvalidSetting(format!(
                "decimalPlaces must be at most {}",
                MAX_DECIMAL_PLACES
            )));
        }
        if self.rate_offset_percent <= -Decimal::ONE_HUNDRED {
            return Err(Error::InvalidSetting(
                "rateOffsetPercent must be greater than -100".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether in-page annotation should run.
    pub fn annotates(&self) -> bool {
        self.extension_enabled && self.mode == ConversionMode::Auto
    }

    /// Apply every field present in `update`.
    pub fn merge(&mut self, update: &SettingsUpdate) {
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(code) = &update.target_currency {
            self.target_currency = code.trim().to_ascii_uppercase();
        }
        if let Some(code) = &update.base_currency {
            self.base_currency = code.trim().to_ascii_uppercase();
        }
        if let Some(places) = update.decimal_places {
            self.decimal_places = places;
        }
        if let Some(offset) = update.rate_offset_percent {
            self.rate_offset_percent = offset;
        }
        if let Some(enabled) = update.extension_enabled {
            self.extension_enabled = enabled;
        }
        if let Some(auto_update) = update.auto_update {
            self.auto_update = auto_update;
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub mode: Option<ConversionMode>,
    pub target_currency: Option<String>,
    pub base_currency: Option<String>,
    pub decimal_places: Option<u32>,
    pub rate_offset_percent: Option<Decimal>,
    pub extension_enabled: Option<bool>,
    pub auto_update: Option<bool>,
}
