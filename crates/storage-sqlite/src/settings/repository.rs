use async_trait::async_trait;
use diesel::prelude::*;
use log::warn;
use std::str::FromStr;
use std::sync::Arc;

use super::model::AppSettingDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::app_settings::dsl::*;
use fxlens_core::errors::Result;
use fxlens_core::settings::{ConversionMode, ExtensionSettings, SettingsRepositoryTrait};

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SettingsRepository { pool, writer }
    }
}

fn parse_or<T: FromStr>(key: &str, value: &str, current: T) -> T {
    value.parse().unwrap_or_else(|_| {
        warn!("Ignoring unparsable setting {}={}", key, value);
        current
    })
}

fn parse_mode(value: &str) -> Option<ConversionMode> {
    match value {
        "auto" => Some(ConversionMode::Auto),
        "selection" => Some(ConversionMode::Selection),
        "manual" => Some(ConversionMode::Manual),
        _ => None,
    }
}

fn mode_name(mode: ConversionMode) -> &'static str {
    match mode {
        ConversionMode::Auto => "auto",
        ConversionMode::Selection => "selection",
        ConversionMode::Manual => "manual",
    }
}

fn to_rows(settings: &ExtensionSettings) -> Vec<AppSettingDB> {
    [
        ("mode", mode_name(settings.mode).to_string()),
        ("target_currency", settings.target_currency.clone()),
        ("base_currency", settings.base_currency.clone()),
        ("decimal_places", settings.decimal_places.to_string()),
        ("rate_offset_percent", settings.rate_offset_percent.to_string()),
        ("extension_enabled", settings.extension_enabled.to_string()),
        ("auto_update", settings.auto_update.to_string()),
    ]
    .into_iter()
    .map(|(key, value)| AppSettingDB {
        setting_key: key.to_string(),
        setting_value: value,
    })
    .collect()
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn load(&self) -> Result<Option<ExtensionSettings>> {
        let mut conn = get_connection(&self.pool).into_core()?;
        let all_settings: Vec<(String, String)> = app_settings
            .select((setting_key, setting_value))
            .load::<(String, String)>(&mut conn)
            .map_err(StorageError::from)
            .into_core()?;

        if all_settings.is_empty() {
            return Ok(None);
        }

        let mut settings = ExtensionSettings::default();
        for (key, value) in all_settings {
            match key.as_str() {
                "mode" => match parse_mode(&value) {
                    Some(mode) => settings.mode = mode,
                    None => warn!("Ignoring unknown mode '{}'", value),
                },
                "target_currency" => settings.target_currency = value,
                "base_currency" => settings.base_currency = value,
                "decimal_places" => {
                    settings.decimal_places = parse_or(&key, &value, settings.decimal_places);
                }
                "rate_offset_percent" => {
                    settings.rate_offset_percent =
                        parse_or(&key, &value, settings.rate_offset_percent);
                }
                "extension_enabled" => {
                    settings.extension_enabled = parse_or(&key, &value, settings.extension_enabled);
                }
                "auto_update" => {
                    settings.auto_update = parse_or(&key, &value, settings.auto_update);
                }
                _ => {} // Ignore unknown settings
            }
        }

        Ok(Some(settings))
    }

    async fn save(&self, settings: &ExtensionSettings) -> Result<()> {
        let rows = to_rows(settings);
        self.writer
            .exec(move |conn| {
                for row in &rows {
                    diesel::replace_into(app_settings)
                        .values(row)
                        .execute(conn)?;
                }
                Ok(())
            })
            .await
            .into_core()
    }
}
