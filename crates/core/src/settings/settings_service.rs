use async_trait::async_trait;
use log::{debug, info};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

use super::{SettingsRepositoryTrait, SettingsStore};
use crate::errors::{Error, Result};
use crate::settings::{ExtensionSettings, SettingsUpdate};

#[async_trait]
pub trait SettingsServiceTrait: SettingsStore {
    /// Validate, persist and broadcast a partial update.
    async fn update_settings(&self, update: &SettingsUpdate) -> Result<ExtensionSettings>;
}

/// Owns the current settings and is their only writer.
pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
    sender: watch::Sender<ExtensionSettings>,
}

impl SettingsService {
    /// Load the stored settings, falling back to defaults.
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>) -> Result<Self> {
        let initial = match settings_repository.load()? {
            Some(settings) => settings,
            None => {
                debug!("No stored settings, using defaults");
                ExtensionSettings::default()
            }
        };
        let (sender, _) = watch::channel(initial);
        Ok(Self {
            settings_repository,
            sender,
        })
    }
}

impl SettingsStore for SettingsService {
    fn get(&self) -> ExtensionSettings {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ExtensionSettings> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    async fn update_settings(&self, update: &SettingsUpdate) -> Result<ExtensionSettings> {
        let mut next = self.get();
        next.merge(update);
        next.validate()?;

        self.settings_repository.save(&next).await?;
        info!(
            "Settings updated: mode={:?} target={} enabled={}",
            next.mode, next.target_currency, next.extension_enabled
        );
        self.sender.send_replace(next.clone());
        Ok(next)
    }
}

/// Settings that never change. Used for one-shot annotation requests.
pub struct FixedSettings {
    sender: watch::Sender<ExtensionSettings>,
}

impl FixedSettings {
    pub fn new(settings: ExtensionSettings) -> Self {
        let (sender, _) = watch::channel(settings);
        Self { sender }
    }
}

impl SettingsStore for FixedSettings {
    fn get(&self) -> ExtensionSettings {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ExtensionSettings> {
        self.sender.subscribe()
    }
}

/// Process-local repository.
#[derive(Default)]
pub struct InMemorySettingsRepository {
    stored: RwLock<Option<ExtensionSettings>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepositoryTrait for InMemorySettingsRepository {
    fn load(&self) -> Result<Option<ExtensionSettings>> {
        self.stored
            .read()
            .map(|s| s.clone())
            .map_err(|e| Error::Repository(e.to_string()))
    }

    async fn save(&self, settings: &ExtensionSettings) -> Result<()> {
        *self
            .stored
            .write()
            .map_err(|e| Error::Repository(e.to_string()))? = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ConversionMode;

    #[tokio::test]
    async fn test_update_persists_and_notifies() {
        let repository = Arc::new(InMemorySettingsRepository::new());
        let service = SettingsService::new(repository.clone()).unwrap();
        let mut rx = service.subscribe();

        let updated = service
            .update_settings(&SettingsUpdate {
                mode: Some(ConversionMode::Manual),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.mode, ConversionMode::Manual);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().mode, ConversionMode::Manual);
        assert_eq!(repository.load().unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_invalid_update_changes_nothing() {
        let repository = Arc::new(InMemorySettingsRepository::new());
        let service = SettingsService::new(repository.clone()).unwrap();
        let rx = service.subscribe();

        let result = service
            .update_settings(&SettingsUpdate {
                target_currency: Some("dollars".to_string()),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(Error::InvalidSetting(_))));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(service.get(), ExtensionSettings::default());
        assert_eq!(repository.load().unwrap(), None);
    }

    #[test]
    fn test_loads_stored_settings() {
        let repository = Arc::new(InMemorySettingsRepository::new());
        let stored = ExtensionSettings {
            target_currency: "JPY".to_string(),
            ..Default::default()
        };
        *repository.stored.write().unwrap() = Some(stored.clone());

        let service = SettingsService::new(repository).unwrap();
        assert_eq!(service.get(), stored);
    }
}
