//! Repository and store traits for settings.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::errors::Result;
use crate::settings::ExtensionSettings;

/// Persistence for [`ExtensionSettings`].
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    /// Stored settings, or `None` before the first save.
    fn load(&self) -> Result<Option<ExtensionSettings>>;

    async fn save(&self, settings: &ExtensionSettings) -> Result<()>;
}

/// Read-only view of the current settings plus change notification.
///
/// Components take this instead of a global so every call sees an explicit
/// snapshot.
pub trait SettingsStore: Send + Sync {
    fn get(&self) -> ExtensionSettings;

    fn subscribe(&self) -> watch::Receiver<ExtensionSettings>;
}
