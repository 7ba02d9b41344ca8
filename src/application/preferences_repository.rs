// Repository trait for persisted dashboard preferences
use async_trait::async_trait;

#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    /// Stored dark-mode flag, `None` when nothing has been saved yet.
    async fn load_dark_mode(&self) -> anyhow::Result<Option<bool>>;

    async fn save_dark_mode(&self, dark: bool) -> anyhow::Result<()>;
}
