// TOML file implementation of the preferences repository
use crate::application::preferences_repository::PreferencesRepository;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default)]
    dark: bool,
}

pub struct FilePreferencesRepository {
    path: PathBuf,
}

impl FilePreferencesRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PreferencesRepository for FilePreferencesRepository {
    async fn load_dark_mode(&self) -> anyhow::Result<Option<bool>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };

        let stored: StoredPreferences = toml::from_str(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(stored.dark))
    }

    async fn save_dark_mode(&self, dark: bool) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let raw = toml::to_string(&StoredPreferences { dark })?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("writing {}", self.path.display()))?;
        tracing::debug!("Saved dark mode = {} to {}", dark, self.path.display());
        Ok(())
    }
}
