// Theme service - Dark mode toggling backed by the preferences repository
use crate::application::fleet_engine::FleetEngine;
use crate::application::preferences_repository::PreferencesRepository;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct ThemeService {
    engine: FleetEngine,
    repository: Arc<dyn PreferencesRepository>,
    // Held across flip and save so the stored value matches the last flip.
    toggle_lock: Arc<Mutex<()>>,
}

impl ThemeService {
    pub fn new(engine: FleetEngine, repository: Arc<dyn PreferencesRepository>) -> Self {
        Self {
            engine,
            repository,
            toggle_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Apply the saved theme once at startup. Unreadable storage falls back to light.
    pub async fn restore(&self) -> bool {
        let dark = match self.repository.load_dark_mode().await {
            Ok(saved) => saved.unwrap_or(false),
            Err(e) => {
                tracing::warn!("Could not read saved theme: {:#}", e);
                false
            }
        };
        self.engine.set_dark(dark).await;
        dark
    }

    /// Flip the theme and persist it. A failed write keeps the new theme in memory.
    pub async fn toggle(&self) -> bool {
        let _guard = self.toggle_lock.lock().await;
        let dark = self.engine.toggle_dark().await;
        if let Err(e) = self.repository.save_dark_mode(dark).await {
            tracing::warn!("Could not persist theme: {:#}", e);
        }
        dark
    }
}
