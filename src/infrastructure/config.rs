use crate::domain::alert::AlertRule;
use crate::domain::vehicle::{BASE_LAT, BASE_LON};
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub simulation: SimulationSettings,
    pub alerts: AlertSettings,
    pub preferences: PreferencesSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationSettings {
    pub fleet_size: usize,
    pub tick_interval_ms: u64,
    pub base_lat: f64,
    pub base_lon: f64,
    /// Start streaming as soon as the service is up.
    pub autostart: bool,
}

impl SimulationSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn base(&self) -> (f64, f64) {
        (self.base_lat, self.base_lon)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertSettings {
    pub low_battery_trigger: f64,
    pub low_battery_recovery: f64,
    pub high_temp_trigger: f64,
    pub high_temp_recovery: f64,
}

impl AlertSettings {
    pub fn rules(&self) -> Vec<AlertRule> {
        vec![
            AlertRule::low_battery(self.low_battery_trigger, self.low_battery_recovery),
            AlertRule::high_temp(self.high_temp_trigger, self.high_temp_recovery),
        ]
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PreferencesSettings {
    pub path: PathBuf,
}

/// `config/fleet.toml` (optional) overridden by `FLEET__SECTION__KEY` env vars.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name("config/fleet").required(false))
        .add_source(
            config::Environment::with_prefix("FLEET")
                .separator("__")
                .try_parsing(true),
        );

    finish(builder)
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("simulation.fleet_size", 10)?
        .set_default("simulation.tick_interval_ms", 1500)?
        .set_default("simulation.base_lat", BASE_LAT)?
        .set_default("simulation.base_lon", BASE_LON)?
        .set_default("simulation.autostart", true)?
        .set_default("alerts.low_battery_trigger", 30.0)?
        .set_default("alerts.low_battery_recovery", 20.0)?
        .set_default("alerts.high_temp_trigger", 35.0)?
        .set_default("alerts.high_temp_recovery", 30.0)?
        .set_default("preferences.path", "data/preferences.toml")
}

fn finish(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AppConfig> {
    let config: AppConfig = builder.build()?.try_deserialize()?;

    anyhow::ensure!(config.simulation.fleet_size > 0, "simulation.fleet_size must be positive");
    anyhow::ensure!(
        config.simulation.tick_interval_ms > 0,
        "simulation.tick_interval_ms must be positive"
    );

    Ok(config)
}
