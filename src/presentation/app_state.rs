// Application state for HTTP handlers
use crate::application::fleet_engine::FleetEngine;
use crate::application::stream_driver::StreamDriver;
use crate::application::theme_service::ThemeService;

#[derive(Clone)]
pub struct AppState {
    pub engine: FleetEngine,
    pub driver: StreamDriver,
    pub themes: ThemeService,
}
