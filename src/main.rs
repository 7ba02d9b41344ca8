// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{
    Router,
    routing::{get, post, put},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::fleet_engine::FleetEngine;
use crate::application::stream_driver::StreamDriver;
use crate::application::theme_service::ThemeService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::file_preferences::FilePreferencesRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    acknowledge_alert, get_fleet, get_overview, get_theme, get_ui, get_widgets, health_check,
    init_fleet, list_alerts, list_vehicles, replace_fleet, set_filter, set_sort, set_widgets,
    start_stream, stop_stream, stream_snapshots, toggle_theme,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fleet_telemetry=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create repository (infrastructure layer)
    let preferences = Arc::new(FilePreferencesRepository::new(config.preferences.path.clone()));

    // Create services (application layer)
    let engine = FleetEngine::new(config.simulation.clone(), config.alerts.rules());
    engine.init_fleet().await;
    let driver = StreamDriver::new(engine.clone(), config.simulation.tick_interval());
    let themes = ThemeService::new(engine.clone(), preferences);
    let dark = themes.restore().await;
    tracing::info!("Theme restored: {}", if dark { "dark" } else { "light" });

    if config.simulation.autostart {
        driver.start().await;
    }

    // Create application state
    let state = Arc::new(AppState {
        engine,
        driver: driver.clone(),
        themes,
    });

    // Build router (presentation layer)
    // Responses are compressed by hand, so no CompressionLayer here.
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/overview", get(get_overview))
        .route("/vehicles", get(list_vehicles))
        .route("/fleet", get(get_fleet).put(replace_fleet))
        .route("/fleet/init", post(init_fleet))
        .route("/alerts", get(list_alerts))
        .route("/alerts/:id/ack", post(acknowledge_alert))
        .route("/stream", get(stream_snapshots))
        .route("/stream/start", post(start_stream))
        .route("/stream/stop", post(stop_stream))
        .route("/ui", get(get_ui))
        .route("/ui/filter/:filter", put(set_filter))
        .route("/ui/sort/:key/:dir", put(set_sort))
        .route("/ui/theme", get(get_theme))
        .route("/ui/theme/toggle", post(toggle_theme))
        .route("/ui/widgets", get(get_widgets).put(set_widgets))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind_addr.parse()?;
    tracing::info!("Starting fleet-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    driver.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
