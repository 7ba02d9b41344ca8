// HTTP request handlers
use crate::domain::preferences::{SortDirection, SortKey, StatusFilter, UiPreferences, WidgetId};
use crate::domain::vehicle::Vehicle;
use crate::infrastructure::chunked_json::stream_from_broadcast;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct StreamStatus {
    pub running: bool,
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct UiView {
    #[serde(flatten)]
    pub preferences: UiPreferences,
    pub offline: bool,
}

#[derive(Debug, Serialize)]
pub struct ThemeView {
    pub dark: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Fleet-wide KPIs
pub async fn get_overview(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response<Body>, ApiError> {
    let overview = state.engine.overview().await;
    Ok(json_response(&overview, accepts_brotli(&headers)).await?)
}

/// Vehicles after the active filter and sort
pub async fn list_vehicles(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response<Body>, ApiError> {
    let vehicles = state.engine.visible_vehicles().await;
    Ok(json_response(&vehicles, accepts_brotli(&headers)).await?)
}

pub async fn init_fleet(State(state): State<Arc<AppState>>) -> StatusCode {
    state.engine.init_fleet().await;
    StatusCode::NO_CONTENT
}

/// Raw registry in fleet order
pub async fn get_fleet(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response<Body>, ApiError> {
    let vehicles = state.engine.vehicles().await;
    Ok(json_response(&vehicles, accepts_brotli(&headers)).await?)
}

pub async fn replace_fleet(
    State(state): State<Arc<AppState>>,
    Json(vehicles): Json<Vec<Vehicle>>,
) -> StatusCode {
    tracing::info!("Replacing fleet with {} vehicles", vehicles.len());
    state.engine.set_vehicles(vehicles).await;
    StatusCode::NO_CONTENT
}

/// Notification list, newest first
pub async fn list_alerts(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response<Body>, ApiError> {
    let alerts = state.engine.alerts().await;
    Ok(json_response(&alerts, accepts_brotli(&headers)).await?)
}

pub async fn acknowledge_alert(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    if state.engine.acknowledge_alert(id).await {
        tracing::info!("Alert {} acknowledged", id);
    } else {
        tracing::debug!("Ignoring acknowledgement for unknown alert {}", id);
    }
    StatusCode::NO_CONTENT
}

/// Live snapshot stream (length-prefixed JSON frames)
pub async fn stream_snapshots(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Subscribe first so nothing published after the initial snapshot is lost.
    let rx = state.engine.subscribe();
    let initial = state.engine.snapshot().await;
    stream_from_broadcast(initial, rx, accepts_brotli(&headers))
}

pub async fn start_stream(State(state): State<Arc<AppState>>) -> Json<StreamStatus> {
    let changed = state.driver.start().await;
    Json(StreamStatus {
        running: state.driver.is_running().await,
        changed,
    })
}

pub async fn stop_stream(State(state): State<Arc<AppState>>) -> Json<StreamStatus> {
    let changed = state.driver.stop().await;
    Json(StreamStatus {
        running: state.driver.is_running().await,
        changed,
    })
}

pub async fn get_ui(State(state): State<Arc<AppState>>) -> Json<UiView> {
    let preferences = state.engine.ui_preferences().await;
    let offline = state.engine.offline().await;
    Json(UiView {
        preferences,
        offline,
    })
}

pub async fn set_filter(
    Path(filter): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    let filter: StatusFilter = filter.parse()?;
    state.engine.set_filter(filter).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_sort(
    Path((key, dir)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    let key: SortKey = key.parse()?;
    let dir: SortDirection = dir.parse()?;
    state.engine.set_sort(key, dir).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_theme(State(state): State<Arc<AppState>>) -> Json<ThemeView> {
    Json(ThemeView {
        dark: state.engine.is_dark().await,
    })
}

pub async fn toggle_theme(State(state): State<Arc<AppState>>) -> Json<ThemeView> {
    let dark = state.themes.toggle().await;
    Json(ThemeView { dark })
}

pub async fn get_widgets(State(state): State<Arc<AppState>>) -> Json<Vec<WidgetId>> {
    Json(state.engine.widgets().await)
}

/// Replace the dashboard layout with the given ordered widget ids
pub async fn set_widgets(
    State(state): State<Arc<AppState>>,
    Json(ids): Json<Vec<String>>,
) -> Result<StatusCode, ApiError> {
    let widgets = ids
        .iter()
        .map(|id| id.parse::<WidgetId>())
        .collect::<Result<Vec<_>, _>>()?;
    state.engine.set_widgets(widgets).await;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fleet_engine::FleetEngine;
    use crate::application::stream_driver::StreamDriver;
    use crate::application::theme_service::ThemeService;
    use crate::domain::alert::AlertRule;
    use crate::domain::vehicle::{BASE_LAT, BASE_LON, Vehicle};
    use crate::infrastructure::config::SimulationSettings;
    use crate::infrastructure::file_preferences::FilePreferencesRepository;

    fn app_state(prefs_path: std::path::PathBuf) -> Arc<AppState> {
        let settings = SimulationSettings {
            fleet_size: 3,
            tick_interval_ms: 1500,
            base_lat: BASE_LAT,
            base_lon: BASE_LON,
            autostart: false,
        };
        let period = settings.tick_interval();
        let engine = FleetEngine::new(settings, vec![AlertRule::low_battery(30.0, 20.0)]);
        let repository = Arc::new(FilePreferencesRepository::new(prefs_path));
        Arc::new(AppState {
            driver: StreamDriver::new(engine.clone(), period),
            themes: ThemeService::new(engine.clone(), repository),
            engine,
        })
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_overview_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(dir.path().join("prefs.toml"));
        let mut moving = Vehicle::parked(1, 50.0, 25.0, BASE_LAT, BASE_LON);
        moving.speed = 20.0;
        let mut charging = Vehicle::parked(2, 90.0, 25.0, BASE_LAT, BASE_LON);
        charging.charging = true;
        state
            .engine
            .set_vehicles(vec![
                Vehicle::parked(0, 10.0, 25.0, BASE_LAT, BASE_LON),
                moving,
                charging,
            ])
            .await;

        let response = get_overview(HeaderMap::new(), State(state)).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["avg_soc"].as_f64().unwrap().round(), 50.0);
        assert_eq!(json["moving"], 1);
        assert_eq!(json["charging"], 1);
        assert_eq!(json["idle"], 1);
    }

    #[tokio::test]
    async fn test_replace_fleet_clamps_values() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(dir.path().join("prefs.toml"));
        let mut hot = Vehicle::parked(0, 120.0, 140.0, BASE_LAT, BASE_LON);
        hot.speed = 300.0;

        let status = replace_fleet(State(state.clone()), Json(vec![hot])).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let response = get_fleet(HeaderMap::new(), State(state)).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json[0]["soc"], 100.0);
        assert_eq!(json[0]["temp"], 95.0);
        assert_eq!(json[0]["speed"], 120.0);
    }

    #[tokio::test]
    async fn test_filter_rejects_unknown_name() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(dir.path().join("prefs.toml"));

        let err = set_filter(Path("parked".to_string()), State(state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let ok = set_filter(Path("moving".to_string()), State(state.clone())).await;
        assert_eq!(ok.unwrap(), StatusCode::NO_CONTENT);
        assert_eq!(
            state.engine.ui_preferences().await.status_filter,
            StatusFilter::Moving
        );
    }

    #[tokio::test]
    async fn test_stream_toggle_drives_offline() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(dir.path().join("prefs.toml"));

        let started = start_stream(State(state.clone())).await;
        assert!(started.changed && started.running);
        assert!(!get_ui(State(state.clone())).await.offline);

        let stopped = stop_stream(State(state.clone())).await;
        assert!(stopped.changed);
        assert!(get_ui(State(state)).await.offline);
    }

    #[tokio::test]
    async fn test_theme_toggle_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        let state = app_state(path.clone());

        assert!(!get_theme(State(state.clone())).await.dark);
        assert!(toggle_theme(State(state.clone())).await.dark);
        assert!(get_theme(State(state)).await.dark);
        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("dark = true"));
    }

    #[tokio::test]
    async fn test_widgets_and_ack() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(dir.path().join("prefs.toml"));

        let status = set_widgets(
            State(state.clone()),
            Json(vec!["cards".to_string(), "map".to_string()]),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(
            get_widgets(State(state.clone())).await.0,
            vec![WidgetId::Cards, WidgetId::Map]
        );

        assert!(set_widgets(State(state.clone()), Json(vec!["radar".to_string()]))
            .await
            .is_err());

        assert_eq!(
            acknowledge_alert(Path(7), State(state)).await,
            StatusCode::NO_CONTENT
        );
    }
}
