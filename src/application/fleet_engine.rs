// Fleet engine - Owns the registry, alert book and UI preferences
use crate::application::alert_evaluator::AlertBook;
use crate::application::fleet_views::{self, Overview, VehicleCard};
use crate::application::simulator::{DEFAULT_TICK_SECS, step_vehicle};
use crate::domain::alert::{Alert, AlertRule};
use crate::domain::preferences::{SortDirection, SortKey, StatusFilter, UiPreferences, WidgetId};
use crate::domain::vehicle::{Vehicle, VehiclePatch};
use crate::infrastructure::config::SimulationSettings;
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tokio::time::Instant;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// Everything a dashboard needs to redraw after a tick.
#[derive(Debug, Clone, Serialize)]
pub struct FleetSnapshot {
    pub ts: i64,
    pub offline: bool,
    pub overview: Overview,
    pub open_alerts: usize,
    pub vehicles: Vec<VehicleCard>,
}

struct FleetState {
    vehicles: Vec<Vehicle>,
    alerts: AlertBook,
    ui: UiPreferences,
    last_tick: Option<Instant>,
    rng: StdRng,
}

impl FleetState {
    fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            ts: Utc::now().timestamp_millis(),
            offline: !self.ui.stream_on,
            overview: fleet_views::overview(&self.vehicles),
            open_alerts: self.alerts.open_count(),
            vehicles: fleet_views::visible_vehicles(&self.vehicles, &self.ui)
                .into_iter()
                .map(VehicleCard::from)
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct FleetEngine {
    state: Arc<RwLock<FleetState>>,
    snapshots: broadcast::Sender<FleetSnapshot>,
    settings: SimulationSettings,
}

impl FleetEngine {
    pub fn new(settings: SimulationSettings, rules: Vec<AlertRule>) -> Self {
        Self::with_rng(settings, rules, StdRng::from_entropy())
    }

    pub fn with_rng(settings: SimulationSettings, rules: Vec<AlertRule>, rng: StdRng) -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let state = FleetState {
            vehicles: Vec::new(),
            alerts: AlertBook::new(rules),
            ui: UiPreferences::default(),
            last_tick: None,
            rng,
        };
        Self {
            state: Arc::new(RwLock::new(state)),
            snapshots,
            settings,
        }
    }

    /// Create the fleet around the configured base point.
    pub async fn init_fleet(&self) {
        let mut state = self.state.write().await;
        let base = self.settings.base();
        let vehicles: Vec<Vehicle> = (0..self.settings.fleet_size)
            .map(|i| Vehicle::spawn(i, base, &mut state.rng))
            .collect();
        state.vehicles = vehicles;
        tracing::info!("Initialized fleet of {} vehicles", self.settings.fleet_size);
        self.publish(&state);
    }

    /// Replace the registry wholesale. Out-of-range values are clamped and
    /// only the first vehicle with a given id is kept.
    pub async fn set_vehicles(&self, vehicles: Vec<Vehicle>) {
        let mut seen = HashSet::with_capacity(vehicles.len());
        let vehicles: Vec<Vehicle> = vehicles
            .into_iter()
            .filter(|v| {
                let first = seen.insert(v.id.clone());
                if !first {
                    tracing::warn!("Dropping duplicate vehicle {}", v.id);
                }
                first
            })
            .map(|mut v| {
                v.clamp_bounds();
                v
            })
            .collect();
        self.state.write().await.vehicles = vehicles;
    }

    pub async fn tick(&self) -> Vec<Alert> {
        self.tick_at(Instant::now()).await
    }

    /// Advance every vehicle one step and evaluate alert rules on the
    /// result. The new registry is published in one assignment.
    pub async fn tick_at(&self, now: Instant) -> Vec<Alert> {
        let mut state = self.state.write().await;
        let dt_secs = state
            .last_tick
            .map(|last| now.saturating_duration_since(last).as_secs_f64())
            .unwrap_or(DEFAULT_TICK_SECS);
        state.last_tick = Some(now);
        let now_ms = Utc::now().timestamp_millis();

        let FleetState {
            vehicles,
            alerts,
            rng,
            ..
        } = &mut *state;

        let mut patches = HashMap::with_capacity(vehicles.len());
        let mut raised = Vec::new();
        for vehicle in vehicles.iter() {
            let patch = step_vehicle(vehicle, dt_secs, rng);
            let mut next = vehicle.clone();
            next.apply(&patch);
            raised.extend(alerts.evaluate(&next, now_ms));
            patches.insert(vehicle.id.clone(), patch);
        }
        *vehicles = apply_patches(vehicles, &patches);

        tracing::debug!(
            dt_secs,
            vehicles = state.vehicles.len(),
            alerts = raised.len(),
            "Tick applied"
        );
        self.publish(&state);
        raised
    }

    /// Called by the driver when the periodic trigger starts.
    pub async fn mark_stream_started(&self) {
        let mut state = self.state.write().await;
        state.last_tick = Some(Instant::now());
        state.ui.stream_on = true;
        self.publish(&state);
    }

    pub async fn set_stream(&self, on: bool) {
        let mut state = self.state.write().await;
        state.ui.stream_on = on;
        self.publish(&state);
    }

    pub async fn set_filter(&self, filter: StatusFilter) {
        self.state.write().await.ui.status_filter = filter;
    }

    pub async fn set_sort(&self, key: SortKey, dir: SortDirection) {
        let mut state = self.state.write().await;
        state.ui.sort_key = key;
        state.ui.sort_dir = dir;
    }

    pub async fn acknowledge_alert(&self, id: u64) -> bool {
        self.state.write().await.alerts.acknowledge(id)
    }

    /// Flip the theme and return the new value.
    pub async fn toggle_dark(&self) -> bool {
        let mut state = self.state.write().await;
        state.ui.dark = !state.ui.dark;
        state.ui.dark
    }

    pub async fn set_dark(&self, dark: bool) {
        self.state.write().await.ui.dark = dark;
    }

    pub async fn set_widgets(&self, widgets: Vec<WidgetId>) {
        self.state.write().await.ui.widgets = widgets;
    }

    pub async fn vehicles(&self) -> Vec<Vehicle> {
        self.state.read().await.vehicles.clone()
    }

    pub async fn overview(&self) -> Overview {
        fleet_views::overview(&self.state.read().await.vehicles)
    }

    pub async fn visible_vehicles(&self) -> Vec<VehicleCard> {
        let state = self.state.read().await;
        fleet_views::visible_vehicles(&state.vehicles, &state.ui)
            .into_iter()
            .map(VehicleCard::from)
            .collect()
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        self.state.read().await.alerts.alerts()
    }

    pub async fn offline(&self) -> bool {
        !self.state.read().await.ui.stream_on
    }

    pub async fn is_dark(&self) -> bool {
        self.state.read().await.ui.dark
    }

    pub async fn widgets(&self) -> Vec<WidgetId> {
        self.state.read().await.ui.widgets.clone()
    }

    pub async fn ui_preferences(&self) -> UiPreferences {
        self.state.read().await.ui.clone()
    }

    pub async fn snapshot(&self) -> FleetSnapshot {
        self.state.read().await.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FleetSnapshot> {
        self.snapshots.subscribe()
    }

    fn publish(&self, state: &FleetState) {
        // No subscribers is the common case.
        let _ = self.snapshots.send(state.snapshot());
    }
}

/// Merge per-id patches into a copy of the registry, keeping its order.
/// Patches for unknown ids are dropped.
pub fn apply_patches(
    vehicles: &[Vehicle],
    patches: &HashMap<String, VehiclePatch>,
) -> Vec<Vehicle> {
    let mut next = vehicles.to_vec();
    let index: HashMap<&str, usize> = vehicles
        .iter()
        .enumerate()
        .map(|(i, v)| (v.id.as_str(), i))
        .collect();

    for (id, patch) in patches {
        match index.get(id.as_str()) {
            Some(&i) => next[i].apply(patch),
            None => tracing::debug!("Ignoring patch for unknown vehicle {}", id),
        }
    }

    next
}
