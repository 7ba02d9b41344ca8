// Derived views - Pure projections over the registry and UI preferences
use crate::domain::preferences::{SortDirection, UiPreferences};
use crate::domain::vehicle::{Vehicle, VehicleStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub avg_soc: f64,
    pub moving: usize,
    pub charging: usize,
    pub idle: usize,
}

/// A vehicle as the card list renders it.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleCard {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub status: VehicleStatus,
}

impl From<Vehicle> for VehicleCard {
    fn from(vehicle: Vehicle) -> Self {
        let status = vehicle.status();
        Self { vehicle, status }
    }
}

pub fn overview(vehicles: &[Vehicle]) -> Overview {
    let avg_soc = if vehicles.is_empty() {
        0.0
    } else {
        vehicles.iter().map(|v| v.soc).sum::<f64>() / vehicles.len() as f64
    };

    Overview {
        avg_soc,
        moving: vehicles.iter().filter(|v| v.is_moving()).count(),
        charging: vehicles.iter().filter(|v| v.charging).count(),
        idle: vehicles.iter().filter(|v| v.is_idle()).count(),
    }
}

/// Filter by status, then sort a fresh copy. The registry order is untouched.
pub fn visible_vehicles(vehicles: &[Vehicle], prefs: &UiPreferences) -> Vec<Vehicle> {
    let mut visible: Vec<Vehicle> = vehicles
        .iter()
        .filter(|v| prefs.status_filter.matches(v))
        .cloned()
        .collect();

    let key = prefs.sort_key;
    visible.sort_by(|a, b| {
        let ordering = key.value(a).total_cmp(&key.value(b));
        match prefs.sort_dir {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::preferences::{SortKey, StatusFilter};
    use crate::domain::vehicle::{BASE_LAT, BASE_LON};

    fn vehicle(index: usize, soc: f64, speed: f64, charging: bool) -> Vehicle {
        let mut v = Vehicle::parked(index, soc, 25.0, BASE_LAT, BASE_LON);
        v.speed = speed;
        v.charging = charging;
        v
    }

    fn sample() -> Vec<Vehicle> {
        vec![
            vehicle(0, 10.0, 0.0, false),
            vehicle(1, 50.0, 20.0, false),
            vehicle(2, 90.0, 0.0, true),
        ]
    }

    #[test]
    fn test_overview_counts() {
        let o = overview(&sample());
        assert_eq!(o.avg_soc.round(), 50.0);
        assert_eq!(o.moving, 1);
        assert_eq!(o.charging, 1);
        assert_eq!(o.idle, 1);
    }

    #[test]
    fn test_overview_empty() {
        let o = overview(&[]);
        assert_eq!(o.avg_soc, 0.0);
        assert_eq!((o.moving, o.charging, o.idle), (0, 0, 0));
    }

    #[test]
    fn test_moving_filter_ignores_sort() {
        let mut fleet = sample();
        fleet.push(vehicle(3, 70.0, 55.0, false));

        for key in [SortKey::Soc, SortKey::Speed, SortKey::Temp, SortKey::Distance] {
            for dir in [SortDirection::Asc, SortDirection::Desc] {
                let prefs = UiPreferences {
                    status_filter: StatusFilter::Moving,
                    sort_key: key,
                    sort_dir: dir,
                    ..UiPreferences::default()
                };
                let visible = visible_vehicles(&fleet, &prefs);
                assert_eq!(visible.len(), 2);
                assert!(visible.iter().all(|v| v.speed > 0.0));
            }
        }
    }

    #[test]
    fn test_sort_directions_leave_registry_alone() {
        let fleet = sample();
        let mut prefs = UiPreferences::default();

        let desc: Vec<String> = visible_vehicles(&fleet, &prefs)
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(desc, vec!["V3", "V2", "V1"]);

        prefs.sort_dir = SortDirection::Asc;
        let asc: Vec<String> = visible_vehicles(&fleet, &prefs).into_iter().map(|v| v.id).collect();
        assert_eq!(asc, vec!["V1", "V2", "V3"]);

        assert_eq!(fleet[0].id, "V1");
        assert_eq!(fleet[2].id, "V3");
    }

    #[test]
    fn test_idle_and_charging_filters() {
        let fleet = sample();
        let prefs = UiPreferences {
            status_filter: StatusFilter::Idle,
            ..UiPreferences::default()
        };
        let idle = visible_vehicles(&fleet, &prefs);
        assert_eq!(idle.len(), 1);
        assert_eq!(idle[0].id, "V1");

        let prefs = UiPreferences {
            status_filter: StatusFilter::Charging,
            ..UiPreferences::default()
        };
        let charging = visible_vehicles(&fleet, &prefs);
        assert_eq!(charging.len(), 1);
        assert_eq!(charging[0].id, "V3");
    }

    #[test]
    fn test_card_status() {
        let card = VehicleCard::from(vehicle(0, 42.0, 50.0, false));
        assert_eq!(card.status, VehicleStatus::Moving);
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["id"], "V1");
        assert_eq!(json["status"], "moving");
    }
}
