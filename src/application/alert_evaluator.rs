// Alert evaluator - Edge-triggered threshold alerts with hysteresis
use crate::domain::alert::{Alert, AlertKey, AlertKind, AlertRule, RuleState};
use crate::domain::vehicle::Vehicle;
use std::collections::{HashMap, VecDeque};

/// Append-only alert history plus the per-(rule, vehicle) trigger states.
#[derive(Debug, Clone)]
pub struct AlertBook {
    rules: Vec<AlertRule>,
    states: HashMap<AlertKey, RuleState>,
    // Newest first.
    alerts: VecDeque<Alert>,
    last_id: u64,
}

impl AlertBook {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self {
            rules,
            states: HashMap::new(),
            alerts: VecDeque::new(),
            last_id: 0,
        }
    }

    /// Run every rule against a vehicle's freshly simulated values.
    /// Returns the alerts raised by this observation.
    pub fn evaluate(&mut self, vehicle: &Vehicle, now_ms: i64) -> Vec<Alert> {
        let mut raised = Vec::new();

        for rule in &self.rules {
            let value = observed_value(rule.kind, vehicle);
            let key = AlertKey::new(rule.kind, &vehicle.id);
            let current = self.states.get(&key).copied().unwrap_or_default();
            let (next, fire) = current.step(rule, value);

            if next == RuleState::Armed {
                if self.states.remove(&key).is_some() {
                    tracing::debug!("Re-armed {}", key);
                }
            } else {
                self.states.insert(key.clone(), next);
            }

            if fire {
                self.last_id += 1;
                let alert = Alert {
                    id: self.last_id,
                    key: key.to_string(),
                    kind: rule.kind,
                    vehicle_id: vehicle.id.clone(),
                    message: rule.kind.message(&vehicle.name, value),
                    ts: now_ms,
                    ack: false,
                };
                tracing::info!(alert_id = alert.id, "{}", alert.message);
                self.alerts.push_front(alert.clone());
                raised.push(alert);
            }
        }

        raised
    }

    /// Mark an alert as handled. Unknown ids are ignored.
    pub fn acknowledge(&mut self, id: u64) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.ack = true;
                true
            }
            None => false,
        }
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }

    pub fn open_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.ack).count()
    }

    #[cfg(test)]
    pub fn rule_state(&self, key: &AlertKey) -> RuleState {
        self.states.get(key).copied().unwrap_or_default()
    }
}

fn observed_value(kind: AlertKind, vehicle: &Vehicle) -> f64 {
    match kind {
        AlertKind::LowBattery => vehicle.soc,
        AlertKind::HighTemp => vehicle.temp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::{BASE_LAT, BASE_LON};

    fn book() -> AlertBook {
        AlertBook::new(vec![
            AlertRule::low_battery(30.0, 20.0),
            AlertRule::high_temp(35.0, 30.0),
        ])
    }

    fn vehicle(soc: f64, temp: f64) -> Vehicle {
        Vehicle::parked(0, soc, temp, BASE_LAT, BASE_LON)
    }

    #[test]
    fn test_low_battery_fires_once() {
        let mut book = book();

        let raised = book.evaluate(&vehicle(28.0, 25.0), 1);
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].kind, AlertKind::LowBattery);
        assert_eq!(raised[0].key, "low_battery:V1");
        assert_eq!(raised[0].message, "EV-1 battery low (28%)");

        assert!(book.evaluate(&vehicle(15.0, 25.0), 2).is_empty());
        assert_eq!(book.alerts().len(), 1);
    }

    #[test]
    fn test_recovery_rearms_with_new_id() {
        let mut book = book();
        let first = book.evaluate(&vehicle(28.0, 25.0), 1);

        assert!(book.evaluate(&vehicle(45.0, 25.0), 2).is_empty());
        let key = AlertKey::new(AlertKind::LowBattery, "V1");
        assert_eq!(book.rule_state(&key), RuleState::Armed);

        let second = book.evaluate(&vehicle(29.0, 25.0), 3);
        assert_eq!(second.len(), 1);
        assert!(second[0].id > first[0].id);
    }

    #[test]
    fn test_low_battery_refires_after_soc_clears_recovery() {
        let mut book = book();
        let key = AlertKey::new(AlertKind::LowBattery, "V1");

        assert_eq!(book.evaluate(&vehicle(10.0, 25.0), 1).len(), 1);
        assert!(book.evaluate(&vehicle(25.0, 25.0), 2).is_empty());
        assert_eq!(book.rule_state(&key), RuleState::Armed);

        let again = book.evaluate(&vehicle(10.0, 25.0), 3);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].id, 2);
        assert_eq!(book.alerts().len(), 2);
    }

    #[test]
    fn test_high_temp_band_suppresses_noise() {
        let mut book = book();
        assert_eq!(book.evaluate(&vehicle(80.0, 36.0), 1).len(), 1);
        assert!(book.evaluate(&vehicle(80.0, 33.0), 2).is_empty());
        assert!(book.evaluate(&vehicle(80.0, 36.5), 3).is_empty());

        let key = AlertKey::new(AlertKind::HighTemp, "V1");
        assert_eq!(book.rule_state(&key), RuleState::Triggered);

        assert!(book.evaluate(&vehicle(80.0, 29.0), 4).is_empty());
        assert_eq!(book.rule_state(&key), RuleState::Armed);
        assert_eq!(book.evaluate(&vehicle(80.0, 37.0), 5).len(), 1);
    }

    #[test]
    fn test_ids_shared_across_rules_and_newest_first() {
        let mut book = book();
        let raised = book.evaluate(&vehicle(10.0, 50.0), 1);
        assert_eq!(raised.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);

        let mut other = vehicle(10.0, 20.0);
        other.id = "V2".to_string();
        let raised = book.evaluate(&other, 2);
        assert_eq!(raised[0].id, 3);

        let ids: Vec<u64> = book.alerts().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_acknowledge() {
        let mut book = book();
        book.evaluate(&vehicle(10.0, 20.0), 1);
        assert_eq!(book.open_count(), 1);

        assert!(book.acknowledge(1));
        assert!(book.alerts()[0].ack);
        assert_eq!(book.open_count(), 0);
        assert_eq!(book.alerts().len(), 1);

        assert!(!book.acknowledge(99));
    }
}
