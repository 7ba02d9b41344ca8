// Alert domain model and the per-rule trigger state machine
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowBattery,
    HighTemp,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LowBattery => "low_battery",
            AlertKind::HighTemp => "high_temp",
        }
    }

    pub fn message(&self, vehicle_name: &str, value: f64) -> String {
        match self {
            AlertKind::LowBattery => format!("{} battery low ({:.0}%)", vehicle_name, value),
            AlertKind::HighTemp => format!("{} high temperature ({:.0}°C)", vehicle_name, value),
        }
    }
}

/// Dedupe key: one rule on one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub kind: AlertKind,
    pub vehicle_id: String,
}

impl AlertKey {
    pub fn new(kind: AlertKind, vehicle_id: &str) -> Self {
        Self {
            kind,
            vehicle_id: vehicle_id.to_string(),
        }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.vehicle_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: u64,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub vehicle_id: String,
    pub message: String,
    pub ts: i64,
    pub ack: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    /// Fires when the value drops below the trigger threshold.
    Below,
    /// Fires when the value climbs above the trigger threshold.
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertRule {
    pub kind: AlertKind,
    pub direction: Direction,
    pub trigger: f64,
    pub recovery: f64,
}

impl AlertRule {
    pub fn low_battery(trigger: f64, recovery: f64) -> Self {
        Self {
            kind: AlertKind::LowBattery,
            direction: Direction::Below,
            trigger,
            recovery,
        }
    }

    pub fn high_temp(trigger: f64, recovery: f64) -> Self {
        Self {
            kind: AlertKind::HighTemp,
            direction: Direction::Above,
            trigger,
            recovery,
        }
    }

    pub fn is_triggered(&self, value: f64) -> bool {
        match self.direction {
            Direction::Below => value < self.trigger,
            Direction::Above => value > self.trigger,
        }
    }

    pub fn is_recovered(&self, value: f64) -> bool {
        match self.direction {
            Direction::Below => value > self.recovery,
            Direction::Above => value < self.recovery,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleState {
    #[default]
    Armed,
    Triggered,
    Cooldown,
}

impl RuleState {
    /// Advance one observation. Returns the next state and whether an
    /// alert must be raised.
    ///
    /// Recovery is checked before the trigger condition, so a value inside
    /// both bands re-arms the rule.
    pub fn step(self, rule: &AlertRule, value: f64) -> (RuleState, bool) {
        match self {
            RuleState::Armed if rule.is_triggered(value) => (RuleState::Triggered, true),
            RuleState::Armed => (RuleState::Armed, false),
            RuleState::Triggered | RuleState::Cooldown if rule.is_recovered(value) => {
                (RuleState::Armed, false)
            }
            RuleState::Triggered | RuleState::Cooldown if rule.is_triggered(value) => {
                (RuleState::Triggered, false)
            }
            RuleState::Triggered | RuleState::Cooldown => (RuleState::Cooldown, false),
        }
    }
}
