// Dashboard presentation preferences
use super::vehicle::Vehicle;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PreferenceParseError {
    #[error("unknown status filter: {0}")]
    Filter(String),
    #[error("unknown sort key: {0}")]
    SortKey(String),
    #[error("unknown sort direction: {0}")]
    SortDirection(String),
    #[error("unknown widget: {0}")]
    Widget(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Moving,
    Charging,
    Idle,
}

impl StatusFilter {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Moving => vehicle.is_moving(),
            StatusFilter::Charging => vehicle.charging,
            StatusFilter::Idle => vehicle.is_idle(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = PreferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "moving" => Ok(StatusFilter::Moving),
            "charging" => Ok(StatusFilter::Charging),
            "idle" => Ok(StatusFilter::Idle),
            other => Err(PreferenceParseError::Filter(other.to_string())),
        }
    }
}

/// Numeric vehicle fields the card list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Soc,
    Speed,
    Distance,
    Temp,
    Efficiency,
}

impl SortKey {
    pub fn value(&self, vehicle: &Vehicle) -> f64 {
        match self {
            SortKey::Soc => vehicle.soc,
            SortKey::Speed => vehicle.speed,
            SortKey::Distance => vehicle.distance,
            SortKey::Temp => vehicle.temp,
            SortKey::Efficiency => vehicle.efficiency,
        }
    }
}

impl FromStr for SortKey {
    type Err = PreferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soc" => Ok(SortKey::Soc),
            "speed" => Ok(SortKey::Speed),
            "distance" => Ok(SortKey::Distance),
            "temp" => Ok(SortKey::Temp),
            "efficiency" => Ok(SortKey::Efficiency),
            other => Err(PreferenceParseError::SortKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = PreferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(PreferenceParseError::SortDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetId {
    Kpis,
    Map,
    Controls,
    Cards,
}

impl WidgetId {
    pub fn default_layout() -> Vec<WidgetId> {
        vec![WidgetId::Kpis, WidgetId::Map, WidgetId::Controls, WidgetId::Cards]
    }
}

impl FromStr for WidgetId {
    type Err = PreferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kpis" => Ok(WidgetId::Kpis),
            "map" => Ok(WidgetId::Map),
            "controls" => Ok(WidgetId::Controls),
            "cards" => Ok(WidgetId::Cards),
            other => Err(PreferenceParseError::Widget(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiPreferences {
    pub status_filter: StatusFilter,
    pub sort_key: SortKey,
    pub sort_dir: SortDirection,
    pub stream_on: bool,
    pub dark: bool,
    pub widgets: Vec<WidgetId>,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            status_filter: StatusFilter::default(),
            sort_key: SortKey::default(),
            sort_dir: SortDirection::default(),
            // The driver starts stopped, so the stream flag follows it.
            stream_on: false,
            dark: false,
            widgets: WidgetId::default_layout(),
        }
    }
}
