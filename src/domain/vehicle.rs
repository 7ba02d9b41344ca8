// Vehicle domain model
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Map drift is centred on Munich.
pub const BASE_LAT: f64 = 48.137;
pub const BASE_LON: f64 = 11.575;

pub const SOC_RANGE: (f64, f64) = (0.0, 100.0);
pub const SPEED_RANGE: (f64, f64) = (0.0, 120.0);
pub const TEMP_RANGE: (f64, f64) = (15.0, 95.0);
pub const TIRE_RANGE: (f64, f64) = (1.8, 3.2);
pub const EFFICIENCY_RANGE: (f64, f64) = (4.0, 8.5);

const NOMINAL_TIRE_BAR: f64 = 2.4;
const BASELINE_EFFICIENCY: f64 = 6.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub soc: f64,
    pub speed: f64,
    pub distance: f64,
    pub charging: bool,
    pub temp: f64,
    pub lat: f64,
    pub lon: f64,
    pub tire_fl: f64,
    pub tire_fr: f64,
    pub tire_rl: f64,
    pub tire_rr: f64,
    pub efficiency: f64,
    pub regen: bool,
}

/// Full replacement of a vehicle's mutable fields for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePatch {
    pub soc: f64,
    pub speed: f64,
    pub distance: f64,
    pub charging: bool,
    pub temp: f64,
    pub lat: f64,
    pub lon: f64,
    pub tire_fl: f64,
    pub tire_fr: f64,
    pub tire_rl: f64,
    pub tire_rr: f64,
    pub efficiency: f64,
    pub regen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Moving,
    Charging,
    Idle,
}

impl Vehicle {
    /// Parked, cold-ish vehicle placed at the given position.
    pub fn parked(index: usize, soc: f64, temp: f64, lat: f64, lon: f64) -> Self {
        Self {
            id: format!("V{}", index + 1),
            name: format!("EV-{}", index + 1),
            soc,
            speed: 0.0,
            distance: 0.0,
            charging: false,
            temp,
            lat,
            lon,
            tire_fl: NOMINAL_TIRE_BAR,
            tire_fr: NOMINAL_TIRE_BAR,
            tire_rl: NOMINAL_TIRE_BAR,
            tire_rr: NOMINAL_TIRE_BAR,
            efficiency: BASELINE_EFFICIENCY,
            regen: false,
        }
    }

    /// Random starting state scattered around the base point.
    pub fn spawn<R: Rng + ?Sized>(index: usize, base: (f64, f64), rng: &mut R) -> Self {
        let soc = (40.0 + rng.gen_range(0.0..50.0_f64)).floor();
        let temp = rng.gen_range(22.0..38.0_f64).round();
        let lat = base.0 + rng.gen_range(-0.02..0.02);
        let lon = base.1 + rng.gen_range(-0.03..0.03);
        Self::parked(index, soc, temp, lat, lon)
    }

    pub fn is_moving(&self) -> bool {
        self.speed > 0.0
    }

    pub fn is_idle(&self) -> bool {
        self.speed == 0.0 && !self.charging
    }

    /// Card label. Charging wins over motion.
    pub fn status(&self) -> VehicleStatus {
        if self.charging {
            VehicleStatus::Charging
        } else if self.is_moving() {
            VehicleStatus::Moving
        } else {
            VehicleStatus::Idle
        }
    }

    /// Pull externally supplied values back into their documented ranges.
    pub fn clamp_bounds(&mut self) {
        self.soc = clamp(self.soc, SOC_RANGE);
        self.speed = clamp(self.speed, SPEED_RANGE);
        self.distance = self.distance.max(0.0);
        self.temp = clamp(self.temp, TEMP_RANGE);
        self.tire_fl = clamp(self.tire_fl, TIRE_RANGE);
        self.tire_fr = clamp(self.tire_fr, TIRE_RANGE);
        self.tire_rl = clamp(self.tire_rl, TIRE_RANGE);
        self.tire_rr = clamp(self.tire_rr, TIRE_RANGE);
        self.efficiency = clamp(self.efficiency, EFFICIENCY_RANGE);
    }

    pub fn apply(&mut self, patch: &VehiclePatch) {
        self.soc = patch.soc;
        self.speed = patch.speed;
        self.distance = patch.distance;
        self.charging = patch.charging;
        self.temp = patch.temp;
        self.lat = patch.lat;
        self.lon = patch.lon;
        self.tire_fl = patch.tire_fl;
        self.tire_fr = patch.tire_fr;
        self.tire_rl = patch.tire_rl;
        self.tire_rr = patch.tire_rr;
        self.efficiency = patch.efficiency;
        self.regen = patch.regen;
    }
}

pub fn clamp(value: f64, (min, max): (f64, f64)) -> f64 {
    value.clamp(min, max)
}
