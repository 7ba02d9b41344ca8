// Random-walk telemetry simulator - one vehicle, one tick
use crate::domain::vehicle::{
    EFFICIENCY_RANGE, SOC_RANGE, SPEED_RANGE, TEMP_RANGE, TIRE_RANGE, Vehicle, VehiclePatch, clamp,
};
use rand::Rng;

/// Elapsed time assumed for the first tick after start.
pub const DEFAULT_TICK_SECS: f64 = 1.5;

const MOVE_PROBABILITY: f64 = 0.55;
const IDLE_TOP_UP_PROBABILITY: f64 = 0.3;
const REGEN_PROBABILITY: f64 = 0.4;
const CHARGE_CEILING: f64 = 95.0;
const HOT_MOTOR: f64 = 60.0;
const BASELINE_EFFICIENCY: f64 = 6.5;

/// Efficiency multiplier by speed band: best around 60-90 km/h.
pub fn efficiency_factor(speed: f64) -> f64 {
    if speed < 20.0 {
        0.85
    } else if speed < 60.0 {
        1.05
    } else if speed < 90.0 {
        1.1
    } else if speed < 120.0 {
        0.95
    } else {
        0.85
    }
}

pub fn step_vehicle<R: Rng + ?Sized>(vehicle: &Vehicle, dt_secs: f64, rng: &mut R) -> VehiclePatch {
    let still_charging = vehicle.charging && vehicle.soc < CHARGE_CEILING;
    let moving = !still_charging && rng.gen_bool(MOVE_PROBABILITY);

    let speed = if moving {
        clamp(vehicle.speed + rng.gen_range(-3.0..8.0), SPEED_RANGE)
    } else {
        0.0
    };

    let mut soc = vehicle.soc;
    if moving {
        soc = clamp(soc - rng.gen_range(0.02..0.08), SOC_RANGE);
    } else if vehicle.charging
        || (vehicle.soc < CHARGE_CEILING && rng.gen_bool(IDLE_TOP_UP_PROBABILITY))
    {
        soc = clamp(soc + rng.gen_range(0.4..1.2), SOC_RANGE);
    }
    let charging = (!moving && soc > vehicle.soc) || (vehicle.charging && soc < CHARGE_CEILING);

    let distance = vehicle.distance + speed * dt_secs.max(0.0) / 3600.0;

    let (mut lat, mut lon) = (vehicle.lat, vehicle.lon);
    if moving {
        let factor = speed / SPEED_RANGE.1;
        lat += rng.gen_range(-0.0005..0.0005) * factor;
        lon += rng.gen_range(-0.0008..0.0008) * factor;
    }

    let temp = if moving {
        clamp(vehicle.temp + rng.gen_range(0.2..1.0), TEMP_RANGE)
    } else {
        clamp(vehicle.temp - rng.gen_range(0.5..1.2), TEMP_RANGE)
    };

    // Pressures creep up while moving and when the motor runs hot.
    let heat_bump = if moving { 0.01 } else { -0.005 };
    let hot_bump = if temp > HOT_MOTOR { 0.005 } else { 0.0 };
    let mut drift = |pressure: f64| {
        clamp(pressure + rng.gen_range(-0.01..0.02) + hot_bump + heat_bump, TIRE_RANGE)
    };
    let tire_fl = drift(vehicle.tire_fl);
    let tire_fr = drift(vehicle.tire_fr);
    let tire_rl = drift(vehicle.tire_rl);
    let tire_rr = drift(vehicle.tire_rr);

    let efficiency = clamp(
        BASELINE_EFFICIENCY * efficiency_factor(speed) + rng.gen_range(-0.15..0.15),
        EFFICIENCY_RANGE,
    );

    let regen = vehicle.speed > speed && speed > 0.0 && rng.gen_bool(REGEN_PROBABILITY);

    VehiclePatch {
        soc,
        speed,
        distance,
        charging,
        temp,
        lat,
        lon,
        tire_fl,
        tire_fr,
        tire_rl,
        tire_rr,
        efficiency,
        regen,
    }
}
