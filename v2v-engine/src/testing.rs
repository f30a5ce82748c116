//! Fixtures shared by unit tests.

use crate::agents::{VehicleAgent, VehicleConfig};

/// 75 kWh vehicle at `charge` state of charge, 40 km/h, asking 0.20, 5 kWh rate,
/// sized for the default six-price ladder.
pub fn vehicle(id: u32, charge: f64, position_m: f64) -> VehicleAgent {
    vehicle_with(id, charge, position_m, 6, 5.0)
}

pub fn vehicle_with(id: u32, charge: f64, position_m: f64, ladder_len: usize, rate_kwh: f64) -> VehicleAgent {
    VehicleAgent::new(
        id,
        VehicleConfig {
            capacity_kwh: 75.0,
            initial_battery_kwh: charge * 75.0,
            asking_price: 0.20,
            max_charge_speed: rate_kwh,
            position_m,
            speed_kmh: 40.0,
            exploration_rate: 0.15,
        },
        ladder_len,
    )
}
