use rand::rngs::StdRng;

use crate::config::SimConfig;

pub mod pricing;
pub mod vehicle;

pub use vehicle::{FleetSnapshotEntry, VehicleAgent, VehicleConfig};

/// Build the initial fleet. Ids are `0..agent_count` in creation order.
pub fn spawn_fleet(config: &SimConfig, rng: &mut StdRng) -> Vec<VehicleAgent> {
    let ladder_len = config.market.price_ladder.len();
    (0..config.agent_count)
        .map(|i| {
            let vehicle = VehicleConfig::random(&config.fleet, &config.market, config.physics.road_length_m, rng);
            VehicleAgent::new(i as u32, vehicle, ladder_len)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_fleet_ids_and_determinism() {
        let config = SimConfig::new(10, 1, true, 99);
        let a = spawn_fleet(&config, &mut StdRng::seed_from_u64(config.seed));
        let b = spawn_fleet(&config, &mut StdRng::seed_from_u64(config.seed));

        assert_eq!(a.len(), 10);
        for (i, v) in a.iter().enumerate() {
            assert_eq!(v.id(), i as u32);
            assert!(v.current_battery_kwh() >= 0.0);
            assert!(v.current_battery_kwh() <= v.total_capacity_kwh());
        }
        let snap_a: Vec<_> = a.iter().map(|v| v.snapshot()).collect();
        let snap_b: Vec<_> = b.iter().map(|v| v.snapshot()).collect();
        assert_eq!(snap_a, snap_b);
    }
}
