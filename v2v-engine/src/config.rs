// src/config.rs
// Run configuration. Every constant of the market and of the physics lives here
// with the reference value as its default, so a scenario JSON only needs the
// fields it wants to change.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alignment::AlignmentModel;
use crate::error::{SimError, SimResult};
use crate::latency::NetworkLatency;

/// How the minimum-transfer floor interacts with the computed capacity bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferFloor {
    /// `max(min_transfer_kwh, computed)`: a paired buyer/seller always moves at
    /// least the floor, even past the 40%/60% thresholds.
    #[default]
    Slack,
    /// The computed bound is final; zero is allowed and logged as `zero_transfer`.
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketParams {
    /// Prices an agent may advertise once the policy has run.
    pub price_ladder: Vec<f64>,
    /// Prices an agent starts with before its first decision.
    pub initial_price_choices: Vec<f64>,
    pub exploration_rate: f64,
    /// Below this state of charge an agent buys; also the buyer's fill ceiling.
    pub buyer_threshold: f64,
    /// Above this state of charge an agent sells; also the seller's drain floor.
    pub seller_threshold: f64,
    /// When set, settled energy is fed back into the price memory.
    pub price_learning_rate: Option<f64>,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            price_ladder: vec![0.08, 0.12, 0.16, 0.20, 0.25, 0.30],
            initial_price_choices: vec![0.10, 0.12, 0.14, 0.16, 0.18, 0.20, 0.22, 0.24, 0.26],
            exploration_rate: 0.15,
            buyer_threshold: 0.40,
            seller_threshold: 0.60,
            price_learning_rate: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    pub inductive_range_m: f64,
    pub road_length_m: f64,
    /// Simulated seconds per round, used to turn km/h into metres per round.
    pub round_duration_s: f64,
    pub min_transfer_kwh: f64,
    pub transfer_floor: TransferFloor,
    /// Standard deviation of the sampled lane misalignment.
    pub lateral_offset_sd_m: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            inductive_range_m: 3.0,
            road_length_m: 800.0,
            round_duration_s: 0.01,
            min_transfer_kwh: 0.1,
            transfer_floor: TransferFloor::Slack,
            lateral_offset_sd_m: 0.1,
        }
    }
}

/// Distributions the initial fleet is drawn from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetParams {
    pub capacity_choices_kwh: Vec<f64>,
    pub initial_charge_min: f64,
    pub initial_charge_max: f64,
    pub charge_rate_choices_kwh: Vec<f64>,
    pub speed_min_kmh: f64,
    pub speed_max_kmh: f64,
}

impl Default for FleetParams {
    fn default() -> Self {
        Self {
            capacity_choices_kwh: vec![60.0, 75.0, 90.0],
            initial_charge_min: 0.12,
            initial_charge_max: 0.96,
            charge_rate_choices_kwh: vec![3.0, 5.0, 7.0],
            speed_min_kmh: 20.0,
            speed_max_kmh: 80.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_scenario_name")]
    pub scenario_name: String,
    #[serde(default = "default_agent_count")]
    pub agent_count: usize,
    #[serde(default = "default_round_count")]
    pub round_count: usize,
    #[serde(default = "default_fast_network")]
    pub fast_network: bool,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub market: MarketParams,
    #[serde(default)]
    pub physics: PhysicsParams,
    #[serde(default)]
    pub fleet: FleetParams,
    #[serde(default)]
    pub alignment: AlignmentModel,
    #[serde(default)]
    pub network: NetworkLatency,
}

fn default_scenario_name() -> String {
    "highway".to_string()
}

fn default_agent_count() -> usize {
    32
}

fn default_round_count() -> usize {
    120
}

fn default_fast_network() -> bool {
    true
}

fn default_seed() -> u64 {
    1234
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            scenario_name: default_scenario_name(),
            agent_count: default_agent_count(),
            round_count: default_round_count(),
            fast_network: default_fast_network(),
            seed: default_seed(),
            market: MarketParams::default(),
            physics: PhysicsParams::default(),
            fleet: FleetParams::default(),
            alignment: AlignmentModel::default(),
            network: NetworkLatency::default(),
        }
    }
}

impl SimConfig {
    /// Reference configuration with the four run-level knobs overridden.
    pub fn new(agent_count: usize, round_count: usize, fast_network: bool, seed: u64) -> Self {
        Self {
            agent_count,
            round_count,
            fast_network,
            seed,
            ..Self::default()
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reject configurations the engine cannot run without panicking or
    /// producing meaningless output.
    pub fn validate(&self) -> SimResult<()> {
        if self.agent_count == 0 {
            return Err(invalid("agent_count must be > 0"));
        }
        if self.round_count == 0 {
            return Err(invalid("round_count must be > 0"));
        }

        let m = &self.market;
        if m.price_ladder.is_empty() {
            return Err(invalid("market.price_ladder is empty"));
        }
        if m.initial_price_choices.is_empty() {
            return Err(invalid("market.initial_price_choices is empty"));
        }
        if m.price_ladder.iter().chain(&m.initial_price_choices).any(|p| !p.is_finite() || *p < 0.0) {
            return Err(invalid("prices must be finite and non-negative"));
        }
        if !(0.0..=1.0).contains(&m.exploration_rate) {
            return Err(invalid("market.exploration_rate must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&m.buyer_threshold)
            || !(0.0..=1.0).contains(&m.seller_threshold)
            || m.buyer_threshold > m.seller_threshold
        {
            return Err(invalid("thresholds must satisfy 0 <= buyer <= seller <= 1"));
        }
        if let Some(rate) = m.price_learning_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid("market.price_learning_rate must be within [0, 1]"));
            }
        }

        let p = &self.physics;
        if !(p.inductive_range_m > 0.0) {
            return Err(invalid("physics.inductive_range_m must be > 0"));
        }
        if !(p.road_length_m > 0.0) {
            return Err(invalid("physics.road_length_m must be > 0"));
        }
        if !(p.round_duration_s >= 0.0) {
            return Err(invalid("physics.round_duration_s must be >= 0"));
        }
        if !(p.min_transfer_kwh >= 0.0) {
            return Err(invalid("physics.min_transfer_kwh must be >= 0"));
        }
        if !(p.lateral_offset_sd_m >= 0.0) {
            return Err(invalid("physics.lateral_offset_sd_m must be >= 0"));
        }

        let f = &self.fleet;
        if f.capacity_choices_kwh.is_empty() || f.capacity_choices_kwh.iter().any(|c| !(*c > 0.0)) {
            return Err(invalid("fleet.capacity_choices_kwh must be non-empty and positive"));
        }
        if f.charge_rate_choices_kwh.is_empty() || f.charge_rate_choices_kwh.iter().any(|c| !(*c >= 0.0)) {
            return Err(invalid("fleet.charge_rate_choices_kwh must be non-empty and non-negative"));
        }
        if !(0.0 <= f.initial_charge_min && f.initial_charge_min < f.initial_charge_max && f.initial_charge_max <= 1.0) {
            return Err(invalid("fleet initial charge range must satisfy 0 <= min < max <= 1"));
        }
        if !(0.0 <= f.speed_min_kmh && f.speed_min_kmh < f.speed_max_kmh) {
            return Err(invalid("fleet speed range must satisfy 0 <= min < max"));
        }

        let n = &self.network;
        if !n.fast_base_ms.is_finite() || !n.slow_base_ms.is_finite() {
            return Err(invalid("network base latencies must be finite"));
        }
        if !(n.jitter_sd_ms.is_finite() && n.jitter_sd_ms >= 0.0) {
            return Err(invalid("network.jitter_sd_ms must be finite and >= 0"));
        }
        if !(n.floor_ms.is_finite() && n.floor_ms > 0.0) {
            return Err(invalid("network.floor_ms must be > 0"));
        }

        let a = &self.alignment;
        if !(a.base_score > 0.0 && a.base_score <= 1.0) {
            return Err(invalid("alignment.base_score must be within (0, 1]"));
        }
        if !(a.gap_sd_m > 0.0 && a.lateral_sd_m > 0.0 && a.speed_decay_kmh > 0.0) {
            return Err(invalid("alignment spreads and speed decay must be > 0"));
        }
        if !(a.min_gap_m >= 0.0) || !(0.0..=1.0).contains(&a.out_of_range_penalty) {
            return Err(invalid("alignment.min_gap_m must be >= 0 and out_of_range_penalty within [0, 1]"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> SimError {
    SimError::InvalidConfig(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent_count, 32);
        assert_eq!(config.round_count, 120);
        assert!(config.fast_network);
        assert_eq!(config.seed, 1234);
        assert_eq!(config.physics.transfer_floor, TransferFloor::Slack);
        assert!(config.market.price_learning_rate.is_none());
    }

    #[test]
    fn test_zero_counts_rejected() {
        assert!(matches!(
            SimConfig::new(0, 10, true, 1).validate(),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimConfig::new(10, 0, true, 1).validate(),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut config = SimConfig::default();
        config.market.buyer_threshold = 0.7;
        config.market.seller_threshold = 0.3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_ladder_rejected() {
        let mut config = SimConfig::default();
        config.market.price_ladder.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "agent_count": 6,
            "physics": { "transfer_floor": "strict" },
            "market": { "price_ladder": [0.2] }
        }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.agent_count, 6);
        assert_eq!(config.round_count, 120);
        assert_eq!(config.physics.transfer_floor, TransferFloor::Strict);
        assert_eq!(config.physics.inductive_range_m, 3.0);
        assert_eq!(config.market.price_ladder, vec![0.2]);
        assert_eq!(config.market.exploration_rate, 0.15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shipped_scenarios_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");

        let highway = SimConfig::from_file(dir.join("highway.json")).unwrap();
        assert!(highway.validate().is_ok());
        assert_eq!(highway.agent_count, 32);

        let platoon = SimConfig::from_file(dir.join("dense_platoon.json")).unwrap();
        assert!(platoon.validate().is_ok());
        assert_eq!(platoon.physics.transfer_floor, TransferFloor::Strict);
        assert_eq!(platoon.market.price_learning_rate, Some(0.1));
        assert_eq!(platoon.physics.inductive_range_m, 3.0);
    }

    #[test]
    fn test_negative_latency_floor_rejected() {
        let json = r#"{
            "physics": { "road_length_m": 30.0 },
            "network": { "fast_base_ms": -500.0, "floor_ms": -100.0 }
        }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        let mut config = SimConfig::default();
        config.network.floor_ms = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.network.slow_base_ms = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_degenerate_alignment_rejected() {
        let mut config = SimConfig::default();
        config.alignment.lateral_sd_m = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.alignment.gap_sd_m = -0.8;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.alignment.speed_decay_kmh = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.alignment.base_score = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimConfig::from_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
