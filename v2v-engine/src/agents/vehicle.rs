use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

use crate::agents::pricing::{choose_price_index, PriceMemory};
use crate::config::{FleetParams, MarketParams};
use crate::types::{AgentId, Role};

/// Initial attributes of a vehicle.
#[derive(Debug, Clone)]
pub struct VehicleConfig {
    pub capacity_kwh: f64,
    pub initial_battery_kwh: f64,
    pub asking_price: f64,
    /// Most energy the vehicle can move in one round, in either direction.
    pub max_charge_speed: f64,
    pub position_m: f64,
    pub speed_kmh: f64,
    pub exploration_rate: f64,
}

impl VehicleConfig {
    /// Draw a random vehicle. Draw order: capacity, charge fraction, price,
    /// charge rate, position, speed.
    pub fn random(fleet: &FleetParams, market: &MarketParams, road_length_m: f64, rng: &mut StdRng) -> Self {
        let capacity_kwh = pick(&fleet.capacity_choices_kwh, rng);
        let charge_fraction = rng.gen_range(fleet.initial_charge_min..fleet.initial_charge_max);
        let asking_price = pick(&market.initial_price_choices, rng);
        let max_charge_speed = pick(&fleet.charge_rate_choices_kwh, rng);
        let position_m = rng.gen_range(0.0..road_length_m);
        let speed_kmh = rng.gen_range(fleet.speed_min_kmh..fleet.speed_max_kmh);

        Self {
            capacity_kwh,
            initial_battery_kwh: charge_fraction * capacity_kwh,
            asking_price,
            max_charge_speed,
            position_m,
            speed_kmh,
            exploration_rate: market.exploration_rate,
        }
    }
}

fn pick(choices: &[f64], rng: &mut StdRng) -> f64 {
    choices[rng.gen_range(0..choices.len())]
}

/// Final per-vehicle state handed to consumers of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSnapshotEntry {
    pub id: AgentId,
    pub battery_percentage: f64,
    pub current_battery_kwh: f64,
    pub total_capacity_kwh: f64,
    pub asking_price: f64,
    pub position_m: f64,
    pub speed_kmh: f64,
}

#[derive(Debug, Clone)]
pub struct VehicleAgent {
    id: AgentId,
    current_battery_kwh: f64,
    total_capacity_kwh: f64,
    role: Role,
    asking_price: f64,
    /// Ladder index of `asking_price`; `None` until the first decision.
    price_index: Option<usize>,
    max_charge_speed: f64,
    position_on_road: f64,
    current_speed_kmh: f64,
    price_memory: PriceMemory,
    exploration_rate: f64,
}

impl VehicleAgent {
    pub fn new(id: AgentId, config: VehicleConfig, ladder_len: usize) -> Self {
        let total_capacity_kwh = config.capacity_kwh;
        Self {
            id,
            current_battery_kwh: config.initial_battery_kwh.clamp(0.0, total_capacity_kwh),
            total_capacity_kwh,
            role: Role::Neutral,
            asking_price: config.asking_price,
            price_index: None,
            max_charge_speed: config.max_charge_speed,
            position_on_road: config.position_m,
            current_speed_kmh: config.speed_kmh,
            price_memory: PriceMemory::new(ladder_len),
            exploration_rate: config.exploration_rate,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn asking_price(&self) -> f64 {
        self.asking_price
    }

    pub fn current_battery_kwh(&self) -> f64 {
        self.current_battery_kwh
    }

    pub fn total_capacity_kwh(&self) -> f64 {
        self.total_capacity_kwh
    }

    pub fn battery_percentage(&self) -> f64 {
        self.current_battery_kwh / self.total_capacity_kwh
    }

    pub fn max_charge_speed(&self) -> f64 {
        self.max_charge_speed
    }

    pub fn position_m(&self) -> f64 {
        self.position_on_road
    }

    pub fn speed_kmh(&self) -> f64 {
        self.current_speed_kmh
    }

    pub fn price_memory(&self) -> &PriceMemory {
        &self.price_memory
    }

    /// Classify by state of charge: buyer below `buyer_threshold`, seller above
    /// `seller_threshold`, neutral in between (inclusive).
    pub fn decide_role(&mut self, buyer_threshold: f64, seller_threshold: f64) -> Role {
        let pct = self.battery_percentage();
        self.role = if pct < buyer_threshold {
            Role::Buyer
        } else if pct > seller_threshold {
            Role::Seller
        } else {
            Role::Neutral
        };
        self.role
    }

    /// Epsilon-greedy choice over `ladder`. The result is always a ladder member.
    pub fn select_price(&mut self, ladder: &[f64], rng: &mut StdRng) -> f64 {
        let index = choose_price_index(&self.price_memory, self.exploration_rate, rng);
        self.price_index = Some(index);
        self.asking_price = ladder[index];
        self.asking_price
    }

    /// Override the advertised price, detaching it from the ladder.
    pub fn set_asking_price(&mut self, price: f64) {
        self.asking_price = price;
        self.price_index = None;
    }

    /// Feed a settlement back into the value of the currently advertised price.
    pub fn reinforce(&mut self, reward: f64, learning_rate: f64) {
        if let Some(index) = self.price_index {
            self.price_memory.reinforce(index, reward, learning_rate);
        }
    }

    /// Energy this buyer may still take before reaching `ceiling` of capacity.
    pub fn headroom_to(&self, ceiling: f64) -> f64 {
        (ceiling * self.total_capacity_kwh - self.current_battery_kwh).max(0.0)
    }

    /// Energy this seller may give before dropping to `floor` of capacity.
    pub fn surplus_above(&self, floor: f64) -> f64 {
        (self.current_battery_kwh - floor * self.total_capacity_kwh).max(0.0)
    }

    /// Room left before the battery is physically full.
    pub fn free_capacity_kwh(&self) -> f64 {
        (self.total_capacity_kwh - self.current_battery_kwh).max(0.0)
    }

    pub fn charge(&mut self, kwh: f64) {
        self.current_battery_kwh = (self.current_battery_kwh + kwh).min(self.total_capacity_kwh);
    }

    pub fn discharge(&mut self, kwh: f64) {
        self.current_battery_kwh = (self.current_battery_kwh - kwh).max(0.0);
    }

    /// Constant-speed motion on a circular road.
    pub fn advance(&mut self, road_length_m: f64, round_duration_s: f64) {
        let metres = self.current_speed_kmh * 1000.0 / 3600.0 * round_duration_s;
        self.position_on_road = (self.position_on_road + metres).rem_euclid(road_length_m);
    }

    pub fn snapshot(&self) -> FleetSnapshotEntry {
        FleetSnapshotEntry {
            id: self.id,
            battery_percentage: self.battery_percentage(),
            current_battery_kwh: self.current_battery_kwh,
            total_capacity_kwh: self.total_capacity_kwh,
            asking_price: self.asking_price,
            position_m: self.position_on_road,
            speed_kmh: self.current_speed_kmh,
        }
    }
}
