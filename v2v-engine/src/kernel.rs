// src/kernel.rs
// Round-driven simulation kernel: owns the seeded rng, the fleet, the ledger
// and the event bus, and advances the world one round at a time.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::agents::{spawn_fleet, VehicleAgent};
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::events::{EventBus, SimEvent};
use crate::latency::LatencyModel;
use crate::ledger::Ledger;
use crate::matching::{MatchingEngine, RoundContext, RoundOutcome};
use crate::report::RunOutput;
use crate::types::Role;

/// Simulation kernel.
///
/// Draw order from the single rng is fixed: fleet creation first, then per
/// round the agents' price decisions in fleet order, then the matching sweep.
pub struct Kernel {
    config: SimConfig,
    round: usize,
    rng: StdRng,
    fleet: Vec<VehicleAgent>,
    engine: MatchingEngine,
    latency: Box<dyn LatencyModel>,
    ledger: Ledger,
    event_bus: EventBus,
}

impl Kernel {
    /// Validate `config`, seed the rng and draw a random fleet.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let latency: Box<dyn LatencyModel> = Box::new(config.network.for_mode(config.fast_network)?);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let fleet = spawn_fleet(&config, &mut rng);
        Self::assemble(config, rng, fleet, latency)
    }

    /// Run with a hand-built fleet and latency model. `agent_count` is taken
    /// from the fleet; the rng is still seeded from `config.seed`.
    pub fn with_fleet(
        mut config: SimConfig,
        fleet: Vec<VehicleAgent>,
        latency: Box<dyn LatencyModel>,
    ) -> SimResult<Self> {
        config.agent_count = fleet.len();
        config.validate()?;
        let ladder_len = config.market.price_ladder.len();
        if let Some(agent) = fleet.iter().find(|a| a.price_memory().len() != ladder_len) {
            return Err(SimError::InvalidConfig(format!(
                "agent {} has price memory for {} prices, ladder has {}",
                agent.id(),
                agent.price_memory().len(),
                ladder_len
            )));
        }
        let rng = StdRng::seed_from_u64(config.seed);
        Self::assemble(config, rng, fleet, latency)
    }

    fn assemble(
        config: SimConfig,
        rng: StdRng,
        fleet: Vec<VehicleAgent>,
        latency: Box<dyn LatencyModel>,
    ) -> SimResult<Self> {
        let engine = MatchingEngine::new(&config)?;
        Ok(Self {
            config,
            round: 0,
            rng,
            fleet,
            engine,
            latency,
            ledger: Ledger::new(),
            event_bus: EventBus::new(),
        })
    }

    /// Access to the event bus (for SimEngine to subscribe loggers).
    pub fn event_bus_mut(&mut self) -> &mut EventBus {
        &mut self.event_bus
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn fleet(&self) -> &[VehicleAgent] {
        &self.fleet
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Index of the next round to run.
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn is_finished(&self) -> bool {
        self.round >= self.config.round_count
    }

    /// Run one round. Returns `None` once `round_count` rounds have run.
    pub fn step(&mut self) -> Option<RoundOutcome> {
        if self.is_finished() {
            return None;
        }
        let round = self.round;
        let market = &self.config.market;

        // 1. Every vehicle decides, in fleet order.
        let (mut buyers, mut sellers, mut neutral) = (0, 0, 0);
        for agent in self.fleet.iter_mut() {
            match agent.decide_role(market.buyer_threshold, market.seller_threshold) {
                Role::Buyer => buyers += 1,
                Role::Seller => sellers += 1,
                Role::Neutral => neutral += 1,
            }
            agent.select_price(&market.price_ladder, &mut self.rng);
        }
        self.event_bus.emit(SimEvent::RoundStarted {
            round,
            buyers,
            sellers,
            neutral,
        });

        // 2-3. Clear the market; unmatched vehicles are logged by the engine.
        let outcome = {
            let mut ctx = RoundContext {
                round,
                rng: &mut self.rng,
                latency: self.latency.as_ref(),
                ledger: &mut self.ledger,
                events: &mut self.event_bus,
            };
            self.engine.clear_round(&mut self.fleet, &mut ctx)
        };

        // 4. Everyone drives on.
        let physics = &self.config.physics;
        for agent in self.fleet.iter_mut() {
            agent.advance(physics.road_length_m, physics.round_duration_s);
        }

        self.event_bus.emit(SimEvent::RoundFinished {
            round,
            settled: outcome.settled,
            energy_kwh: outcome.energy_kwh,
        });
        self.round += 1;
        Some(outcome)
    }

    /// Run every remaining round.
    pub fn run(&mut self) {
        info!(
            scenario = %self.config.scenario_name,
            agents = self.fleet.len(),
            rounds = self.config.round_count,
            fast_network = self.config.fast_network,
            seed = self.config.seed,
            "starting simulation"
        );

        while self.step().is_some() {}

        info!(
            rounds = self.round,
            attempts = self.ledger.attempts().len(),
            settlements = self.ledger.transactions().len(),
            "simulation finished"
        );
    }

    /// Consume the kernel into the attempt log, the final fleet snapshot and the ledger.
    pub fn into_output(self) -> RunOutput {
        let fleet = self.fleet.iter().map(VehicleAgent::snapshot).collect();
        let (attempts, ledger) = self.ledger.into_parts();
        RunOutput {
            attempts,
            fleet,
            ledger,
        }
    }
}
