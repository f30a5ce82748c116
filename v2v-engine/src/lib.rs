//! Round-based vehicle-to-vehicle energy market.
//!
//! Vehicles classify themselves each round as buyers, sellers or neutral from
//! their state of charge, pick an asking price with an epsilon-greedy policy,
//! and are cleared through a greedy double auction constrained by price and by
//! inductive charging range. A run returns the attempt log, the final fleet
//! snapshot and the settlement ledger.
//!
//! ```no_run
//! let output = v2v_engine::run(32, 120, true, 1234).unwrap();
//! println!("{} transfers settled", output.ledger.len());
//! ```

pub mod agents;
pub mod alignment;
pub mod config;
pub mod error;
pub mod events;
pub mod kernel;
pub mod latency;
pub mod ledger;
pub mod logging;
pub mod matching;
pub mod report;
pub mod sim_engine;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{SimConfig, TransferFloor};
pub use error::{SimError, SimResult};
pub use report::{RunOutput, RunSummary};
pub use sim_engine::{run, SimEngine};
