// src/logging.rs
// Event bus listeners that turn simulation events into log output.

use tracing::{debug, info, trace};

use crate::events::{EventListener, SimEvent};

/// Logs every event through `tracing`: round boundaries at `debug`, single
/// attempts at `trace`, and a line per settlement at `debug`.
#[derive(Debug, Default)]
pub struct TracingListener {
    settlements: usize,
    failures: usize,
}

impl TracingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settlements(&self) -> usize {
        self.settlements
    }

    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl EventListener for TracingListener {
    fn on_event(&mut self, event: &SimEvent) {
        match event {
            SimEvent::RoundStarted {
                round,
                buyers,
                sellers,
                neutral,
            } => {
                debug!(round, buyers, sellers, neutral, "round started");
            }
            SimEvent::Settled {
                round,
                buyer,
                seller,
                energy_kwh,
                price_per_kwh,
                tx_hash,
            } => {
                self.settlements += 1;
                debug!(round, buyer, seller, energy_kwh, price_per_kwh, %tx_hash, "transfer settled");
            }
            SimEvent::AttemptFailed {
                round,
                buyer,
                seller,
                reason,
            } => {
                self.failures += 1;
                trace!(round, ?buyer, ?seller, %reason, "attempt failed");
            }
            SimEvent::RoundFinished {
                round,
                settled,
                energy_kwh,
            } => {
                if *settled > 0 {
                    info!(round, settled, energy_kwh, "round cleared");
                } else {
                    debug!(round, "round cleared without settlements");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureReason;

    #[test]
    fn test_counts_outcomes() {
        let mut listener = TracingListener::new();
        listener.on_event(&SimEvent::AttemptFailed {
            round: 0,
            buyer: Some(1),
            seller: None,
            reason: FailureReason::NoSellerFound,
        });
        listener.on_event(&SimEvent::Settled {
            round: 0,
            buyer: 1,
            seller: 2,
            energy_kwh: 0.5,
            price_per_kwh: 0.2,
            tx_hash: "abc".to_string(),
        });
        listener.on_event(&SimEvent::RoundFinished {
            round: 0,
            settled: 1,
            energy_kwh: 0.5,
        });
        assert_eq!(listener.settlements(), 1);
        assert_eq!(listener.failures(), 1);
    }
}
