// src/report.rs
// The three data products of a run and the headline figures derived from them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::agents::FleetSnapshotEntry;
use crate::ledger::{AttemptRecord, TransactionRecord};

/// Everything a run hands to its consumers.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub attempts: Vec<AttemptRecord>,
    pub fleet: Vec<FleetSnapshotEntry>,
    pub ledger: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_energy_kwh: f64,
    pub successful_deals: usize,
    pub failed_attempts: usize,
    /// Mean over every attempt that carries a latency sample.
    pub avg_latency_ms: Option<f64>,
    pub total_value: f64,
    /// Settled energy per round, only for rounds with at least one settlement.
    pub energy_timeline: Vec<(usize, f64)>,
}

impl RunOutput {
    pub fn summary(&self) -> RunSummary {
        let mut timeline: BTreeMap<usize, f64> = BTreeMap::new();
        for a in self.attempts.iter().filter(|a| a.success) {
            *timeline.entry(a.round).or_insert(0.0) += a.energy_kwh;
        }

        let latencies: Vec<f64> = self.attempts.iter().filter_map(|a| a.latency_ms).collect();
        let avg_latency_ms = if latencies.is_empty() {
            None
        } else {
            Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
        };

        RunSummary {
            total_energy_kwh: timeline.values().sum(),
            successful_deals: self.attempts.iter().filter(|a| a.success).count(),
            failed_attempts: self.attempts.iter().filter(|a| !a.success).count(),
            avg_latency_ms,
            total_value: self.ledger.iter().map(|t| t.total_cost).sum(),
            energy_timeline: timeline.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureReason;

    #[test]
    fn test_summary_figures() {
        let tx1 = TransactionRecord::new(0, 1, 2, 1.0, 0.2, 20.0, 1.0, 0.9);
        let tx2 = TransactionRecord::new(2, 3, 4, 0.5, 0.1, 40.0, 1.0, 0.9);
        let zero = AttemptRecord::failure(1, FailureReason::ZeroTransfer)
            .with_buyer(1)
            .with_seller(2)
            .with_link(60.0, 0.1);
        let output = RunOutput {
            attempts: vec![
                AttemptRecord::from(&tx1),
                zero,
                AttemptRecord::failure(1, FailureReason::NoSellerFound).with_buyer(5),
                AttemptRecord::from(&tx2),
            ],
            fleet: Vec::new(),
            ledger: vec![tx1, tx2],
        };

        let s = output.summary();
        assert_eq!(s.successful_deals, 2);
        assert_eq!(s.failed_attempts, 2);
        assert!((s.total_energy_kwh - 1.5).abs() < 1e-12);
        assert_eq!(s.avg_latency_ms, Some(40.0));
        assert!((s.total_value - 0.25).abs() < 1e-12);
        assert_eq!(s.energy_timeline, vec![(0, 1.0), (2, 0.5)]);
    }

    #[test]
    fn test_empty_summary() {
        let output = RunOutput {
            attempts: Vec::new(),
            fleet: Vec::new(),
            ledger: Vec::new(),
        };
        let s = output.summary();
        assert_eq!(s.successful_deals, 0);
        assert_eq!(s.avg_latency_ms, None);
        assert!(s.energy_timeline.is_empty());
    }
}
