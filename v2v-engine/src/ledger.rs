// src/ledger.rs
// Append-only record stores: the attempt log (every matching attempt) and the
// settlement ledger (successful transfers only, each with a fingerprint).

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::types::{AgentId, FailureReason};

/// Hex characters kept from the SHA-256 digest.
const FINGERPRINT_LEN: usize = 12;

/// One matching attempt, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub round: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<AgentId>,
    pub energy_kwh: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_kwh: Option<f64>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_gap_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl AttemptRecord {
    /// Failed attempt with no energy moved. Optional fields are filled with the
    /// `with_*` builders.
    pub fn failure(round: usize, reason: FailureReason) -> Self {
        Self {
            round,
            buyer_id: None,
            seller_id: None,
            energy_kwh: 0.0,
            price_per_kwh: None,
            success: false,
            reason: Some(reason),
            latency_ms: None,
            distance_gap_m: None,
            alignment_quality: None,
            total_cost: None,
            tx_hash: None,
        }
    }

    pub fn with_buyer(mut self, id: AgentId) -> Self {
        self.buyer_id = Some(id);
        self
    }

    pub fn with_seller(mut self, id: AgentId) -> Self {
        self.seller_id = Some(id);
        self
    }

    pub fn with_price(mut self, price_per_kwh: f64) -> Self {
        self.price_per_kwh = Some(price_per_kwh);
        self
    }

    pub fn with_distance_gap(mut self, distance_gap_m: f64) -> Self {
        self.distance_gap_m = Some(distance_gap_m);
        self
    }

    pub fn with_link(mut self, latency_ms: f64, alignment_quality: f64) -> Self {
        self.latency_ms = Some(latency_ms);
        self.alignment_quality = Some(alignment_quality);
        self
    }
}

impl From<&TransactionRecord> for AttemptRecord {
    fn from(tx: &TransactionRecord) -> Self {
        Self {
            round: tx.round,
            buyer_id: Some(tx.buyer_id),
            seller_id: Some(tx.seller_id),
            energy_kwh: tx.energy_kwh,
            price_per_kwh: Some(tx.price_per_kwh),
            success: true,
            reason: None,
            latency_ms: Some(tx.latency_ms),
            distance_gap_m: Some(tx.distance_gap_m),
            alignment_quality: Some(tx.alignment_quality),
            total_cost: Some(tx.total_cost),
            tx_hash: Some(tx.tx_hash.clone()),
        }
    }
}

/// A settled energy transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub buyer_id: AgentId,
    pub seller_id: AgentId,
    pub energy_kwh: f64,
    pub price_per_kwh: f64,
    pub total_cost: f64,
    pub round: usize,
    pub latency_ms: f64,
    pub distance_gap_m: f64,
    pub alignment_quality: f64,
    pub tx_hash: String,
}

impl TransactionRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        round: usize,
        buyer_id: AgentId,
        seller_id: AgentId,
        energy_kwh: f64,
        price_per_kwh: f64,
        latency_ms: f64,
        distance_gap_m: f64,
        alignment_quality: f64,
    ) -> Self {
        let mut tx = Self {
            buyer_id,
            seller_id,
            energy_kwh,
            price_per_kwh,
            total_cost: price_per_kwh * energy_kwh,
            round,
            latency_ms,
            distance_gap_m,
            alignment_quality,
            tx_hash: String::new(),
        };
        tx.tx_hash = tx.fingerprint();
        tx
    }

    /// Fixed-order text form of every field except `tx_hash`.
    /// f64 `Display` is the shortest round-tripping decimal, so equal values
    /// always render identically.
    pub fn canonical_form(&self) -> String {
        format!(
            "buyer_id={};seller_id={};energy_kwh={};price_per_kwh={};total_cost={};round={};latency_ms={};distance_gap_m={};alignment_quality={}",
            self.buyer_id,
            self.seller_id,
            self.energy_kwh,
            self.price_per_kwh,
            self.total_cost,
            self.round,
            self.latency_ms,
            self.distance_gap_m,
            self.alignment_quality,
        )
    }

    /// Truncated SHA-256 of [`canonical_form`](Self::canonical_form).
    /// Audit identifier only.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_form().as_bytes());
        let mut hash = hex::encode(hasher.finalize());
        hash.truncate(FINGERPRINT_LEN);
        hash
    }
}

#[derive(Debug, Default)]
pub struct Ledger {
    attempts: Vec<AttemptRecord>,
    transactions: Vec<TransactionRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a settlement to the ledger and, as a successful attempt, to the log.
    pub fn record_success(&mut self, tx: TransactionRecord) {
        self.attempts.push(AttemptRecord::from(&tx));
        self.transactions.push(tx);
    }

    /// Append a failed attempt to the log only.
    pub fn record_failure(&mut self, entry: AttemptRecord) {
        debug_assert!(!entry.success && entry.reason.is_some());
        self.attempts.push(entry);
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn into_parts(self) -> (Vec<AttemptRecord>, Vec<TransactionRecord>) {
        (self.attempts, self.transactions)
    }
}
