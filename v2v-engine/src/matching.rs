// src/matching.rs
// Per-round double auction: partition by role, sort by price, one greedy
// two-pointer sweep with price-crossing and inductive-range checks, then
// bounded energy transfer for every physically eligible pair.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::agents::VehicleAgent;
use crate::alignment::AlignmentModel;
use crate::config::{MarketParams, PhysicsParams, SimConfig, TransferFloor};
use crate::error::{SimError, SimResult};
use crate::events::{EventBus, SimEvent};
use crate::latency::LatencyModel;
use crate::ledger::{AttemptRecord, Ledger, TransactionRecord};
use crate::types::{AgentId, FailureReason, Role};

/// Counts for one cleared round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundOutcome {
    pub buyers: usize,
    pub sellers: usize,
    pub neutral: usize,
    pub settled: usize,
    pub energy_kwh: f64,
}

/// Shared sinks and sources for one clearing pass.
pub struct RoundContext<'a> {
    pub round: usize,
    pub rng: &'a mut StdRng,
    pub latency: &'a dyn LatencyModel,
    pub ledger: &'a mut Ledger,
    pub events: &'a mut EventBus,
}

impl RoundContext<'_> {
    fn fail(&mut self, entry: AttemptRecord) {
        self.events.emit(SimEvent::AttemptFailed {
            round: entry.round,
            buyer: entry.buyer_id,
            seller: entry.seller_id,
            reason: entry.reason.unwrap_or(FailureReason::ZeroTransfer),
        });
        self.ledger.record_failure(entry);
    }

    fn settle(&mut self, tx: TransactionRecord) {
        self.events.emit(SimEvent::Settled {
            round: tx.round,
            buyer: tx.buyer_id,
            seller: tx.seller_id,
            energy_kwh: tx.energy_kwh,
            price_per_kwh: tx.price_per_kwh,
            tx_hash: tx.tx_hash.clone(),
        });
        self.ledger.record_success(tx);
    }
}

pub struct MatchingEngine {
    market: MarketParams,
    physics: PhysicsParams,
    alignment: AlignmentModel,
    lateral_offset: Normal<f64>,
}

impl MatchingEngine {
    pub fn new(config: &SimConfig) -> SimResult<Self> {
        let sd = config.physics.lateral_offset_sd_m;
        if !(sd.is_finite() && sd >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "lateral offset sd {} must be finite and >= 0",
                sd
            )));
        }
        Ok(Self {
            market: config.market.clone(),
            physics: config.physics.clone(),
            alignment: config.alignment.clone(),
            lateral_offset: Normal::new(0.0, config.physics.lateral_offset_sd_m)?,
        })
    }

    /// Clear one round over `fleet`. Every buyer and seller is considered at
    /// most once; skipped pairs are never revisited within the round.
    pub fn clear_round(&self, fleet: &mut [VehicleAgent], ctx: &mut RoundContext<'_>) -> RoundOutcome {
        let mut outcome = RoundOutcome::default();
        let mut buyers = Vec::new();
        let mut sellers = Vec::new();

        for (idx, agent) in fleet.iter_mut().enumerate() {
            match agent.decide_role(self.market.buyer_threshold, self.market.seller_threshold) {
                Role::Buyer => buyers.push(idx),
                Role::Seller => sellers.push(idx),
                Role::Neutral => outcome.neutral += 1,
            }
        }
        outcome.buyers = buyers.len();
        outcome.sellers = sellers.len();

        // Stable sorts: equal prices keep fleet order.
        buyers.sort_by(|&a, &b| fleet[b].asking_price().total_cmp(&fleet[a].asking_price()));
        sellers.sort_by(|&a, &b| fleet[a].asking_price().total_cmp(&fleet[b].asking_price()));

        let mut matched_buyers: HashSet<AgentId> = HashSet::new();
        let mut matched_sellers: HashSet<AgentId> = HashSet::new();
        let range = self.physics.inductive_range_m;

        let (mut b_idx, mut s_idx) = (0, 0);
        while b_idx < buyers.len() && s_idx < sellers.len() {
            let (b, s) = (buyers[b_idx], sellers[s_idx]);
            let buyer_id = fleet[b].id();
            let seller_id = fleet[s].id();

            // Sellers are ascending, so no later seller can satisfy this buyer.
            if fleet[b].asking_price() < fleet[s].asking_price() {
                ctx.fail(
                    AttemptRecord::failure(ctx.round, FailureReason::PriceMismatch)
                        .with_buyer(buyer_id)
                        .with_seller(seller_id),
                );
                b_idx += 1;
                continue;
            }

            let distance_gap = (fleet[b].position_m() - fleet[s].position_m()).abs();
            if distance_gap > range {
                ctx.fail(
                    AttemptRecord::failure(ctx.round, FailureReason::OutOfRange)
                        .with_buyer(buyer_id)
                        .with_seller(seller_id)
                        .with_distance_gap(distance_gap),
                );
                b_idx += 1;
                s_idx += 1;
                continue;
            }

            let (buyer, seller) = pair_mut(fleet, b, s);
            if let Some(energy) = self.negotiate(buyer, seller, distance_gap, ctx) {
                matched_buyers.insert(buyer_id);
                matched_sellers.insert(seller_id);
                outcome.settled += 1;
                outcome.energy_kwh += energy;
            }

            b_idx += 1;
            s_idx += 1;
        }

        // Scoped to this round's settlements only.
        for &b in &buyers {
            let id = fleet[b].id();
            if !matched_buyers.contains(&id) {
                ctx.fail(AttemptRecord::failure(ctx.round, FailureReason::NoSellerFound).with_buyer(id));
            }
        }
        for &s in &sellers {
            let id = fleet[s].id();
            if !matched_sellers.contains(&id) {
                ctx.fail(AttemptRecord::failure(ctx.round, FailureReason::NoBuyerFound).with_seller(id));
            }
        }

        outcome
    }

    /// Score the link of an eligible pair and move energy. Draws the lateral
    /// offset, then the latency. Returns the energy moved on success.
    fn negotiate(
        &self,
        buyer: &mut VehicleAgent,
        seller: &mut VehicleAgent,
        distance_gap: f64,
        ctx: &mut RoundContext<'_>,
    ) -> Option<f64> {
        let range = self.physics.inductive_range_m;
        let lateral_offset = self.lateral_offset.sample(&mut *ctx.rng);
        let speed_diff = (buyer.speed_kmh() - seller.speed_kmh()).abs();
        let alignment_quality = self.alignment.score(distance_gap, lateral_offset, speed_diff, range);
        let latency_ms = ctx.latency.sample_ms(&mut *ctx.rng);
        let final_price = (buyer.asking_price() + seller.asking_price()) / 2.0;

        let efficiency = (alignment_quality * (1.0 - distance_gap / range)).max(0.0);
        let energy = self.energy_to_move(efficiency, buyer, seller);

        if energy <= 0.0 {
            ctx.fail(
                AttemptRecord::failure(ctx.round, FailureReason::ZeroTransfer)
                    .with_buyer(buyer.id())
                    .with_seller(seller.id())
                    .with_price(final_price)
                    .with_distance_gap(distance_gap)
                    .with_link(latency_ms, alignment_quality),
            );
            return None;
        }

        buyer.charge(energy);
        seller.discharge(energy);

        if let Some(rate) = self.market.price_learning_rate {
            buyer.reinforce(energy, rate);
            seller.reinforce(energy, rate);
        }

        ctx.settle(TransactionRecord::new(
            ctx.round,
            buyer.id(),
            seller.id(),
            energy,
            final_price,
            latency_ms,
            distance_gap,
            alignment_quality,
        ));
        Some(energy)
    }

    /// Largest transfer both parties allow this round: charge rates, the
    /// buyer's headroom to its ceiling and the seller's surplus above its floor.
    pub fn allowable_transfer(&self, buyer: &VehicleAgent, seller: &VehicleAgent) -> f64 {
        buyer
            .max_charge_speed()
            .min(seller.max_charge_speed())
            .min(buyer.headroom_to(self.market.buyer_threshold))
            .min(seller.surplus_above(self.market.seller_threshold))
            .max(0.0)
    }

    /// Energy actually moved for a given link efficiency, after the transfer
    /// floor policy and the physical battery limits.
    pub fn energy_to_move(&self, efficiency: f64, buyer: &VehicleAgent, seller: &VehicleAgent) -> f64 {
        let computed = efficiency * self.allowable_transfer(buyer, seller);
        let floored = match self.physics.transfer_floor {
            TransferFloor::Slack => computed.max(self.physics.min_transfer_kwh),
            TransferFloor::Strict => computed,
        };
        floored
            .min(buyer.free_capacity_kwh())
            .min(seller.current_battery_kwh())
            .max(0.0)
    }
}

/// Two distinct agents borrowed mutably at once.
fn pair_mut(fleet: &mut [VehicleAgent], a: usize, b: usize) -> (&mut VehicleAgent, &mut VehicleAgent) {
    assert_ne!(a, b, "buyer and seller must be different agents");
    if a < b {
        let (left, right) = fleet.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = fleet.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
