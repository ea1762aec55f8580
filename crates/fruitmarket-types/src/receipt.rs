//! Receipts produced by settlement and carryover.
//!
//! A [`SettlementReceipt`] records how a round moved money; a
//! [`CarryoverReport`] records what was handed to the next round.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Offer, PlayerId, RoundNumber};

/// Proof that a round was settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub round: RoundNumber,
    /// Net balance change per player (negative for the buyer).
    pub deltas: BTreeMap<PlayerId, Decimal>,
    /// Money that changed hands (buyer spend == seller proceeds).
    pub volume: Decimal,
    pub purchase_count: usize,
    /// SHA-256 digest over the settled purchases.
    pub purchase_root: [u8; 32],
    pub settled_at: DateTime<Utc>,
}

impl SettlementReceipt {
    #[must_use]
    pub fn delta_for(&self, player: PlayerId) -> Decimal {
        self.deltas.get(&player).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sum of all deltas; zero for a conserving settlement.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.deltas.values().copied().sum()
    }
}

/// What a closed round handed to the next one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryoverReport {
    pub from: RoundNumber,
    pub to: RoundNumber,
    /// Unsold remainders re-posted in `to`.
    pub carried_offers: Vec<Offer>,
    /// Starting balances opened in `to`.
    pub balances: BTreeMap<PlayerId, Decimal>,
}

impl CarryoverReport {
    /// Units re-posted in the next round.
    #[must_use]
    pub fn carried_units(&self) -> u64 {
        self.carried_offers.iter().map(|o| u64::from(o.amount)).sum()
    }
}
