//! Money conservation checks for settlement.
//!
//! Invariants checked for every settled round:
//! ```text
//! Σ buyer spend == Σ seller proceeds
//! Σ ending balances == Σ starting balances
//! ```
//!
//! Settlement only moves money between players; it never creates or
//! destroys it.

use std::collections::BTreeMap;

use fruitmarket_types::{MarketError, PlayerId, Purchase, Result, RoundNumber};
use rust_decimal::Decimal;

/// Spend and proceeds of one round, computed from its purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundFlows {
    /// What buyers are charged (recorded purchase costs).
    pub spend: Decimal,
    /// What sellers earn (unit price × amount).
    pub proceeds: Decimal,
}

impl RoundFlows {
    /// Compute both sides independently from the purchase list.
    #[must_use]
    pub fn from_purchases(purchases: &[Purchase]) -> Self {
        let spend = purchases.iter().map(|p| p.cost).sum();
        let proceeds = purchases
            .iter()
            .map(|p| p.unit_price * Decimal::from(p.amount))
            .sum();
        Self { spend, proceeds }
    }

    /// # Errors
    /// [`MarketError::ConservationViolation`] if spend ≠ proceeds.
    pub fn verify(&self, round: RoundNumber) -> Result<()> {
        if self.spend != self.proceeds {
            return Err(MarketError::ConservationViolation {
                round,
                spend: self.spend,
                proceeds: self.proceeds,
            });
        }
        Ok(())
    }
}

/// Per-round volume of settled rounds.
#[derive(Debug, Default)]
pub struct Conservation {
    volume: BTreeMap<RoundNumber, Decimal>,
}

impl Conservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a settled round.
    pub fn record(&mut self, round: RoundNumber, flows: RoundFlows) {
        self.volume.insert(round, flows.spend);
    }

    /// Volume settled in `round` (zero if not settled).
    #[must_use]
    pub fn volume(&self, round: RoundNumber) -> Decimal {
        self.volume.get(&round).copied().unwrap_or(Decimal::ZERO)
    }

    /// Check that per-player deltas net to zero, so writing them leaves
    /// the round's balance total unchanged.
    ///
    /// # Errors
    /// [`MarketError::ConservationViolation`] with the debits as `spend`
    /// and the credits as `proceeds` if they differ.
    pub fn verify_net(round: RoundNumber, deltas: &BTreeMap<PlayerId, Decimal>) -> Result<()> {
        let debits: Decimal = deltas.values().filter(|d| d.is_sign_negative()).map(|d| -*d).sum();
        let credits: Decimal = deltas.values().filter(|d| d.is_sign_positive()).sum();
        if debits != credits {
            return Err(MarketError::ConservationViolation {
                round,
                spend: debits,
                proceeds: credits,
            });
        }
        Ok(())
    }
}
