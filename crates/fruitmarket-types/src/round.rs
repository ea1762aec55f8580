//! Round lifecycle for the market game.
//!
//! Each round cycles through four non-overlapping phases:
//! **OFFERS → PURCHASES → SETTLEMENT → CLOSED**
//!
//! During OFFERS, sellers post sell offers into the ledger.
//! During PURCHASES, the buyer matches purchase requests against those offers.
//! During SETTLEMENT, balances are updated once per player.
//! A CLOSED round hands its ending balances and unsold offers to the next one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four phases of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Sellers submit offers.
    Offers,
    /// The buyer submits purchases.
    Purchases,
    /// Matched purchases are applied to balances.
    Settlement,
    /// Settled; ready for carryover.
    Closed,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offers => write!(f, "OFFERS"),
            Self::Purchases => write!(f, "PURCHASES"),
            Self::Settlement => write!(f, "SETTLEMENT"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

impl RoundPhase {
    /// Next phase, or `None` for a closed round.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Offers => Some(Self::Purchases),
            Self::Purchases => Some(Self::Settlement),
            Self::Settlement => Some(Self::Closed),
            Self::Closed => None,
        }
    }
}
