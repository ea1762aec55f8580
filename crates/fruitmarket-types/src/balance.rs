//! Per-round balance of a player.
//!
//! A round opens with a `starting` balance and gains an `ending` balance
//! exactly once, at settlement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance of one player in one round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundBalance {
    /// Balance when the round opened.
    pub starting: Decimal,
    /// Balance after settlement; `None` until the round is settled.
    pub ending: Option<Decimal>,
}

impl RoundBalance {
    #[must_use]
    pub fn opening(starting: Decimal) -> Self {
        Self {
            starting,
            ending: None,
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.ending.is_some()
    }

    /// Ending balance if settled, starting balance otherwise.
    #[must_use]
    pub fn current(&self) -> Decimal {
        self.ending.unwrap_or(self.starting)
    }

    /// Net change over the round (zero until settled).
    #[must_use]
    pub fn delta(&self) -> Decimal {
        self.ending.map_or(Decimal::ZERO, |end| end - self.starting)
    }
}
