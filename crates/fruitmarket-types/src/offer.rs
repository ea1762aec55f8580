//! Sell offers posted by sellers.
//!
//! An [`OfferInput`] is what a seller submits; the ledger validates it and
//! turns it into an [`Offer`]. Only `amount` changes after creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OfferId, PlayerId, RoundNumber};

/// Kind of fruit on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FruitKind {
    Apple,
    Orange,
    Banana,
}

impl FruitKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 3] = [Self::Apple, Self::Orange, Self::Banana];

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Apple => "Apple",
            Self::Orange => "Orange",
            Self::Banana => "Banana",
        }
    }
}

impl std::fmt::Display for FruitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apple => write!(f, "apple"),
            Self::Orange => write!(f, "orange"),
            Self::Banana => write!(f, "banana"),
        }
    }
}

/// One line of a seller's offer submission, before validation.
///
/// `amount` is signed so that out-of-range input can be reported back
/// instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferInput {
    pub kind: FruitKind,
    #[serde(default)]
    pub is_organic: bool,
    pub amount: i64,
    pub unit_price: Decimal,
}

impl OfferInput {
    #[must_use]
    pub fn new(kind: FruitKind, unit_price: Decimal, amount: i64) -> Self {
        Self {
            kind,
            is_organic: false,
            amount,
            unit_price,
        }
    }

    #[must_use]
    pub fn organic(mut self) -> Self {
        self.is_organic = true;
        self
    }
}

/// A seller's posted sell offer for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub seller_id: PlayerId,
    pub round: RoundNumber,
    pub kind: FruitKind,
    pub is_organic: bool,
    pub unit_price: Decimal,
    /// Quantity still available for purchase.
    pub amount: u32,
    /// Quantity the offer was created with.
    pub original_amount: u32,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Quantity already sold.
    #[must_use]
    pub fn sold(&self) -> u32 {
        self.original_amount - self.amount
    }

    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.amount == 0
    }

    /// Price of `amount` units of this offer.
    #[must_use]
    pub fn cost_of(&self, amount: u32) -> Decimal {
        self.unit_price * Decimal::from(amount)
    }

    /// Copy of the unsold remainder as a fresh offer in `round`.
    #[must_use]
    pub fn remainder_for(&self, round: RoundNumber) -> Self {
        Self {
            id: OfferId::new(),
            seller_id: self.seller_id,
            round,
            kind: self.kind,
            is_organic: self.is_organic,
            unit_price: self.unit_price,
            amount: self.amount,
            original_amount: self.amount,
            created_at: Utc::now(),
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Offer {
    pub fn dummy(seller_id: PlayerId, kind: FruitKind, unit_price: Decimal, amount: u32) -> Self {
        Self {
            id: OfferId::new(),
            seller_id,
            round: RoundNumber::FIRST,
            kind,
            is_organic: false,
            unit_price,
            amount,
            original_amount: amount,
            created_at: Utc::now(),
        }
    }
}
