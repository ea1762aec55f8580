//! Per-line outcome reports for multi-line player actions.
//!
//! Submitting offers and submitting purchases both take a list of lines.
//! Every line ends up either accepted or rejected with a reason, so callers
//! can show rejects to the player instead of losing them.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::{MarketError, Offer, OfferInput, PlayerId, Purchase, PurchaseRequest, Result};

/// An offer line that was not turned into an offer.
#[derive(Debug, Clone)]
pub struct RejectedOfferLine {
    /// Position of the line in the submission.
    pub index: usize,
    pub input: OfferInput,
    pub error: MarketError,
}

/// Outcome of one offer submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionReport {
    pub accepted: Vec<Offer>,
    pub rejected: Vec<RejectedOfferLine>,
}

impl SubmissionReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Total units put on offer by this submission.
    #[must_use]
    pub fn accepted_units(&self) -> u64 {
        self.accepted.iter().map(|o| u64::from(o.original_amount)).sum()
    }
}

/// A purchase line that did not produce a purchase.
#[derive(Debug, Clone)]
pub struct FailedPurchaseLine {
    /// Position of the line in the submission.
    pub index: usize,
    pub request: PurchaseRequest,
    pub error: MarketError,
}

/// Outcome of one purchase submission.
#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    /// Purchases created, in line order.
    pub purchases: Vec<Purchase>,
    /// Lines that failed.
    pub failures: Vec<FailedPurchaseLine>,
    /// Indices of zero-amount lines that were ignored.
    pub skipped: Vec<usize>,
    /// Sum of purchase costs charged to the buyer.
    pub total_cost: Decimal,
    /// Proceeds owed to each seller.
    pub proceeds: BTreeMap<PlayerId, Decimal>,
}

impl MatchReport {
    /// Record a committed purchase and accrue its cost.
    pub fn record(&mut self, purchase: Purchase) {
        self.total_cost += purchase.cost;
        *self.proceeds.entry(purchase.seller_id).or_insert(Decimal::ZERO) += purchase.cost;
        self.purchases.push(purchase);
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total units bought.
    #[must_use]
    pub fn units(&self) -> u64 {
        self.purchases.iter().map(|p| u64::from(p.amount)).sum()
    }

    /// Surface the first failed line as an error.
    ///
    /// # Errors
    /// The error of the first failed line, if any.
    pub fn into_result(self) -> Result<Self> {
        match self.failures.first() {
            Some(failed) => Err(failed.error.clone()),
            None => Ok(self),
        }
    }
}
