//! Purchases recorded by the matcher.
//!
//! A [`Purchase`] is immutable once created. It snapshots the seller and
//! unit price of the offer at match time so settlement can run from the
//! purchase list alone.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Offer, OfferId, PlayerId, PurchaseId, RoundNumber};

/// One line of a buyer's purchase submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub offer_id: OfferId,
    pub amount: u32,
}

impl PurchaseRequest {
    #[must_use]
    pub fn new(offer_id: OfferId, amount: u32) -> Self {
        Self { offer_id, amount }
    }
}

/// A buyer's recorded acquisition against one offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub buyer_id: PlayerId,
    pub seller_id: PlayerId,
    pub offer_id: OfferId,
    pub round: RoundNumber,
    /// Units taken, always at least one.
    pub amount: u32,
    pub unit_price: Decimal,
    /// `unit_price × amount`.
    pub cost: Decimal,
    pub executed_at: DateTime<Utc>,
}

impl Purchase {
    /// Record `amount` units of `offer` bought by `buyer_id`.
    #[must_use]
    pub fn against(offer: &Offer, buyer_id: PlayerId, amount: u32) -> Self {
        Self {
            id: PurchaseId::new(),
            buyer_id,
            seller_id: offer.seller_id,
            offer_id: offer.id,
            round: offer.round,
            amount,
            unit_price: offer.unit_price,
            cost: offer.cost_of(amount),
            executed_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for Purchase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Purchase[{}] {} x{} @ {} = {}",
            self.id, self.offer_id, self.amount, self.unit_price, self.cost,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FruitKind;

    #[test]
    fn purchase_snapshots_offer_terms() {
        let seller = PlayerId::new();
        let buyer = PlayerId::new();
        let offer = Offer::dummy(seller, FruitKind::Apple, Decimal::new(2, 0), 10);
        let p = Purchase::against(&offer, buyer, 4);
        assert_eq!(p.seller_id, seller);
        assert_eq!(p.buyer_id, buyer);
        assert_eq!(p.offer_id, offer.id);
        assert_eq!(p.round, offer.round);
        assert_eq!(p.cost, Decimal::new(8, 0));
    }

    #[test]
    fn purchase_display() {
        let offer = Offer::dummy(PlayerId::new(), FruitKind::Apple, Decimal::new(25, 1), 10);
        let p = Purchase::against(&offer, PlayerId::new(), 2);
        let s = format!("{p}");
        assert!(s.contains("x2"));
        assert!(s.contains("5.0"));
    }

    #[test]
    fn request_serde_roundtrip() {
        let req = PurchaseRequest::new(OfferId::new(), 3);
        let json = serde_json::to_string(&req).unwrap();
        let back: PurchaseRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }
}
