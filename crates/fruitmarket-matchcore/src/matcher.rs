//! Purchase matcher.
//!
//! Takes a buyer's purchase lines and turns them into [`Purchase`]s against
//! the offers of the buyer's round:
//!
//! ```text
//! match_purchases(ledger, buyer, budget, lines) -> MatchReport
//! ```
//!
//! ## Commit policy
//!
//! - [`MatchPolicy::BestEffort`]: each line is checked and committed on its
//!   own. A failing line is reported and does not undo earlier lines.
//! - [`MatchPolicy::AllOrNothing`]: every line is checked against a working
//!   copy of the remaining amounts first. The first failing line is returned
//!   as the error and the ledger is not touched.

use std::collections::HashMap;

use fruitmarket_ledger::OfferLedger;
use fruitmarket_types::{
    FailedPurchaseLine, GameConfig, MarketError, MatchPolicy, MatchReport, OfferId, Player,
    Purchase, PurchaseRequest, Result, Role, RoundNumber,
};
use rust_decimal::Decimal;

use crate::determinism::compute_purchase_root;

/// Matches buyer purchase lines against the offer ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct PurchaseMatcher {
    policy: MatchPolicy,
    /// Reject lines that would take the buyer's spend past its budget.
    enforce_budget: bool,
}

impl PurchaseMatcher {
    #[must_use]
    pub fn new(policy: MatchPolicy, enforce_budget: bool) -> Self {
        Self {
            policy,
            enforce_budget,
        }
    }

    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.match_policy, config.enforce_budget)
    }

    #[must_use]
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Match `lines` for `buyer` against the offers of the buyer's round.
    ///
    /// `budget` is the buyer's starting balance for the round; it only
    /// matters when budget enforcement is on.
    ///
    /// # Errors
    /// - `WrongRole` if `buyer` is a seller
    /// - under `AllOrNothing`, the first failing line's error
    pub fn match_purchases(
        &self,
        ledger: &mut OfferLedger,
        buyer: &Player,
        budget: Decimal,
        lines: &[PurchaseRequest],
    ) -> Result<MatchReport> {
        if !buyer.is_buyer() {
            return Err(MarketError::WrongRole {
                player: buyer.id,
                expected: Role::Buyer,
            });
        }

        let report = match self.policy {
            MatchPolicy::BestEffort => self.match_best_effort(ledger, buyer, budget, lines)?,
            MatchPolicy::AllOrNothing => self.match_all_or_nothing(ledger, buyer, budget, lines)?,
        };

        tracing::info!(
            buyer = %buyer.id,
            round = buyer.round.0,
            policy = ?self.policy,
            purchases = report.purchases.len(),
            failed = report.failures.len(),
            skipped = report.skipped.len(),
            total_cost = %report.total_cost,
            purchase_root = hex::encode(compute_purchase_root(&report.purchases)),
            "Purchase matching complete"
        );
        Ok(report)
    }

    fn match_best_effort(
        &self,
        ledger: &mut OfferLedger,
        buyer: &Player,
        budget: Decimal,
        lines: &[PurchaseRequest],
    ) -> Result<MatchReport> {
        let mut report = MatchReport::default();

        for (index, request) in lines.iter().enumerate() {
            if request.amount == 0 {
                report.skipped.push(index);
                continue;
            }

            let checked = ledger
                .get(request.offer_id)
                .filter(|o| o.round == buyer.round)
                .map(|o| o.amount)
                .ok_or(MarketError::UnknownOffer(request.offer_id))
                .and_then(|remaining| {
                    self.check_line(ledger, buyer.round, request, remaining, report.total_cost, budget)
                });

            match checked {
                Ok(_) => {
                    let offer = ledger.take(request.offer_id, buyer.round, request.amount)?;
                    let purchase = Purchase::against(&offer, buyer.id, request.amount);
                    log_purchase(&purchase);
                    report.record(purchase);
                }
                Err(error) => {
                    tracing::warn!(
                        buyer = %buyer.id,
                        offer = %request.offer_id,
                        line = index,
                        %error,
                        "Purchase line failed"
                    );
                    report.failures.push(FailedPurchaseLine {
                        index,
                        request: *request,
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    fn match_all_or_nothing(
        &self,
        ledger: &mut OfferLedger,
        buyer: &Player,
        budget: Decimal,
        lines: &[PurchaseRequest],
    ) -> Result<MatchReport> {
        let mut report = MatchReport::default();
        let mut working: HashMap<OfferId, u32> = HashMap::new();
        let mut planned_spend = Decimal::ZERO;

        // Pass 1: check every line without touching the ledger.
        for (index, request) in lines.iter().enumerate() {
            if request.amount == 0 {
                report.skipped.push(index);
                continue;
            }

            let remaining = match working.get(&request.offer_id) {
                Some(&left) => left,
                None => ledger
                    .get(request.offer_id)
                    .filter(|o| o.round == buyer.round)
                    .map(|o| o.amount)
                    .ok_or(MarketError::UnknownOffer(request.offer_id))?,
            };

            let cost = self
                .check_line(ledger, buyer.round, request, remaining, planned_spend, budget)
                .inspect_err(|error| {
                    tracing::warn!(
                        buyer = %buyer.id,
                        offer = %request.offer_id,
                        line = index,
                        %error,
                        "Purchase submission rejected"
                    );
                })?;

            working.insert(request.offer_id, remaining - request.amount);
            planned_spend += cost;
        }

        // Pass 2: commit. Every take was checked above.
        for request in lines.iter().filter(|r| r.amount > 0) {
            let offer = ledger.take(request.offer_id, buyer.round, request.amount)?;
            let purchase = Purchase::against(&offer, buyer.id, request.amount);
            log_purchase(&purchase);
            report.record(purchase);
        }

        Ok(report)
    }

    /// Check one line against `remaining` units and the spend so far.
    /// Returns the line's cost.
    fn check_line(
        &self,
        ledger: &OfferLedger,
        round: RoundNumber,
        request: &PurchaseRequest,
        remaining: u32,
        spent: Decimal,
        budget: Decimal,
    ) -> Result<Decimal> {
        let offer = ledger
            .get(request.offer_id)
            .filter(|o| o.round == round)
            .ok_or(MarketError::UnknownOffer(request.offer_id))?;

        if request.amount > remaining {
            return Err(MarketError::InsufficientStock {
                offer_id: request.offer_id,
                requested: request.amount,
                remaining,
            });
        }

        let cost = offer.cost_of(request.amount);
        if self.enforce_budget && spent + cost > budget {
            return Err(MarketError::InsufficientBalance {
                needed: spent + cost,
                available: budget,
            });
        }
        Ok(cost)
    }
}

fn log_purchase(purchase: &Purchase) {
    tracing::debug!(
        purchase = %purchase.id,
        buyer = %purchase.buyer_id,
        seller = %purchase.seller_id,
        offer = %purchase.offer_id,
        amount = purchase.amount,
        cost = %purchase.cost,
        "Purchase matched"
    );
}

#[cfg(test)]
mod tests {
    use fruitmarket_types::*;
    use rust_decimal::Decimal;

    use super::*;

    struct Market {
        ledger: OfferLedger,
        buyer: Player,
        seller: Player,
    }

    fn market_with(offers: &[OfferInput]) -> (Market, Vec<OfferId>) {
        let mut ledger = OfferLedger::new();
        let seller = Player::dummy_seller(2);
        let ids = ledger
            .submit_offers(&seller, offers)
            .unwrap()
            .accepted
            .iter()
            .map(|o| o.id)
            .collect();
        (
            Market {
                ledger,
                buyer: Player::dummy_buyer(),
                seller,
            },
            ids,
        )
    }

    fn apples(price: i64, amount: i64) -> OfferInput {
        OfferInput::new(FruitKind::Apple, Decimal::new(price, 0), amount)
    }

    #[test]
    fn purchase_decrements_offer_and_accrues_cost() {
        let (mut m, ids) = market_with(&[apples(2, 10)]);
        let report = PurchaseMatcher::default()
            .match_purchases(&mut m.ledger, &m.buyer, Decimal::new(20, 0), &[PurchaseRequest::new(ids[0], 4)])
            .unwrap();
        assert_eq!(report.purchases.len(), 1);
        assert_eq!(report.total_cost, Decimal::new(8, 0));
        assert_eq!(report.proceeds[&m.seller.id], Decimal::new(8, 0));
        assert_eq!(m.ledger.remaining(ids[0]).unwrap(), 6);
    }

    #[test]
    fn insufficient_stock_creates_no_purchase() {
        let (mut m, ids) = market_with(&[apples(2, 6)]);
        let report = PurchaseMatcher::default()
            .match_purchases(&mut m.ledger, &m.buyer, Decimal::new(100, 0), &[PurchaseRequest::new(ids[0], 15)])
            .unwrap();
        assert!(report.purchases.is_empty());
        assert!(matches!(
            report.failures[0].error,
            MarketError::InsufficientStock { requested: 15, remaining: 6, .. }
        ));
        assert_eq!(m.ledger.remaining(ids[0]).unwrap(), 6);
        assert!(report.into_result().is_err());
    }

    #[test]
    fn best_effort_keeps_committed_lines() {
        let (mut m, ids) = market_with(&[apples(1, 5), apples(3, 2)]);
        let lines = [
            PurchaseRequest::new(ids[0], 3),
            PurchaseRequest::new(ids[1], 9),
            PurchaseRequest::new(OfferId::new(), 1),
            PurchaseRequest::new(ids[1], 2),
        ];
        let report = PurchaseMatcher::default()
            .match_purchases(&mut m.ledger, &m.buyer, Decimal::new(100, 0), &lines)
            .unwrap();
        assert_eq!(report.purchases.len(), 2);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].index, 1);
        assert!(matches!(report.failures[1].error, MarketError::UnknownOffer(_)));
        assert_eq!(report.total_cost, Decimal::new(9, 0));
        assert_eq!(m.ledger.remaining(ids[0]).unwrap(), 2);
        assert_eq!(m.ledger.remaining(ids[1]).unwrap(), 0);
    }

    #[test]
    fn repeated_lines_cannot_oversell() {
        let (mut m, ids) = market_with(&[apples(1, 5)]);
        let lines = [
            PurchaseRequest::new(ids[0], 3),
            PurchaseRequest::new(ids[0], 3),
            PurchaseRequest::new(ids[0], 2),
        ];
        let report = PurchaseMatcher::default()
            .match_purchases(&mut m.ledger, &m.buyer, Decimal::new(100, 0), &lines)
            .unwrap();
        assert_eq!(report.units(), 5);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(m.ledger.remaining(ids[0]).unwrap(), 0);
    }

    #[test]
    fn zero_amount_lines_are_skipped() {
        let (mut m, ids) = market_with(&[apples(1, 5)]);
        let report = PurchaseMatcher::default()
            .match_purchases(&mut m.ledger, &m.buyer, Decimal::new(100, 0), &[PurchaseRequest::new(ids[0], 0)])
            .unwrap();
        assert!(report.purchases.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(report.skipped, vec![0]);
        assert_eq!(m.ledger.remaining(ids[0]).unwrap(), 5);
    }

    #[test]
    fn seller_cannot_match() {
        let (mut m, ids) = market_with(&[apples(1, 5)]);
        let seller = m.seller.clone();
        let err = PurchaseMatcher::default()
            .match_purchases(&mut m.ledger, &seller, Decimal::new(100, 0), &[PurchaseRequest::new(ids[0], 1)])
            .unwrap_err();
        assert!(matches!(err, MarketError::WrongRole { expected: Role::Buyer, .. }));
    }

    #[test]
    fn offers_from_other_rounds_are_unknown() {
        let (mut m, ids) = market_with(&[apples(1, 5)]);
        let later_buyer = m.buyer.in_round(RoundNumber(2));
        let report = PurchaseMatcher::default()
            .match_purchases(&mut m.ledger, &later_buyer, Decimal::new(100, 0), &[PurchaseRequest::new(ids[0], 1)])
            .unwrap();
        assert!(matches!(report.failures[0].error, MarketError::UnknownOffer(_)));
    }

    #[test]
    fn all_or_nothing_rejects_whole_submission() {
        let (mut m, ids) = market_with(&[apples(1, 5), apples(3, 2)]);
        let matcher = PurchaseMatcher::new(MatchPolicy::AllOrNothing, false);
        let lines = [PurchaseRequest::new(ids[0], 3), PurchaseRequest::new(ids[1], 9)];
        let err = matcher
            .match_purchases(&mut m.ledger, &m.buyer, Decimal::new(100, 0), &lines)
            .unwrap_err();
        assert!(matches!(err, MarketError::InsufficientStock { requested: 9, .. }));
        assert_eq!(m.ledger.remaining(ids[0]).unwrap(), 5);
        assert_eq!(m.ledger.remaining(ids[1]).unwrap(), 2);
    }

    #[test]
    fn all_or_nothing_tracks_repeated_lines() {
        let (mut m, ids) = market_with(&[apples(1, 5)]);
        let matcher = PurchaseMatcher::new(MatchPolicy::AllOrNothing, false);
        let lines = [PurchaseRequest::new(ids[0], 3), PurchaseRequest::new(ids[0], 3)];
        assert!(matcher
            .match_purchases(&mut m.ledger, &m.buyer, Decimal::new(100, 0), &lines)
            .is_err());
        assert_eq!(m.ledger.remaining(ids[0]).unwrap(), 5);

        let lines = [PurchaseRequest::new(ids[0], 3), PurchaseRequest::new(ids[0], 2)];
        let report = matcher
            .match_purchases(&mut m.ledger, &m.buyer, Decimal::new(100, 0), &lines)
            .unwrap();
        assert_eq!(report.purchases.len(), 2);
        assert_eq!(m.ledger.remaining(ids[0]).unwrap(), 0);
    }

    #[test]
    fn budget_enforcement() {
        let (mut m, ids) = market_with(&[apples(2, 10)]);
        let matcher = PurchaseMatcher::new(MatchPolicy::BestEffort, true);
        let lines = [PurchaseRequest::new(ids[0], 4), PurchaseRequest::new(ids[0], 2)];
        let report = matcher
            .match_purchases(&mut m.ledger, &m.buyer, Decimal::new(10, 0), &lines)
            .unwrap();
        assert_eq!(report.total_cost, Decimal::new(8, 0));
        assert!(matches!(
            report.failures[0].error,
            MarketError::InsufficientBalance { .. }
        ));
        assert_eq!(m.ledger.remaining(ids[0]).unwrap(), 6);
    }

    #[test]
    fn budget_ignored_by_default() {
        let (mut m, ids) = market_with(&[apples(2, 10)]);
        let report = PurchaseMatcher::default()
            .match_purchases(&mut m.ledger, &m.buyer, Decimal::ONE, &[PurchaseRequest::new(ids[0], 10)])
            .unwrap();
        assert_eq!(report.total_cost, Decimal::new(20, 0));
    }
}
