//! Offer ledger: every sell offer posted in the game.
//!
//! Sellers post offers through [`OfferLedger::submit_offers`]. The purchase
//! matcher takes units off them with [`OfferLedger::take`], and round
//! carryover re-posts remainders with [`OfferLedger::insert_carried`].
//!
//! Offers are indexed per round in posting order so that listing a round
//! is deterministic.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use fruitmarket_types::{
    MarketError, Offer, OfferId, OfferInput, Player, PlayerId, RejectedOfferLine, Result, Role,
    RoundNumber, SubmissionReport,
};

use crate::validation::OfferValidator;

/// Holds every offer across all rounds.
pub struct OfferLedger {
    /// All offers indexed by their ID.
    offers: HashMap<OfferId, Offer>,
    /// Offer IDs per round, in posting order.
    by_round: BTreeMap<RoundNumber, Vec<OfferId>>,
    /// Line validation for submissions.
    validator: OfferValidator,
}

impl OfferLedger {
    /// Create an empty ledger with default validation limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_validator(OfferValidator::new())
    }

    #[must_use]
    pub fn with_validator(validator: OfferValidator) -> Self {
        Self {
            offers: HashMap::new(),
            by_round: BTreeMap::new(),
            validator,
        }
    }

    /// Post a seller's offers for the seller's current round.
    ///
    /// Each line is validated on its own: valid lines become offers exactly
    /// once, invalid lines are returned in the report's `rejected` list.
    ///
    /// # Errors
    /// `WrongRole` if `seller` is the buyer. Nothing is posted in that case.
    pub fn submit_offers(&mut self, seller: &Player, lines: &[OfferInput]) -> Result<SubmissionReport> {
        if !seller.is_seller() {
            return Err(MarketError::WrongRole {
                player: seller.id,
                expected: Role::Seller,
            });
        }

        let mut report = SubmissionReport::default();
        for (index, input) in lines.iter().enumerate() {
            match self.validator.validate(index, input) {
                Ok(amount) => {
                    let offer = Offer {
                        id: OfferId::new(),
                        seller_id: seller.id,
                        round: seller.round,
                        kind: input.kind,
                        is_organic: input.is_organic,
                        unit_price: input.unit_price,
                        amount,
                        original_amount: amount,
                        created_at: Utc::now(),
                    };
                    self.post(offer.clone());
                    report.accepted.push(offer);
                }
                Err(error) => {
                    tracing::warn!(
                        seller = %seller.id,
                        round = seller.round.0,
                        line = index,
                        %error,
                        "Offer line rejected"
                    );
                    report.rejected.push(RejectedOfferLine {
                        index,
                        input: input.clone(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            seller = %seller.id,
            round = seller.round.0,
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            "Offers submitted"
        );
        Ok(report)
    }

    /// Current unsold amount of an offer.
    ///
    /// # Errors
    /// `UnknownOffer` if no such offer exists.
    pub fn remaining(&self, offer_id: OfferId) -> Result<u32> {
        self.get(offer_id)
            .map(|o| o.amount)
            .ok_or(MarketError::UnknownOffer(offer_id))
    }

    /// Take `amount` units off an offer posted in `round`.
    ///
    /// Returns the offer as it was before the take, so the caller can price
    /// the purchase. The offer is left unchanged on error.
    ///
    /// # Errors
    /// - `UnknownOffer` if the offer does not exist or belongs to another round
    /// - `InsufficientStock` if `amount` exceeds the remaining amount
    pub fn take(&mut self, offer_id: OfferId, round: RoundNumber, amount: u32) -> Result<Offer> {
        let offer = self
            .offers
            .get_mut(&offer_id)
            .filter(|o| o.round == round)
            .ok_or(MarketError::UnknownOffer(offer_id))?;

        if amount > offer.amount {
            return Err(MarketError::InsufficientStock {
                offer_id,
                requested: amount,
                remaining: offer.amount,
            });
        }

        let before = offer.clone();
        offer.amount -= amount;
        Ok(before)
    }

    /// Post a remainder carried over from an earlier round.
    pub fn insert_carried(&mut self, offer: Offer) {
        tracing::debug!(
            offer = %offer.id,
            seller = %offer.seller_id,
            round = offer.round.0,
            amount = offer.amount,
            "Offer carried over"
        );
        self.post(offer);
    }

    /// Look up an offer by ID.
    #[must_use]
    pub fn get(&self, offer_id: OfferId) -> Option<&Offer> {
        self.offers.get(&offer_id)
    }

    /// Offers posted in `round`, in posting order.
    pub fn offers_in_round(&self, round: RoundNumber) -> impl Iterator<Item = &Offer> + '_ {
        self.by_round
            .get(&round)
            .into_iter()
            .flatten()
            .filter_map(|id| self.offers.get(id))
    }

    /// Offers a seller posted in `round`, in posting order.
    pub fn offers_by_seller(
        &self,
        seller: PlayerId,
        round: RoundNumber,
    ) -> impl Iterator<Item = &Offer> + '_ {
        self.offers_in_round(round)
            .filter(move |o| o.seller_id == seller)
    }

    /// Units still unsold in `round`.
    #[must_use]
    pub fn remaining_in_round(&self, round: RoundNumber) -> u64 {
        self.offers_in_round(round).map(|o| u64::from(o.amount)).sum()
    }

    /// Number of offers across all rounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    fn post(&mut self, offer: Offer) {
        self.by_round.entry(offer.round).or_default().push(offer.id);
        self.offers.insert(offer.id, offer);
    }
}

impl Default for OfferLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruitmarket_types::FruitKind;
    use rust_decimal::Decimal;

    fn apples(price: i64, amount: i64) -> OfferInput {
        OfferInput::new(FruitKind::Apple, Decimal::new(price, 0), amount)
    }

    #[test]
    fn submit_records_each_offer_once() {
        let mut ledger = OfferLedger::new();
        let seller = Player::dummy_seller(2);
        let report = ledger
            .submit_offers(&seller, &[apples(2, 10), apples(3, 5)])
            .unwrap();
        assert_eq!(report.accepted.len(), 2);
        assert!(report.is_clean());
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.remaining(report.accepted[0].id).unwrap(), 10);
        assert_eq!(ledger.remaining(report.accepted[1].id).unwrap(), 5);
        assert_eq!(ledger.offers_in_round(RoundNumber(1)).count(), 2);
    }

    #[test]
    fn invalid_lines_reported_not_posted() {
        let mut ledger = OfferLedger::new();
        let seller = Player::dummy_seller(2);
        let report = ledger
            .submit_offers(&seller, &[apples(-1, 10), apples(2, 0), apples(2, 4)])
            .unwrap();
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].index, 0);
        assert_eq!(report.rejected[1].index, 1);
        assert!(matches!(
            report.rejected[0].error,
            MarketError::InvalidOfferInput { .. }
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn buyer_cannot_post_offers() {
        let mut ledger = OfferLedger::new();
        let buyer = Player::dummy_buyer();
        let err = ledger.submit_offers(&buyer, &[apples(2, 10)]).unwrap_err();
        assert!(matches!(err, MarketError::WrongRole { expected: Role::Seller, .. }));
        assert!(ledger.is_empty());
    }

    #[test]
    fn offers_carry_organic_flag_and_round() {
        let mut ledger = OfferLedger::new();
        let seller = Player::dummy_seller(2).in_round(RoundNumber(2));
        let report = ledger
            .submit_offers(&seller, &[apples(1, 1).organic()])
            .unwrap();
        let offer = &report.accepted[0];
        assert!(offer.is_organic);
        assert_eq!(offer.round, RoundNumber(2));
        assert_eq!(ledger.offers_in_round(RoundNumber(1)).count(), 0);
    }

    #[test]
    fn take_decrements_remaining() {
        let mut ledger = OfferLedger::new();
        let seller = Player::dummy_seller(2);
        let id = ledger.submit_offers(&seller, &[apples(2, 10)]).unwrap().accepted[0].id;
        let before = ledger.take(id, RoundNumber(1), 4).unwrap();
        assert_eq!(before.amount, 10);
        assert_eq!(ledger.remaining(id).unwrap(), 6);
        assert_eq!(ledger.get(id).unwrap().sold(), 4);
    }

    #[test]
    fn take_more_than_remaining_fails_unchanged() {
        let mut ledger = OfferLedger::new();
        let seller = Player::dummy_seller(2);
        let id = ledger.submit_offers(&seller, &[apples(2, 6)]).unwrap().accepted[0].id;
        let err = ledger.take(id, RoundNumber(1), 15).unwrap_err();
        assert!(matches!(
            err,
            MarketError::InsufficientStock { requested: 15, remaining: 6, .. }
        ));
        assert_eq!(ledger.remaining(id).unwrap(), 6);
    }

    #[test]
    fn take_from_other_round_is_unknown() {
        let mut ledger = OfferLedger::new();
        let seller = Player::dummy_seller(2);
        let id = ledger.submit_offers(&seller, &[apples(2, 6)]).unwrap().accepted[0].id;
        let err = ledger.take(id, RoundNumber(2), 1).unwrap_err();
        assert!(matches!(err, MarketError::UnknownOffer(x) if x == id));
    }

    #[test]
    fn remaining_of_unknown_offer_fails() {
        let ledger = OfferLedger::new();
        assert!(matches!(
            ledger.remaining(OfferId::new()),
            Err(MarketError::UnknownOffer(_))
        ));
    }

    #[test]
    fn offers_by_seller_filters() {
        let mut ledger = OfferLedger::new();
        let s1 = Player::dummy_seller(2);
        let s2 = Player::dummy_seller(3);
        ledger.submit_offers(&s1, &[apples(1, 1), apples(1, 2)]).unwrap();
        ledger.submit_offers(&s2, &[apples(1, 3)]).unwrap();
        assert_eq!(ledger.offers_by_seller(s1.id, RoundNumber(1)).count(), 2);
        assert_eq!(ledger.offers_by_seller(s2.id, RoundNumber(1)).count(), 1);
        assert_eq!(ledger.remaining_in_round(RoundNumber(1)), 6);
    }

    #[test]
    fn insert_carried_indexes_new_round() {
        let mut ledger = OfferLedger::new();
        let seller = Player::dummy_seller(2);
        let offer = ledger.submit_offers(&seller, &[apples(2, 6)]).unwrap().accepted[0].clone();
        ledger.insert_carried(offer.remainder_for(RoundNumber(2)));
        assert_eq!(ledger.offers_in_round(RoundNumber(2)).count(), 1);
        assert_eq!(ledger.len(), 2);
    }
}
