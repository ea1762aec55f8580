//! Round settlement.
//!
//! At the end of a round every player's ending balance is written once:
//! 1. Check the purchases all belong to the round
//! 2. Check nobody in the round has been settled already
//! 3. Net each player's delta: buyers pay purchase costs, sellers collect them
//! 4. Check spend == proceeds and that the deltas net to zero
//! 5. Write ending = starting + delta for every player, traded or not
//! 6. Issue a receipt

use std::collections::BTreeMap;

use chrono::Utc;
use fruitmarket_ledger::BalanceBook;
use fruitmarket_matchcore::compute_purchase_root;
use fruitmarket_types::{MarketError, PlayerId, Purchase, Result, RoundNumber, SettlementReceipt};
use rust_decimal::Decimal;

use crate::conservation::{Conservation, RoundFlows};
use crate::idempotency::SettlementGuard;

/// Applies a round's purchases to the balance book.
///
/// Either every player of the round is settled or none is: all checks run
/// before the first balance is written.
#[derive(Debug, Default)]
pub struct RoundSettler {
    guard: SettlementGuard,
    conservation: Conservation,
}

impl RoundSettler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settle `round` from its purchases.
    ///
    /// # Errors
    /// - `RoundMismatch` if a purchase belongs to another round
    /// - `UnknownRound` if no player has a balance in `round`
    /// - `UnknownPlayer` if a purchase names a player without a balance in `round`
    /// - `RoundAlreadySettled` if any player of the round was already settled
    /// - `ConservationViolation` if spend and proceeds disagree or the
    ///   deltas do not net to zero
    pub fn settle_round(
        &mut self,
        book: &mut BalanceBook,
        round: RoundNumber,
        purchases: &[Purchase],
    ) -> Result<SettlementReceipt> {
        if let Some(stray) = purchases.iter().find(|p| p.round != round) {
            return Err(MarketError::RoundMismatch {
                expected: round,
                actual: stray.round,
            });
        }

        let players = book.players_in_round(round);
        if players.is_empty() {
            return Err(MarketError::UnknownRound(round));
        }
        for &player in &players {
            self.guard.ensure_unsettled(player, round)?;
            if book.get(player, round).is_some_and(|b| b.is_settled()) {
                return Err(MarketError::RoundAlreadySettled { player, round });
            }
        }

        let mut deltas: BTreeMap<PlayerId, Decimal> =
            players.iter().map(|&p| (p, Decimal::ZERO)).collect();
        for purchase in purchases {
            *deltas
                .get_mut(&purchase.buyer_id)
                .ok_or(MarketError::UnknownPlayer(purchase.buyer_id))? -= purchase.cost;
            *deltas
                .get_mut(&purchase.seller_id)
                .ok_or(MarketError::UnknownPlayer(purchase.seller_id))? += purchase.cost;
        }

        let flows = RoundFlows::from_purchases(purchases);
        flows.verify(round)?;
        Conservation::verify_net(round, &deltas)?;

        for (&player, &delta) in &deltas {
            let starting = book.starting(player, round)?;
            book.close(player, round, starting + delta)?;
            self.guard.mark_settled(player, round)?;
        }
        self.conservation.record(round, flows);

        let receipt = SettlementReceipt {
            round,
            deltas,
            volume: flows.spend,
            purchase_count: purchases.len(),
            purchase_root: compute_purchase_root(purchases),
            settled_at: Utc::now(),
        };

        tracing::info!(
            round = round.0,
            players = receipt.deltas.len(),
            purchases = receipt.purchase_count,
            volume = %receipt.volume,
            purchase_root = hex::encode(receipt.purchase_root),
            "Round settled"
        );
        Ok(receipt)
    }

    /// Whether `player` has been settled for `round`.
    #[must_use]
    pub fn is_settled(&self, player: PlayerId, round: RoundNumber) -> bool {
        self.guard.is_settled(player, round)
    }

    /// Volume settled in `round`.
    #[must_use]
    pub fn volume(&self, round: RoundNumber) -> Decimal {
        self.conservation.volume(round)
    }
}
