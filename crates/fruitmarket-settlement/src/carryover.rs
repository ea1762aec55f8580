//! Round carryover.
//!
//! When a settled round is not the last one, it hands two things to the
//! next round:
//! - every player's ending balance becomes their next starting balance
//! - every offer with unsold units is re-posted with the same terms, a
//!   fresh ID, and the remainder as its amount

use std::collections::BTreeMap;

use fruitmarket_ledger::{BalanceBook, OfferLedger};
use fruitmarket_types::{CarryoverReport, MarketError, Offer, Result, RoundNumber};

/// Carry `round` over into the next round.
///
/// All checks run before anything is written.
///
/// # Errors
/// - `FinalRoundReached` if `round >= final_round`
/// - `UnknownRound` if no player has a balance in `round`
/// - `RoundNotSettled` if any player of `round` has no ending balance
/// - `Internal` if the next round is already open for a player
pub fn carry_over_round(
    ledger: &mut OfferLedger,
    book: &mut BalanceBook,
    round: RoundNumber,
    final_round: RoundNumber,
) -> Result<CarryoverReport> {
    if round >= final_round {
        return Err(MarketError::FinalRoundReached(round));
    }
    let next = round.next();

    let players = book.players_in_round(round);
    if players.is_empty() {
        return Err(MarketError::UnknownRound(round));
    }

    let mut balances = BTreeMap::new();
    for &player in &players {
        let ending = book
            .get(player, round)
            .and_then(|b| b.ending)
            .ok_or(MarketError::RoundNotSettled { player, round })?;
        if book.get(player, next).is_some() {
            return Err(MarketError::Internal(format!(
                "{next} already open for {player}"
            )));
        }
        balances.insert(player, ending);
    }

    let carried_offers: Vec<Offer> = ledger
        .offers_in_round(round)
        .filter(|o| !o.is_sold_out())
        .map(|o| o.remainder_for(next))
        .collect();

    for (&player, &ending) in &balances {
        book.open(player, next, ending)?;
    }
    for offer in &carried_offers {
        ledger.insert_carried(offer.clone());
    }

    let report = CarryoverReport {
        from: round,
        to: next,
        carried_offers,
        balances,
    };

    tracing::info!(
        from = round.0,
        to = next.0,
        players = report.balances.len(),
        offers = report.carried_offers.len(),
        units = report.carried_units(),
        "Round carried over"
    );
    Ok(report)
}
