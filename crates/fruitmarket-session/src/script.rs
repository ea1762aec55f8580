//! Scripted play: run a whole session from a JSON description of each
//! round's offers and purchases.
//!
//! ```json
//! { "rounds": [
//!   { "offers":    [ { "seller": 2, "lines": [ { "kind": "apple", "unit_price": "2", "amount": 10 } ] } ],
//!     "purchases": [ { "seller": 2, "offer": 0, "amount": 4 } ] }
//! ] }
//! ```
//!
//! Players are named by `id_in_group`. A purchase names an offer by its
//! position among the seller's offers in that round, carried remainders
//! first.

use std::path::Path;

use fruitmarket_types::{MarketError, OfferInput, PurchaseRequest, Result, SettlementReceipt};
use serde::{Deserialize, Serialize};

use crate::session::GameSession;

/// One seller's offer submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedOffers {
    pub seller: u32,
    pub lines: Vec<OfferInput>,
}

/// One purchase line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScriptedPurchase {
    pub seller: u32,
    pub offer: usize,
    pub amount: u32,
}

/// Actions of one round.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundScript {
    #[serde(default)]
    pub offers: Vec<ScriptedOffers>,
    #[serde(default)]
    pub purchases: Vec<ScriptedPurchase>,
}

/// Actions of a whole session. Rounds without an entry play with no
/// actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub rounds: Vec<RoundScript>,
}

impl Script {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

/// Play every round of `session` from `script` and return the settlement
/// receipts.
///
/// # Errors
/// - `Configuration` if the script has more rounds than the session
/// - `InvalidPurchaseInput` if a purchase names an offer that does not exist
/// - `UnknownPosition` if an action names a position no player holds
/// - any error of the session calls
pub fn play(session: &mut GameSession, script: &Script) -> Result<Vec<SettlementReceipt>> {
    let num_rounds = session.config().num_rounds as usize;
    if script.rounds.len() > num_rounds {
        return Err(MarketError::Configuration(format!(
            "script has {} rounds, session has {num_rounds}",
            script.rounds.len()
        )));
    }

    let empty = RoundScript::default();
    let mut receipts = Vec::with_capacity(num_rounds);
    for index in 0..num_rounds {
        let round_script = script.rounds.get(index).unwrap_or(&empty);
        receipts.push(play_round(session, round_script)?);
        if !session.is_finished() {
            session.carry_over_round()?;
        }
    }
    Ok(receipts)
}

fn play_round(session: &mut GameSession, script: &RoundScript) -> Result<SettlementReceipt> {
    for submission in &script.offers {
        let seller = session.player_at(submission.seller)?;
        session.submit_offers(seller.id, &submission.lines)?;
    }
    session.begin_purchases()?;

    let lines = script
        .purchases
        .iter()
        .map(|p| resolve_purchase(session, p))
        .collect::<Result<Vec<_>>>()?;
    if !lines.is_empty() {
        let buyer = session.buyer()?;
        session.match_purchases(buyer.id, &lines)?;
    }

    session.begin_settlement()?;
    session.settle_round()
}

fn resolve_purchase(session: &GameSession, purchase: &ScriptedPurchase) -> Result<PurchaseRequest> {
    let seller = session.player_at(purchase.seller)?;
    let offer = session
        .offers_by_seller(seller.id)
        .nth(purchase.offer)
        .ok_or_else(|| MarketError::InvalidPurchaseInput {
            reason: format!(
                "seller {} has no offer #{} in {}",
                purchase.seller,
                purchase.offer,
                session.round()
            ),
        })?;
    Ok(PurchaseRequest::new(offer.id, purchase.amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruitmarket_types::{BalanceDistribution, GameConfig, RoundNumber};
    use rust_decimal::Decimal;

    const SCRIPT: &str = r#"{
        "rounds": [
            {
                "offers": [
                    { "seller": 2, "lines": [ { "kind": "apple", "unit_price": "2", "amount": 10 } ] },
                    { "seller": 3, "lines": [ { "kind": "banana", "is_organic": true, "unit_price": "1.5", "amount": 2 } ] }
                ],
                "purchases": [
                    { "seller": 2, "offer": 0, "amount": 4 },
                    { "seller": 3, "offer": 0, "amount": 2 }
                ]
            },
            {
                "purchases": [ { "seller": 2, "offer": 0, "amount": 6 } ]
            }
        ]
    }"#;

    fn session(num_rounds: u32) -> GameSession {
        GameSession::new(GameConfig {
            num_rounds,
            initial_balance: BalanceDistribution::fixed(Decimal::new(20, 0)),
            seed: Some(1),
            ..GameConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn script_plays_all_rounds() {
        let mut s = session(2);
        let script = Script::from_json_str(SCRIPT).unwrap();
        let receipts = play(&mut s, &script).unwrap();

        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0].volume, Decimal::new(11, 0));
        // Round 2 buys the carried apple remainder.
        assert_eq!(receipts[1].volume, Decimal::new(12, 0));
        assert!(s.is_finished());

        let buyer = s.buyer().unwrap();
        assert_eq!(
            s.balance(buyer.id, RoundNumber(2)).unwrap().ending,
            Some(Decimal::new(-3, 0))
        );
    }

    #[test]
    fn missing_rounds_play_empty() {
        let mut s = session(3);
        let receipts = play(&mut s, &Script::default()).unwrap();
        assert_eq!(receipts.len(), 3);
        assert!(receipts.iter().all(|r| r.purchase_count == 0));
    }

    #[test]
    fn too_many_rounds_rejected() {
        let mut s = session(1);
        let script = Script::from_json_str(SCRIPT).unwrap();
        assert!(matches!(
            play(&mut s, &script),
            Err(MarketError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_offer_position_rejected() {
        let mut s = session(1);
        let script = Script {
            rounds: vec![RoundScript {
                offers: vec![],
                purchases: vec![ScriptedPurchase {
                    seller: 2,
                    offer: 0,
                    amount: 1,
                }],
            }],
        };
        assert!(matches!(
            play(&mut s, &script),
            Err(MarketError::InvalidPurchaseInput { .. })
        ));
    }
}
