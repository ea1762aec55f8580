//! Read-only snapshot of a game session, the input of every export.

use fruitmarket_types::{Offer, Player, PlayerId, PlayerPhase, Purchase, RoundBalance, RoundNumber, RoundPhase};
use serde::{Deserialize, Serialize};

/// One player in one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRow {
    pub player: Player,
    pub phase: PlayerPhase,
    pub balance: RoundBalance,
}

/// Everything that happened in one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub round: RoundNumber,
    pub phase: RoundPhase,
    /// Ordered by `id_in_group`, then participant id.
    pub players: Vec<PlayerRow>,
    /// Offers posted in the round, in posting order.
    pub offers: Vec<Offer>,
    /// Purchases made in the round, in match order.
    pub purchases: Vec<Purchase>,
}

impl RoundSnapshot {
    /// Offers posted by `seller`.
    pub fn offers_by(&self, seller: PlayerId) -> impl Iterator<Item = &Offer> + '_ {
        self.offers.iter().filter(move |o| o.seller_id == seller)
    }

    /// Purchases made by `buyer`.
    pub fn purchases_by(&self, buyer: PlayerId) -> impl Iterator<Item = &Purchase> + '_ {
        self.purchases.iter().filter(move |p| p.buyer_id == buyer)
    }

    #[must_use]
    pub fn row(&self, player: PlayerId) -> Option<&PlayerRow> {
        self.players.iter().find(|r| r.player.id == player)
    }

    /// Sort players into export order.
    pub fn sort_players(&mut self) {
        self.players
            .sort_by_key(|r| (r.player.id_in_group, r.player.id));
    }
}

/// All rounds of a session that have been opened so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Ordered by round number.
    pub rounds: Vec<RoundSnapshot>,
}

impl SessionSnapshot {
    /// Participants in export order, taken from the first round.
    #[must_use]
    pub fn participants(&self) -> Vec<PlayerId> {
        self.rounds
            .first()
            .map(|r| r.players.iter().map(|row| row.player.id).collect())
            .unwrap_or_default()
    }
}
