//! Settlement guard: each player is settled at most once per round.
//!
//! Settling the same (player, round) pair a second time returns
//! [`MarketError::RoundAlreadySettled`].

use std::collections::HashSet;

use fruitmarket_types::{MarketError, PlayerId, Result, RoundNumber};

/// Remembers which (player, round) pairs have been settled.
#[derive(Debug, Default)]
pub struct SettlementGuard {
    settled: HashSet<(PlayerId, RoundNumber)>,
}

impl SettlementGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a player as settled for `round`.
    ///
    /// # Errors
    /// Returns [`MarketError::RoundAlreadySettled`] if the pair was already
    /// marked.
    pub fn mark_settled(&mut self, player: PlayerId, round: RoundNumber) -> Result<()> {
        if !self.settled.insert((player, round)) {
            return Err(MarketError::RoundAlreadySettled { player, round });
        }
        Ok(())
    }

    /// Check without marking.
    ///
    /// # Errors
    /// Returns [`MarketError::RoundAlreadySettled`] if the pair is marked.
    pub fn ensure_unsettled(&self, player: PlayerId, round: RoundNumber) -> Result<()> {
        if self.is_settled(player, round) {
            return Err(MarketError::RoundAlreadySettled { player, round });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_settled(&self, player: PlayerId, round: RoundNumber) -> bool {
        self.settled.contains(&(player, round))
    }

    /// Number of players settled in `round`.
    #[must_use]
    pub fn settled_in_round(&self, round: RoundNumber) -> usize {
        self.settled.iter().filter(|(_, r)| *r == round).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.settled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}
