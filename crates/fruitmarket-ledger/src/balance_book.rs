//! Per-round balance book.
//!
//! Tracks a [`RoundBalance`] for every (player, round) pair. Round 1 is
//! opened from a random draw; later rounds are opened by carryover from the
//! previous round's ending balance. An ending balance is written exactly
//! once, by settlement.

use std::collections::HashMap;

use fruitmarket_types::{
    BalanceDistribution, MarketError, PlayerId, Result, RoundBalance, RoundNumber, constants,
};
use rand::Rng;
use rand_distr::{Distribution, Triangular};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Draw one starting balance, rounded to currency precision.
///
/// # Errors
/// `Configuration` if the distribution bounds are inconsistent.
pub fn draw_balance<R: Rng + ?Sized>(dist: &BalanceDistribution, rng: &mut R) -> Result<Decimal> {
    if dist.is_degenerate() {
        return Ok(dist.low.round_dp(constants::CURRENCY_DECIMAL_PLACES));
    }

    let to_f64 = |d: Decimal| {
        d.to_f64()
            .ok_or_else(|| MarketError::Configuration(format!("balance bound {d} out of range")))
    };
    let triangular = Triangular::new(to_f64(dist.low)?, to_f64(dist.high)?, to_f64(dist.mode)?)
        .map_err(|e| MarketError::Configuration(format!("initial balance distribution: {e}")))?;

    let sample = triangular.sample(rng);
    let value = Decimal::from_f64(sample)
        .ok_or_else(|| MarketError::Internal(format!("balance sample {sample} not representable")))?;
    Ok(value
        .round_dp(constants::CURRENCY_DECIMAL_PLACES)
        .clamp(dist.low, dist.high))
}

/// Balances for every player in every opened round.
pub struct BalanceBook {
    balances: HashMap<(PlayerId, RoundNumber), RoundBalance>,
}

impl BalanceBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Open `round` for `player` with a starting balance.
    ///
    /// # Errors
    /// `Internal` if the round is already open for this player.
    pub fn open(&mut self, player: PlayerId, round: RoundNumber, starting: Decimal) -> Result<()> {
        if self.balances.contains_key(&(player, round)) {
            return Err(MarketError::Internal(format!(
                "{round} already open for {player}"
            )));
        }
        self.balances
            .insert((player, round), RoundBalance::opening(starting));
        Ok(())
    }

    /// Open round 1 for every player with a balance drawn from `dist`.
    pub fn draw_initial<R: Rng + ?Sized>(
        &mut self,
        players: &[PlayerId],
        dist: &BalanceDistribution,
        rng: &mut R,
    ) -> Result<()> {
        for &player in players {
            let starting = draw_balance(dist, rng)?;
            self.open(player, RoundNumber::FIRST, starting)?;
            tracing::debug!(%player, %starting, "Initial balance drawn");
        }
        Ok(())
    }

    /// Write the ending balance for a round.
    ///
    /// # Errors
    /// - `UnknownRound` if the round was never opened for this player
    /// - `RoundAlreadySettled` if an ending balance already exists
    pub fn close(&mut self, player: PlayerId, round: RoundNumber, ending: Decimal) -> Result<()> {
        let entry = self
            .balances
            .get_mut(&(player, round))
            .ok_or(MarketError::UnknownRound(round))?;
        if entry.is_settled() {
            return Err(MarketError::RoundAlreadySettled { player, round });
        }
        entry.ending = Some(ending);
        Ok(())
    }

    /// Balance record for a (player, round) pair.
    #[must_use]
    pub fn get(&self, player: PlayerId, round: RoundNumber) -> Option<RoundBalance> {
        self.balances.get(&(player, round)).copied()
    }

    /// Starting balance for a (player, round) pair.
    ///
    /// # Errors
    /// `UnknownRound` if the round was never opened for this player.
    pub fn starting(&self, player: PlayerId, round: RoundNumber) -> Result<Decimal> {
        self.get(player, round)
            .map(|b| b.starting)
            .ok_or(MarketError::UnknownRound(round))
    }

    /// Players with an open balance in `round`, sorted.
    #[must_use]
    pub fn players_in_round(&self, round: RoundNumber) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self
            .balances
            .keys()
            .filter(|(_, r)| *r == round)
            .map(|(p, _)| *p)
            .collect();
        players.sort();
        players
    }

    /// Sum of current balances in `round`.
    #[must_use]
    pub fn total_in_round(&self, round: RoundNumber) -> Decimal {
        self.balances
            .iter()
            .filter(|((_, r), _)| *r == round)
            .map(|(_, b)| b.current())
            .sum()
    }
}

impl Default for BalanceBook {
    fn default() -> Self {
        Self::new()
    }
}
