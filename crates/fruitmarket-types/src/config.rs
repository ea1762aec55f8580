//! Game configuration.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MarketError, Result, constants};

/// How a multi-line purchase submission is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Every line is processed on its own; failed lines are reported and
    /// lines already committed stay committed.
    #[default]
    BestEffort,
    /// The whole submission is checked first; any failing line rejects it
    /// and nothing is committed.
    AllOrNothing,
}

/// Triangular distribution the round-1 balances are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDistribution {
    pub low: Decimal,
    pub high: Decimal,
    pub mode: Decimal,
}

impl Default for BalanceDistribution {
    fn default() -> Self {
        Self {
            low: Decimal::from(constants::DEFAULT_INITIAL_BALANCE_LOW),
            high: Decimal::from(constants::DEFAULT_INITIAL_BALANCE_HIGH),
            mode: Decimal::from(constants::DEFAULT_INITIAL_BALANCE_MODE),
        }
    }
}

impl BalanceDistribution {
    /// Distribution that always yields `value`.
    #[must_use]
    pub fn fixed(value: Decimal) -> Self {
        Self {
            low: value,
            high: value,
            mode: value,
        }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }
}

/// Configuration for one game session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of rounds played.
    pub num_rounds: u32,
    /// Players in the (single) group.
    pub players_per_group: u32,
    /// Which position in the group is the buyer.
    pub buyer_id_in_group: u32,
    /// Round-1 balance distribution.
    pub initial_balance: BalanceDistribution,
    /// Commit policy for purchase submissions.
    pub match_policy: MatchPolicy,
    /// Reject purchase lines the buyer cannot afford.
    pub enforce_budget: bool,
    /// Maximum offer lines per submission.
    pub max_offer_lines: usize,
    /// RNG seed for the balance draw; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_rounds: constants::DEFAULT_NUM_ROUNDS,
            players_per_group: constants::DEFAULT_PLAYERS_PER_GROUP,
            buyer_id_in_group: constants::DEFAULT_BUYER_ID_IN_GROUP,
            initial_balance: BalanceDistribution::default(),
            match_policy: MatchPolicy::default(),
            enforce_budget: false,
            max_offer_lines: constants::DEFAULT_MAX_OFFER_LINES,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Check bounds and cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if !(1..=constants::MAX_NUM_ROUNDS).contains(&self.num_rounds) {
            return Err(MarketError::Configuration(format!(
                "num_rounds {} outside 1..={}",
                self.num_rounds,
                constants::MAX_NUM_ROUNDS
            )));
        }
        if !(2..=constants::MAX_PLAYERS_PER_GROUP).contains(&self.players_per_group) {
            return Err(MarketError::Configuration(format!(
                "players_per_group {} outside 2..={}",
                self.players_per_group,
                constants::MAX_PLAYERS_PER_GROUP
            )));
        }
        if self.buyer_id_in_group == 0 || self.buyer_id_in_group > self.players_per_group {
            return Err(MarketError::Configuration(format!(
                "buyer_id_in_group {} outside 1..={}",
                self.buyer_id_in_group, self.players_per_group
            )));
        }
        let dist = &self.initial_balance;
        if dist.low.is_sign_negative() {
            return Err(MarketError::Configuration(
                "initial_balance.low must not be negative".to_string(),
            ));
        }
        if !(dist.low <= dist.mode && dist.mode <= dist.high) {
            return Err(MarketError::Configuration(format!(
                "initial_balance requires low <= mode <= high (got {}/{}/{})",
                dist.low, dist.mode, dist.high
            )));
        }
        if self.max_offer_lines == 0 {
            return Err(MarketError::Configuration(
                "max_offer_lines must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = GameConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.num_rounds, 1);
        assert_eq!(cfg.buyer_id_in_group, 1);
        assert_eq!(cfg.match_policy, MatchPolicy::BestEffort);
        assert_eq!(cfg.initial_balance.low, Decimal::ONE);
        assert_eq!(cfg.initial_balance.high, Decimal::new(20, 0));
        assert_eq!(cfg.initial_balance.mode, Decimal::new(10, 0));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg = GameConfig::from_json_str(r#"{"num_rounds": 3, "match_policy": "all_or_nothing"}"#)
            .unwrap();
        assert_eq!(cfg.num_rounds, 3);
        assert_eq!(cfg.match_policy, MatchPolicy::AllOrNothing);
        assert_eq!(cfg.players_per_group, 3);
    }

    #[test]
    fn zero_rounds_rejected() {
        let err = GameConfig::from_json_str(r#"{"num_rounds": 0}"#).unwrap_err();
        assert!(matches!(err, MarketError::Configuration(_)));
    }

    #[test]
    fn round_and_group_caps_enforced() {
        let err = GameConfig::from_json_str(r#"{"num_rounds": 4294967295}"#).unwrap_err();
        assert!(matches!(err, MarketError::Configuration(_)));

        let cfg = GameConfig {
            num_rounds: constants::MAX_NUM_ROUNDS,
            ..GameConfig::default()
        };
        assert!(cfg.validate().is_ok());

        let cfg = GameConfig {
            players_per_group: constants::MAX_PLAYERS_PER_GROUP + 1,
            ..GameConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MarketError::Configuration(_))));
    }

    #[test]
    fn buyer_slot_must_exist() {
        let cfg = GameConfig {
            players_per_group: 2,
            buyer_id_in_group: 3,
            ..GameConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MarketError::Configuration(_))));
    }

    #[test]
    fn mode_outside_bounds_rejected() {
        let cfg = GameConfig {
            initial_balance: BalanceDistribution {
                low: Decimal::new(5, 0),
                high: Decimal::new(10, 0),
                mode: Decimal::new(11, 0),
            },
            ..GameConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MarketError::Configuration(_))));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = GameConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, MarketError::Serialization(_)));
    }

    #[test]
    fn fixed_distribution() {
        let d = BalanceDistribution::fixed(Decimal::new(7, 0));
        assert!(d.is_degenerate());
        let cfg = GameConfig {
            initial_balance: d,
            ..GameConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
