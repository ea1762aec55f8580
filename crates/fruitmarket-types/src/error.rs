//! Error types for the market game.
//!
//! All errors use the `FM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Offer errors
//! - 2xx: Purchase errors
//! - 3xx: Round errors
//! - 4xx: Settlement errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{OfferId, PlayerId, Role, RoundNumber, RoundPhase};

/// Central error enum for all market operations.
#[derive(Debug, Clone, Error)]
pub enum MarketError {
    // =================================================================
    // Offer Errors (1xx)
    // =================================================================
    /// An offer line failed validation (negative price, non-positive amount, ...).
    #[error("FM_ERR_100: Invalid offer input: {reason}")]
    InvalidOfferInput { reason: String },

    /// The referenced offer does not exist in this round.
    #[error("FM_ERR_101: Unknown offer: {0}")]
    UnknownOffer(OfferId),

    // =================================================================
    // Purchase Errors (2xx)
    // =================================================================
    /// The requested amount exceeds what is left on the offer.
    #[error("FM_ERR_200: Insufficient stock on offer {offer_id}: requested {requested}, remaining {remaining}")]
    InsufficientStock {
        offer_id: OfferId,
        requested: u32,
        remaining: u32,
    },

    /// A purchase line failed validation.
    #[error("FM_ERR_201: Invalid purchase input: {reason}")]
    InvalidPurchaseInput { reason: String },

    /// The buyer cannot afford the line under budget enforcement.
    #[error("FM_ERR_202: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// The player tried an action reserved for the other role.
    #[error("FM_ERR_203: Wrong role for {player}: expected {expected}")]
    WrongRole { player: PlayerId, expected: Role },

    // =================================================================
    // Round Errors (3xx)
    // =================================================================
    /// An operation was attempted in the wrong round phase.
    #[error("FM_ERR_300: Wrong round phase: expected {expected}, got {actual}")]
    WrongRoundPhase {
        expected: RoundPhase,
        actual: RoundPhase,
    },

    /// Data from one round was handed to an operation on another.
    #[error("FM_ERR_301: Round mismatch: expected {expected}, got {actual}")]
    RoundMismatch {
        expected: RoundNumber,
        actual: RoundNumber,
    },

    /// No round follows the final one.
    #[error("FM_ERR_302: {0} is the final round")]
    FinalRoundReached(RoundNumber),

    /// The player is not part of this game.
    #[error("FM_ERR_303: Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    /// The round has not been opened.
    #[error("FM_ERR_304: Unknown round: {0}")]
    UnknownRound(RoundNumber),

    /// No player holds this `id_in_group`.
    #[error("FM_ERR_305: No player at position {0}")]
    UnknownPosition(u32),

    // =================================================================
    // Settlement Errors (4xx)
    // =================================================================
    /// Balances for this player and round were already settled.
    #[error("FM_ERR_400: {player} already settled for {round}")]
    RoundAlreadySettled { player: PlayerId, round: RoundNumber },

    /// Carryover needs an ending balance that does not exist yet.
    #[error("FM_ERR_401: {player} not settled for {round}")]
    RoundNotSettled { player: PlayerId, round: RoundNumber },

    /// Buyer spend and seller proceeds disagree.
    #[error("FM_ERR_402: Conservation violation in {round}: spend {spend} != proceeds {proceeds}")]
    ConservationViolation {
        round: RoundNumber,
        spend: Decimal,
        proceeds: Decimal,
    },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("FM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("FM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad bounds, etc.).
    #[error("FM_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("FM_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<std::io::Error> for MarketError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = MarketError::UnknownOffer(OfferId::new());
        let msg = format!("{err}");
        assert!(msg.starts_with("FM_ERR_101"), "Got: {msg}");
    }

    #[test]
    fn insufficient_stock_display() {
        let err = MarketError::InsufficientStock {
            offer_id: OfferId::new(),
            requested: 15,
            remaining: 6,
        };
        let msg = format!("{err}");
        assert!(msg.contains("FM_ERR_200"));
        assert!(msg.contains("15"));
        assert!(msg.contains('6'));
    }

    #[test]
    fn wrong_phase_display() {
        let err = MarketError::WrongRoundPhase {
            expected: RoundPhase::Offers,
            actual: RoundPhase::Purchases,
        };
        let msg = format!("{err}");
        assert!(msg.contains("OFFERS"));
        assert!(msg.contains("PURCHASES"));
    }

    #[test]
    fn all_errors_have_fm_err_prefix() {
        let errors: Vec<MarketError> = vec![
            MarketError::InvalidOfferInput { reason: "x".into() },
            MarketError::FinalRoundReached(RoundNumber(1)),
            MarketError::UnknownPosition(9),
            MarketError::WrongRole {
                player: PlayerId::new(),
                expected: Role::Buyer,
            },
            MarketError::Internal("test".into()),
            MarketError::ConservationViolation {
                round: RoundNumber(1),
                spend: Decimal::ONE,
                proceeds: Decimal::ZERO,
            },
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(msg.starts_with("FM_ERR_"), "Error missing FM_ERR_ prefix: {msg}");
        }
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: MarketError = io.into();
        assert!(matches!(err, MarketError::Io(ref m) if m.contains("missing")));
    }
}
