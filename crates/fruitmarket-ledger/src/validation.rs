//! Offer line validation: the gate every offer passes before it is posted.
//!
//! Each line of a submission is checked on its own. A failing line is
//! reported as `InvalidOfferInput` and never reaches the ledger; the rest
//! of the submission is unaffected.

use fruitmarket_types::{MarketError, OfferInput, Result, constants};
use rust_decimal::Decimal;

/// Validates offer lines against fixed limits.
#[derive(Debug, Clone)]
pub struct OfferValidator {
    /// Highest unit price accepted.
    max_unit_price: Decimal,
    /// Maximum lines per submission.
    max_lines: usize,
}

impl OfferValidator {
    /// Validator with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_unit_price: Decimal::from(constants::MAX_UNIT_PRICE),
            max_lines: constants::DEFAULT_MAX_OFFER_LINES,
        }
    }

    /// Validator with custom limits.
    #[must_use]
    pub fn with_limits(max_unit_price: Decimal, max_lines: usize) -> Self {
        Self {
            max_unit_price,
            max_lines,
        }
    }

    #[must_use]
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Validate one line. Returns the amount as an unsigned quantity.
    ///
    /// `index` is the line's position in the submission; lines past the
    /// configured maximum are rejected.
    pub fn validate(&self, index: usize, input: &OfferInput) -> Result<u32> {
        if index >= self.max_lines {
            return Err(MarketError::InvalidOfferInput {
                reason: format!("at most {} offer lines per submission", self.max_lines),
            });
        }

        if input.unit_price.is_sign_negative() && !input.unit_price.is_zero() {
            return Err(MarketError::InvalidOfferInput {
                reason: format!("unit price {} is negative", input.unit_price),
            });
        }

        if input.unit_price > self.max_unit_price {
            return Err(MarketError::InvalidOfferInput {
                reason: format!(
                    "unit price {} exceeds maximum {}",
                    input.unit_price, self.max_unit_price
                ),
            });
        }

        if input.amount <= 0 {
            return Err(MarketError::InvalidOfferInput {
                reason: format!("amount {} must be positive", input.amount),
            });
        }

        u32::try_from(input.amount).map_err(|_| MarketError::InvalidOfferInput {
            reason: format!("amount {} is too large", input.amount),
        })
    }
}

impl Default for OfferValidator {
    fn default() -> Self {
        Self::new()
    }
}
