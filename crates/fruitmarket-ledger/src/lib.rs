//! # fruitmarket-ledger
//!
//! **Market state**: the offer ledger, offer line validation, and the
//! per-round balance book.
//!
//! ## Architecture
//!
//! 1. **OfferValidator**: checks each submitted offer line on its own
//! 2. **OfferLedger**: holds every offer; the matcher takes units off it
//! 3. **BalanceBook**: starting/ending balance per (player, round)
//!
//! ## Offer Flow
//!
//! ```text
//! seller → OfferLedger.submit_offers() → OfferValidator.validate() per line
//!        → accepted offers posted, rejected lines reported
//! ```

pub mod balance_book;
pub mod offer_ledger;
pub mod validation;

pub use balance_book::{BalanceBook, draw_balance};
pub use offer_ledger::OfferLedger;
pub use validation::OfferValidator;
