//! # fruitmarket-settlement
//!
//! **End of round**: balance settlement, conservation checks and carryover
//! into the next round.
//!
//! ## Architecture
//!
//! The settlement plane receives the round's purchases from MatchCore and:
//! 1. Guards against settling a player twice in the same round
//! 2. Checks buyer spend equals seller proceeds
//! 3. Writes every player's ending balance in the [`BalanceBook`]
//! 4. Issues a [`SettlementReceipt`] carrying the purchase root
//!
//! A closed round that is not the last one is then carried over: ending
//! balances open the next round and unsold offers are re-posted.
//!
//! [`BalanceBook`]: fruitmarket_ledger::BalanceBook
//! [`SettlementReceipt`]: fruitmarket_types::SettlementReceipt

pub mod carryover;
pub mod conservation;
pub mod idempotency;
pub mod settler;

pub use carryover::carry_over_round;
pub use conservation::{Conservation, RoundFlows};
pub use idempotency::SettlementGuard;
pub use settler::RoundSettler;
