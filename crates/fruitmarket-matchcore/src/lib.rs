//! # fruitmarket-matchcore
//!
//! **Purchase matching for fruitmarket.**
//!
//! The buyer submits purchase lines against the offers posted in its round.
//! MatchCore validates each line, records [`Purchase`]s, takes the units off
//! the offers and accrues what the buyer owes and each seller earns. It
//! never touches balances; that is settlement's job.
//!
//! [`Purchase`]: fruitmarket_types::Purchase

pub mod determinism;
pub mod matcher;

pub use determinism::{compute_purchase_root, verify_purchase_root};
pub use matcher::PurchaseMatcher;
