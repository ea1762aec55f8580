//! # fruitmarket-types
//!
//! Shared types, errors, and configuration for the **fruitmarket** game.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`PlayerId`], [`OfferId`], [`PurchaseId`], [`RoundNumber`]
//! - **Offer model**: [`Offer`], [`OfferInput`], [`FruitKind`]
//! - **Purchase model**: [`Purchase`], [`PurchaseRequest`]
//! - **Players**: [`Player`], [`Role`], [`PlayerPhase`]
//! - **Rounds**: [`RoundPhase`], [`RoundBalance`]
//! - **Reports**: [`SubmissionReport`], [`MatchReport`], [`SettlementReceipt`], [`CarryoverReport`]
//! - **Configuration**: [`GameConfig`], [`MatchPolicy`], [`BalanceDistribution`]
//! - **Errors**: [`MarketError`] with `FM_ERR_` prefix codes
//! - **Constants**: game-wide limits and defaults

pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod offer;
pub mod player;
pub mod purchase;
pub mod receipt;
pub mod report;
pub mod round;

pub use balance::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use offer::*;
pub use player::*;
pub use purchase::*;
pub use receipt::*;
pub use report::*;
pub use round::*;

// Constants are accessed via `fruitmarket_types::constants::FOO`
// (not re-exported to avoid name collisions).
