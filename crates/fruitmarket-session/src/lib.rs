//! # fruitmarket-session
//!
//! Orchestrates one group through the rounds of the market game.
//!
//! ## Round lifecycle
//!
//! ```text
//! OFFERS ──► PURCHASES ──► SETTLEMENT ──► CLOSED ──► next round
//!   │            │              │            │
//!   sellers      buyer matches  balances     ending balances and
//!   post offers  against offers settled once unsold offers carried over
//! ```
//!
//! [`GameSession`] wires the ledger, matcher and settler together and
//! tracks each player's [`PlayerPhase`](fruitmarket_types::PlayerPhase).
//! [`script::play`] runs a session from a JSON script; the
//! `fruitmarket-sim` binary is a thin wrapper around it.

pub mod script;
pub mod session;

pub use script::{Script, play};
pub use session::GameSession;
