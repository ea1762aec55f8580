//! Game-wide constants.

/// Decimal places kept for currency amounts.
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

/// Default number of rounds in a game.
pub const DEFAULT_NUM_ROUNDS: u32 = 1;

/// Most rounds a game may have.
pub const MAX_NUM_ROUNDS: u32 = 1_000;

/// Default group size (one buyer, two sellers).
pub const DEFAULT_PLAYERS_PER_GROUP: u32 = 3;

/// Largest group a game may have.
pub const MAX_PLAYERS_PER_GROUP: u32 = 1_000;

/// Position in the group that plays the buyer.
pub const DEFAULT_BUYER_ID_IN_GROUP: u32 = 1;

/// Lower bound of the round-1 balance draw.
pub const DEFAULT_INITIAL_BALANCE_LOW: i64 = 1;

/// Upper bound of the round-1 balance draw.
pub const DEFAULT_INITIAL_BALANCE_HIGH: i64 = 20;

/// Mode of the round-1 balance draw.
pub const DEFAULT_INITIAL_BALANCE_MODE: i64 = 10;

/// Maximum offer lines a seller may submit in one action.
pub const DEFAULT_MAX_OFFER_LINES: usize = 20;

/// Highest unit price accepted for an offer.
pub const MAX_UNIT_PRICE: i64 = 1_000_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
