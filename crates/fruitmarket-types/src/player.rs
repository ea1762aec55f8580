//! Players, roles and the per-player round state machine.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, RoundNumber};

/// A player's role. Fixed for the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    /// Role for a position in the group: the configured buyer slot buys,
    /// everyone else sells.
    #[must_use]
    pub fn for_id_in_group(id_in_group: u32, buyer_id_in_group: u32) -> Self {
        if id_in_group == buyer_id_in_group {
            Self::Buyer
        } else {
            Self::Seller
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
        }
    }
}

/// A participant's player instance in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// 1-based position within the group.
    pub id_in_group: u32,
    pub round: RoundNumber,
    pub role: Role,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, id_in_group: u32, round: RoundNumber, buyer_id_in_group: u32) -> Self {
        Self {
            id,
            id_in_group,
            round,
            role: Role::for_id_in_group(id_in_group, buyer_id_in_group),
        }
    }

    /// The same participant's player instance in `round`.
    #[must_use]
    pub fn in_round(&self, round: RoundNumber) -> Self {
        Self {
            round,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn is_buyer(&self) -> bool {
        self.role == Role::Buyer
    }

    #[must_use]
    pub fn is_seller(&self) -> bool {
        self.role == Role::Seller
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Player {
    pub fn dummy_buyer() -> Self {
        Self::new(
            PlayerId::new(),
            crate::constants::DEFAULT_BUYER_ID_IN_GROUP,
            RoundNumber::FIRST,
            crate::constants::DEFAULT_BUYER_ID_IN_GROUP,
        )
    }

    pub fn dummy_seller(id_in_group: u32) -> Self {
        assert_ne!(id_in_group, crate::constants::DEFAULT_BUYER_ID_IN_GROUP);
        Self::new(
            PlayerId::new(),
            id_in_group,
            RoundNumber::FIRST,
            crate::constants::DEFAULT_BUYER_ID_IN_GROUP,
        )
    }
}

/// Progress of one player through a round.
///
/// Sellers start in `AwaitingOffers`, buyers in `AwaitingPurchases`; both
/// then move through `Submitted → Matched → Settled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerPhase {
    AwaitingOffers,
    AwaitingPurchases,
    Submitted,
    Matched,
    Settled,
}

impl PlayerPhase {
    /// Entry state for a role.
    #[must_use]
    pub fn initial(role: Role) -> Self {
        match role {
            Role::Seller => Self::AwaitingOffers,
            Role::Buyer => Self::AwaitingPurchases,
        }
    }

    /// Next state, or `None` once settled.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::AwaitingOffers | Self::AwaitingPurchases => Some(Self::Submitted),
            Self::Submitted => Some(Self::Matched),
            Self::Matched => Some(Self::Settled),
            Self::Settled => None,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Settled
    }
}

impl std::fmt::Display for PlayerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingOffers => write!(f, "AWAITING_OFFERS"),
            Self::AwaitingPurchases => write!(f, "AWAITING_PURCHASES"),
            Self::Submitted => write!(f, "SUBMITTED"),
            Self::Matched => write!(f, "MATCHED"),
            Self::Settled => write!(f, "SETTLED"),
        }
    }
}
