//! Player identification and per-seat data.
//!
//! ## PlayerId
//!
//! Stable string identifier shared with the connected user. Bots get an id
//! derived from the table RNG so simulations stay reproducible.
//!
//! ## Player
//!
//! The persisted seat record. Connection handles are never stored here; the
//! table resolves a player's user lazily by id.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Identifier of a seat at a table, equal to the owning user's id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a player id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an id from 128 random bits.
    ///
    /// ```
    /// use tabletop_engine::core::PlayerId;
    ///
    /// let a = PlayerId::from_bits(7);
    /// let b = PlayerId::from_bits(7);
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str().len(), 36);
    /// ```
    #[must_use]
    pub fn from_bits(bits: u128) -> Self {
        Self(Uuid::from_u128(bits).to_string())
    }

    /// A fresh random id for a newly connected user.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Bot bookkeeping carried on every seat.
///
/// Persisted so a reload resumes a bot mid-decision without repeating or
/// dropping its chosen action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotState {
    /// Ticks left before the bot may act.
    pub think_ticks: u32,
    /// Action id decided on but not yet executed.
    pub pending_action: Option<String>,
    /// Game-defined goal, e.g. a points threshold.
    pub target: Option<i64>,
}

/// A seat at a table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_bot: bool,
    pub is_spectator: bool,
    /// Optional team index for team games.
    pub team: Option<u8>,
    pub bot: BotState,
}

impl Player {
    /// Create a human seat.
    #[must_use]
    pub fn human(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_bot: false,
            is_spectator: false,
            team: None,
            bot: BotState::default(),
        }
    }

    /// Create a bot seat.
    #[must_use]
    pub fn bot(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            is_bot: true,
            ..Self::human(id, name)
        }
    }

    /// Seated and not spectating.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_spectator
    }
}
