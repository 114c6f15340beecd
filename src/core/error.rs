//! Error types shared across the engine.

use std::borrow::Cow;
use thiserror::Error;

use crate::core::player::PlayerId;

/// Human-readable reason attached to a disabled action or bad input.
pub type Reason = Cow<'static, str>;

/// Why an action or event was refused.
///
/// Rejections never mutate table state. The `Display` text is what the
/// player hears; [`Rejection::code`] is a stable tag for transports and logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("That table is no longer open.")]
    TableClosed,

    #[error("That table has been suspended after an internal fault.")]
    TableFrozen,

    #[error("No table with id `{0}` is running.")]
    UnknownTable(String),

    #[error("You are not seated at this table.")]
    UnknownPlayer(PlayerId),

    /// The action id is not in any of the player's action sets. Covers
    /// stale menu selections after a phase change.
    #[error("That action is not available right now.")]
    Unavailable { action_id: String },

    #[error("{reason}")]
    Disabled { action_id: String, reason: Reason },

    #[error("That action is not on your menu.")]
    Hidden { action_id: String },

    #[error("{reason}")]
    InvalidInput { action_id: String, reason: Reason },

    #[error("That action needs an answer that could not be provided.")]
    MissingInput { action_id: String },

    #[error("That key does nothing right now.")]
    UnknownKey(String),
}

impl Rejection {
    /// Stable machine-readable tag.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::TableClosed => "table-closed",
            Rejection::TableFrozen => "table-frozen",
            Rejection::UnknownTable(_) => "unknown-table",
            Rejection::UnknownPlayer(_) => "unknown-player",
            Rejection::Unavailable { .. } => "action-unavailable",
            Rejection::Disabled { .. } => "action-disabled",
            Rejection::Hidden { .. } => "action-hidden",
            Rejection::InvalidInput { .. } => "invalid-input",
            Rejection::MissingInput { .. } => "missing-input",
            Rejection::UnknownKey(_) => "unknown-key",
        }
    }

    /// The action this rejection concerns, if any.
    #[must_use]
    pub fn action_id(&self) -> Option<&str> {
        match self {
            Rejection::Unavailable { action_id }
            | Rejection::Disabled { action_id, .. }
            | Rejection::Hidden { action_id }
            | Rejection::InvalidInput { action_id, .. }
            | Rejection::MissingInput { action_id } => Some(action_id),
            _ => None,
        }
    }
}

/// Failures while saving or restoring a table.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode or decode JSON state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode or decode binary state: {0}")]
    Binary(#[from] bincode::Error),

    #[error("state format version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("state belongs to game `{found}`, not `{expected}`")]
    WrongGameType { expected: String, found: String },

    #[error("no game registered for type `{0}`")]
    UnknownGameType(String),

    #[error("state store failure: {0}")]
    Store(String),
}

/// A table fault caught at the tick boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickError {
    #[error("table `{table_id}` panicked during {phase}: {message}")]
    Panicked {
        table_id: String,
        phase: &'static str,
        message: String,
    },
}
