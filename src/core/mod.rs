//! Core engine types: players, RNG, configuration, options, errors and the
//! shared table aggregate.
//!
//! Everything here is game-agnostic. Games embed a [`GameCore`] in their
//! own state and layer their rules on top.

pub mod config;
pub mod error;
pub mod options;
pub mod player;
pub mod rng;
pub mod state;

pub use config::EngineConfig;
pub use error::{PersistError, Reason, Rejection, TickError};
pub use options::{OptionBag, OptionKind, OptionSpec, OptionValue};
pub use player::{BotState, Player, PlayerId};
pub use rng::{GameRng, GameRngState};
pub use state::{GameCore, GameStatus};
