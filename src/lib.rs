//! # tabletop-engine
//!
//! A session engine for multiplayer turn-based table games.
//!
//! ## Design Principles
//!
//! 1. **One Aggregate**: Everything a table needs to resume lives in the
//!    game value. Connections, action sets and keybinds are derived and
//!    rebuilt after a restore.
//!
//! 2. **Actions Are Data Over State**: An action is a set of function
//!    pointers over the game. Resolving one is a pure read; running one is
//!    an imperative `&mut` call.
//!
//! 3. **Waiting Is State**: A player who owes input is an entry in the
//!    pending-input map, never a blocked call.
//!
//! ## Architecture
//!
//! - **Single-threaded tables**: The scheduler applies queued transport
//!   commands and ticks every table from one thread. The only parallel work
//!   is duration estimation, which runs on independent simulated copies.
//!
//! - **Fault isolation**: A panic inside one table freezes that table; the
//!   rest keep ticking.
//!
//! ## Modules
//!
//! - `core`: Players, RNG, configuration, options, errors and the table aggregate
//! - `user`: The capability interface games use to talk to players
//! - `actions`: Actions, action sets, the per-player registry and resolution
//! - `turns`: Turn order, direction and skips
//! - `game`: The `Game` trait and the action sets every table gets
//! - `engine`: Action execution, events, menus, keybinds, bots, lifecycle, estimates
//! - `scheduler`: Scheduled effects and the tick loop
//! - `persistence`: Snapshots, stores and the game registry
//! - `simulation`: Headless bot-only runs
//! - `games`: Games shipped with the engine

pub mod actions;
pub mod core;
pub mod engine;
pub mod game;
pub mod games;
pub mod persistence;
pub mod scheduler;
pub mod simulation;
pub mod turns;
pub mod user;

// Re-export commonly used types
pub use crate::core::{
    BotState, EngineConfig, GameCore, GameRng, GameRngState, GameStatus, OptionBag, OptionKind, OptionSpec,
    OptionValue, PersistError, Player, PlayerId, Reason, Rejection, TickError,
};

pub use crate::user::{BotUser, MenuItem, Notification, RecordingUser, SoundCue, User, UserHandle};

pub use crate::actions::{
    get_all_enabled_actions, get_all_visible_actions, resolve_action, Action, ActionCall, ActionContext,
    ActionRegistry, ActionSet, InputRequest, Origin, ResolvedAction, Visibility,
};

pub use crate::turns::{Advance, Direction, TurnOrder};

pub use crate::game::{Game, GameResult, Outcome, PlayerResult};

pub use crate::engine::{
    execute_action, handle_event, Dispatch, EstimateSummary, Execution, Keybind, KeybindState, PlayerEvent,
};

pub use crate::scheduler::{EffectId, EffectKind, EffectQueue, Scheduler, SchedulerHandle, Table, TableHealth};

pub use crate::persistence::{Encoding, GameRegistry, MemoryStore, PersistenceStore, StateBlob, FORMAT_VERSION};

pub use crate::simulation::{Simulation, SimulationReport};

pub use crate::games::PigGame;
