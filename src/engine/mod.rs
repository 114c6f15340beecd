//! The runtime that drives a table: action execution, event routing,
//! menus, keybinds, bots, lifecycle and duration estimates.
//!
//! Every function here takes the game by `&mut` and runs to completion.
//! Nothing blocks; a player who owes input is a map entry, not a waiting
//! call.

pub mod bots;
pub mod estimate;
pub mod events;
pub mod execution;
pub mod keybinds;
pub mod lifecycle;
pub mod menus;

pub use estimate::{format_duration, EstimateSummary};
pub use events::{handle_event, Dispatch, PlayerEvent};
pub use execution::{advance_turn, announce_turn, end_turn, execute_action, Execution};
pub use keybinds::{normalize_key, Keybind, KeybindMap, KeybindState};
pub use lifecycle::{
    add_bot, add_player, attach_user, destroy, detach_user, finish_game, leave_table, remove_player, restore_runtime,
    run_tick, start_game,
};
