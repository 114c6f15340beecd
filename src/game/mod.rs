//! The contract every game implements.
//!
//! Games implement [`Game`] to define their rules:
//! - How a table is created and started
//! - Which actions a seated player gets on their turn
//! - What bots do and what happens on each tick
//! - How the end result is reported
//!
//! ## Implementation Notes
//!
//! - All game state lives in `Self` and must serialize. Action callbacks
//!   are function pointers, so nothing can hide outside the aggregate.
//! - Hooks run with exclusive access to the table; there is no need for
//!   locking inside a game.
//! - A game never talks to connections directly, only through the
//!   [`GameCore`] communication helpers.

mod lobby;
mod result;

pub use lobby::{
    estimate_action_set, lobby_action_set, next_bot_name, options_action_set, standard_action_set, standard_keybinds,
    BOT_NAMES,
};
pub use result::{GameResult, Outcome, PlayerResult};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::actions::ActionSet;
use crate::core::{GameCore, OptionSpec, Player, PlayerId};
use crate::engine::{bots, execution, Keybind};

/// A turn-based table game.
pub trait Game: Serialize + DeserializeOwned + Send + Sized + 'static {
    /// Registry tag stored in every snapshot.
    const GAME_TYPE: &'static str;
    /// Human-readable name.
    const NAME: &'static str;
    const MIN_PLAYERS: usize = 2;
    const MAX_PLAYERS: usize = 4;

    /// Create an empty table in the lobby.
    fn new_table(table_id: &str, seed: u64) -> Self;

    fn core(&self) -> &GameCore<Self>;

    fn core_mut(&mut self) -> &mut GameCore<Self>;

    /// Called once when the host starts the game, after the table has
    /// switched to the active phase.
    fn on_start(&mut self);

    // === Optional hooks ===

    /// Options the host may configure in the lobby.
    fn option_specs() -> &'static [OptionSpec] {
        &[]
    }

    /// Problems preventing the game from starting, as messages for the host.
    fn prestart_validate(&self) -> Vec<String> {
        Vec::new()
    }

    /// The game's own actions for a seat, registered ahead of the lobby and
    /// standard sets.
    fn turn_action_set(&self, _player: &Player) -> Option<ActionSet<Self>> {
        None
    }

    /// Game-specific keybinds, added to the standard ones.
    fn game_keybinds(&self) -> Vec<Keybind> {
        Vec::new()
    }

    /// Per-tick hook. The default drives bots.
    fn on_tick(&mut self) {
        bots::on_tick(self);
    }

    /// A timer scheduled with `schedule_timer` came due.
    fn on_timer(&mut self, _key: &str) {}

    fn on_player_skipped(&mut self, player: &PlayerId) {
        let name = self
            .core()
            .player(player)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| player.to_string());
        self.core().broadcast(&format!("{name} is skipped."));
    }

    /// Pick the next action id for a bot holding the turn.
    fn bot_think(&mut self, _player: &PlayerId) -> Option<String> {
        None
    }

    /// Finish the current turn. The default advances the turn order and
    /// announces the next player.
    fn end_turn(&mut self) {
        execution::end_turn(self);
    }

    /// Lines for the scores readout.
    fn score_lines(&self) -> Vec<String> {
        Vec::new()
    }

    /// Assemble the end result. Called when the game finishes.
    fn build_result(&self) -> GameResult {
        let core = self.core();
        GameResult {
            game_type: Self::GAME_TYPE.to_string(),
            outcome: Outcome::Draw,
            duration_ticks: core.tick,
            rounds: core.round,
            players: core
                .players
                .iter()
                .filter(|p| p.is_active())
                .map(|p| PlayerResult {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    is_bot: p.is_bot,
                    score: None,
                })
                .collect(),
        }
    }

    /// Lines shown to every player when the game ends.
    fn format_end_screen(&self, result: &GameResult) -> Vec<String> {
        let mut lines = vec!["Game over.".to_string()];
        match result.winner_names().as_slice() {
            [] => lines.push("The game ended in a draw.".to_string()),
            [winner] => lines.push(format!("{winner} wins!")),
            winners => lines.push(format!("Winners: {}.", winners.join(", "))),
        }
        for player in &result.players {
            match player.score {
                Some(score) => lines.push(format!("{}: {score}", player.name)),
                None => lines.push(player.name.clone()),
            }
        }
        lines
    }

    /// Rebuild game-specific caches after a restore. Engine runtime state is
    /// rebuilt before this is called.
    fn rebuild_runtime_state(&mut self) {}
}
