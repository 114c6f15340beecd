//! The table aggregate shared by every game.
//!
//! ## GameCore
//!
//! Everything a table needs to resume after a restart lives in the
//! serialized fields: roster, turn order, options, pending input, scheduled
//! effects, the tick counter and the RNG. Connections, action sets,
//! keybinds and in-flight estimates are runtime state, skipped by serde and
//! rebuilt after a restore.

use im::Vector;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::options::{OptionBag, OptionSpec};
use super::player::{Player, PlayerId};
use super::rng::GameRng;
use crate::actions::{ActionContext, ActionRegistry};
use crate::engine::estimate::EstimateRun;
use crate::engine::keybinds::KeybindMap;
use crate::game::GameResult;
use crate::scheduler::{EffectId, EffectKind, EffectQueue};
use crate::turns::TurnOrder;
use crate::user::{SoundCue, UserHandle};

/// Table lifecycle phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Lobby,
    Active,
    Finished,
}

/// Non-persisted table state.
pub(crate) struct Runtime<G> {
    pub users: FxHashMap<PlayerId, UserHandle>,
    pub actions: ActionRegistry<G>,
    pub keybinds: KeybindMap,
    pub context: Option<ActionContext>,
    pub menus_dirty: bool,
    /// Nesting depth of action execution; menus flush at depth zero.
    pub depth: u32,
    pub destroyed: bool,
    pub save_requested: Option<PlayerId>,
    pub status_box_open: FxHashSet<PlayerId>,
    pub actions_menu_open: FxHashSet<PlayerId>,
    pub estimate: EstimateRun,
    pub config: EngineConfig,
}

impl<G> Default for Runtime<G> {
    fn default() -> Self {
        Self {
            users: FxHashMap::default(),
            actions: ActionRegistry::default(),
            keybinds: KeybindMap::default(),
            context: None,
            menus_dirty: false,
            depth: 0,
            destroyed: false,
            save_requested: None,
            status_box_open: FxHashSet::default(),
            actions_menu_open: FxHashSet::default(),
            estimate: EstimateRun::default(),
            config: EngineConfig::default(),
        }
    }
}

/// State common to every table, embedded in each game's own state.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct GameCore<G> {
    pub table_id: String,
    pub game_type: String,
    pub status: GameStatus,
    pub host: Option<PlayerId>,
    pub players: Vector<Player>,
    pub options: OptionBag,
    pub turn: TurnOrder,
    /// Round counter maintained by the game.
    pub round: u32,
    /// Ticks processed since the table was created.
    pub tick: u64,
    pub rng: GameRng,
    pub effects: EffectQueue,
    /// Players waiting to answer an input request, mapped to the action
    /// that asked.
    pub pending_inputs: IndexMap<PlayerId, String>,
    pub current_music: Option<String>,
    pub result: Option<GameResult>,
    #[serde(skip)]
    pub(crate) runtime: Runtime<G>,
}

impl<G> GameCore<G> {
    #[must_use]
    pub fn new(table_id: impl Into<String>, game_type: impl Into<String>, seed: u64) -> Self {
        Self {
            table_id: table_id.into(),
            game_type: game_type.into(),
            status: GameStatus::Lobby,
            host: None,
            players: Vector::new(),
            options: OptionBag::new(),
            turn: TurnOrder::default(),
            round: 0,
            tick: 0,
            rng: GameRng::new(seed),
            effects: EffectQueue::default(),
            pending_inputs: IndexMap::new(),
            current_music: None,
            result: None,
            runtime: Runtime::default(),
        }
    }

    // === Roster ===

    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == *id)
    }

    #[must_use]
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Seated, non-spectating players in join order.
    #[must_use]
    pub fn active_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.is_active()).collect()
    }

    #[must_use]
    pub fn active_player_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id.clone())
            .collect()
    }

    #[must_use]
    pub fn human_count(&self) -> usize {
        self.players.iter().filter(|p| !p.is_bot).count()
    }

    /// The player holding the turn, resolved by id.
    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.turn.current().and_then(|id| self.player(id))
    }

    #[must_use]
    pub fn is_current(&self, id: &PlayerId) -> bool {
        self.turn.current() == Some(id)
    }

    #[must_use]
    pub fn is_host(&self, id: &PlayerId) -> bool {
        self.host.as_ref() == Some(id)
    }

    // === Options ===

    #[must_use]
    pub fn option_int(&self, spec: &OptionSpec) -> i64 {
        self.options.int(spec)
    }

    #[must_use]
    pub fn option_flag(&self, spec: &OptionSpec) -> bool {
        self.options.flag(spec)
    }

    // === Runtime views ===

    /// Connected user for a seat, if any.
    #[must_use]
    pub fn user(&self, id: &PlayerId) -> Option<UserHandle> {
        self.runtime.users.get(id).cloned()
    }

    /// Context of the action currently executing.
    #[must_use]
    pub fn action_context(&self) -> Option<&ActionContext> {
        self.runtime.context.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.runtime.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.runtime.config = config;
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.runtime.destroyed
    }

    #[must_use]
    pub fn is_pending_input(&self, id: &PlayerId) -> bool {
        self.pending_inputs.contains_key(id)
    }

    /// Mark every menu stale; they are redrawn before the next render.
    pub fn invalidate_menus(&mut self) {
        self.runtime.menus_dirty = true;
    }

    /// Ask the host process to save and close this table after the tick.
    pub fn request_save(&mut self, requester: &PlayerId) {
        self.runtime.save_requested = Some(requester.clone());
    }

    // === Communication ===

    pub fn speak_to(&self, id: &PlayerId, text: &str) {
        if let Some(user) = self.runtime.users.get(id) {
            user.speak(text);
        }
    }

    pub fn broadcast(&self, text: &str) {
        for player in &self.players {
            self.speak_to(&player.id, text);
        }
    }

    pub fn broadcast_except(&self, skip: &PlayerId, text: &str) {
        for player in self.players.iter().filter(|p| p.id != *skip) {
            self.speak_to(&player.id, text);
        }
    }

    pub fn play_sound_to(&self, id: &PlayerId, cue: &SoundCue) {
        if let Some(user) = self.runtime.users.get(id) {
            user.play_sound(cue);
        }
    }

    pub fn broadcast_sound(&self, cue: &SoundCue) {
        for player in &self.players {
            self.play_sound_to(&player.id, cue);
        }
    }

    /// Start a music track for everyone; users attaching later hear it too.
    pub fn play_music(&mut self, name: &str) {
        self.current_music = Some(name.to_string());
        for player in &self.players {
            if let Some(user) = self.runtime.users.get(&player.id) {
                user.play_music(name);
            }
        }
    }

    // === Scheduling ===

    /// Play `cue` to everyone `delay_ticks` from now.
    pub fn schedule_sound(&mut self, cue: SoundCue, delay_ticks: u64) -> EffectId {
        self.effects.schedule(self.tick + delay_ticks, EffectKind::Sound(cue))
    }

    /// Fire the game's timer hook with `key` after `delay_ticks`.
    pub fn schedule_timer(&mut self, key: impl Into<String>, delay_ticks: u64) -> EffectId {
        self.effects
            .schedule(self.tick + delay_ticks, EffectKind::Timer { key: key.into() })
    }

    /// Run `action_id` for a bot after `delay_ticks`.
    pub fn schedule_bot_action(&mut self, player: &PlayerId, action_id: impl Into<String>, delay_ticks: u64) -> EffectId {
        self.effects.schedule(
            self.tick + delay_ticks,
            EffectKind::BotAction {
                player: player.clone(),
                action_id: action_id.into(),
            },
        )
    }

    pub fn cancel_effect(&mut self, id: EffectId) -> bool {
        self.effects.cancel(id)
    }
}
