//! Shared fixtures for the integration tests.
//!
//! `CounterGame` is a deliberately small game that exercises every engine
//! surface: turn actions, hidden keybind-only actions, menu and editbox
//! input, timers, a slow effect for exclusivity checks and a switch that
//! makes the next tick panic.

#![allow(dead_code)]

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabletop_engine::engine::{bots, execution, lifecycle};
use tabletop_engine::{
    Action, ActionCall, ActionSet, Game, GameCore, GameStatus, InputRequest, Keybind, KeybindState, Player,
    PlayerId, Reason, RecordingUser, Visibility,
};

/// Set while a `slow` effect is running.
pub static SLOW_RUNNING: AtomicBool = AtomicBool::new(false);
/// Times a `slow` effect started while another was still running.
pub static SLOW_OVERLAPS: AtomicUsize = AtomicUsize::new(0);

/// Ticks run by `CounterGame` tables inside headless simulations.
pub static SIMULATED_TICKS: AtomicUsize = AtomicUsize::new(0);

pub const COLORS: [&str; 3] = ["red", "green", "blue"];

/// A turn-based counter.
#[derive(Serialize, Deserialize)]
pub struct CounterGame {
    core: GameCore<CounterGame>,
    pub count: i64,
    pub bids: Vec<(PlayerId, i64)>,
    pub color: Option<String>,
    pub secrets: u32,
    /// Ordered record of bumps and timers.
    pub log: Vec<String>,
    pub panic_on_tick: bool,
}

impl CounterGame {
    fn name_of(&self, player: &PlayerId) -> String {
        self.core
            .player(player)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| player.to_string())
    }
}

fn playing(game: &CounterGame, _player: &Player) -> Result<(), Reason> {
    if game.core().status == GameStatus::Active {
        Ok(())
    } else {
        Err(Cow::Borrowed("The game is not running."))
    }
}

fn my_turn(game: &CounterGame, player: &Player) -> Result<(), Reason> {
    playing(game, player)?;
    if game.core().is_current(&player.id) {
        Ok(())
    } else {
        Err(Cow::Borrowed("It is not your turn."))
    }
}

fn hidden(_game: &CounterGame, _player: &Player) -> Visibility {
    Visibility::Hidden
}

fn bump(game: &mut CounterGame, player: &PlayerId, _call: &ActionCall) {
    game.count += 1;
    let name = game.name_of(player);
    game.log.push(format!("bump:{name}"));
    game.core().broadcast(&format!("{name} bumps the counter to {}.", game.count));
    game.end_turn();
}

fn slow(game: &mut CounterGame, _player: &PlayerId, _call: &ActionCall) {
    if SLOW_RUNNING.swap(true, Ordering::SeqCst) {
        SLOW_OVERLAPS.fetch_add(1, Ordering::SeqCst);
    }
    thread::sleep(Duration::from_millis(2));
    game.count += 1;
    SLOW_RUNNING.store(false, Ordering::SeqCst);
}

fn validate_bid(_game: &CounterGame, _player: &Player, _action_id: &str, value: &str) -> Result<(), Reason> {
    match value.trim().parse::<i64>() {
        Ok(bid) if (1..=100).contains(&bid) => Ok(()),
        _ => Err(Cow::Borrowed("Bid a number from 1 to 100.")),
    }
}

fn bot_bid(_game: &CounterGame, _player: &Player, _action_id: &str) -> Option<String> {
    Some("10".to_string())
}

fn bid(game: &mut CounterGame, player: &PlayerId, call: &ActionCall) {
    let Some(value) = call.input.as_deref().and_then(|v| v.trim().parse().ok()) else {
        return;
    };
    game.bids.push((player.clone(), value));
    let name = game.name_of(player);
    game.core().broadcast(&format!("{name} bids {value}."));
}

fn color_options(_game: &CounterGame, _player: &Player, _action_id: &str) -> Vec<String> {
    COLORS.iter().map(|c| (*c).to_string()).collect()
}

fn pick_color(game: &mut CounterGame, _player: &PlayerId, call: &ActionCall) {
    game.color = call.input.clone();
}

fn secret(game: &mut CounterGame, _player: &PlayerId, _call: &ActionCall) {
    game.secrets += 1;
}

fn arm_timer(game: &mut CounterGame, _player: &PlayerId, _call: &ActionCall) {
    game.core_mut().schedule_timer("ding", 2);
}

fn boom(game: &mut CounterGame, _player: &PlayerId, _call: &ActionCall) {
    game.panic_on_tick = true;
}

fn finish(game: &mut CounterGame, _player: &PlayerId, _call: &ActionCall) {
    lifecycle::finish_game(game);
}

impl Game for CounterGame {
    const GAME_TYPE: &'static str = "counter";
    const NAME: &'static str = "Counter";
    const MIN_PLAYERS: usize = 1;

    fn new_table(table_id: &str, seed: u64) -> Self {
        Self {
            core: GameCore::new(table_id, Self::GAME_TYPE, seed),
            count: 0,
            bids: Vec::new(),
            color: None,
            secrets: 0,
            log: Vec::new(),
            panic_on_tick: false,
        }
    }

    fn core(&self) -> &GameCore<Self> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GameCore<Self> {
        &mut self.core
    }

    fn on_start(&mut self) {
        execution::announce_turn(self);
    }

    fn turn_action_set(&self, _player: &Player) -> Option<ActionSet<Self>> {
        Some(
            ActionSet::new("turn")
                .with(Action::new("bump", "Bump", bump).enabled_when(my_turn))
                .with(Action::new("slow", "Slow", slow).enabled_when(playing))
                .with(
                    Action::new("bid", "Bid", bid).enabled_when(playing).with_input(
                        InputRequest::editbox("Your bid:", "")
                            .with_validator(validate_bid)
                            .with_bot_input(bot_bid),
                    ),
                )
                .with(
                    Action::new("pick_color", "Pick a color", pick_color)
                        .enabled_when(playing)
                        .with_input(InputRequest::menu("Pick a color:", color_options)),
                )
                .with(Action::new("secret", "Secret", secret).enabled_when(playing).hidden_when(hidden))
                .with(Action::new("arm_timer", "Arm timer", arm_timer).enabled_when(playing))
                .with(Action::new("boom", "Boom", boom).enabled_when(playing).hidden_when(hidden))
                .with(Action::new("finish", "Finish", finish).enabled_when(playing).hidden_when(hidden)),
        )
    }

    fn game_keybinds(&self) -> Vec<Keybind> {
        vec![
            Keybind::new("space", "Bump", &["bump"], KeybindState::Active),
            Keybind::new("x", "Secret", &["secret"], KeybindState::Active),
            Keybind::new("p", "Pick color", &["pick_color"], KeybindState::Active).focused(),
        ]
    }

    fn on_tick(&mut self) {
        if self.panic_on_tick {
            panic!("counter exploded");
        }
        if self.core.table_id == "simulation" {
            SIMULATED_TICKS.fetch_add(1, Ordering::SeqCst);
        }
        bots::on_tick(self);
    }

    fn on_timer(&mut self, key: &str) {
        self.log.push(format!("timer:{key}"));
        self.core.broadcast(&format!("Timer {key} fired."));
    }

    fn bot_think(&mut self, _player: &PlayerId) -> Option<String> {
        Some("bump".to_string())
    }

    fn score_lines(&self) -> Vec<String> {
        vec![format!("Count: {}", self.count)]
    }
}

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fresh recording user for `id`.
pub fn recorder(id: &str, name: &str) -> Arc<RecordingUser> {
    Arc::new(RecordingUser::new(id, name))
}

/// A lobby with one seated human per name. The first is host.
pub fn lobby<G: Game>(table_id: &str, seed: u64, names: &[&str]) -> (G, Vec<(PlayerId, Arc<RecordingUser>)>) {
    let mut game = G::new_table(table_id, seed);
    let seats = names
        .iter()
        .map(|name| {
            let user = recorder(&name.to_lowercase(), name);
            let id = lifecycle::add_player(&mut game, name, user.clone());
            (id, user)
        })
        .collect();
    (game, seats)
}

/// A started counter game with one human per name.
pub fn started_counter(names: &[&str]) -> (CounterGame, Vec<(PlayerId, Arc<RecordingUser>)>) {
    let (mut game, seats) = lobby::<CounterGame>("counter-1", 7, names);
    lifecycle::start_game(&mut game);
    for (_, user) in &seats {
        user.clear();
    }
    (game, seats)
}

/// The game's persisted state as JSON.
pub fn state_json<G: Game>(game: &G) -> serde_json::Value {
    serde_json::to_value(game).expect("game state serializes")
}
