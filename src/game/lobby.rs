//! Action sets every table gets: lobby management, options, duration
//! estimate and the always-available standard actions.

use std::borrow::Cow;

use super::Game;
use crate::actions::{Action, ActionCall, ActionSet, InputRequest, Visibility};
use crate::core::{GameStatus, OptionKind, OptionSpec, OptionValue, Player, PlayerId, Reason};
use crate::engine::{estimate, lifecycle, menus, Keybind, KeybindState};

/// Names handed to bots added without one.
pub const BOT_NAMES: [&str; 26] = [
    "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack", "Kate", "Leo", "Mia",
    "Noah", "Olivia", "Pete", "Quinn", "Rose", "Sam", "Tina", "Uma", "Vic", "Wendy", "Xander", "Yara", "Zack",
];

const GAME_IN_PROGRESS: &str = "The game has already started.";
const NOT_HOST: &str = "Only the host can do that.";
const NOT_PLAYING: &str = "The game is not running.";

fn in_lobby<G: Game>(game: &G) -> Result<(), Reason> {
    if game.core().status == GameStatus::Lobby {
        Ok(())
    } else {
        Err(Cow::Borrowed(GAME_IN_PROGRESS))
    }
}

fn lobby_host<G: Game>(game: &G, player: &Player) -> Result<(), Reason> {
    in_lobby(game)?;
    if game.core().is_host(&player.id) {
        Ok(())
    } else {
        Err(Cow::Borrowed(NOT_HOST))
    }
}

fn playing<G: Game>(game: &G, _player: &Player) -> Result<(), Reason> {
    if game.core().status == GameStatus::Active {
        Ok(())
    } else {
        Err(Cow::Borrowed(NOT_PLAYING))
    }
}

fn always_hidden<G>(_game: &G, _player: &Player) -> Visibility {
    Visibility::Hidden
}

fn hidden_outside_lobby<G: Game>(game: &G, _player: &Player) -> Visibility {
    Visibility::hidden_if(game.core().status != GameStatus::Lobby)
}

/// First entry of [`BOT_NAMES`] nobody at the table is using.
#[must_use]
pub fn next_bot_name<G: Game>(game: &G) -> String {
    BOT_NAMES
        .iter()
        .find(|name| game.core().player_by_name(name).is_none())
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| format!("Bot {}", game.core().players.len() + 1))
}

// === Lobby ===

fn start_game_enabled<G: Game>(game: &G, player: &Player) -> Result<(), Reason> {
    lobby_host(game, player)?;
    if game.core().active_players().len() < G::MIN_PLAYERS {
        return Err(Cow::Owned(format!(
            "At least {} players are needed to start.",
            G::MIN_PLAYERS
        )));
    }
    Ok(())
}

fn start_game<G: Game>(game: &mut G, player: &PlayerId, _call: &ActionCall) {
    let problems = game.prestart_validate();
    if !problems.is_empty() {
        for problem in &problems {
            game.core().speak_to(player, problem);
        }
        return;
    }
    lifecycle::start_game(game);
}

fn add_bot_enabled<G: Game>(game: &G, player: &Player) -> Result<(), Reason> {
    lobby_host(game, player)?;
    if game.core().players.len() >= G::MAX_PLAYERS {
        return Err(Cow::Borrowed("The table is full."));
    }
    Ok(())
}

fn add_bot_name<G: Game>(game: &G, _player: &Player, _action_id: &str) -> Option<String> {
    Some(next_bot_name(game))
}

fn add_bot<G: Game>(game: &mut G, _player: &PlayerId, call: &ActionCall) {
    lifecycle::add_bot(game, call.input.as_deref());
}

fn remove_bot_enabled<G: Game>(game: &G, player: &Player) -> Result<(), Reason> {
    lobby_host(game, player)?;
    if !game.core().players.iter().any(|p| p.is_bot) {
        return Err(Cow::Borrowed("There are no bots to remove."));
    }
    Ok(())
}

fn remove_bot<G: Game>(game: &mut G, _player: &PlayerId, _call: &ActionCall) {
    let last_bot = game
        .core()
        .players
        .iter()
        .rev()
        .find(|p| p.is_bot)
        .map(|p| p.id.clone());
    if let Some(bot) = last_bot {
        if let Some(removed) = lifecycle::remove_player(game, &bot) {
            game.core().broadcast(&format!("{} left the table.", removed.name));
        }
    }
}

fn toggle_spectator_enabled<G: Game>(game: &G, player: &Player) -> Result<(), Reason> {
    in_lobby(game)?;
    if player.is_bot {
        return Err(Cow::Borrowed("Bots cannot do that."));
    }
    Ok(())
}

fn toggle_spectator_label<G: Game>(_game: &G, player: &Player, _action_id: &str) -> String {
    if player.is_spectator {
        "Play".to_string()
    } else {
        "Spectate".to_string()
    }
}

fn toggle_spectator<G: Game>(game: &mut G, player: &PlayerId, _call: &ActionCall) {
    let Some(seat) = game.core_mut().player_mut(player) else {
        return;
    };
    seat.is_spectator = !seat.is_spectator;
    let message = if seat.is_spectator {
        format!("{} is now spectating.", seat.name)
    } else {
        format!("{} is now playing.", seat.name)
    };
    game.core().broadcast(&message);
}

fn leave_game<G: Game>(game: &mut G, player: &PlayerId, _call: &ActionCall) {
    lifecycle::leave_table(game, player);
}

/// Start, bots, spectating and leaving.
#[must_use]
pub fn lobby_action_set<G: Game>() -> ActionSet<G> {
    ActionSet::new("lobby")
        .with(
            Action::new("start_game", "Start game", start_game::<G>)
                .enabled_when(start_game_enabled::<G>)
                .hidden_when(hidden_outside_lobby::<G>),
        )
        .with(
            Action::new("add_bot", "Add bot", add_bot::<G>)
                .enabled_when(add_bot_enabled::<G>)
                .hidden_when(always_hidden::<G>)
                .with_input(InputRequest::editbox("Enter a name for the bot:", "").with_bot_input(add_bot_name::<G>)),
        )
        .with(
            Action::new("remove_bot", "Remove bot", remove_bot::<G>)
                .enabled_when(remove_bot_enabled::<G>)
                .hidden_when(always_hidden::<G>),
        )
        .with(
            Action::new("toggle_spectator", "Spectate", toggle_spectator::<G>)
                .enabled_when(toggle_spectator_enabled::<G>)
                .hidden_when(always_hidden::<G>)
                .with_label(toggle_spectator_label::<G>),
        )
        .with(Action::new("leave_game", "Leave table", leave_game::<G>).hidden_when(always_hidden::<G>))
}

// === Options ===

fn option_for<G: Game>(action_id: &str) -> Option<&'static OptionSpec> {
    let key = action_id
        .strip_prefix("set_")
        .or_else(|| action_id.strip_prefix("toggle_"))?;
    G::option_specs().iter().find(|spec| spec.key == key)
}

fn option_label<G: Game>(game: &G, _player: &Player, action_id: &str) -> String {
    match option_for::<G>(action_id) {
        Some(spec) => format!("{}: {}", spec.label, game.core().options.value(spec)),
        None => action_id.to_string(),
    }
}

fn option_choices<G: Game>(_game: &G, _player: &Player, action_id: &str) -> Vec<String> {
    match option_for::<G>(action_id).map(|spec| spec.kind) {
        Some(OptionKind::Choice { choices, .. }) => choices.iter().map(|c| (*c).to_string()).collect(),
        _ => Vec::new(),
    }
}

fn option_validate<G: Game>(_game: &G, _player: &Player, action_id: &str, value: &str) -> Result<(), Reason> {
    let spec = option_for::<G>(action_id).ok_or(Cow::Borrowed("Unknown option."))?;
    spec.parse(value).map(|_| ())
}

fn set_option<G: Game>(game: &mut G, _player: &PlayerId, call: &ActionCall) {
    let Some(spec) = option_for::<G>(&call.action_id) else {
        return;
    };
    let options = &mut game.core_mut().options;
    let outcome = match (spec.kind, call.input.as_deref()) {
        (OptionKind::Bool { .. }, _) => {
            let flipped = !options.flag(spec);
            Ok(options.insert(spec.key, OptionValue::Bool(flipped)).to_string())
        }
        (_, Some(raw)) => options.set(spec, raw).map(ToString::to_string),
        (_, None) => return,
    };
    match outcome {
        Ok(value) => game.core().broadcast(&format!("{} set to {value}.", spec.label)),
        Err(reason) => tracing::warn!(option = spec.key, %reason, "option value rejected after validation"),
    }
}

/// One action per declared option: `set_<key>` for values, `toggle_<key>`
/// for switches.
#[must_use]
pub fn options_action_set<G: Game>() -> ActionSet<G> {
    let mut set = ActionSet::new("options");
    for spec in G::option_specs() {
        let action = match spec.kind {
            OptionKind::Bool { .. } => Action::new(format!("toggle_{}", spec.key), spec.label, set_option::<G>),
            OptionKind::Int { min, max, .. } => Action::new(format!("set_{}", spec.key), spec.label, set_option::<G>)
                .with_input(
                    InputRequest::editbox(format!("Enter {} ({min}-{max}):", spec.label.to_lowercase()), "")
                        .with_validator(option_validate::<G>),
                ),
            OptionKind::Choice { .. } => Action::new(format!("set_{}", spec.key), spec.label, set_option::<G>)
                .with_input(InputRequest::menu(format!("Choose {}:", spec.label.to_lowercase()), option_choices::<G>)),
        };
        set.add(
            action
                .enabled_when(lobby_host::<G>)
                .hidden_when(hidden_outside_lobby::<G>)
                .with_label(option_label::<G>),
        );
    }
    set
}

// === Estimate ===

fn estimate_enabled<G: Game>(game: &G, _player: &Player) -> Result<(), Reason> {
    in_lobby(game)
}

fn estimate_duration<G: Game>(game: &mut G, player: &PlayerId, _call: &ActionCall) {
    estimate::start_estimate(game, player);
}

#[must_use]
pub fn estimate_action_set<G: Game>() -> ActionSet<G> {
    ActionSet::new("estimate").with(
        Action::new("estimate_duration", "Estimate duration", estimate_duration::<G>)
            .enabled_when(estimate_enabled::<G>)
            .hidden_when(hidden_outside_lobby::<G>),
    )
}

// === Standard ===

fn show_actions<G: Game>(game: &mut G, player: &PlayerId, _call: &ActionCall) {
    menus::show_actions_menu(game, player);
}

fn save_table_enabled<G: Game>(game: &G, player: &Player) -> Result<(), Reason> {
    if game.core().is_host(&player.id) {
        Ok(())
    } else {
        Err(Cow::Borrowed(NOT_HOST))
    }
}

fn save_table<G: Game>(game: &mut G, player: &PlayerId, _call: &ActionCall) {
    game.core_mut().request_save(player);
    game.core().broadcast("The table is being saved.");
}

fn whose_turn<G: Game>(game: &mut G, player: &PlayerId, _call: &ActionCall) {
    let text = match game.core().current_player() {
        Some(current) if current.id == *player => "It is your turn.".to_string(),
        Some(current) => format!("It is {}'s turn.", current.name),
        None => "Nobody is taking a turn.".to_string(),
    };
    game.core().speak_to(player, &text);
}

fn check_scores_enabled<G: Game>(game: &G, player: &Player) -> Result<(), Reason> {
    playing(game, player)?;
    if game.score_lines().is_empty() {
        return Err(Cow::Borrowed("There are no scores to show."));
    }
    Ok(())
}

fn check_scores<G: Game>(game: &mut G, player: &PlayerId, _call: &ActionCall) {
    let lines = game.score_lines();
    game.core().speak_to(player, &lines.join(". "));
}

/// Actions menu, save, whose turn and scores. All hidden; reached through
/// keybinds or the actions menu.
#[must_use]
pub fn standard_action_set<G: Game>() -> ActionSet<G> {
    ActionSet::new("standard")
        .with(Action::new("show_actions", "Actions menu", show_actions::<G>).hidden_when(always_hidden::<G>))
        .with(
            Action::new("save_table", "Save table", save_table::<G>)
                .enabled_when(save_table_enabled::<G>)
                .hidden_when(always_hidden::<G>),
        )
        .with(
            Action::new("whose_turn", "Whose turn", whose_turn::<G>)
                .enabled_when(playing::<G>)
                .hidden_when(always_hidden::<G>),
        )
        .with(
            Action::new("check_scores", "Check scores", check_scores::<G>)
                .enabled_when(check_scores_enabled::<G>)
                .hidden_when(always_hidden::<G>),
        )
}

/// Keybinds shared by every game.
#[must_use]
pub fn standard_keybinds() -> Vec<Keybind> {
    vec![
        Keybind::new("enter", "Start game", &["start_game"], KeybindState::Idle),
        Keybind::new("b", "Add bot", &["add_bot"], KeybindState::Idle),
        Keybind::new("shift+b", "Remove bot", &["remove_bot"], KeybindState::Idle),
        Keybind::new("f3", "Toggle spectator", &["toggle_spectator"], KeybindState::Idle).with_spectators(),
        Keybind::new("q", "Leave table", &["leave_game"], KeybindState::Always).with_spectators(),
        Keybind::new("escape", "Actions menu", &["show_actions"], KeybindState::Always).with_spectators(),
        Keybind::new("ctrl+s", "Save table", &["save_table"], KeybindState::Always),
        Keybind::new("t", "Whose turn", &["whose_turn"], KeybindState::Active).with_spectators(),
        Keybind::new("s", "Check scores", &["check_scores"], KeybindState::Active).with_spectators(),
    ]
}
