//! Seating, starting, finishing and tearing down tables, plus the per-tick
//! driver.

use std::sync::Arc;

use tracing::{debug, debug_span, info};

use super::execution::{execute_action, reprompt};
use super::{estimate, menus};
use crate::actions::ActionContext;
use crate::core::{GameStatus, Player, PlayerId, Rejection};
use crate::game::{
    estimate_action_set, lobby_action_set, next_bot_name, options_action_set, standard_action_set,
    standard_keybinds, Game,
};
use crate::scheduler::EffectKind;
use crate::user::{BotUser, UserHandle};

/// Seat a human, or reattach them if they already have a seat.
///
/// Late joiners and anyone arriving at a full table spectate. The first
/// human seated becomes host.
pub fn add_player<G: Game>(game: &mut G, name: &str, user: UserHandle) -> PlayerId {
    let id = PlayerId::new(user.id());
    if game.core().player(&id).is_some() {
        if let Err(err) = attach_user(game, &id, user) {
            debug!(player = %id, error = %err, "reattach failed");
        }
        return id;
    }
    let core = game.core_mut();
    let mut player = Player::human(id.clone(), name);
    player.is_spectator =
        core.status != GameStatus::Lobby || core.active_players().len() >= G::MAX_PLAYERS;
    core.players.push_back(player);
    if core.host.is_none() {
        core.host = Some(id.clone());
    }
    if let Some(music) = &core.current_music {
        user.play_music(music);
    }
    core.runtime.users.insert(id.clone(), user);
    setup_player_actions(game, &id);
    info!(table = %game.core().table_id, player = %id, name, "player joined");
    game.core().broadcast(&format!("{name} joined the table."));
    game.core_mut().invalidate_menus();
    id
}

/// Seat a bot. A blank or missing name picks the next free bot name.
pub fn add_bot<G: Game>(game: &mut G, name: Option<&str>) -> PlayerId {
    let name = match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => next_bot_name(game),
    };
    let core = game.core_mut();
    let id = PlayerId::from_bits(core.rng.next_bits());
    core.players.push_back(Player::bot(id.clone(), name.clone()));
    core.runtime
        .users
        .insert(id.clone(), Arc::new(BotUser::new(id.as_str(), name.clone())));
    setup_player_actions(game, &id);
    debug!(table = %game.core().table_id, player = %id, name = %name, "bot added");
    game.core().broadcast(&format!("{name} joined the table."));
    game.core_mut().invalidate_menus();
    id
}

/// Remove a seat entirely. The turn passes on if they held it, and the host
/// role moves to the next human.
pub fn remove_player<G: Game>(game: &mut G, id: &PlayerId) -> Option<Player> {
    let core = game.core_mut();
    let index = core.players.iter().position(|p| p.id == *id)?;
    let player = core.players.remove(index);
    core.turn.remove_player(id);
    core.pending_inputs.shift_remove(id);
    core.runtime.actions.clear_player(id);
    core.runtime.users.remove(id);
    core.runtime.status_box_open.remove(id);
    core.runtime.actions_menu_open.remove(id);
    core.effects
        .cancel_where(|kind| matches!(kind, EffectKind::BotAction { player, .. } if player == id));
    if core.host.as_ref() == Some(id) {
        core.host = core
            .players
            .iter()
            .find(|p| !p.is_bot)
            .or_else(|| core.players.front())
            .map(|p| p.id.clone());
    }
    core.invalidate_menus();
    Some(player)
}

/// Connect a user to an existing seat. Pending input is asked for again.
pub fn attach_user<G: Game>(game: &mut G, id: &PlayerId, user: UserHandle) -> Result<(), Rejection> {
    let core = game.core_mut();
    if core.player(id).is_none() {
        return Err(Rejection::UnknownPlayer(id.clone()));
    }
    if let Some(music) = &core.current_music {
        user.play_music(music);
    }
    core.runtime.users.insert(id.clone(), user);
    match game.core().pending_inputs.get(id).cloned() {
        Some(action_id) => reprompt(game, id, &action_id),
        None => menus::rebuild_player_menu(game, id),
    }
    Ok(())
}

/// Drop a seat's connection. The seat and its state stay.
pub fn detach_user<G: Game>(game: &mut G, id: &PlayerId) {
    let runtime = &mut game.core_mut().runtime;
    runtime.users.remove(id);
    runtime.status_box_open.remove(id);
    runtime.actions_menu_open.remove(id);
}

/// A player leaves.
///
/// Mid-game a human is replaced by a bot under the same id so the game can
/// continue; otherwise the seat is removed. The table is destroyed once no
/// humans remain.
pub fn leave_table<G: Game>(game: &mut G, id: &PlayerId) {
    let Some(player) = game.core().player(id).cloned() else {
        return;
    };
    let mid_game = game.core().status == GameStatus::Active && !player.is_spectator;
    if mid_game && !player.is_bot {
        let core = game.core_mut();
        if let Some(seat) = core.player_mut(id) {
            seat.is_bot = true;
            seat.bot = Default::default();
        }
        core.pending_inputs.shift_remove(id);
        core.runtime.status_box_open.remove(id);
        core.runtime.actions_menu_open.remove(id);
        core.runtime
            .users
            .insert(id.clone(), Arc::new(BotUser::new(id.as_str(), player.name.clone())));
        game.core()
            .broadcast(&format!("{} left the table. A bot takes their place.", player.name));
    } else {
        remove_player(game, id);
        game.core().broadcast(&format!("{} left the table.", player.name));
    }
    info!(table = %game.core().table_id, player = %id, "player left");
    if game.core().human_count() == 0 {
        destroy(game);
    }
}

/// Register the standard action sets for one seat, in menu order: the
/// game's turn set, lobby, options, estimate, standard. Keybinds are set up
/// with the first seat.
pub fn setup_player_actions<G: Game>(game: &mut G, id: &PlayerId) {
    let Some(player) = game.core().player(id).cloned() else {
        return;
    };
    if game.core().runtime.keybinds.is_empty() {
        setup_keybinds(game);
    }
    let turn_set = game.turn_action_set(&player);
    let registry = &mut game.core_mut().runtime.actions;
    if let Some(set) = turn_set {
        registry.add_action_set(id, set);
    }
    registry.add_action_set(id, lobby_action_set::<G>());
    if !G::option_specs().is_empty() {
        registry.add_action_set(id, options_action_set::<G>());
    }
    registry.add_action_set(id, estimate_action_set::<G>());
    registry.add_action_set(id, standard_action_set::<G>());
}

/// Rebuild every seat's action sets from the aggregate.
pub fn rebuild_action_sets<G: Game>(game: &mut G) {
    game.core_mut().runtime.actions.clear();
    let ids: Vec<PlayerId> = game.core().players.iter().map(|p| p.id.clone()).collect();
    for id in &ids {
        setup_player_actions(game, id);
    }
    game.core_mut().invalidate_menus();
}

pub fn setup_keybinds<G: Game>(game: &mut G) {
    let binds = standard_keybinds().into_iter().chain(game.game_keybinds());
    let keybinds: Vec<_> = binds.collect();
    let map = &mut game.core_mut().runtime.keybinds;
    map.clear();
    for keybind in keybinds {
        map.define(keybind);
    }
}

/// Rebuild everything serde skipped: action sets, keybinds and bot users.
/// Human users reattach through [`attach_user`].
pub fn restore_runtime<G: Game>(game: &mut G) {
    let bots: Vec<(PlayerId, String)> = game
        .core()
        .players
        .iter()
        .filter(|p| p.is_bot)
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect();
    for (id, name) in bots {
        game.core_mut()
            .runtime
            .users
            .insert(id.clone(), Arc::new(BotUser::new(id.as_str(), name)));
    }
    rebuild_action_sets(game);
    setup_keybinds(game);
    game.rebuild_runtime_state();
}

/// Switch to the active phase and hand over to the game.
pub fn start_game<G: Game>(game: &mut G) {
    let core = game.core_mut();
    core.status = GameStatus::Active;
    core.round = 0;
    core.pending_inputs.clear();
    let turn_order = core.active_player_ids();
    core.turn.set_turn_players(turn_order, true);
    core.turn.reset_turn_order();
    info!(table = %core.table_id, game = G::GAME_TYPE, players = core.players.len(), "game started");
    rebuild_action_sets(game);
    game.on_start();
    game.core_mut().invalidate_menus();
}

/// Record the result, show the end screen and close the table if nobody
/// human is left to see it.
pub fn finish_game<G: Game>(game: &mut G) {
    game.core_mut().status = GameStatus::Finished;
    let result = game.build_result();
    let lines = game.format_end_screen(&result);
    info!(
        table = %game.core().table_id,
        outcome = ?result.outcome,
        ticks = result.duration_ticks,
        "game finished"
    );
    game.core_mut().result = Some(result);
    game.core_mut().effects.clear();
    let ids: Vec<PlayerId> = game.core().players.iter().map(|p| p.id.clone()).collect();
    for id in &ids {
        menus::status_box(game, id, &lines);
    }
    if game.core().human_count() == 0 {
        destroy(game);
    }
}

/// Close the table. Pending effects and input requests are dropped and any
/// running estimate is abandoned.
pub fn destroy<G: Game>(game: &mut G) {
    let core = game.core_mut();
    if core.runtime.destroyed {
        return;
    }
    core.runtime.destroyed = true;
    core.effects.clear();
    core.pending_inputs.clear();
    core.runtime.estimate.abandon();
    core.runtime.users.clear();
    info!(table = %core.table_id, "table destroyed");
}

/// One scheduler tick: finished estimates, the game's tick hook, due
/// effects, then any stale menus.
pub fn run_tick<G: Game>(game: &mut G) {
    if game.core().is_destroyed() {
        return;
    }
    let span = debug_span!("table", table = %game.core().table_id);
    let _guard = span.enter();
    estimate::poll(game);
    game.on_tick();
    drain_due_effects(game);
    game.core_mut().tick += 1;
    menus::flush(game);
}

fn drain_due_effects<G: Game>(game: &mut G) {
    loop {
        if game.core().is_destroyed() {
            return;
        }
        let tick = game.core().tick;
        let Some(effect) = game.core_mut().effects.pop_due(tick) else {
            return;
        };
        debug!(table = %game.core().table_id, id = effect.id.0, "scheduled effect due");
        match effect.kind {
            EffectKind::Sound(cue) => game.core().broadcast_sound(&cue),
            EffectKind::Timer { key } => game.on_timer(&key),
            EffectKind::BotAction { player, action_id } => {
                if let Err(err) = execute_action(game, &player, &action_id, None, ActionContext::timer()) {
                    debug!(player = %player, action = %action_id, error = %err, "scheduled bot action rejected");
                }
            }
        }
    }
}
