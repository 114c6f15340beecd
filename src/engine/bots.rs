//! Per-tick bot driver.
//!
//! A bot holding the turn asks the game for a decision, waits out its think
//! ticks, then executes the action it decided on. Both the
//! countdown and the decision live on the persisted [`BotState`], so a bot
//! restored mid-thought neither repeats nor drops its move.
//!
//! [`BotState`]: crate::core::BotState

use tracing::debug;

use super::execution::execute_action;
use crate::actions::ActionContext;
use crate::core::{GameStatus, PlayerId};
use crate::game::Game;

/// Drive the bot holding the turn, if any.
pub fn on_tick<G: Game>(game: &mut G) {
    let core = game.core();
    if core.status != GameStatus::Active || core.is_destroyed() {
        return;
    }
    let Some(current) = core.current_player() else {
        return;
    };
    if !current.is_bot {
        return;
    }
    let id = current.id.clone();
    process_bot(game, &id);
}

/// Run one step of a single bot.
pub fn process_bot<G: Game>(game: &mut G, id: &PlayerId) {
    let Some(player) = game.core_mut().player_mut(id) else {
        return;
    };
    if player.bot.think_ticks > 0 {
        player.bot.think_ticks -= 1;
        return;
    }
    if let Some(action_id) = player.bot.pending_action.take() {
        if let Err(rejection) = execute_action(game, id, &action_id, None, ActionContext::bot()) {
            debug!(
                player = %id,
                action = %action_id,
                code = rejection.code(),
                "bot decision went stale"
            );
        }
        return;
    }
    if let Some(action_id) = game.bot_think(id) {
        let think_ticks = game.core().config().bot_think_ticks;
        if let Some(player) = game.core_mut().player_mut(id) {
            player.bot.pending_action = Some(action_id);
            player.bot.think_ticks = think_ticks;
        }
    }
}

/// Pause a bot and discard its pending decision.
pub fn jolt_bot<G: Game>(game: &mut G, id: &PlayerId, ticks: u32) {
    if let Some(player) = game.core_mut().player_mut(id) {
        player.bot.think_ticks = ticks;
        player.bot.pending_action = None;
    }
}

/// Pause every bot, each for a random number of ticks in `min..=max`.
pub fn jolt_bots<G: Game>(game: &mut G, min: u32, max: u32) {
    let bots: Vec<PlayerId> = game
        .core()
        .players
        .iter()
        .filter(|p| p.is_bot)
        .map(|p| p.id.clone())
        .collect();
    for bot in bots {
        let ticks = game.core_mut().rng.gen_range(i64::from(min)..=i64::from(max.max(min)));
        jolt_bot(game, &bot, u32::try_from(ticks).unwrap_or(min));
    }
}
