//! The single entry point through which every action runs.
//!
//! ## Flow
//!
//! 1. Look the action up in the player's sets and resolve it. Unknown,
//!    disabled and (for menu-driven calls) hidden actions are rejected
//!    without touching state.
//! 2. If the action needs input and none was given, humans enter the
//!    pending-input state and are prompted; bots answer synchronously.
//! 3. The effect runs with exclusive access to the game.
//! 4. Menus are marked stale and redrawn once the outermost call returns.
//!
//! Every rejection is spoken to the player in plain language.

use std::borrow::Cow;

use tracing::{debug, warn};

use super::menus::{self, CANCEL_ID, INPUT_EDITBOX, INPUT_MENU};
use crate::actions::{find_action, resolve_action, Action, ActionCall, ActionContext, InputRequest, Origin};
use crate::core::{Player, PlayerId, Rejection};
use crate::game::Game;
use crate::user::{MenuItem, SoundCue};

/// How an accepted invocation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Execution {
    /// The effect ran.
    Completed,
    /// The player was asked for input; the effect runs when it arrives.
    AwaitingInput,
}

/// Run `action_id` for `player`.
pub fn execute_action<G: Game>(
    game: &mut G,
    player: &PlayerId,
    action_id: &str,
    input: Option<String>,
    context: ActionContext,
) -> Result<Execution, Rejection> {
    let outcome = try_execute(game, player, action_id, input, context);
    if let Err(rejection) = &outcome {
        report_rejection(game, player, rejection);
        if let Rejection::InvalidInput { action_id, .. } = rejection {
            reprompt(game, player, action_id);
        }
    }
    outcome
}

fn try_execute<G: Game>(
    game: &mut G,
    player_id: &PlayerId,
    action_id: &str,
    input: Option<String>,
    context: ActionContext,
) -> Result<Execution, Rejection> {
    if game.core().is_destroyed() {
        return Err(Rejection::TableClosed);
    }
    let player = game
        .core()
        .player(player_id)
        .cloned()
        .ok_or_else(|| Rejection::UnknownPlayer(player_id.clone()))?;
    let action = find_action(game, player_id, action_id)
        .cloned()
        .ok_or_else(|| Rejection::Unavailable {
            action_id: action_id.to_string(),
        })?;

    let resolved = resolve_action(game, &player, &action);
    if let Some(reason) = resolved.disabled_reason {
        return Err(Rejection::Disabled {
            action_id: action.id,
            reason,
        });
    }
    if !resolved.visible && !context.origin.may_run_hidden() {
        return Err(Rejection::Hidden { action_id: action.id });
    }

    let input = match (&action.input, input) {
        (None, _) => None,
        (Some(request), Some(value)) => {
            validate_input(game, &player, &action.id, request, &value)?;
            Some(value)
        }
        (Some(request), None) if player.is_bot || context.origin == Origin::Bot => {
            let value = bot_input(game, &player, &action.id, request).ok_or_else(|| Rejection::MissingInput {
                action_id: action.id.clone(),
            })?;
            Some(value)
        }
        (Some(request), None) => {
            game.core_mut()
                .pending_inputs
                .insert(player_id.clone(), action.id.clone());
            show_input_prompt(game, player_id, &action.id, request);
            return Ok(Execution::AwaitingInput);
        }
    };

    run_effect(
        game,
        player_id,
        &action,
        ActionCall {
            action_id: action.id.clone(),
            input,
            context,
        },
    );
    Ok(Execution::Completed)
}

fn run_effect<G: Game>(game: &mut G, player: &PlayerId, action: &Action<G>, call: ActionCall) {
    debug!(
        table = %game.core().table_id,
        %player,
        action = %call.action_id,
        origin = ?call.context.origin,
        "executing action"
    );
    let core = game.core_mut();
    core.pending_inputs.shift_remove(player);
    let previous = core.runtime.context.replace(call.context.clone());
    core.runtime.depth += 1;

    (action.effect)(game, player, &call);

    let core = game.core_mut();
    core.runtime.depth = core.runtime.depth.saturating_sub(1);
    core.runtime.context = previous;
    core.runtime.menus_dirty = true;
    if core.runtime.depth == 0 {
        menus::flush(game);
    }
}

fn validate_input<G: Game>(
    game: &G,
    player: &Player,
    action_id: &str,
    request: &InputRequest<G>,
    value: &str,
) -> Result<(), Rejection> {
    let check = match request {
        InputRequest::Menu { options, .. } => {
            if options(game, player, action_id).iter().any(|option| option == value) {
                Ok(())
            } else {
                Err(Cow::Borrowed("That is not one of the choices."))
            }
        }
        InputRequest::Editbox { validate, .. } => match validate {
            Some(validate) => validate(game, player, action_id, value),
            None => Ok(()),
        },
    };
    check.map_err(|reason| Rejection::InvalidInput {
        action_id: action_id.to_string(),
        reason,
    })
}

fn bot_input<G: Game>(game: &G, player: &Player, action_id: &str, request: &InputRequest<G>) -> Option<String> {
    match request {
        InputRequest::Menu {
            options, bot_select, ..
        } => {
            let options = options(game, player, action_id);
            match bot_select {
                Some(select) => select(game, player, &options),
                None => options.into_iter().next(),
            }
        }
        InputRequest::Editbox {
            default, bot_input, ..
        } => match bot_input {
            Some(generate) => generate(game, player, action_id),
            None => Some(default.to_string()),
        },
    }
}

/// Render the input request for a pending action.
pub(crate) fn show_input_prompt<G: Game>(game: &G, player_id: &PlayerId, action_id: &str, request: &InputRequest<G>) {
    let core = game.core();
    let (Some(user), Some(player)) = (core.user(player_id), core.player(player_id)) else {
        return;
    };
    match request {
        InputRequest::Menu { prompt, options, .. } => {
            let mut items: Vec<MenuItem> = options(game, player, action_id)
                .into_iter()
                .map(|option| MenuItem::new(option.clone(), option))
                .collect();
            items.push(MenuItem::new(CANCEL_ID, "Cancel"));
            user.speak(prompt);
            user.show_menu(INPUT_MENU, &items);
        }
        InputRequest::Editbox { prompt, default, .. } => {
            user.show_editbox(INPUT_EDITBOX, prompt, default);
        }
    }
}

/// Ask again for the input of `action_id`, e.g. after a bad answer or when
/// the player reconnects.
pub(crate) fn reprompt<G: Game>(game: &mut G, player: &PlayerId, action_id: &str) {
    let Some(request) = find_action(game, player, action_id).and_then(|a| a.input.clone()) else {
        game.core_mut().pending_inputs.shift_remove(player);
        return;
    };
    if game.core().player(player).is_some_and(|p| p.is_bot) {
        return;
    }
    game.core_mut()
        .pending_inputs
        .insert(player.clone(), action_id.to_string());
    show_input_prompt(game, player, action_id, &request);
}

fn report_rejection<G: Game>(game: &G, player: &PlayerId, rejection: &Rejection) {
    let is_bot = game.core().player(player).is_some_and(|p| p.is_bot);
    if is_bot {
        debug!(
            table = %game.core().table_id,
            %player,
            code = rejection.code(),
            "bot action rejected"
        );
    } else {
        warn!(
            table = %game.core().table_id,
            %player,
            code = rejection.code(),
            action = rejection.action_id().unwrap_or(""),
            "action rejected"
        );
    }
    game.core().speak_to(player, &rejection.to_string());
}

/// Advance the turn order, consuming skips, and notify the game of each
/// skipped player. Returns the new turn holder.
pub fn advance_turn<G: Game>(game: &mut G) -> Option<PlayerId> {
    let advance = game.core_mut().turn.advance();
    for skipped in &advance.skipped {
        game.on_player_skipped(skipped);
    }
    game.core_mut().invalidate_menus();
    advance.current
}

/// Tell everyone whose turn it is.
pub fn announce_turn<G: Game>(game: &G) {
    let core = game.core();
    let Some(current) = core.current_player() else {
        return;
    };
    core.speak_to(&current.id, "It is your turn.");
    core.broadcast_except(&current.id, &format!("It is {}'s turn.", current.name));
    core.play_sound_to(&current.id, &SoundCue::new("game/turn.ogg"));
}

/// Default end of turn: advance, announce, redraw menus.
pub fn end_turn<G: Game>(game: &mut G) {
    advance_turn(game);
    announce_turn(game);
}
