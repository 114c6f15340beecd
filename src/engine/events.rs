//! Inbound player events: menu selections, editbox submissions, key presses
//! and raw action submissions, turned into action invocations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::execution::{execute_action, Execution};
use super::keybinds::normalize_key;
use super::menus::{self, ACTIONS_MENU, CANCEL_ID, GO_BACK_ID, INPUT_EDITBOX, INPUT_MENU, STATUS_BOX, TURN_MENU};
use crate::actions::{find_action, get_all_visible_actions, ActionContext, Origin};
use crate::core::{PlayerId, Rejection};
use crate::game::Game;

/// An event from one player's client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    Menu {
        menu_id: String,
        #[serde(default)]
        selection_id: Option<String>,
        /// 1-based position in the menu.
        #[serde(default)]
        selection: Option<usize>,
    },
    Editbox {
        input_id: String,
        #[serde(default)]
        text: String,
    },
    Keybind {
        key: String,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        control: bool,
        #[serde(default)]
        alt: bool,
        #[serde(default)]
        menu_item_id: Option<String>,
        #[serde(default)]
        menu_index: Option<usize>,
    },
    /// A pre-resolved `(action, input)` submission.
    Action {
        action_id: String,
        #[serde(default)]
        input: Option<String>,
    },
}

impl PlayerEvent {
    #[must_use]
    pub fn select(menu_id: impl Into<String>, selection_id: impl Into<String>) -> Self {
        PlayerEvent::Menu {
            menu_id: menu_id.into(),
            selection_id: Some(selection_id.into()),
            selection: None,
        }
    }

    #[must_use]
    pub fn select_index(menu_id: impl Into<String>, selection: usize) -> Self {
        PlayerEvent::Menu {
            menu_id: menu_id.into(),
            selection_id: None,
            selection: Some(selection),
        }
    }

    #[must_use]
    pub fn editbox(text: impl Into<String>) -> Self {
        PlayerEvent::Editbox {
            input_id: INPUT_EDITBOX.to_string(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        PlayerEvent::Keybind {
            key: key.into(),
            shift: false,
            control: false,
            alt: false,
            menu_item_id: None,
            menu_index: None,
        }
    }

    #[must_use]
    pub fn action(action_id: impl Into<String>, input: Option<String>) -> Self {
        PlayerEvent::Action {
            action_id: action_id.into(),
            input,
        }
    }
}

/// What an accepted event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Executed,
    AwaitingInput,
    /// An input request was dismissed.
    Cancelled,
    /// An overlay was closed.
    Closed,
    /// The event did not apply to anything.
    Ignored,
}

impl From<Execution> for Dispatch {
    fn from(execution: Execution) -> Self {
        match execution {
            Execution::Completed => Dispatch::Executed,
            Execution::AwaitingInput => Dispatch::AwaitingInput,
        }
    }
}

/// Route one event from `player`.
pub fn handle_event<G: Game>(game: &mut G, player: &PlayerId, event: PlayerEvent) -> Result<Dispatch, Rejection> {
    if game.core().is_destroyed() {
        return Err(Rejection::TableClosed);
    }
    if game.core().player(player).is_none() {
        return Err(Rejection::UnknownPlayer(player.clone()));
    }
    let outcome = match event {
        PlayerEvent::Menu {
            menu_id,
            selection_id,
            selection,
        } => handle_menu(game, player, &menu_id, selection_id, selection),
        PlayerEvent::Editbox { input_id, text } => handle_editbox(game, player, &input_id, text),
        PlayerEvent::Keybind {
            key,
            shift,
            control,
            alt,
            menu_item_id,
            menu_index,
        } => handle_keybind(
            game,
            player,
            &normalize_key(&key, shift, control, alt),
            menu_item_id,
            menu_index,
        ),
        PlayerEvent::Action { action_id, input } => {
            execute_action(game, player, &action_id, input, ActionContext::default()).map(Dispatch::from)
        }
    };
    menus::flush(game);
    outcome
}

fn handle_menu<G: Game>(
    game: &mut G,
    player: &PlayerId,
    menu_id: &str,
    selection_id: Option<String>,
    selection: Option<usize>,
) -> Result<Dispatch, Rejection> {
    match menu_id {
        TURN_MENU => {
            game.core_mut().runtime.actions_menu_open.remove(player);
            let by_id = selection_id
                .as_deref()
                .filter(|id| find_action(game, player, id).is_some())
                .map(str::to_string);
            let by_index = || {
                selection
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|index| get_all_visible_actions(game, player).into_iter().nth(index))
                    .map(|resolved| resolved.id)
            };
            let Some(action_id) = by_id.or_else(by_index) else {
                return match selection_id {
                    Some(action_id) => {
                        let rejection = Rejection::Unavailable { action_id };
                        game.core().speak_to(player, &rejection.to_string());
                        Err(rejection)
                    }
                    None => Ok(Dispatch::Ignored),
                };
            };
            let context = ActionContext::menu(action_id.clone(), selection);
            execute_action(game, player, &action_id, None, context).map(Dispatch::from)
        }
        ACTIONS_MENU => {
            game.core_mut().runtime.actions_menu_open.remove(player);
            let outcome = match selection_id.as_deref() {
                None | Some(GO_BACK_ID) => Ok(Dispatch::Closed),
                Some(action_id) => {
                    execute_action(game, player, action_id, None, ActionContext::new(Origin::ActionsMenu))
                        .map(Dispatch::from)
                }
            };
            restore_turn_menu(game, player);
            outcome
        }
        STATUS_BOX => {
            menus::close_status_box(game, player);
            Ok(Dispatch::Closed)
        }
        INPUT_MENU => {
            let choice = selection_id.filter(|id| id != CANCEL_ID);
            answer_pending_input(game, player, choice)
        }
        other => {
            debug!(%player, menu = other, "event for unknown menu");
            Ok(Dispatch::Ignored)
        }
    }
}

fn handle_editbox<G: Game>(game: &mut G, player: &PlayerId, input_id: &str, text: String) -> Result<Dispatch, Rejection> {
    if input_id != INPUT_EDITBOX {
        return Ok(Dispatch::Ignored);
    }
    let answer = Some(text).filter(|text| !text.is_empty());
    answer_pending_input(game, player, answer)
}

/// Resume a pending action with the player's answer, or drop it when the
/// answer is `None`.
fn answer_pending_input<G: Game>(game: &mut G, player: &PlayerId, answer: Option<String>) -> Result<Dispatch, Rejection> {
    let Some(action_id) = game.core_mut().pending_inputs.shift_remove(player) else {
        return Ok(Dispatch::Ignored);
    };
    let outcome = match answer {
        Some(value) => execute_action(
            game,
            player,
            &action_id,
            Some(value),
            ActionContext::new(Origin::InputResponse),
        )
        .map(Dispatch::from),
        None => Ok(Dispatch::Cancelled),
    };
    restore_turn_menu(game, player);
    outcome
}

fn handle_keybind<G: Game>(
    game: &mut G,
    player: &PlayerId,
    key: &str,
    menu_item_id: Option<String>,
    menu_index: Option<usize>,
) -> Result<Dispatch, Rejection> {
    let status = game.core().status;
    let Some(seat) = game.core().player(player).cloned() else {
        return Err(Rejection::UnknownPlayer(player.clone()));
    };
    let registered = game.core().runtime.keybinds.lookup(key);
    if registered.is_empty() {
        return Err(Rejection::UnknownKey(key.to_string()));
    }
    let binds: Vec<_> = registered
        .iter()
        .filter(|bind| bind.can_player_use(status, &seat))
        .filter(|bind| !bind.requires_focus || menu_item_id.as_ref().is_some_and(|id| bind.actions.contains(id)))
        .cloned()
        .collect();

    let mut dispatched: Option<Dispatch> = None;
    let mut first_rejection = None;
    for bind in &binds {
        for action_id in &bind.actions {
            if find_action(game, player, action_id).is_none() {
                continue;
            }
            let context = ActionContext::keybind(menu_item_id.clone(), menu_index);
            match execute_action(game, player, action_id, None, context) {
                Ok(execution) => {
                    dispatched.get_or_insert(Dispatch::from(execution));
                }
                Err(rejection) => {
                    first_rejection.get_or_insert(rejection);
                }
            }
        }
    }
    match (dispatched, first_rejection) {
        (Some(dispatch), _) => Ok(dispatch),
        (None, Some(rejection)) => Err(rejection),
        (None, None) => Ok(Dispatch::Ignored),
    }
}

/// Bring back the turn menu unless something else now has the player's
/// attention.
fn restore_turn_menu<G: Game>(game: &mut G, player: &PlayerId) {
    let core = game.core();
    let busy = core.is_pending_input(player)
        || core.runtime.status_box_open.contains(player)
        || core.runtime.actions_menu_open.contains(player);
    if !busy {
        menus::rebuild_player_menu(game, player);
    }
}
