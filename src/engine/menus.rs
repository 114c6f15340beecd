//! Rendering action sets into menus.

use crate::actions::{get_all_enabled_actions, get_all_visible_actions};
use crate::core::{GameStatus, PlayerId};
use crate::game::Game;
use crate::user::MenuItem;

pub const TURN_MENU: &str = "turn_menu";
pub const ACTIONS_MENU: &str = "actions_menu";
pub const STATUS_BOX: &str = "status_box";
pub const INPUT_MENU: &str = "action_input_menu";
pub const INPUT_EDITBOX: &str = "action_input_editbox";
pub const CANCEL_ID: &str = "_cancel";
pub const GO_BACK_ID: &str = "go_back";

/// Draw the turn menu for one player.
///
/// Nothing is drawn once the table is finished or destroyed, or when the
/// player has no connected user.
pub fn rebuild_player_menu<G: Game>(game: &G, player: &PlayerId) {
    let core = game.core();
    if core.is_destroyed() || core.status == GameStatus::Finished {
        return;
    }
    let Some(user) = core.user(player) else {
        return;
    };
    let items: Vec<MenuItem> = get_all_visible_actions(game, player)
        .into_iter()
        .map(|resolved| MenuItem::new(resolved.id, resolved.label))
        .collect();
    user.show_menu(TURN_MENU, &items);
}

/// Redraw every player's turn menu, except for players answering an input
/// request or looking at an overlay.
pub fn rebuild_all_menus<G: Game>(game: &mut G) {
    game.core_mut().runtime.menus_dirty = false;
    let core = game.core();
    if core.is_destroyed() {
        return;
    }
    let targets: Vec<PlayerId> = core
        .players
        .iter()
        .map(|p| p.id.clone())
        .filter(|id| {
            !core.pending_inputs.contains_key(id)
                && !core.runtime.status_box_open.contains(id)
                && !core.runtime.actions_menu_open.contains(id)
        })
        .collect();
    for player in &targets {
        rebuild_player_menu(game, player);
    }
}

/// Redraw menus if anything marked them stale.
pub fn flush<G: Game>(game: &mut G) {
    if game.core().runtime.menus_dirty {
        rebuild_all_menus(game);
    }
}

/// Show a list of lines to a player until they close it.
pub fn status_box<G: Game>(game: &mut G, player: &PlayerId, lines: &[String]) {
    let Some(user) = game.core().user(player) else {
        return;
    };
    user.status_box(lines);
    game.core_mut().runtime.status_box_open.insert(player.clone());
}

/// Close a player's status box and bring back the turn menu.
pub fn close_status_box<G: Game>(game: &mut G, player: &PlayerId) {
    game.core_mut().runtime.status_box_open.remove(player);
    if let Some(user) = game.core().user(player) {
        user.remove_menu(STATUS_BOX);
        user.speak("Status box closed.");
    }
    rebuild_player_menu(game, player);
}

/// List every enabled action, hidden ones included, plus a way back.
pub fn show_actions_menu<G: Game>(game: &mut G, player: &PlayerId) {
    let Some(user) = game.core().user(player) else {
        return;
    };
    let mut items: Vec<MenuItem> = get_all_enabled_actions(game, player)
        .into_iter()
        .filter(|resolved| resolved.id != "show_actions")
        .map(|resolved| MenuItem::new(resolved.id, resolved.label))
        .collect();
    items.push(MenuItem::new(GO_BACK_ID, "Go back"));
    user.show_menu(ACTIONS_MENU, &items);
    game.core_mut().runtime.actions_menu_open.insert(player.clone());
}
