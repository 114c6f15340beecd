//! Pure resolution of actions against the current table state.
//!
//! Nothing here mutates the game, so resolving twice without an
//! intervening mutation always yields equal results.

use super::action::{Action, ResolvedAction};
use crate::core::{Player, PlayerId};
use crate::game::Game;

/// Evaluate label, enabled state and visibility for one player.
///
/// Visible means enabled and not hidden.
pub fn resolve_action<G: Game>(game: &G, player: &Player, action: &Action<G>) -> ResolvedAction {
    let label = match action.get_label {
        Some(get_label) => get_label(game, player, &action.id),
        None => action.label.clone(),
    };
    let enabled = (action.is_enabled)(game, player);
    let shown = (action.is_hidden)(game, player).is_visible();
    ResolvedAction {
        id: action.id.clone(),
        label,
        visible: enabled.is_ok() && shown,
        enabled: enabled.is_ok(),
        disabled_reason: enabled.err(),
    }
}

/// First action with this id in the player's sets.
pub fn find_action<'a, G: Game>(game: &'a G, player: &PlayerId, action_id: &str) -> Option<&'a Action<G>> {
    game.core().runtime.actions.find_action(player, action_id)
}

/// Resolve by id. `None` when the player or the action is unknown.
pub fn resolve_action_by_id<G: Game>(game: &G, player: &PlayerId, action_id: &str) -> Option<ResolvedAction> {
    let seat = game.core().player(player)?;
    let action = find_action(game, player, action_id)?;
    Some(resolve_action(game, seat, action))
}

fn collect<G: Game>(game: &G, player: &PlayerId, keep: fn(&ResolvedAction) -> bool) -> Vec<ResolvedAction> {
    let Some(seat) = game.core().player(player) else {
        return Vec::new();
    };
    let mut seen = rustc_hash::FxHashSet::default();
    game.core()
        .runtime
        .actions
        .sets_for(player)
        .flat_map(|set| set.iter())
        .filter(|action| seen.insert(action.id.as_str()))
        .map(|action| resolve_action(game, seat, action))
        .filter(|resolved| keep(resolved))
        .collect()
}

/// Actions that belong in the turn menu, in set order.
pub fn get_all_visible_actions<G: Game>(game: &G, player: &PlayerId) -> Vec<ResolvedAction> {
    collect(game, player, |resolved| resolved.visible)
}

/// Every enabled action, hidden ones included.
pub fn get_all_enabled_actions<G: Game>(game: &G, player: &PlayerId) -> Vec<ResolvedAction> {
    collect(game, player, |resolved| resolved.enabled)
}
