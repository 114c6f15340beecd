use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::action::Action;
use super::set::ActionSet;
use crate::core::PlayerId;

/// Per-player ordered action sets.
///
/// Lives in the table's runtime state and is rebuilt from the aggregate
/// after a restore, so it is never serialized.
pub struct ActionRegistry<G> {
    sets: FxHashMap<PlayerId, IndexMap<String, ActionSet<G>>>,
}

impl<G> Default for ActionRegistry<G> {
    fn default() -> Self {
        Self {
            sets: FxHashMap::default(),
        }
    }
}

impl<G> ActionRegistry<G> {
    /// Register a set for a player. A set with the same name is replaced in
    /// place, so each name appears at most once per player.
    pub fn add_action_set(&mut self, player: &PlayerId, set: ActionSet<G>) {
        self.sets
            .entry(player.clone())
            .or_default()
            .insert(set.name().to_string(), set);
    }

    pub fn remove_action_set(&mut self, player: &PlayerId, name: &str) -> Option<ActionSet<G>> {
        self.sets.get_mut(player)?.shift_remove(name)
    }

    #[must_use]
    pub fn action_set(&self, player: &PlayerId, name: &str) -> Option<&ActionSet<G>> {
        self.sets.get(player)?.get(name)
    }

    pub fn action_set_mut(&mut self, player: &PlayerId, name: &str) -> Option<&mut ActionSet<G>> {
        self.sets.get_mut(player)?.get_mut(name)
    }

    /// A player's sets in registration order.
    pub fn sets_for<'a>(&'a self, player: &PlayerId) -> impl Iterator<Item = &'a ActionSet<G>> + 'a {
        self.sets.get(player).into_iter().flat_map(|sets| sets.values())
    }

    /// First action with this id across the player's sets, in set order.
    #[must_use]
    pub fn find_action(&self, player: &PlayerId, action_id: &str) -> Option<&Action<G>> {
        self.sets_for(player).find_map(|set| set.get(action_id))
    }

    pub fn clear_player(&mut self, player: &PlayerId) {
        self.sets.remove(player);
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionCall;

    struct Dummy;

    fn noop(_: &mut Dummy, _: &PlayerId, _: &ActionCall) {}

    #[test]
    fn test_first_match_wins_in_registration_order() {
        let player = PlayerId::new("p");
        let mut registry: ActionRegistry<Dummy> = ActionRegistry::default();
        registry.add_action_set(&player, ActionSet::new("turn").with(Action::new("go", "Turn go", noop)));
        registry.add_action_set(&player, ActionSet::new("lobby").with(Action::new("go", "Lobby go", noop)));

        let found = registry.find_action(&player, "go").unwrap();
        assert_eq!(found.label, "Turn go");
        assert!(registry.find_action(&PlayerId::new("other"), "go").is_none());
    }

    #[test]
    fn test_same_name_replaces_in_place() {
        let player = PlayerId::new("p");
        let mut registry: ActionRegistry<Dummy> = ActionRegistry::default();
        registry.add_action_set(&player, ActionSet::new("turn"));
        registry.add_action_set(&player, ActionSet::new("lobby"));
        registry.add_action_set(&player, ActionSet::new("turn").with(Action::new("x", "X", noop)));

        let names: Vec<_> = registry.sets_for(&player).map(ActionSet::name).collect();
        assert_eq!(names, vec!["turn", "lobby"]);
        assert!(registry.find_action(&player, "x").is_some());

        assert!(registry.remove_action_set(&player, "turn").is_some());
        assert!(registry.find_action(&player, "x").is_none());
    }
}
