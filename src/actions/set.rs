use indexmap::IndexMap;

use super::action::Action;

/// A named, ordered group of actions.
pub struct ActionSet<G> {
    name: String,
    actions: IndexMap<String, Action<G>>,
}

impl<G> Clone for ActionSet<G> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl<G> std::fmt::Debug for ActionSet<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionSet")
            .field("name", &self.name)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<G> ActionSet<G> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an action. Re-adding an id replaces it in place.
    pub fn add(&mut self, action: Action<G>) {
        self.actions.insert(action.id.clone(), action);
    }

    #[must_use]
    pub fn with(mut self, action: Action<G>) -> Self {
        self.add(action);
        self
    }

    pub fn remove(&mut self, action_id: &str) -> Option<Action<G>> {
        self.actions.shift_remove(action_id)
    }

    /// Remove every action whose id starts with `prefix`.
    pub fn remove_by_prefix(&mut self, prefix: &str) -> usize {
        let before = self.actions.len();
        self.actions.retain(|id, _| !id.starts_with(prefix));
        before - self.actions.len()
    }

    #[must_use]
    pub fn get(&self, action_id: &str) -> Option<&Action<G>> {
        self.actions.get(action_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action<G>> {
        self.actions.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionCall;
    use crate::core::PlayerId;

    struct Dummy;

    fn noop(_: &mut Dummy, _: &PlayerId, _: &ActionCall) {}

    #[test]
    fn test_replace_keeps_position() {
        let mut set: ActionSet<Dummy> = ActionSet::new("turn")
            .with(Action::new("roll", "Roll", noop))
            .with(Action::new("bank", "Bank", noop));
        set.add(Action::new("roll", "Roll again", noop));

        let ids: Vec<_> = set.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["roll", "bank"]);
        assert_eq!(set.get("roll").map(|a| a.label.as_str()), Some("Roll again"));
    }

    #[test]
    fn test_remove_by_prefix() {
        let mut set: ActionSet<Dummy> = ActionSet::new("options")
            .with(Action::new("set_target", "Target", noop))
            .with(Action::new("set_sides", "Sides", noop))
            .with(Action::new("toggle_fast", "Fast", noop));

        assert_eq!(set.remove_by_prefix("set_"), 2);
        assert_eq!(set.len(), 1);
        assert!(set.remove("toggle_fast").is_some());
        assert!(set.is_empty());
    }
}
