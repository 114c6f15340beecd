//! Deferred work owned by a table: sounds, timers and delayed bot moves.
//!
//! Entries fire in `(due_tick, sequence)` order, so two effects due on the
//! same tick run in the order they were scheduled. The queue is part of the
//! persisted aggregate.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::PlayerId;
use crate::user::SoundCue;

/// Handle for cancelling a scheduled effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(pub u64);

/// What happens when an entry comes due.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Play a sound to every seated user.
    Sound(SoundCue),
    /// Call the game's timer hook with this key.
    Timer { key: String },
    /// Run an action on behalf of a bot.
    BotAction { player: PlayerId, action_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEffect {
    pub id: EffectId,
    pub due_tick: u64,
    pub kind: EffectKind,
}

/// Ordered queue of scheduled effects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectQueue {
    next_id: u64,
    entries: VecDeque<ScheduledEffect>,
}

impl EffectQueue {
    /// Schedule `kind` at `due_tick`. Ids increase monotonically and double
    /// as the tie-break sequence.
    pub fn schedule(&mut self, due_tick: u64, kind: EffectKind) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        let position = self
            .entries
            .iter()
            .position(|entry| (entry.due_tick, entry.id) > (due_tick, id))
            .unwrap_or(self.entries.len());
        self.entries.insert(position, ScheduledEffect { id, due_tick, kind });
        id
    }

    /// Remove a pending entry. Returns false if it already fired or never
    /// existed.
    pub fn cancel(&mut self, id: EffectId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every entry matching `predicate`.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&EffectKind) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(&entry.kind));
        before - self.entries.len()
    }

    /// Pop the earliest entry if it is due at or before `tick`.
    pub fn pop_due(&mut self, tick: u64) -> Option<ScheduledEffect> {
        if self.entries.front().is_some_and(|entry| entry.due_tick <= tick) {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEffect> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(key: &str) -> EffectKind {
        EffectKind::Timer { key: key.to_string() }
    }

    fn drain(queue: &mut EffectQueue, tick: u64) -> Vec<EffectKind> {
        std::iter::from_fn(|| queue.pop_due(tick)).map(|e| e.kind).collect()
    }

    #[test]
    fn test_fires_in_due_then_sequence_order() {
        let mut queue = EffectQueue::default();
        queue.schedule(5, timer("late"));
        queue.schedule(2, timer("first"));
        queue.schedule(2, timer("second"));

        assert!(drain(&mut queue, 1).is_empty());
        assert_eq!(drain(&mut queue, 2), vec![timer("first"), timer("second")]);
        assert_eq!(drain(&mut queue, 10), vec![timer("late")]);
    }

    #[test]
    fn test_cancel() {
        let mut queue = EffectQueue::default();
        let a = queue.schedule(1, timer("a"));
        queue.schedule(1, timer("b"));
        assert!(queue.cancel(a));
        assert!(!queue.cancel(a));
        assert_eq!(drain(&mut queue, 1), vec![timer("b")]);
    }

    #[test]
    fn test_cancel_where() {
        let mut queue = EffectQueue::default();
        queue.schedule(
            1,
            EffectKind::BotAction {
                player: PlayerId::new("bot"),
                action_id: "roll".to_string(),
            },
        );
        queue.schedule(1, timer("keep"));
        let removed = queue.cancel_where(|kind| matches!(kind, EffectKind::BotAction { .. }));
        assert_eq!(removed, 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_queue_survives_bincode() {
        let mut queue = EffectQueue::default();
        queue.schedule(3, EffectKind::Sound(SoundCue::new("ding.ogg")));
        queue.schedule(1, timer("t"));

        let bytes = bincode::serialize(&queue).unwrap();
        let mut restored: EffectQueue = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, queue);
        let next = restored.schedule(1, timer("u"));
        assert_eq!(next, EffectId(2));
    }
}
