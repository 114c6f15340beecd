//! Turn order: who acts next, in which direction, and who gets skipped.
//!
//! `TurnOrder` is plain data inside the persisted aggregate. It never looks
//! players up itself; callers resolve the returned id against the roster,
//! so a stale id simply resolves to nobody instead of panicking.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PlayerId;

/// Direction of play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    #[must_use]
    pub fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Outcome of one [`TurnOrder::advance`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Advance {
    /// Players passed over by pending skips, in the order they were skipped.
    pub skipped: SmallVec<[PlayerId; 2]>,
    /// The player whose turn it now is.
    pub current: Option<PlayerId>,
}

/// Ordered turn rotation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrder {
    turn_player_ids: Vec<PlayerId>,
    turn_index: usize,
    turn_direction: Direction,
    skip_count: u32,
}

impl TurnOrder {
    #[must_use]
    pub fn new(players: Vec<PlayerId>) -> Self {
        Self {
            turn_player_ids: players,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.turn_player_ids
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.turn_index
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.turn_direction
    }

    #[must_use]
    pub fn skip_count(&self) -> u32 {
        self.skip_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turn_player_ids.is_empty()
    }

    /// Id of the player whose turn it is, or `None` with no turn players.
    #[must_use]
    pub fn current(&self) -> Option<&PlayerId> {
        if self.turn_player_ids.is_empty() {
            return None;
        }
        self.turn_player_ids
            .get(self.turn_index % self.turn_player_ids.len())
    }

    /// True when the current index is the last seat in forward order.
    #[must_use]
    pub fn is_last_in_round(&self) -> bool {
        !self.turn_player_ids.is_empty() && self.turn_index + 1 >= self.turn_player_ids.len()
    }

    fn step(&mut self) {
        let len = self.turn_player_ids.len() as isize;
        if len == 0 {
            self.turn_index = 0;
            return;
        }
        let next = (self.turn_index as isize + self.turn_direction.step()).rem_euclid(len);
        self.turn_index = next as usize;
    }

    /// Move to the next player, consuming pending skips first.
    ///
    /// Each pending skip passes over one player; the move after the skips
    /// is the normal step.
    pub fn advance(&mut self) -> Advance {
        let mut skipped = SmallVec::new();
        if self.turn_player_ids.is_empty() {
            self.skip_count = 0;
            self.turn_index = 0;
            return Advance {
                skipped,
                current: None,
            };
        }
        while self.skip_count > 0 {
            self.skip_count -= 1;
            self.step();
            if let Some(id) = self.current() {
                skipped.push(id.clone());
            }
        }
        self.step();
        Advance {
            skipped,
            current: self.current().cloned(),
        }
    }

    /// Queue `count` players to be passed over on the next advance.
    pub fn skip_next_players(&mut self, count: u32) {
        self.skip_count = self.skip_count.saturating_add(count);
    }

    /// Flip the direction of play.
    ///
    /// With exactly two turn players a reversal cannot change who goes next,
    /// so it acts as a skip of the other player instead.
    pub fn reverse_turn_direction(&mut self) {
        self.turn_direction = self.turn_direction.flipped();
        if self.turn_player_ids.len() == 2 {
            self.skip_next_players(1);
        }
    }

    /// Back to the first player, forward, with no skips.
    pub fn reset_turn_order(&mut self) {
        self.turn_index = 0;
        self.turn_direction = Direction::Forward;
        self.skip_count = 0;
    }

    /// Replace the rotation. With `reset_index` the first listed player is
    /// current; otherwise the current player keeps the turn if still listed.
    pub fn set_turn_players(&mut self, players: Vec<PlayerId>, reset_index: bool) {
        let current = self.current().cloned();
        self.turn_player_ids = players;
        if reset_index {
            self.turn_index = 0;
            return;
        }
        self.turn_index = current
            .and_then(|id| self.turn_player_ids.iter().position(|p| *p == id))
            .unwrap_or(0);
    }

    /// Make `player` current if they are in the rotation.
    pub fn set_current(&mut self, player: &PlayerId) -> bool {
        match self.turn_player_ids.iter().position(|p| p == player) {
            Some(index) => {
                self.turn_index = index;
                true
            }
            None => false,
        }
    }

    /// Drop a player from the rotation.
    ///
    /// If they held the turn, it passes to whoever would have been next in
    /// the current direction. Returns whether the turn holder changed.
    pub fn remove_player(&mut self, player: &PlayerId) -> bool {
        let Some(pos) = self.turn_player_ids.iter().position(|p| p == player) else {
            return false;
        };
        let len = self.turn_player_ids.len();
        let current_pos = self.turn_index % len;
        self.turn_player_ids.remove(pos);
        let remaining = self.turn_player_ids.len();
        if remaining == 0 {
            self.turn_index = 0;
            self.skip_count = 0;
            return true;
        }
        if pos < current_pos {
            self.turn_index = current_pos - 1;
            false
        } else if pos > current_pos {
            self.turn_index = current_pos;
            false
        } else {
            self.turn_index = match self.turn_direction {
                Direction::Forward => pos % remaining,
                Direction::Reverse => (pos as isize - 1).rem_euclid(remaining as isize) as usize,
            };
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| PlayerId::new(*n)).collect()
    }

    #[test]
    fn test_empty_has_no_current() {
        let mut order = TurnOrder::default();
        assert!(order.current().is_none());
        assert!(order.advance().current.is_none());
    }

    #[test]
    fn test_advance_wraps() {
        let mut order = TurnOrder::new(ids(&["a", "b", "c"]));
        assert_eq!(order.current(), Some(&PlayerId::new("a")));
        order.advance();
        order.advance();
        assert_eq!(order.current(), Some(&PlayerId::new("c")));
        assert_eq!(order.advance().current, Some(PlayerId::new("a")));
    }

    #[test]
    fn test_skips_are_reported() {
        let mut order = TurnOrder::new(ids(&["a", "b", "c", "d"]));
        order.skip_next_players(2);
        let advance = order.advance();
        assert_eq!(advance.skipped.as_slice(), ids(&["b", "c"]).as_slice());
        assert_eq!(advance.current, Some(PlayerId::new("d")));
        assert_eq!(order.skip_count(), 0);
    }

    #[test]
    fn test_reverse_moves_backwards() {
        let mut order = TurnOrder::new(ids(&["a", "b", "c"]));
        order.reverse_turn_direction();
        assert_eq!(order.skip_count(), 0);
        assert_eq!(order.advance().current, Some(PlayerId::new("c")));
    }

    #[test]
    fn test_reverse_with_two_players_skips() {
        let mut order = TurnOrder::new(ids(&["a", "b"]));
        order.reverse_turn_direction();
        assert_eq!(order.direction(), Direction::Reverse);
        let advance = order.advance();
        assert_eq!(advance.skipped.as_slice(), ids(&["b"]).as_slice());
        assert_eq!(advance.current, Some(PlayerId::new("a")));
    }

    #[test]
    fn test_reset_turn_order() {
        let mut order = TurnOrder::new(ids(&["a", "b", "c"]));
        order.advance();
        order.reverse_turn_direction();
        order.skip_next_players(1);
        order.reset_turn_order();
        assert_eq!(order.index(), 0);
        assert_eq!(order.direction(), Direction::Forward);
        assert_eq!(order.skip_count(), 0);
    }

    #[test]
    fn test_set_turn_players_keeps_current() {
        let mut order = TurnOrder::new(ids(&["a", "b", "c"]));
        order.advance();
        order.set_turn_players(ids(&["c", "b"]), false);
        assert_eq!(order.current(), Some(&PlayerId::new("b")));
        order.set_turn_players(ids(&["x", "y"]), false);
        assert_eq!(order.current(), Some(&PlayerId::new("x")));
    }

    #[test]
    fn test_remove_current_passes_turn_forward() {
        let mut order = TurnOrder::new(ids(&["a", "b", "c"]));
        order.advance();
        assert!(order.remove_player(&PlayerId::new("b")));
        assert_eq!(order.current(), Some(&PlayerId::new("c")));
    }

    #[test]
    fn test_remove_current_passes_turn_backward() {
        let mut order = TurnOrder::new(ids(&["a", "b", "c"]));
        order.advance();
        order.reverse_turn_direction();
        assert!(order.remove_player(&PlayerId::new("b")));
        assert_eq!(order.current(), Some(&PlayerId::new("a")));
    }

    #[test]
    fn test_remove_earlier_player_keeps_holder() {
        let mut order = TurnOrder::new(ids(&["a", "b", "c"]));
        order.advance();
        order.advance();
        assert!(!order.remove_player(&PlayerId::new("a")));
        assert_eq!(order.current(), Some(&PlayerId::new("c")));
        assert!(!order.remove_player(&PlayerId::new("zzz")));
    }

    #[test]
    fn test_remove_last_player() {
        let mut order = TurnOrder::new(ids(&["a"]));
        assert!(order.remove_player(&PlayerId::new("a")));
        assert!(order.current().is_none());
    }

    #[test]
    fn test_is_last_in_round() {
        let mut order = TurnOrder::new(ids(&["a", "b"]));
        assert!(!order.is_last_in_round());
        order.advance();
        assert!(order.is_last_in_round());
    }
}
