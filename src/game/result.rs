//! Results of finished tables.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// Who won.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (no winner).
    Draw,
    /// Multiple winners (team games, shared victory).
    Winners(Vec<PlayerId>),
}

impl Outcome {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: &PlayerId) -> bool {
        match self {
            Outcome::Winner(p) => p == player,
            Outcome::Winners(ps) => ps.contains(player),
            Outcome::Draw => false,
        }
    }
}

/// Per-seat line of a result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub id: PlayerId,
    pub name: String,
    pub is_bot: bool,
    pub score: Option<i64>,
}

/// Record of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_type: String,
    pub outcome: Outcome,
    /// Ticks from table creation to the end of the game.
    pub duration_ticks: u64,
    pub rounds: u32,
    pub players: Vec<PlayerResult>,
}

impl GameResult {
    /// Names of the winning players, in roster order.
    #[must_use]
    pub fn winner_names(&self) -> Vec<&str> {
        self.players
            .iter()
            .filter(|p| self.outcome.is_winner(&p.id))
            .map(|p| p.name.as_str())
            .collect()
    }
}
