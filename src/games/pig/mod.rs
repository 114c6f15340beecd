//! Pig, the dice game.
//!
//! - On your turn, roll as often as you like; each roll adds to the points
//!   at risk this turn
//! - Rolling a 1 loses them and ends the turn
//! - Banking adds them to your total and ends the turn
//! - After a full round, the highest total at or above the target wins;
//!   tied leaders play tiebreak rounds
//!
//! Supports 2-4 players, bots included.

mod game;

pub use game::{PigGame, DICE_SIDES, MIN_BANK_POINTS, TARGET_SCORE};
