//! Deterministic, serializable random number generation.
//!
//! The table RNG lives inside the persisted aggregate. Its state is captured
//! as a seed plus ChaCha word position, so a restored table continues the
//! exact sequence it would have produced without the save.
//!
//! ```
//! use tabletop_engine::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let _ = rng.roll(6);
//!
//! let mut restored = GameRng::from_state(&rng.state());
//! assert_eq!(rng.roll(6), restored.roll(6));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG owned by a table.
///
/// Serializes through [`GameRngState`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "GameRngState", into = "GameRngState")]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Derive a seed for an independent copy of this table, e.g. a
    /// duration-estimate simulation.
    pub fn fork_seed(&mut self) -> u64 {
        self.fork_counter += 1;
        self.seed
            .wrapping_add(self.fork_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Roll a die with `sides` faces, returning `1..=sides`.
    pub fn roll(&mut self, sides: u32) -> u32 {
        self.inner.gen_range(1..=sides.max(1))
    }

    /// Generate a random integer in the given inclusive range.
    pub fn gen_range(&mut self, range: std::ops::RangeInclusive<i64>) -> i64 {
        self.inner.gen_range(range)
    }

    /// 128 random bits, used for stable bot identifiers.
    pub fn next_bits(&mut self) -> u128 {
        self.inner.gen::<u128>()
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
            fork_counter: self.fork_counter,
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
            fork_counter: state.fork_counter,
        }
    }
}

/// Serializable RNG state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
    /// Number of seeds handed out by [`GameRng::fork_seed`]
    pub fork_counter: u64,
}

impl From<GameRngState> for GameRng {
    fn from(state: GameRngState) -> Self {
        Self::from_state(&state)
    }
}

impl From<GameRng> for GameRngState {
    fn from(rng: GameRng) -> Self {
        rng.state()
    }
}
