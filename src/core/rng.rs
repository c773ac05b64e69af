//! Pluggable randomness for shuffles and coin flips.
//!
//! The engine only needs two things from a random source: shuffle a zone and
//! pick an index. `RandomSource` captures that so a match can be driven by
//! the seeded production RNG or by a fixed, non-random source in tests.
//!
//! ## Sources
//!
//! - `GameRng`: ChaCha8, deterministic per seed, checkpointable.
//! - `FixedOrder`: never reorders and always picks index 0. Deck order equals
//!   deck-list order, which makes scripted games reproducible by hand.
//!
//! ```
//! use holo_rules::core::{GameRng, RandomSource};
//! use holo_rules::core::InstanceId;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//!
//! let mut x: Vec<_> = (1..=10).map(InstanceId::new).collect();
//! let mut y = x.clone();
//! a.shuffle_ids(&mut x);
//! b.shuffle_ids(&mut y);
//! assert_eq!(x, y);
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::entity::InstanceId;

/// Source of randomness for one match.
///
/// Object safe; the match stores it as `Box<dyn RandomSource>`.
pub trait RandomSource: std::fmt::Debug + Send {
    /// Reorder `ids` in place.
    fn shuffle_ids(&mut self, ids: &mut [InstanceId]);

    /// Pick an index in `0..len`. `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this RNG was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Checkpoint the stream position.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Resume a checkpointed stream where it left off.
    #[must_use]
    pub fn from_state(checkpoint: &GameRngState) -> Self {
        let mut rng = Self::new(checkpoint.seed);
        rng.inner.set_word_pos(checkpoint.word_pos);
        rng
    }
}

impl RandomSource for GameRng {
    fn shuffle_ids(&mut self, ids: &mut [InstanceId]) {
        ids.shuffle(&mut self.inner);
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }
}

/// Seed plus ChaCha8 word position. Restoring replays nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    pub word_pos: u128,
}

/// A source that never shuffles and always picks the first option.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedOrder;

impl RandomSource for FixedOrder {
    fn shuffle_ids(&mut self, _ids: &mut [InstanceId]) {}

    fn pick_index(&mut self, _len: usize) -> usize {
        0
    }
}
