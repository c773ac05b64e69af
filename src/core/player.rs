//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Seat index for one of the two players. `opponent()` gives the other seat.
//!
//! ## PlayerMap
//!
//! Fixed two-slot storage indexed by `PlayerId`.
//!
//! ## PlayerState
//!
//! Everything about a player that is not a card location: identity, oshi,
//! usage ledgers and the once-per-turn action flags.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::entity::InstanceId;
use crate::cards::CardId;

/// Seat identifier, `0` or `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Number of seats in a match.
    pub const COUNT: usize = 2;

    /// Create a new player ID.
    ///
    /// Panics if `id` is not a valid seat.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        assert!(id < 2, "PlayerId must be 0 or 1");
        Self(id)
    }

    /// Get the raw seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other seat.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Both seats in order.
    pub fn both() -> impl Iterator<Item = PlayerId> {
        [PlayerId(0), PlayerId(1)].into_iter()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage.
///
/// ```
/// use holo_rules::core::{PlayerId, PlayerMap};
///
/// let mut life: PlayerMap<u32> = PlayerMap::new(|_| 5);
/// life[PlayerId::new(1)] = 3;
///
/// assert_eq!(life[PlayerId::new(0)], 5);
/// assert_eq!(life[PlayerId::new(1)], 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: [T; 2],
}

impl<T> PlayerMap<T> {
    pub fn new(factory: impl Fn(PlayerId) -> T) -> Self {
        Self::from_array([factory(PlayerId(0)), factory(PlayerId(1))])
    }

    /// Seat 0 first.
    pub fn from_array(seats: [T; 2]) -> Self {
        Self { data: seats }
    }

    /// Seats in order with their values.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::both().zip(self.data.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        PlayerId::both().zip(self.data.iter_mut())
    }
}

impl<T: Default> Default for PlayerMap<T> {
    fn default() -> Self {
        Self::new(|_| T::default())
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }
}

/// Mutable per-player state that does not live in a zone.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,

    /// Identifier assigned by the room layer.
    pub external_id: String,

    pub username: String,

    /// Oshi instance. Never placed in a zone.
    pub oshi: InstanceId,

    /// Catalog id of the oshi.
    pub oshi_card: CardId,

    /// Effect ids consumed this turn. Cleared at every turn start.
    pub used_this_turn: FxHashSet<String>,

    /// Effect ids consumed this game. Never cleared.
    pub used_this_game: FxHashSet<String>,

    /// Every effect or skill id consumed so far, whatever its limit.
    pub activated: FxHashSet<String>,

    /// Turns granted to this player on top of the normal rotation.
    pub extra_turns: u32,

    pub collabed_this_turn: bool,
    pub baton_passed_this_turn: bool,
    pub limited_played_this_turn: bool,

    /// Turns this player has started, including the current one.
    pub turns_taken: u32,

    /// Forced redraws taken during setup.
    pub forced_mulligans: u32,

    /// Set once the opening placement has been submitted.
    pub placed: bool,
}

impl PlayerState {
    /// Create a fresh player record.
    pub fn new(
        id: PlayerId,
        external_id: impl Into<String>,
        username: impl Into<String>,
        oshi: InstanceId,
        oshi_card: CardId,
    ) -> Self {
        Self {
            id,
            external_id: external_id.into(),
            username: username.into(),
            oshi,
            oshi_card,
            used_this_turn: FxHashSet::default(),
            used_this_game: FxHashSet::default(),
            activated: FxHashSet::default(),
            extra_turns: 0,
            collabed_this_turn: false,
            baton_passed_this_turn: false,
            limited_played_this_turn: false,
            turns_taken: 0,
            forced_mulligans: 0,
            placed: false,
        }
    }

    /// Whether an effect id has been consumed under the given limit.
    #[must_use]
    pub fn has_used(&self, effect_id: &str, per_game: bool) -> bool {
        if per_game {
            self.used_this_game.contains(effect_id)
        } else {
            self.used_this_turn.contains(effect_id)
        }
    }

    /// Record an effect id as consumed.
    pub fn mark_used(&mut self, effect_id: &str, per_game: bool) {
        self.activated.insert(effect_id.to_string());
        if per_game {
            self.used_this_game.insert(effect_id.to_string());
        } else {
            self.used_this_turn.insert(effect_id.to_string());
        }
    }

    /// Clear the per-turn ledger and flags.
    pub fn reset_turn(&mut self) {
        self.used_this_turn.clear();
        self.collabed_this_turn = false;
        self.baton_passed_this_turn = false;
        self.limited_played_this_turn = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player() -> PlayerState {
        PlayerState::new(PlayerId(0), "p-one", "One", InstanceId(1), CardId::from("hSD01-001"))
    }

    #[test]
    fn test_opponent() {
        assert_eq!(PlayerId(0).opponent(), PlayerId(1));
        assert_eq!(PlayerId(1).opponent(), PlayerId(0));
    }

    #[test]
    fn test_both() {
        let all: Vec<_> = PlayerId::both().collect();
        assert_eq!(all, vec![PlayerId(0), PlayerId(1)]);
    }

    #[test]
    #[should_panic(expected = "PlayerId must be 0 or 1")]
    fn test_invalid_seat() {
        let _ = PlayerId::new(2);
    }

    #[test]
    fn test_player_map_mutation() {
        let mut hands: PlayerMap<Vec<u32>> = PlayerMap::default();
        hands[PlayerId(1)].push(7);
        for (seat, hand) in hands.iter_mut() {
            hand.push(u32::from(seat.0));
        }

        let pairs: Vec<_> = hands.iter().collect();
        assert_eq!(pairs, vec![(PlayerId(0), &vec![0]), (PlayerId(1), &vec![7, 1])]);
    }

    #[test]
    fn test_ledger_turn_vs_game() {
        let mut player = sample_player();
        player.mark_used("skill_a", false);
        player.mark_used("skill_b", true);

        assert!(player.has_used("skill_a", false));
        assert!(!player.has_used("skill_a", true));
        assert!(player.has_used("skill_b", true));

        player.reset_turn();
        assert!(!player.has_used("skill_a", false));
        assert!(player.has_used("skill_b", true));
        assert!(player.activated.contains("skill_a"));
        assert!(player.activated.contains("skill_b"));
    }

    #[test]
    fn test_reset_turn_clears_flags() {
        let mut player = sample_player();
        player.collabed_this_turn = true;
        player.baton_passed_this_turn = true;
        player.limited_played_this_turn = true;
        player.extra_turns = 1;

        player.reset_turn();
        assert!(!player.collabed_this_turn);
        assert!(!player.baton_passed_this_turn);
        assert!(!player.limited_played_this_turn);
        assert_eq!(player.extra_turns, 1);
    }
}
