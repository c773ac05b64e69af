//! Card instances: runtime copies of catalog cards.
//!
//! A `CardInstance` carries only what changes during play: damage, resting,
//! and per-turn markers. Where the card is, and what is attached to it, is
//! tracked by the `ZoneManager` so there are no back pointers here.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::CardId;
use crate::core::{InstanceId, PlayerId};

/// Per-turn facts about a card. Cleared at every turn start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnMarker {
    /// Placed on stage this turn.
    EnteredStage,
    /// Bloomed this turn.
    Bloomed,
    /// Used an art this turn.
    UsedArt,
}

/// Runtime card state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique id of this copy.
    pub id: InstanceId,

    /// Catalog id.
    pub card_id: CardId,

    /// Player who brought the card into the match.
    pub owner: PlayerId,

    /// Damage counters.
    pub damage: u32,

    /// Rested holomems cannot perform, collab or baton pass in.
    pub resting: bool,

    markers: SmallVec<[TurnMarker; 3]>,
}

impl CardInstance {
    /// Create a fresh instance.
    pub fn new(id: InstanceId, card_id: CardId, owner: PlayerId) -> Self {
        Self {
            id,
            card_id,
            owner,
            damage: 0,
            resting: false,
            markers: SmallVec::new(),
        }
    }

    /// Set a per-turn marker.
    pub fn mark(&mut self, marker: TurnMarker) {
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
    }

    #[must_use]
    pub fn has_marker(&self, marker: TurnMarker) -> bool {
        self.markers.contains(&marker)
    }

    /// Drop all per-turn markers.
    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    /// Forget everything that happened in play. Used when a card leaves
    /// the stage.
    pub fn reset_play_state(&mut self) {
        self.damage = 0;
        self.resting = false;
        self.markers.clear();
    }
}
