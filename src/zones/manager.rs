//! Zone manager for card locations and movement.
//!
//! The `ZoneManager` is the single source of truth for where every card is.
//! It keeps two indexes in step:
//! - `instance -> Location` for find-by-id
//! - `Location -> ordered Vec<InstanceId>` for zone contents
//!
//! Attachments (cheer, supports, bloom history) are locations too, keyed by
//! their host instance, so cards never hold pointers to each other.
//!
//! Every ordered zone has its top at index 0.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{InstanceId, InvariantViolation, PlayerId, RandomSource};

/// The per-player containers a card can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Deck,
    Hand,
    Archive,
    Backstage,
    Center,
    Collab,
    Life,
    CheerDeck,
    Holopower,
    /// Cards mid-resolution: a support being played, life cards awaiting
    /// placement as cheer.
    Resolving,
}

/// Who may see the identity of cards in a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneVisibility {
    Public,
    OwnerOnly,
    Hidden,
}

impl ZoneKind {
    /// Visibility rules for this zone.
    #[must_use]
    pub fn visibility(self) -> ZoneVisibility {
        match self {
            Self::Hand => ZoneVisibility::OwnerOnly,
            Self::Deck | Self::Life | Self::CheerDeck | Self::Holopower => ZoneVisibility::Hidden,
            Self::Archive | Self::Backstage | Self::Center | Self::Collab | Self::Resolving => {
                ZoneVisibility::Public
            }
        }
    }

    /// Zones that make up a player's stage.
    #[must_use]
    pub fn is_stage(self) -> bool {
        matches!(self, Self::Center | Self::Collab | Self::Backstage)
    }
}

/// What an attached card is to its host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachKind {
    Cheer,
    Support,
    /// Earlier bloom stages under the current card.
    Stacked,
}

/// Where a card is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "location", rename_all = "snake_case")]
pub enum Location {
    Zone { player: PlayerId, zone: ZoneKind },
    Attached { host: InstanceId, kind: AttachKind },
}

impl Location {
    /// Shorthand for a player zone.
    #[must_use]
    pub const fn zone(player: PlayerId, zone: ZoneKind) -> Self {
        Self::Zone { player, zone }
    }

    /// Shorthand for an attachment slot.
    #[must_use]
    pub const fn attached(host: InstanceId, kind: AttachKind) -> Self {
        Self::Attached { host, kind }
    }

    /// The zone kind, if this is a player zone.
    #[must_use]
    pub fn zone_kind(self) -> Option<ZoneKind> {
        match self {
            Self::Zone { zone, .. } => Some(zone),
            Self::Attached { .. } => None,
        }
    }

    /// Visibility of cards at this location. Attachments are public.
    #[must_use]
    pub fn visibility(self) -> ZoneVisibility {
        match self {
            Self::Zone { zone, .. } => zone.visibility(),
            Self::Attached { .. } => ZoneVisibility::Public,
        }
    }

    #[must_use]
    pub fn is_stage(self) -> bool {
        self.zone_kind().is_some_and(ZoneKind::is_stage)
    }
}

/// Position for inserting a card into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Index 0.
    Top,
    /// After the last card.
    Bottom,
    /// Specific index, clamped to the zone size.
    Index(usize),
}

/// A card's location and index within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub location: Location,
    pub index: usize,
}

/// Result of an atomic move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMove {
    pub id: InstanceId,
    pub from: Location,
    pub from_index: usize,
    pub to: Location,
}

/// Tracks card locations across zones.
///
/// ## Usage
///
/// ```
/// use holo_rules::core::{InstanceId, PlayerId};
/// use holo_rules::zones::{Location, ZoneKind, ZoneManager, ZonePosition};
///
/// let mut zones = ZoneManager::new();
/// let deck = Location::zone(PlayerId::new(0), ZoneKind::Deck);
/// let hand = Location::zone(PlayerId::new(0), ZoneKind::Hand);
///
/// zones.place(InstanceId::new(1), deck, ZonePosition::Bottom).unwrap();
/// zones.place(InstanceId::new(2), deck, ZonePosition::Bottom).unwrap();
///
/// let moved = zones.move_card(InstanceId::new(1), hand, ZonePosition::Bottom).unwrap();
/// assert_eq!(moved.from, deck);
/// assert_eq!(zones.cards_at(deck), &[InstanceId::new(2)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    locations: FxHashMap<InstanceId, Location>,
    contents: FxHashMap<Location, Vec<InstanceId>>,
}

impl ZoneManager {
    /// Create a new empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a card that has no location yet.
    pub fn place(
        &mut self,
        id: InstanceId,
        location: Location,
        position: ZonePosition,
    ) -> Result<(), InvariantViolation> {
        if self.locations.contains_key(&id) {
            return Err(InvariantViolation::DuplicatePlacement(id));
        }
        self.insert(id, location, position);
        Ok(())
    }

    /// Move a card atomically from wherever it is to `to`.
    ///
    /// Moving within the same location repositions the card.
    pub fn move_card(
        &mut self,
        id: InstanceId,
        to: Location,
        position: ZonePosition,
    ) -> Result<CardMove, InvariantViolation> {
        let from = self.locate(id)?;
        self.detach(id, from);
        self.insert(id, to, position);
        Ok(CardMove {
            id,
            from: from.location,
            from_index: from.index,
            to,
        })
    }

    /// Find a card's location and index.
    pub fn locate(&self, id: InstanceId) -> Result<Placement, InvariantViolation> {
        let location = *self
            .locations
            .get(&id)
            .ok_or(InvariantViolation::MissingInstance(id))?;
        let index = self
            .cards_at(location)
            .iter()
            .position(|&c| c == id)
            .ok_or_else(|| {
                InvariantViolation::Inconsistent(format!("{id} missing from its location"))
            })?;
        Ok(Placement { location, index })
    }

    /// A card's location, if it has one.
    #[must_use]
    pub fn location(&self, id: InstanceId) -> Option<Location> {
        self.locations.get(&id).copied()
    }

    /// Cards at a location, top first.
    #[must_use]
    pub fn cards_at(&self, location: Location) -> &[InstanceId] {
        self.contents.get(&location).map_or(&[], Vec::as_slice)
    }

    /// Cards in a player zone, top first.
    #[must_use]
    pub fn zone(&self, player: PlayerId, zone: ZoneKind) -> &[InstanceId] {
        self.cards_at(Location::zone(player, zone))
    }

    /// Cards attached to a host.
    #[must_use]
    pub fn attached(&self, host: InstanceId, kind: AttachKind) -> &[InstanceId] {
        self.cards_at(Location::attached(host, kind))
    }

    #[must_use]
    pub fn count(&self, location: Location) -> usize {
        self.cards_at(location).len()
    }

    /// Up to `n` cards from the top of a location.
    #[must_use]
    pub fn top_n(&self, location: Location, n: usize) -> Vec<InstanceId> {
        self.cards_at(location).iter().take(n).copied().collect()
    }

    /// Shuffle a location.
    pub fn shuffle(&mut self, location: Location, rng: &mut dyn RandomSource) {
        if let Some(cards) = self.contents.get_mut(&location) {
            rng.shuffle_ids(cards);
        }
    }

    /// Owning player of a card, following attachment hosts.
    #[must_use]
    pub fn owner_of(&self, id: InstanceId) -> Option<PlayerId> {
        let mut current = id;
        // Attachment chains are at most a couple of links deep.
        for _ in 0..8 {
            match self.locations.get(&current)? {
                Location::Zone { player, .. } => return Some(*player),
                Location::Attached { host, .. } => current = *host,
            }
        }
        None
    }

    /// The top-level zone a card sits in, following attachment hosts.
    #[must_use]
    pub fn root_location(&self, id: InstanceId) -> Option<Location> {
        let mut current = id;
        for _ in 0..8 {
            match self.locations.get(&current)? {
                loc @ Location::Zone { .. } => return Some(*loc),
                Location::Attached { host, .. } => current = *host,
            }
        }
        None
    }

    /// Holomems on a player's stage: center, collab, then backstage.
    #[must_use]
    pub fn stage(&self, player: PlayerId) -> Vec<InstanceId> {
        [ZoneKind::Center, ZoneKind::Collab, ZoneKind::Backstage]
            .into_iter()
            .flat_map(|z| self.zone(player, z).iter().copied())
            .collect()
    }

    /// Whether the card sits directly in a stage zone.
    #[must_use]
    pub fn is_on_stage(&self, id: InstanceId) -> bool {
        self.location(id).is_some_and(Location::is_stage)
    }

    /// Get total number of cards tracked.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn contains(&self, id: InstanceId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Every tracked instance id, in no particular order.
    pub fn all_ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.locations.keys().copied()
    }

    fn detach(&mut self, id: InstanceId, from: Placement) {
        if let Some(cards) = self.contents.get_mut(&from.location) {
            cards.remove(from.index);
            if cards.is_empty() {
                self.contents.remove(&from.location);
            }
        }
        self.locations.remove(&id);
    }

    fn insert(&mut self, id: InstanceId, location: Location, position: ZonePosition) {
        let cards = self.contents.entry(location).or_default();
        match position {
            ZonePosition::Top => cards.insert(0, id),
            ZonePosition::Bottom => cards.push(id),
            ZonePosition::Index(i) => {
                let idx = i.min(cards.len());
                cards.insert(idx, id);
            }
        }
        self.locations.insert(id, location);
    }
}
