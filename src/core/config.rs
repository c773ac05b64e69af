//! Match configuration.
//!
//! - `EngineConfig`: rule knobs (hand size, backstage limit, first-turn rules)
//! - `PlayerSetup`: who is playing and with which oshi, deck and cheer deck
//!
//! Both deserialize from JSON. Every `EngineConfig` field has a default so a
//! partial document only overrides what it names.

use serde::{Deserialize, Serialize};

use super::error::SetupError;
use crate::cards::CardId;

/// Rule configuration for a match.
///
/// ```
/// use holo_rules::core::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "starting_hand_size": 5 }"#).unwrap();
/// assert_eq!(config.starting_hand_size, 5);
/// assert_eq!(config.max_backstage, 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cards dealt at game start and after a voluntary mulligan.
    pub starting_hand_size: usize,

    /// Maximum holomems in the backstage.
    pub max_backstage: usize,

    /// Cards drawn in the draw step.
    pub draw_per_turn: usize,

    /// Deck cards moved to holopower on collab.
    pub holopower_per_collab: usize,

    /// The player going first skips their first draw step.
    pub first_player_skips_draw: bool,

    /// The player going first cannot perform on their first turn.
    pub first_player_skips_performance: bool,

    /// Whether blooming is allowed on a player's own first turn.
    pub allow_first_turn_bloom: bool,

    /// Forced redraws before a player without debuts loses.
    pub max_forced_mulligans: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_hand_size: 7,
            max_backstage: 5,
            draw_per_turn: 1,
            holopower_per_collab: 1,
            first_player_skips_draw: true,
            first_player_skips_performance: true,
            allow_first_turn_bloom: false,
            max_forced_mulligans: 6,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    /// Set the backstage limit.
    #[must_use]
    pub fn with_max_backstage(mut self, max: usize) -> Self {
        self.max_backstage = max;
        self
    }

    /// Allow or forbid blooming on a player's first turn.
    #[must_use]
    pub fn with_first_turn_bloom(mut self, allowed: bool) -> Self {
        self.allow_first_turn_bloom = allowed;
        self
    }
}

/// One line of a deck list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card_id: CardId,
    pub count: u32,
}

impl DeckEntry {
    pub fn new(card_id: impl Into<CardId>, count: u32) -> Self {
        Self {
            card_id: card_id.into(),
            count,
        }
    }
}

/// A player's identity and decks as supplied by the room layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub player_id: String,
    pub username: String,
    pub oshi_id: CardId,
    pub deck: Vec<DeckEntry>,
    pub cheer_deck: Vec<DeckEntry>,
}

impl PlayerSetup {
    pub fn new(player_id: impl Into<String>, oshi_id: impl Into<CardId>) -> Self {
        let player_id = player_id.into();
        Self {
            username: player_id.clone(),
            player_id,
            oshi_id: oshi_id.into(),
            deck: Vec::new(),
            cheer_deck: Vec::new(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Append cards to the main deck, in order.
    #[must_use]
    pub fn with_deck_cards(mut self, card_id: impl Into<CardId>, count: u32) -> Self {
        self.deck.push(DeckEntry::new(card_id, count));
        self
    }

    /// Append cards to the cheer deck, in order.
    #[must_use]
    pub fn with_cheer_cards(mut self, card_id: impl Into<CardId>, count: u32) -> Self {
        self.cheer_deck.push(DeckEntry::new(card_id, count));
        self
    }

    /// Total main deck size.
    #[must_use]
    pub fn deck_size(&self) -> u32 {
        self.deck.iter().map(|e| e.count).sum()
    }
}
