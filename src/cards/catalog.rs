//! Card catalog for definition lookup.
//!
//! The `CardCatalog` holds every card definition known to the server. It is
//! loaded once, validated, and then shared read-only between matches as an
//! `Arc<CardCatalog>`.
//!
//! ## Example
//!
//! ```
//! use holo_rules::cards::{CardCatalog, CardId};
//!
//! let catalog = CardCatalog::from_json(r#"[
//!     { "card_id": "hY01-001", "card_type": "cheer", "colors": ["white"] }
//! ]"#).unwrap();
//!
//! assert!(catalog.get(&CardId::from("hY01-001")).is_some());
//! ```

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId, CardType};
use crate::core::{CatalogError, InvariantViolation};

/// Validated, read-only card definitions.
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<CardId, CardDefinition>,
}

impl CardCatalog {
    /// Parse a JSON array of card definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<CardDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(definitions)
    }

    /// Build from already parsed definitions.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = CardDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut cards = FxHashMap::default();
        for def in definitions {
            validate(&def)?;
            if cards.contains_key(&def.card_id) {
                return Err(CatalogError::Duplicate(def.card_id));
            }
            cards.insert(def.card_id.clone(), def);
        }
        Ok(Self { cards })
    }

    /// Get a card definition by id.
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&CardDefinition> {
        self.cards.get(id)
    }

    /// Get a card definition that must exist during play.
    pub fn require(&self, id: &CardId) -> Result<&CardDefinition, InvariantViolation> {
        self.cards
            .get(id)
            .ok_or_else(|| InvariantViolation::UnknownCard(id.clone()))
    }

    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }
}

fn validate(def: &CardDefinition) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::Invalid {
        card: def.card_id.clone(),
        reason: reason.to_string(),
    };

    if def.is_holomem() && def.hp == 0 {
        return Err(invalid("holomem without hp"));
    }
    if def.card_type == CardType::Oshi && def.life == 0 {
        return Err(invalid("oshi without life"));
    }
    if def.card_type == CardType::Support && def.support.is_none() {
        return Err(invalid("support card without support data"));
    }
    if def.card_type == CardType::Cheer && def.colors.len() != 1 {
        return Err(invalid("cheer must have exactly one color"));
    }
    if def.arts.iter().any(|a| a.art_id.is_empty()) {
        return Err(invalid("art without id"));
    }
    Ok(())
}
