//! Card system: definitions, instances, and the catalog.
//!
//! ## Key Types
//!
//! - `CardId`: Catalog identifier shared by all copies of a card
//! - `CardDefinition`: Static card data (HP, arts, effect descriptors)
//! - `CardInstance`: Runtime card state (damage, resting, turn markers)
//! - `CardCatalog`: Validated definition lookup, shared across matches

pub mod catalog;
pub mod definition;
pub mod instance;

pub use catalog::CardCatalog;
pub use definition::{
    ArtDefinition, CardDefinition, CardId, CardType, CheerCost, Color, CostColor, Gift,
    GiftLocation, GiftTiming, OshiSkill, Passive, PassiveScope, SkillTiming, SupportInfo, SupportType,
};
pub use instance::{CardInstance, TurnMarker};
