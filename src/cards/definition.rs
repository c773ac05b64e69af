//! Card definitions: static, catalog-supplied card data.
//!
//! A `CardDefinition` describes everything printed on a card: type, colors,
//! HP, arts, and the declarative effect lists for bloom, collab, gifts,
//! passives, oshi skills and supports. Definitions are pure data; all
//! behavior lives in the effect resolver.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::effects::{Condition, Effect, LimitScope, Modifier, UsageLimit};

/// Catalog identifier shared by all copies of a card (e.g. `hBP01-077`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub String);

impl CardId {
    /// Borrow the id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Printed card type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Oshi,
    HolomemDebut,
    HolomemBloom,
    HolomemSpot,
    Support,
    Cheer,
}

impl CardType {
    /// Holomem cards of any kind.
    #[must_use]
    pub fn is_holomem(self) -> bool {
        matches!(self, Self::HolomemDebut | Self::HolomemBloom | Self::HolomemSpot)
    }
}

/// Card and cheer colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Green,
    Red,
    Blue,
    Purple,
    Yellow,
}

/// Color requirement in an art cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostColor {
    /// Paid by cheer of any color.
    Any,
    #[serde(untagged)]
    Exact(Color),
}

/// One cheer requirement of an art.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheerCost {
    pub color: CostColor,
    #[serde(default = "one")]
    pub amount: u32,
}

fn one() -> u32 {
    1
}

/// An art printed on a holomem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtDefinition {
    pub art_id: String,
    pub power: u32,
    #[serde(default)]
    pub costs: SmallVec<[CheerCost; 3]>,
    #[serde(default)]
    pub art_effects: Vec<Effect>,
}

/// When a gift fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftTiming {
    /// Owner's reset step.
    TurnStart,
    /// Owner enters the performance step.
    PerformanceStepStart,
    /// After this holomem's art has dealt damage.
    AfterArt,
}

/// Where the gift holder must be for the gift to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftLocation {
    Center,
    Collab,
    Stage,
}

/// A triggered ability on a holomem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gift {
    pub timing: GiftTiming,
    #[serde(default = "stage")]
    pub location: GiftLocation,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub limit: Option<UsageLimit>,
}

fn stage() -> GiftLocation {
    GiftLocation::Stage
}

/// Which holomems a passive modifier applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum PassiveScope {
    /// The passive holder itself.
    This,
    /// The owner's center holomem.
    OwnCenter,
    /// Owner's stage holomems carrying a tag.
    OwnStageWithTag { tag: String },
}

/// A continuous modifier active while the holder is on stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Passive {
    pub modifier: Modifier,
    pub applies_to: PassiveScope,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// When an oshi skill can be activated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTiming {
    /// Offered as a main step action.
    #[default]
    MainStep,
    /// Offered to the owner when one of their holomems is about to take
    /// damage. The damaged holomem is the subject of target predicates.
    OwnHolomemDamaged,
}

/// An activated oshi ability paid with holopower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OshiSkill {
    pub skill_id: String,
    pub holopower_cost: u32,
    pub limit: LimitScope,
    #[serde(default)]
    pub timing: SkillTiming,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub effects: Vec<Effect>,
}

/// Support card sub type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportType {
    Staff,
    Item,
    Event,
    Tool,
    Mascot,
    Fan,
}

impl SupportType {
    /// Tools, mascots and fans stay attached to a holomem after play.
    #[must_use]
    pub fn attaches(self) -> bool {
        matches!(self, Self::Tool | Self::Mascot | Self::Fan)
    }
}

/// Support-specific data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportInfo {
    pub sub_type: SupportType,
    #[serde(default)]
    pub limited: bool,
    #[serde(default)]
    pub play_conditions: Vec<Condition>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Modifiers granted to the holomem this card is attached to.
    #[serde(default)]
    pub attached_modifiers: Vec<Modifier>,
    /// Attaching cards only go on a holomem with this name.
    #[serde(default)]
    pub attach_to_name: Option<String>,
}

/// Static definition of one catalog card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub card_id: CardId,
    pub card_type: CardType,
    #[serde(default)]
    pub card_names: Vec<String>,
    #[serde(default)]
    pub colors: SmallVec<[Color; 2]>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub hp: u32,
    /// Life cards dealt at setup (oshi only).
    #[serde(default)]
    pub life: u32,
    #[serde(default)]
    pub bloom_level: u8,
    #[serde(default)]
    pub buzz: bool,
    #[serde(default)]
    pub down_life_cost: Option<u32>,
    #[serde(default)]
    pub baton_cost: u32,
    #[serde(default)]
    pub arts: Vec<ArtDefinition>,
    #[serde(default)]
    pub bloom_effects: Vec<Effect>,
    #[serde(default)]
    pub collab_effects: Vec<Effect>,
    #[serde(default)]
    pub gifts: Vec<Gift>,
    #[serde(default)]
    pub passives: Vec<Passive>,
    #[serde(default)]
    pub oshi_skills: Vec<OshiSkill>,
    #[serde(default)]
    pub support: Option<SupportInfo>,
}

impl CardDefinition {
    /// Minimal definition of the given type. Mostly useful for tests and
    /// for building catalogs in code.
    pub fn new(card_id: impl Into<CardId>, card_type: CardType) -> Self {
        Self {
            card_id: card_id.into(),
            card_type,
            card_names: Vec::new(),
            colors: SmallVec::new(),
            tags: Vec::new(),
            rarity: String::new(),
            hp: 0,
            life: 0,
            bloom_level: 0,
            buzz: false,
            down_life_cost: None,
            baton_cost: 0,
            arts: Vec::new(),
            bloom_effects: Vec::new(),
            collab_effects: Vec::new(),
            gifts: Vec::new(),
            passives: Vec::new(),
            oshi_skills: Vec::new(),
            support: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.card_names.push(name.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.colors.push(color);
        self
    }

    #[must_use]
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp;
        self
    }

    #[must_use]
    pub fn with_art(mut self, art: ArtDefinition) -> Self {
        self.arts.push(art);
        self
    }

    /// Whether this card is a holomem of any kind.
    #[must_use]
    pub fn is_holomem(&self) -> bool {
        self.card_type.is_holomem()
    }

    /// Life cards lost when this holomem is downed.
    #[must_use]
    pub fn life_cost_on_down(&self) -> u32 {
        self.down_life_cost.unwrap_or(if self.buzz { 2 } else { 1 })
    }

    /// Whether the two cards share at least one name.
    #[must_use]
    pub fn shares_name_with(&self, other: &CardDefinition) -> bool {
        self.card_names.iter().any(|n| other.card_names.contains(n))
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    #[must_use]
    pub fn has_color(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    /// Look up an art by id.
    #[must_use]
    pub fn art(&self, art_id: &str) -> Option<&ArtDefinition> {
        self.arts.iter().find(|a| a.art_id == art_id)
    }

    /// Look up an oshi skill by id.
    #[must_use]
    pub fn oshi_skill(&self, skill_id: &str) -> Option<&OshiSkill> {
        self.oshi_skills.iter().find(|s| s.skill_id == skill_id)
    }

    /// Whether this card carries `name`.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.card_names.iter().any(|n| n == name)
    }

    /// Whether this is a support card that is limited.
    #[must_use]
    pub fn is_limited_support(&self) -> bool {
        self.support.as_ref().is_some_and(|s| s.limited)
    }
}
