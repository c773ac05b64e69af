//! Effect descriptors.
//!
//! Effects are the catalog's vocabulary for what a card does. Every card
//! composes the same small set of operations; the resolver interprets them
//! with one exhaustive match, so adding an operation is a change to
//! `EffectKind` that the compiler follows everywhere it matters.
//!
//! ## JSON shape
//!
//! ```json
//! {
//!   "effect_type": "deal_damage",
//!   "amount": 20,
//!   "special": true,
//!   "target": "opponent_backstage",
//!   "conditions": [{ "condition": "stage_has_tag", "tag": "#Promise" }],
//!   "limit": { "id": "hBP01-079-bloom", "per": "once_per_turn" }
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::targeting::{CardFilter, CardSource, HolomemScope};
use crate::cards::Color;

/// One step of a card's effect list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(flatten)]
    pub kind: EffectKind,

    /// All must hold for the effect to apply. Target predicates narrow the
    /// candidate set instead.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Usage limit shared by every card carrying the same id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<UsageLimit>,
}

impl Effect {
    /// Unconditional, unlimited effect.
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            conditions: Vec::new(),
            limit: None,
        }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, id: impl Into<String>, per: LimitScope) -> Self {
        self.limit = Some(UsageLimit { id: id.into(), per });
        self
    }
}

/// How often a limited effect may be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitScope {
    OncePerTurn,
    OncePerGame,
}

impl LimitScope {
    #[must_use]
    pub fn is_per_game(self) -> bool {
        self == Self::OncePerGame
    }
}

/// Usage ledger key and scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageLimit {
    pub id: String,
    pub per: LimitScope,
}

/// Kinds of continuous modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    PowerBoost,
    HpBoost,
    /// Reduces non-special damage taken.
    DamageReduction,
}

/// A modifier and its magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub amount: u32,
}

/// What `power_boost_per_card` counts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "count", rename_all = "snake_case")]
pub enum CountSource {
    /// Cheer attached to the performer, optionally of one color.
    PerformerCheer {
        #[serde(default)]
        color: Option<Color>,
    },
    /// Own stage holomems with a tag.
    StageHolomemsWithTag { tag: String },
    /// Own backstage holomems.
    OwnBackstage,
    /// Cheer cards in the own archive.
    ArchiveCheer,
}

/// Where chosen cards go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardDestination {
    Hand,
    Archive,
    Backstage,
    DeckBottom,
    Holopower,
}

/// What happens to looked-at cards that were not chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainingCards {
    /// Leave them where they are.
    #[default]
    Stay,
    /// Put them on the bottom of the deck in an order the player picks.
    DeckBottom,
    /// Shuffle the deck.
    Shuffle,
    Archive,
}

/// Where `send_cheer` takes cheer from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheerSource {
    /// Top of the own cheer deck.
    CheerDeck,
    /// Cheer cards in the own archive.
    Archive,
    /// Cheer attached to the effect's source card.
    ThisCard,
    /// Cheer attached to any own stage holomem.
    OwnStage,
}

/// Where an effect takes its bloom card from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloomSource {
    Hand,
    /// Holomems stacked under the effect's source card.
    Stacked,
}

/// The closed set of operations an effect can perform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect_type", rename_all = "snake_case")]
pub enum EffectKind {
    /// Add power to the art in progress.
    PowerBoost { amount: u32 },

    /// Add `amount` per counted card, up to `max` counted cards.
    PowerBoostPerCard {
        amount: u32,
        per: CountSource,
        #[serde(default)]
        max: Option<u32>,
    },

    DealDamage {
        amount: u32,
        #[serde(default)]
        special: bool,
        #[serde(default)]
        prevent_life_loss: bool,
        target: HolomemScope,
    },

    /// Remove damage. `None` heals fully.
    RestoreHp {
        #[serde(default)]
        amount: Option<u32>,
        target: HolomemScope,
    },

    /// Grant a modifier until end of turn.
    AddModifier {
        modifier: Modifier,
        target: HolomemScope,
    },

    Draw {
        amount: u32,
        #[serde(default)]
        opponent: bool,
        #[serde(default)]
        from_bottom: bool,
    },

    /// Bloom a holomem in `target` with a card from `from`. Normal bloom
    /// rules apply except the turn restrictions.
    Bloom { from: BloomSource, target: HolomemScope },

    /// The controller takes another turn after this one.
    ExtraTurn,

    /// Pay for and activate one of the controller's oshi skills.
    UseOshiSkill { skill_id: String },

    ChooseCards {
        from: CardSource,
        to: CardDestination,
        amount_min: u32,
        amount_max: u32,
        #[serde(default)]
        filter: Vec<CardFilter>,
        #[serde(default)]
        remaining: RemainingCards,
        #[serde(default)]
        reveal: bool,
    },

    SendCheer {
        from: CheerSource,
        to: HolomemScope,
        amount_min: u32,
        amount_max: u32,
        #[serde(default)]
        color: Option<Color>,
    },

    ArchiveCheer {
        from: HolomemScope,
        amount: u32,
        #[serde(default)]
        color: Option<Color>,
    },

    GenerateHolopower { amount: u32 },

    ShuffleDeck,

    /// Player picks exactly one option.
    Choice { options: Vec<Effect> },

    Sequence { effects: Vec<Effect> },

    /// Does nothing. Used as the "decline" option of a choice.
    Pass,
}

impl EffectKind {
    /// Wire name of the operation.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PowerBoost { .. } => "power_boost",
            Self::PowerBoostPerCard { .. } => "power_boost_per_card",
            Self::DealDamage { .. } => "deal_damage",
            Self::RestoreHp { .. } => "restore_hp",
            Self::AddModifier { .. } => "add_modifier",
            Self::Draw { .. } => "draw",
            Self::Bloom { .. } => "bloom",
            Self::ExtraTurn => "extra_turn",
            Self::UseOshiSkill { .. } => "use_oshi_skill",
            Self::ChooseCards { .. } => "choose_cards",
            Self::SendCheer { .. } => "send_cheer",
            Self::ArchiveCheer { .. } => "archive_cheer",
            Self::GenerateHolopower { .. } => "generate_holopower",
            Self::ShuffleDeck => "shuffle_deck",
            Self::Choice { .. } => "choice",
            Self::Sequence { .. } => "sequence",
            Self::Pass => "pass",
        }
    }
}
