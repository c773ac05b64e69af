//! Target scopes, card sources and filters.
//!
//! An effect names an implicit scope ("opponent's center", "top 4 of deck");
//! the selector turns that into concrete instance ids. Condition target
//! predicates and card filters then narrow the set.

use serde::{Deserialize, Serialize};

use super::continuation::EffectContext;
use crate::cards::{CardDefinition, CardType, Color};
use crate::core::{GameState, InstanceId, InvariantViolation, PlayerId};
use crate::zones::{AttachKind, ZoneKind};

/// Holomems an effect can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolomemScope {
    OpponentCenter,
    OpponentCollab,
    OpponentCenterOrCollab,
    OpponentBackstage,
    OpponentStage,
    OwnCenter,
    OwnCollab,
    OwnBackstage,
    OwnStage,
    /// The card whose effect is resolving.
    ThisCard,
    /// The holomem using the current art.
    Performer,
    /// The target of the current art.
    ArtTarget,
    /// The own holomem about to take damage, for reactive skills.
    DamagedHolomem,
}

/// Card pools an effect can look at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CardSource {
    /// The whole own deck.
    Deck,
    /// The top `count` cards of the own deck.
    DeckTop { count: u32 },
    Archive,
    Hand,
    Holopower,
    CheerDeck,
    /// Cheer attached to holomems in a scope.
    AttachedCheer { holder: HolomemScope },
}

impl CardSource {
    /// Sources drawn from the deck. These show the player what they looked
    /// at even when nothing can be chosen.
    #[must_use]
    pub fn is_deck(self) -> bool {
        matches!(self, Self::Deck | Self::DeckTop { .. })
    }

    /// Zone the cards come from, for visibility. Attached cheer is public.
    #[must_use]
    pub fn zone(self) -> Option<ZoneKind> {
        match self {
            Self::Deck | Self::DeckTop { .. } => Some(ZoneKind::Deck),
            Self::Archive => Some(ZoneKind::Archive),
            Self::Hand => Some(ZoneKind::Hand),
            Self::Holopower => Some(ZoneKind::Holopower),
            Self::CheerDeck => Some(ZoneKind::CheerDeck),
            Self::AttachedCheer { .. } => None,
        }
    }
}

/// Restriction on which looked-at cards may be chosen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum CardFilter {
    CardType { card_type: CardType },
    Tag { tag: String },
    Name { name: String },
    Color { color: Color },
    BloomLevel { level: u8 },
    /// Any holomem card.
    Holomem,
    /// Excludes limited supports.
    NotLimited,
}

impl CardFilter {
    #[must_use]
    pub fn matches(&self, def: &CardDefinition) -> bool {
        match self {
            Self::CardType { card_type } => def.card_type == *card_type,
            Self::Tag { tag } => def.has_tag(tag),
            Self::Name { name } => def.has_name(name),
            Self::Color { color } => def.has_color(*color),
            Self::BloomLevel { level } => def.is_holomem() && def.bloom_level == *level,
            Self::Holomem => def.is_holomem(),
            Self::NotLimited => !def.is_limited_support(),
        }
    }
}

/// Computes candidate sets.
pub struct TargetSelector;

impl TargetSelector {
    /// Holomems in `scope`, from the controller's point of view.
    pub fn holomems(state: &GameState, scope: HolomemScope, ctx: &EffectContext) -> Vec<InstanceId> {
        let own = ctx.player;
        let opp = own.opponent();
        let zone = |p: PlayerId, z: ZoneKind| state.zones.zone(p, z).to_vec();
        let if_on_stage = |id: Option<InstanceId>| {
            id.filter(|&i| state.zones.is_on_stage(i)).into_iter().collect::<Vec<_>>()
        };

        match scope {
            HolomemScope::OpponentCenter => zone(opp, ZoneKind::Center),
            HolomemScope::OpponentCollab => zone(opp, ZoneKind::Collab),
            HolomemScope::OpponentCenterOrCollab => {
                let mut ids = zone(opp, ZoneKind::Center);
                ids.extend(zone(opp, ZoneKind::Collab));
                ids
            }
            HolomemScope::OpponentBackstage => zone(opp, ZoneKind::Backstage),
            HolomemScope::OpponentStage => state.zones.stage(opp),
            HolomemScope::OwnCenter => zone(own, ZoneKind::Center),
            HolomemScope::OwnCollab => zone(own, ZoneKind::Collab),
            HolomemScope::OwnBackstage => zone(own, ZoneKind::Backstage),
            HolomemScope::OwnStage => state.zones.stage(own),
            HolomemScope::ThisCard => if_on_stage(Some(ctx.source)),
            HolomemScope::Performer => if_on_stage(ctx.performer),
            HolomemScope::ArtTarget => if_on_stage(ctx.art_target),
            HolomemScope::DamagedHolomem => if_on_stage(ctx.damaged),
        }
    }

    /// Cards looked at from `source`, top first where order matters.
    pub fn cards(state: &GameState, source: CardSource, ctx: &EffectContext) -> Vec<InstanceId> {
        let own = ctx.player;
        match source {
            CardSource::Deck => state.zones.zone(own, ZoneKind::Deck).to_vec(),
            CardSource::DeckTop { count } => state
                .zones
                .top_n(crate::zones::Location::zone(own, ZoneKind::Deck), count as usize),
            CardSource::Archive => state.zones.zone(own, ZoneKind::Archive).to_vec(),
            CardSource::Hand => state.zones.zone(own, ZoneKind::Hand).to_vec(),
            CardSource::Holopower => state.zones.zone(own, ZoneKind::Holopower).to_vec(),
            CardSource::CheerDeck => state.zones.zone(own, ZoneKind::CheerDeck).to_vec(),
            CardSource::AttachedCheer { holder } => Self::holomems(state, holder, ctx)
                .into_iter()
                .flat_map(|h| state.zones.attached(h, AttachKind::Cheer).iter().copied())
                .collect(),
        }
    }

    /// Keep the cards that pass every filter.
    pub fn filter_cards(
        state: &GameState,
        cards: &[InstanceId],
        filters: &[CardFilter],
    ) -> Result<Vec<InstanceId>, InvariantViolation> {
        let mut kept = Vec::with_capacity(cards.len());
        for &id in cards {
            let def = state.definition(id)?;
            if filters.iter().all(|f| f.matches(def)) {
                kept.push(id);
            }
        }
        Ok(kept)
    }
}
