//! Effect conditions.
//!
//! Conditions are pure predicates over the game state, evaluated from the
//! point of view of the player controlling the effect. Most are global (they
//! gate the whole effect); target predicates are evaluated per candidate and
//! narrow the candidate set instead.

use serde::{Deserialize, Serialize};

use super::continuation::EffectContext;
use crate::cards::Color;
use crate::core::{GameState, InstanceId, InvariantViolation};
use crate::zones::{Location, ZoneKind};

/// A predicate attached to an effect, gift, passive, skill or support.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum Condition {
    // === Target predicates ===
    TargetHasColor { color: Color },
    TargetHasName { name: String },

    // === Performer ===
    /// Performer has cheer of every listed color.
    PerformerHasCheerColors { colors: Vec<Color> },
    /// Performer has cheer of at least one listed color.
    PerformerHasAnyCheerColor { colors: Vec<Color> },

    // === Own side ===
    StageHasTag { tag: String },
    /// Every own stage holomem carries the tag. False on an empty stage.
    AllStageHaveTag { tag: String },
    OshiHasName { name: String },
    LifeAtMost { amount: u32 },
    /// Fewer life cards than the opponent.
    LifeBelowOpponent,
    LifeAtLeast { amount: u32 },
    HolopowerAtLeast { amount: u32 },
    HandAtLeast { amount: u32 },
    ArchiveCheerAtLeast { amount: u32 },

    // === Source card ===
    ThisCardIsCenter,
    ThisCardIsCollab,
    ThisCardBloomLevel { level: u8 },

    // === Turn ===
    /// The controller went second and this is their first turn.
    GoingSecondFirstTurn,
    /// It is not the controller's turn.
    OpponentTurn,
    /// The controller has used this skill or effect id at least once.
    SkillUsedThisGame { skill_id: String },

    /// Two or more single-colored holomems of different colors on the own
    /// stage. Multi-colored holomems do not count.
    MonocolorDifferentColorsOnStage,

    // === Combinators ===
    Not { inner: Box<Condition> },
    AnyOf { conditions: Vec<Condition> },
}

impl Condition {
    /// Whether this condition is evaluated per candidate target.
    #[must_use]
    pub fn is_target_predicate(&self) -> bool {
        match self {
            Self::TargetHasColor { .. } | Self::TargetHasName { .. } => true,
            Self::Not { inner } => inner.is_target_predicate(),
            Self::AnyOf { conditions } => conditions.iter().any(Condition::is_target_predicate),
            _ => false,
        }
    }
}

/// Evaluates conditions against the game state.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// All global conditions hold. Target predicates are ignored.
    pub fn all_met(
        state: &GameState,
        conditions: &[Condition],
        ctx: &EffectContext,
    ) -> Result<bool, InvariantViolation> {
        for condition in conditions.iter().filter(|c| !c.is_target_predicate()) {
            if !Self::evaluate(state, condition, ctx, None)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// All target predicates hold for `subject`.
    pub fn target_matches(
        state: &GameState,
        conditions: &[Condition],
        ctx: &EffectContext,
        subject: InstanceId,
    ) -> Result<bool, InvariantViolation> {
        for condition in conditions.iter().filter(|c| c.is_target_predicate()) {
            if !Self::evaluate(state, condition, ctx, Some(subject))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Evaluate one condition. Target predicates without a subject hold.
    pub fn evaluate(
        state: &GameState,
        condition: &Condition,
        ctx: &EffectContext,
        subject: Option<InstanceId>,
    ) -> Result<bool, InvariantViolation> {
        let player = ctx.player;

        let result = match condition {
            Condition::TargetHasColor { color } => match subject {
                Some(id) => state.definition(id)?.has_color(*color),
                None => true,
            },
            Condition::TargetHasName { name } => match subject {
                Some(id) => state.definition(id)?.has_name(name),
                None => true,
            },

            Condition::PerformerHasCheerColors { colors } => {
                let held = state.attached_cheer_colors(ctx.performer.unwrap_or(ctx.source))?;
                colors.iter().all(|c| held.contains(c))
            }

            Condition::PerformerHasAnyCheerColor { colors } => {
                let held = state.attached_cheer_colors(ctx.performer.unwrap_or(ctx.source))?;
                colors.iter().any(|c| held.contains(c))
            }

            Condition::StageHasTag { tag } => {
                let mut found = false;
                for id in state.zones.stage(player) {
                    if state.definition(id)?.has_tag(tag) {
                        found = true;
                        break;
                    }
                }
                found
            }

            Condition::AllStageHaveTag { tag } => {
                let stage = state.zones.stage(player);
                let mut all = !stage.is_empty();
                for id in stage {
                    if !state.definition(id)?.has_tag(tag) {
                        all = false;
                        break;
                    }
                }
                all
            }

            Condition::OshiHasName { name } => state.definition(state.players[player].oshi)?.has_name(name),

            Condition::LifeAtMost { amount } => state.count(player, ZoneKind::Life) <= *amount as usize,
            Condition::LifeBelowOpponent => {
                state.count(player, ZoneKind::Life) < state.count(player.opponent(), ZoneKind::Life)
            }
            Condition::LifeAtLeast { amount } => state.count(player, ZoneKind::Life) >= *amount as usize,
            Condition::HolopowerAtLeast { amount } => {
                state.count(player, ZoneKind::Holopower) >= *amount as usize
            }
            Condition::HandAtLeast { amount } => state.count(player, ZoneKind::Hand) >= *amount as usize,

            Condition::ArchiveCheerAtLeast { amount } => {
                let mut cheer = 0usize;
                for &id in state.zones.zone(player, ZoneKind::Archive) {
                    if state.definition(id)?.card_type == crate::cards::CardType::Cheer {
                        cheer += 1;
                    }
                }
                cheer >= *amount as usize
            }

            Condition::ThisCardIsCenter => {
                state.zones.location(ctx.source) == Some(Location::zone(player, ZoneKind::Center))
            }
            Condition::ThisCardIsCollab => {
                state.zones.location(ctx.source) == Some(Location::zone(player, ZoneKind::Collab))
            }
            Condition::ThisCardBloomLevel { level } => state.definition(ctx.source)?.bloom_level == *level,

            Condition::GoingSecondFirstTurn => {
                state.first_player.is_some_and(|first| first != player)
                    && state.players[player].turns_taken == 1
                    && state.active_player == player
            }
            Condition::OpponentTurn => state.active_player != player,
            Condition::SkillUsedThisGame { skill_id } => state.players[player].activated.contains(skill_id),

            Condition::MonocolorDifferentColorsOnStage => {
                let mut colors: Vec<Color> = Vec::new();
                for id in state.zones.stage(player) {
                    let def = state.definition(id)?;
                    if let [only] = def.colors.as_slice() {
                        if !colors.contains(only) {
                            colors.push(*only);
                        }
                    }
                }
                colors.len() >= 2
            }

            Condition::Not { inner } => !Self::evaluate(state, inner, ctx, subject)?,

            Condition::AnyOf { conditions } => {
                let mut any = false;
                for c in conditions {
                    if Self::evaluate(state, c, ctx, subject)? {
                        any = true;
                        break;
                    }
                }
                any
            }
        };

        Ok(result)
    }
}
