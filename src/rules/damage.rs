//! Damage & lifecycle.
//!
//! A holomem is downed iff its damage reaches its current HP. Life-loss
//! prevention only changes what the down costs, never whether it happens.
//!
//! ## Modifier order
//!
//! Modifiers on a holomem are collected in a fixed order, and boosts are
//! emitted in that order:
//!
//! 1. Turn modifiers added by effects, oldest first
//! 2. Attached support modifiers, in attach order
//! 3. Passives of own stage holomems (center, collab, backstage)
//!
//! ## Reactions
//!
//! Damage from arts and effects goes through `incoming`. When the defender
//! has a reactive oshi skill that can answer it, the damage is parked as a
//! `Step::Damage` and the defender is asked first.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cards::PassiveScope;
use crate::core::{GameOverReason, GameState, InstanceId, InvariantViolation, PlayerId};
use crate::effects::{
    ConditionEvaluator, Effect, EffectContext, EffectKind, EffectTrigger, ModifierKind, Resume, Step,
};
use crate::events::{BoostSource, Decision, EventKind};
use crate::zones::{AttachKind, Location, ZoneKind, ZonePosition};

use super::legality::Legality;

/// One damage application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRequest {
    pub source: Option<InstanceId>,
    pub target: InstanceId,
    pub amount: u32,
    /// Ignores damage reduction.
    pub special: bool,
    /// The down, if any, costs no life.
    pub prevent_life_loss: bool,
}

/// A modifier contribution with its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedModifier {
    pub amount: u32,
    pub source: BoostSource,
    pub source_id: InstanceId,
}

/// Damage, healing, HP and downs.
pub struct DamageResolver;

impl DamageResolver {
    /// Every modifier of `kind` currently applying to `holomem`, in order.
    pub fn modifiers(
        state: &GameState,
        holomem: InstanceId,
        kind: ModifierKind,
    ) -> Result<Vec<AppliedModifier>, InvariantViolation> {
        let mut applied: Vec<AppliedModifier> = state
            .modifiers
            .iter()
            .filter(|m| m.target == holomem && m.modifier.kind == kind)
            .map(|m| AppliedModifier {
                amount: m.modifier.amount,
                source: BoostSource::TurnModifier,
                source_id: m.source,
            })
            .collect();

        for &support in state.zones.attached(holomem, AttachKind::Support) {
            if let Some(info) = &state.definition(support)?.support {
                applied.extend(
                    info.attached_modifiers
                        .iter()
                        .filter(|m| m.kind == kind)
                        .map(|m| AppliedModifier {
                            amount: m.amount,
                            source: BoostSource::Support,
                            source_id: support,
                        }),
                );
            }
        }

        let owner = state.card(holomem)?.owner;
        if !state.zones.is_on_stage(holomem) {
            return Ok(applied);
        }
        let subject = state.definition(holomem)?;
        for holder in state.zones.stage(owner) {
            for passive in &state.definition(holder)?.passives {
                if passive.modifier.kind != kind {
                    continue;
                }
                let applies = match &passive.applies_to {
                    PassiveScope::This => holder == holomem,
                    PassiveScope::OwnCenter => state.center(owner) == Some(holomem),
                    PassiveScope::OwnStageWithTag { tag } => subject.has_tag(tag),
                };
                if !applies {
                    continue;
                }
                let mut ctx = EffectContext::new(owner, holder, EffectTrigger::Passive);
                ctx.performer = Some(holomem);
                if ConditionEvaluator::all_met(state, &passive.conditions, &ctx)? {
                    applied.push(AppliedModifier {
                        amount: passive.modifier.amount,
                        source: BoostSource::Passive,
                        source_id: holder,
                    });
                }
            }
        }

        Ok(applied)
    }

    /// Sum of every modifier of `kind` on `holomem`.
    pub fn modifier_total(state: &GameState, holomem: InstanceId, kind: ModifierKind) -> Result<u32, InvariantViolation> {
        Ok(Self::modifiers(state, holomem, kind)?.iter().map(|m| m.amount).sum())
    }

    /// Printed HP plus HP boosts.
    pub fn current_hp(state: &GameState, holomem: InstanceId) -> Result<u32, InvariantViolation> {
        let base = state.definition(holomem)?.hp;
        Ok(base + Self::modifier_total(state, holomem, ModifierKind::HpBoost)?)
    }

    /// Whether a holomem's damage has reached its HP.
    pub fn is_lethal(state: &GameState, holomem: InstanceId) -> Result<bool, InvariantViolation> {
        let damage = state.card(holomem)?.damage;
        Ok(damage > 0 && damage >= Self::current_hp(state, holomem)?)
    }

    /// Deal damage, first offering the defender any reactive oshi skill
    /// that answers it.
    pub fn incoming(state: &mut GameState, req: DamageRequest) -> Result<(), InvariantViolation> {
        if !state.zones.is_on_stage(req.target) {
            debug!(target = %req.target, "damage target is not on stage");
            return Ok(());
        }
        let defender = state.card(req.target)?.owner;
        let reactions = Legality::reactive_skills(state, defender, req.target)?;
        if reactions.is_empty() {
            Self::deal_damage(state, req)?;
            return Ok(());
        }

        debug!(%defender, target = %req.target, amount = req.amount, "offering reactive skills");
        let oshi = state.players[defender].oshi;
        let mut ctx = EffectContext::new(defender, oshi, EffectTrigger::OshiSkill);
        ctx.damaged = Some(req.target);
        let mut options: Vec<Effect> = reactions
            .into_iter()
            .map(|skill_id| Effect::new(EffectKind::UseOshiSkill { skill_id }))
            .collect();
        options.push(Effect::new(EffectKind::Pass));

        state.push_step(Step::Damage { request: req });
        state.post_decision(
            defender,
            Decision::Choice {
                effect_source: oshi,
                options: options.clone(),
            },
            Resume::Choice { ctx, options },
        )
    }

    /// Apply damage. Returns whether the target was downed.
    pub fn deal_damage(state: &mut GameState, req: DamageRequest) -> Result<bool, InvariantViolation> {
        if !state.zones.is_on_stage(req.target) {
            debug!(target = %req.target, "damage target is not on stage");
            return Ok(false);
        }

        // Already lethal: settle the down, the new damage has nothing to hit.
        if Self::is_lethal(state, req.target)? {
            Self::process_down(state, req.target, req.prevent_life_loss)?;
            return Ok(true);
        }

        let hp = Self::current_hp(state, req.target)?;
        let mut amount = req.amount;
        if !req.special {
            let reduction = Self::modifier_total(state, req.target, ModifierKind::DamageReduction)?;
            amount = amount.saturating_sub(reduction);
        }

        let card = state.card_mut(req.target)?;
        card.damage += amount;
        let total_damage = card.damage;
        let target_player = card.owner;
        let died = total_damage >= hp;

        state.emit(EventKind::DamageDealt {
            source_id: req.source,
            target_id: req.target,
            target_player,
            damage: amount,
            special: req.special,
            total_damage,
            died,
        });

        if died {
            Self::process_down(state, req.target, req.prevent_life_loss)?;
        }
        Ok(died)
    }

    /// Remove damage. `None` heals fully.
    pub fn restore_hp(state: &mut GameState, target: InstanceId, amount: Option<u32>) -> Result<(), InvariantViolation> {
        if !state.zones.is_on_stage(target) {
            return Ok(());
        }
        let card = state.card_mut(target)?;
        let healed = amount.map_or(card.damage, |a| a.min(card.damage));
        card.damage -= healed;
        let remaining_damage = card.damage;
        let target_player = card.owner;

        state.emit(EventKind::RestoreHp {
            target_id: target,
            target_player,
            healed,
            remaining_damage,
        });
        Ok(())
    }

    /// Down every stage holomem whose damage has reached its HP.
    pub fn settle_lethal(state: &mut GameState) -> Result<(), InvariantViolation> {
        for player in PlayerId::both() {
            for id in state.zones.stage(player) {
                if state.is_game_over() {
                    return Ok(());
                }
                if state.zones.is_on_stage(id) && Self::is_lethal(state, id)? {
                    debug!(holomem = %id, "settling lethal damage");
                    Self::process_down(state, id, false)?;
                }
            }
        }
        Ok(())
    }

    /// Archive a downed holomem with everything attached, and pay its life
    /// cost.
    fn process_down(state: &mut GameState, target: InstanceId, prevent_life_loss: bool) -> Result<(), InvariantViolation> {
        let owner = state.card(target)?.owner;
        let cost = if prevent_life_loss {
            0
        } else {
            state.definition(target)?.life_cost_on_down()
        };
        let was_center = state.center(owner) == Some(target);
        let archive = Location::zone(owner, ZoneKind::Archive);

        for kind in [AttachKind::Cheer, AttachKind::Support, AttachKind::Stacked] {
            for id in state.zones.attached(target, kind).to_vec() {
                state.move_card(id, archive, ZonePosition::Bottom)?;
            }
        }
        state.move_card(target, archive, ZonePosition::Bottom)?;

        let lost = state
            .zones
            .top_n(Location::zone(owner, ZoneKind::Life), cost as usize);
        let mut lost_refs = Vec::with_capacity(lost.len());
        for &id in &lost {
            state.relocate(id, Location::zone(owner, ZoneKind::Resolving), ZonePosition::Bottom)?;
            lost_refs.push(state.card_ref(id)?);
        }
        let life_remaining = state.count(owner, ZoneKind::Life);

        let life_out = cost > 0 && life_remaining == 0;
        let stage_empty = state.zones.stage(owner).is_empty();
        let game_over = life_out || stage_empty;

        info!(holomem = %target, player = %owner, life_lost = lost.len(), "holomem downed");
        state.emit(EventKind::DownedHolomem {
            target_id: target,
            target_player: owner,
            was_center,
            life_lost: lost.len() as u32,
            life_loss_prevented: prevent_life_loss,
            game_over,
        });
        if !lost.is_empty() {
            state.emit(EventKind::LifeLost {
                player: owner,
                cards: lost_refs,
                life_remaining,
            });
        }

        if game_over {
            let reason = if life_out {
                GameOverReason::LifeZero
            } else {
                GameOverReason::NoHolomemsOnStage
            };
            state.end_game(Some(owner), reason);
            return Ok(());
        }

        if was_center {
            state.push_step(Step::ReplaceCenter { player: owner });
        }
        if !lost.is_empty() {
            state.push_step(Step::LifeCheer { player: owner });
        }
        Ok(())
    }
}
