//! Legal action enumeration.
//!
//! The main and performance decisions carry the complete list of legal
//! actions. Intake only accepts an action that one of them permits, so every
//! rule about what may be played lives here.

use smallvec::SmallVec;

use crate::cards::{CardDefinition, CardType, CheerCost, Color, CostColor, SkillTiming, TurnMarker};
use crate::core::{GameState, InstanceId, InvariantViolation, PlayerId};
use crate::effects::{ConditionEvaluator, Effect, EffectContext, EffectKind, EffectResolver, EffectTrigger, TargetSelector};
use crate::events::{AvailableAction, AvailablePerformance};
use crate::zones::{AttachKind, ZoneKind};

/// Computes legal actions for the active player.
pub struct Legality;

impl Legality {
    /// Every main step action the active player may take.
    pub fn main_actions(state: &GameState) -> Result<Vec<AvailableAction>, InvariantViolation> {
        let player = state.active_player;
        let me = &state.players[player];
        let hand = state.zones.zone(player, ZoneKind::Hand);
        let backstage = state.zones.zone(player, ZoneKind::Backstage);
        let first_turn_of_first = state.is_first_turn_of_first_player();
        let mut actions = Vec::new();

        // Place
        if backstage.len() < state.config.max_backstage {
            for &id in hand {
                let card_type = state.definition(id)?.card_type;
                if matches!(card_type, CardType::HolomemDebut | CardType::HolomemSpot) {
                    actions.push(AvailableAction::MainStepPlaceHolomem { card_id: id });
                }
            }
        }

        // Bloom
        if me.turns_taken > 1 || state.config.allow_first_turn_bloom {
            let stage = state.zones.stage(player);
            for &id in hand {
                let bloom = state.definition(id)?;
                if bloom.card_type != CardType::HolomemBloom {
                    continue;
                }
                for &target in &stage {
                    if Self::can_bloom(state, bloom, target)? {
                        actions.push(AvailableAction::MainStepBloom {
                            card_id: id,
                            target_id: target,
                        });
                    }
                }
            }
        }

        // Collab
        let deck = state.count(player, ZoneKind::Deck);
        if !me.collabed_this_turn && state.collab(player).is_none() && deck >= state.config.holopower_per_collab {
            for &id in backstage {
                if !state.card(id)?.resting {
                    actions.push(AvailableAction::MainStepCollab { card_id: id });
                }
            }
        }

        // Baton pass
        if let Some(center) = state.center(player) {
            let cost = state.definition(center)?.baton_cost;
            let cheer = state.zones.attached(center, AttachKind::Cheer).len();
            if !me.baton_passed_this_turn && cheer >= cost as usize {
                for &id in backstage {
                    if !state.card(id)?.resting {
                        actions.push(AvailableAction::MainStepBatonPass { card_id: id, cost });
                    }
                }
            }
        }

        // Oshi skills
        let oshi = me.oshi;
        let holopower = state.count(player, ZoneKind::Holopower);
        for skill in &state.definition(oshi)?.oshi_skills {
            if skill.timing != SkillTiming::MainStep
                || me.has_used(&skill.skill_id, skill.limit.is_per_game())
                || holopower < skill.holopower_cost as usize
            {
                continue;
            }
            let ctx = EffectContext::new(player, oshi, EffectTrigger::OshiSkill);
            if ConditionEvaluator::all_met(state, &skill.conditions, &ctx)? && Self::has_targets(state, &skill.effects, &ctx)? {
                actions.push(AvailableAction::MainStepOshiSkill {
                    skill_id: skill.skill_id.clone(),
                    cost: skill.holopower_cost,
                });
            }
        }

        // Supports
        for &id in hand {
            let def = state.definition(id)?;
            let Some(support) = &def.support else {
                continue;
            };
            if support.limited && (me.limited_played_this_turn || first_turn_of_first) {
                continue;
            }
            if support.sub_type.attaches() && Self::attach_targets(state, player, id)?.is_empty() {
                continue;
            }
            let ctx = EffectContext::new(player, id, EffectTrigger::Support);
            if ConditionEvaluator::all_met(state, &support.play_conditions, &ctx)?
                && Self::has_targets(state, &support.effects, &ctx)?
            {
                actions.push(AvailableAction::MainStepPlaySupport { card_id: id });
            }
        }

        if !(first_turn_of_first && state.config.first_player_skips_performance) {
            actions.push(AvailableAction::MainStepBeginPerformance);
        }
        actions.push(AvailableAction::MainStepEndTurn);
        Ok(actions)
    }

    /// Every art the active player may use, plus ending the turn.
    pub fn performance_actions(state: &GameState) -> Result<Vec<AvailablePerformance>, InvariantViolation> {
        let player = state.active_player;
        let targets = Self::art_targets(state, player);
        let mut actions = Vec::new();

        if !targets.is_empty() {
            let performers = [state.center(player), state.collab(player)];
            for performer in performers.into_iter().flatten() {
                let card = state.card(performer)?;
                if card.resting || card.has_marker(TurnMarker::UsedArt) {
                    continue;
                }
                let held = state.attached_cheer_colors(performer)?;
                for art in &state.definition(performer)?.arts {
                    if can_pay(&held, &art.costs) {
                        actions.push(AvailablePerformance::PerformanceStepUseArt {
                            performer_id: performer,
                            art_id: art.art_id.clone(),
                            power: art.power,
                            valid_targets: targets.clone(),
                        });
                    }
                }
            }
        }

        actions.push(AvailablePerformance::PerformanceStepEndTurn);
        Ok(actions)
    }

    /// Opponent holomems an art may target: center and collab.
    #[must_use]
    pub fn art_targets(state: &GameState, player: PlayerId) -> Vec<InstanceId> {
        let opponent = player.opponent();
        [state.center(opponent), state.collab(opponent)].into_iter().flatten().collect()
    }

    /// Own stage holomems an attaching support may go on.
    pub fn attach_targets(
        state: &GameState,
        player: PlayerId,
        support: InstanceId,
    ) -> Result<Vec<InstanceId>, InvariantViolation> {
        let stage = state.zones.stage(player);
        let Some(name) = state.definition(support)?.support.as_ref().and_then(|s| s.attach_to_name.as_deref()) else {
            return Ok(stage);
        };
        let mut targets = Vec::with_capacity(stage.len());
        for id in stage {
            if state.definition(id)?.has_name(name) {
                targets.push(id);
            }
        }
        Ok(targets)
    }

    /// Reactive oshi skills `defender` may use before `target` takes damage.
    pub fn reactive_skills(
        state: &GameState,
        defender: PlayerId,
        target: InstanceId,
    ) -> Result<Vec<String>, InvariantViolation> {
        let me = &state.players[defender];
        let holopower = state.count(defender, ZoneKind::Holopower);
        let mut ctx = EffectContext::new(defender, me.oshi, EffectTrigger::OshiSkill);
        ctx.damaged = Some(target);

        let mut usable = Vec::new();
        for skill in &state.definition(me.oshi)?.oshi_skills {
            if skill.timing != SkillTiming::OwnHolomemDamaged
                || me.has_used(&skill.skill_id, skill.limit.is_per_game())
                || holopower < skill.holopower_cost as usize
            {
                continue;
            }
            if ConditionEvaluator::all_met(state, &skill.conditions, &ctx)?
                && ConditionEvaluator::target_matches(state, &skill.conditions, &ctx, target)?
            {
                usable.push(skill.skill_id.clone());
            }
        }
        Ok(usable)
    }

    fn can_bloom(state: &GameState, bloom: &CardDefinition, target: InstanceId) -> Result<bool, InvariantViolation> {
        if state.card(target)?.has_marker(TurnMarker::EnteredStage) {
            return Ok(false);
        }
        Self::bloom_fits(state, bloom, target)
    }

    /// Level, name and HP rules of a bloom, once per holomem per turn.
    /// Effect blooms skip the entered-this-turn and first-turn rules.
    pub fn bloom_fits(state: &GameState, bloom: &CardDefinition, target: InstanceId) -> Result<bool, InvariantViolation> {
        let card = state.card(target)?;
        if card.has_marker(TurnMarker::Bloomed) {
            return Ok(false);
        }
        let current = state.definition(target)?;
        let level_ok = match current.card_type {
            CardType::HolomemDebut => bloom.bloom_level == 1,
            CardType::HolomemBloom => {
                bloom.bloom_level == current.bloom_level || bloom.bloom_level == current.bloom_level + 1
            }
            _ => false,
        };
        Ok(level_ok && bloom.shares_name_with(current) && bloom.hp > card.damage)
    }

    /// Whether an effect list can start. A list opening with a mandatory
    /// targeted operation needs at least one candidate.
    fn has_targets(state: &GameState, effects: &[Effect], ctx: &EffectContext) -> Result<bool, InvariantViolation> {
        let Some(first) = effects.first() else {
            return Ok(true);
        };
        if !ConditionEvaluator::all_met(state, &first.conditions, ctx)? {
            return Ok(true);
        }
        match &first.kind {
            EffectKind::DealDamage { target, .. } | EffectKind::RestoreHp { target, .. } => {
                Ok(!EffectResolver::holomem_candidates(state, *target, &first.conditions, ctx)?.is_empty())
            }
            EffectKind::ChooseCards {
                from,
                amount_min,
                filter,
                ..
            } if *amount_min > 0 && !from.is_deck() => {
                let looked = TargetSelector::cards(state, *from, ctx);
                Ok(!TargetSelector::filter_cards(state, &looked, filter)?.is_empty())
            }
            _ => Ok(true),
        }
    }
}

/// Whether attached cheer colors cover an art's costs. Colored costs are
/// matched first; `any` costs take whatever is left.
#[must_use]
pub fn can_pay(held: &[Color], costs: &[CheerCost]) -> bool {
    let mut pool: SmallVec<[Color; 8]> = held.iter().copied().collect();
    let mut any = 0usize;

    for cost in costs {
        match cost.color {
            CostColor::Any => any += cost.amount as usize,
            CostColor::Exact(color) => {
                for _ in 0..cost.amount {
                    match pool.iter().position(|c| *c == color) {
                        Some(i) => {
                            pool.swap_remove(i);
                        }
                        None => return false,
                    }
                }
            }
        }
    }
    pool.len() >= any
}
