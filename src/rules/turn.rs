//! Turn/phase state machine.
//!
//! `TurnMachine::run` drives the resolution stack until a decision is pending
//! or the game ends. Steps push their successor first and their own sub-work
//! on top, so the stack always reads as "what happens next".
//!
//! ```text
//! StartTurn ─► Reset ─► Draw ─► Cheer ─► Main ⇄ (actions) ─► Performance ─► End ─┐
//!     ▲                                                                           │
//!     └───────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use crate::cards::{CardType, GiftLocation, GiftTiming, TurnMarker};
use crate::core::{
    ActionError, ArtInProgress, EngineError, GameAction, GameOverReason, GameState, InstanceId, InvariantViolation,
    Phase, PlayerId,
};
use crate::effects::{
    validate_selection, Effect, EffectContext, EffectKind, EffectResolver, EffectTrigger, Frame, HolomemPurpose,
    ModifierKind, PendingDecision, Resume, Step,
};
use crate::events::{AvailableAction, BoostedStat, Decision, EventKind};
use crate::zones::{AttachKind, Location, ZoneKind, ZonePosition};

use super::damage::{DamageRequest, DamageResolver};
use super::legality::Legality;
use super::setup::Setup;

pub struct TurnMachine;

impl TurnMachine {
    /// Resolve until input is needed or the game is over.
    pub fn run(state: &mut GameState) -> Result<(), InvariantViolation> {
        loop {
            if state.is_game_over() || state.pending.is_some() {
                return Ok(());
            }
            DamageResolver::settle_lethal(state)?;
            if state.is_game_over() {
                return Ok(());
            }

            match state.stack.pop() {
                Some(Frame::Effects { queue, ctx }) => EffectResolver::step(state, queue, ctx)?,
                Some(Frame::Step { step }) => Self::execute_step(state, step)?,
                None => {
                    if !Self::on_idle(state)? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Route an answer to whatever posted the decision.
    pub fn resume(state: &mut GameState, pending: PendingDecision, action: &GameAction) -> Result<(), EngineError> {
        let PendingDecision {
            player,
            decision,
            resume,
            ..
        } = pending;

        match resume {
            Resume::FirstPlayerChoice | Resume::Mulligan { .. } | Resume::InitialPlacement { .. } => {
                Setup::resume(state, player, resume, action)
            }
            Resume::MainStep => Self::main_action(state, &decision, action),
            Resume::PerformanceStep => Self::performance_action(state, &decision, action),
            Resume::NewCenter { player: owner, candidates } => match action {
                GameAction::EffectResolutionChooseCardsForEffect { card_ids } => {
                    validate_selection(card_ids, &candidates, 1, 1)?;
                    state.move_card(card_ids[0], Location::zone(owner, ZoneKind::Center), ZonePosition::Bottom)?;
                    Ok(())
                }
                other => Err(ActionError::UnexpectedAction(other.action_type()).into()),
            },
            other => EffectResolver::resume(state, player, other, action),
        }
    }

    /// Nothing left on the stack: ask the active player for their next move.
    /// Returns whether anything changed.
    fn on_idle(state: &mut GameState) -> Result<bool, InvariantViolation> {
        let player = state.active_player;
        match state.phase {
            Phase::Main => {
                let available_actions = Legality::main_actions(state)?;
                state.post_decision(player, Decision::MainStep { available_actions }, Resume::MainStep)?;
                Ok(true)
            }
            Phase::Performance => {
                let available_actions = Legality::performance_actions(state)?;
                if available_actions.len() == 1 {
                    debug!(%player, "no usable arts");
                    state.push_step(Step::EndTurn);
                } else {
                    state.post_decision(player, Decision::PerformanceStep { available_actions }, Resume::PerformanceStep)?;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn execute_step(state: &mut GameState, step: Step) -> Result<(), InvariantViolation> {
        debug!(?step, "step");
        match step {
            Step::StartTurn => Self::start_turn(state),
            Step::ResetStep => Self::reset_step(state),
            Step::DrawStep => Self::draw_step(state),
            Step::CheerStep => Self::cheer_step(state),
            Step::EnterMain => {
                Self::enter_phase(state, Phase::Main);
                Ok(())
            }
            Step::EnterPerformance => {
                Self::enter_phase(state, Phase::Performance);
                let player = state.active_player;
                Self::fire_gifts(state, player, GiftTiming::PerformanceStepStart)
            }
            Step::ArtDamage {
                performer,
                target,
                art_id,
            } => Self::art_damage(state, performer, target, &art_id),
            Step::AfterArt { performer } => {
                if state.zones.is_on_stage(performer) {
                    Self::fire_gifts_of(state, performer, GiftTiming::AfterArt)?;
                }
                state.art = None;
                Ok(())
            }
            Step::EndTurn => {
                Self::enter_phase(state, Phase::End);
                state.modifiers.clear();
                state.art = None;
                state.push_step(Step::StartTurn);
                Ok(())
            }
            Step::Damage { request } => {
                DamageResolver::deal_damage(state, request)?;
                Ok(())
            }
            Step::AttachSupport { card } => {
                let player = state.card(card)?.owner;
                let candidates = Legality::attach_targets(state, player, card)?;
                if candidates.is_empty() {
                    state.move_card(card, Location::zone(player, ZoneKind::Archive), ZonePosition::Bottom)?;
                    return Ok(());
                }
                let ctx = EffectContext::new(player, card, EffectTrigger::Support);
                EffectResolver::offer_holomem(state, &ctx, HolomemPurpose::AttachSupport { card }, candidates)
            }
            Step::FinishSupport { card } => {
                let player = state.card(card)?.owner;
                if state.zones.location(card) == Some(Location::zone(player, ZoneKind::Resolving)) {
                    state.move_card(card, Location::zone(player, ZoneKind::Archive), ZonePosition::Bottom)?;
                }
                Ok(())
            }
            Step::LifeCheer { player } => Self::life_cheer(state, player),
            Step::ReplaceCenter { player } => Self::replace_center(state, player),
        }
    }

    fn enter_phase(state: &mut GameState, phase: Phase) {
        state.phase = phase;
        let active_player = state.active_player;
        state.emit(EventKind::PhaseChanged { active_player, phase });
    }

    // === Turn steps ===

    fn start_turn(state: &mut GameState) -> Result<(), InvariantViolation> {
        let first = state
            .first_player
            .ok_or_else(|| InvariantViolation::Inconsistent("turn started before setup".into()))?;
        state.turn_number += 1;
        let previous = state.active_player;
        let active = if state.turn_number == 1 {
            first
        } else if state.players[previous].extra_turns > 0 {
            state.players[previous].extra_turns -= 1;
            info!(player = %previous, "extra turn");
            previous
        } else {
            previous.opponent()
        };
        state.active_player = active;
        state.players[active].turns_taken += 1;
        for player in PlayerId::both() {
            state.players[player].reset_turn();
        }
        for card in state.cards.values_mut() {
            card.clear_markers();
        }

        info!(turn = state.turn_number, player = %active, "turn started");
        let turn_number = state.turn_number;
        state.emit(EventKind::TurnStarted {
            active_player: active,
            turn_number,
        });

        state.push_step(Step::EnterMain);
        state.push_step(Step::CheerStep);
        state.push_step(Step::DrawStep);
        state.push_step(Step::ResetStep);
        Ok(())
    }

    fn reset_step(state: &mut GameState) -> Result<(), InvariantViolation> {
        Self::enter_phase(state, Phase::Reset);
        let player = state.active_player;

        let mut activated = Vec::new();
        for id in state.zones.stage(player) {
            let card = state.card_mut(id)?;
            if card.resting {
                card.resting = false;
                activated.push(id);
            }
        }

        let collab_returned = state.collab(player);
        if let Some(id) = collab_returned {
            state.move_card(id, Location::zone(player, ZoneKind::Backstage), ZonePosition::Bottom)?;
            state.card_mut(id)?.resting = true;
        }

        state.emit(EventKind::ResetStep {
            active_player: player,
            activated,
            collab_returned,
        });

        Self::fire_gifts(state, player, GiftTiming::TurnStart)?;
        if state.center(player).is_none() {
            state.push_step(Step::ReplaceCenter { player });
        }
        Ok(())
    }

    fn draw_step(state: &mut GameState) -> Result<(), InvariantViolation> {
        Self::enter_phase(state, Phase::Draw);
        let player = state.active_player;

        if state.is_first_turn_of_first_player() && state.config.first_player_skips_draw {
            debug!(%player, "first player skips draw");
            return Ok(());
        }
        if state.count(player, ZoneKind::Deck) == 0 {
            state.end_game(Some(player), GameOverReason::DeckOut);
            return Ok(());
        }
        let amount = state.config.draw_per_turn;
        state.draw_cards(player, amount)?;
        Ok(())
    }

    fn cheer_step(state: &mut GameState) -> Result<(), InvariantViolation> {
        Self::enter_phase(state, Phase::Cheer);
        let player = state.active_player;

        let cheer = state.zones.top_n(Location::zone(player, ZoneKind::CheerDeck), 1);
        let targets = state.zones.stage(player);
        if cheer.is_empty() || targets.is_empty() {
            debug!(%player, "no cheer to send");
            return Ok(());
        }
        EffectResolver::offer_cheer(state, player, cheer, targets, 1, 1)
    }

    fn life_cheer(state: &mut GameState, player: PlayerId) -> Result<(), InvariantViolation> {
        let mut cheer = Vec::new();
        for &id in state.zones.zone(player, ZoneKind::Resolving) {
            if state.definition(id)?.card_type == CardType::Cheer {
                cheer.push(id);
            }
        }
        if cheer.is_empty() {
            return Ok(());
        }

        let targets = state.zones.stage(player);
        if targets.is_empty() {
            for id in cheer {
                state.move_card(id, Location::zone(player, ZoneKind::Archive), ZonePosition::Bottom)?;
            }
            return Ok(());
        }
        let amount = cheer.len();
        EffectResolver::offer_cheer(state, player, cheer, targets, amount, amount)
    }

    fn replace_center(state: &mut GameState, player: PlayerId) -> Result<(), InvariantViolation> {
        if state.center(player).is_some() {
            return Ok(());
        }
        let mut candidates = state.zones.zone(player, ZoneKind::Backstage).to_vec();
        if candidates.is_empty() {
            candidates.extend(state.collab(player));
        }

        match candidates.as_slice() {
            [] => {
                state.end_game(Some(player), GameOverReason::NoHolomemsOnStage);
                Ok(())
            }
            [only] => {
                state.move_card(*only, Location::zone(player, ZoneKind::Center), ZonePosition::Bottom)?;
                Ok(())
            }
            _ => state.post_decision(
                player,
                Decision::ChooseNewCenter {
                    candidates: candidates.clone(),
                },
                Resume::NewCenter { player, candidates },
            ),
        }
    }

    /// Push gift frames for every stage holomem of `player`, center first.
    fn fire_gifts(state: &mut GameState, player: PlayerId, timing: GiftTiming) -> Result<(), InvariantViolation> {
        let holders = state.zones.stage(player);
        for holder in holders.into_iter().rev() {
            Self::fire_gifts_of(state, holder, timing)?;
        }
        Ok(())
    }

    fn fire_gifts_of(state: &mut GameState, holder: InstanceId, timing: GiftTiming) -> Result<(), InvariantViolation> {
        let player = state.card(holder)?.owner;
        let in_center = state.center(player) == Some(holder);
        let in_collab = state.collab(player) == Some(holder);

        let gifts: Vec<Effect> = state
            .definition(holder)?
            .gifts
            .iter()
            .filter(|g| g.timing == timing)
            .filter(|g| match g.location {
                GiftLocation::Center => in_center,
                GiftLocation::Collab => in_collab,
                GiftLocation::Stage => true,
            })
            .map(|g| Effect {
                kind: EffectKind::Sequence {
                    effects: g.effects.clone(),
                },
                conditions: g.conditions.clone(),
                limit: g.limit.clone(),
            })
            .collect();

        let mut ctx = EffectContext::new(player, holder, EffectTrigger::Gift);
        if let Some(art) = &state.art {
            ctx.performer = Some(art.performer);
            ctx.art_target = Some(art.target);
        }
        state.push_effects(gifts, ctx);
        Ok(())
    }

    // === Main step ===

    fn main_action(state: &mut GameState, decision: &Decision, action: &GameAction) -> Result<(), EngineError> {
        let Decision::MainStep { available_actions } = decision else {
            return Err(InvariantViolation::Inconsistent("main step resumed without main step decision".into()).into());
        };
        let option = available_actions
            .iter()
            .find(|a| a.permits(action))
            .ok_or_else(|| ActionError::NotAllowed(action.action_type().to_string()))?;
        let player = state.active_player;

        match action {
            GameAction::MainStepPlaceHolomem { card_id } => {
                state.move_card(*card_id, Location::zone(player, ZoneKind::Backstage), ZonePosition::Bottom)?;
                state.card_mut(*card_id)?.mark(TurnMarker::EnteredStage);
            }

            GameAction::MainStepBloom { card_id, target_id } => Self::bloom(state, player, *card_id, *target_id)?,

            GameAction::MainStepCollab { card_id } => {
                state.move_card(*card_id, Location::zone(player, ZoneKind::Collab), ZonePosition::Bottom)?;
                state.players[player].collabed_this_turn = true;

                let amount = state.config.holopower_per_collab;
                let top = state.zones.top_n(Location::zone(player, ZoneKind::Deck), amount);
                for &id in &top {
                    state.move_card(id, Location::zone(player, ZoneKind::Holopower), ZonePosition::Bottom)?;
                }
                state.emit(EventKind::Collab {
                    player,
                    collab_id: *card_id,
                    holopower_generated: top.len(),
                });

                let effects = state.definition(*card_id)?.collab_effects.clone();
                state.push_effects(effects, EffectContext::new(player, *card_id, EffectTrigger::Collab));
            }

            GameAction::MainStepBatonPass { card_id, cheer_ids } => {
                let AvailableAction::MainStepBatonPass { cost, .. } = option else {
                    return Err(InvariantViolation::Inconsistent("baton pass option mismatch".into()).into());
                };
                let center = state
                    .center(player)
                    .ok_or_else(|| InvariantViolation::Inconsistent("baton pass without center".into()))?;
                let attached = state.zones.attached(center, AttachKind::Cheer).to_vec();
                validate_selection(cheer_ids, &attached, *cost as usize, *cost as usize)?;

                for &id in cheer_ids {
                    state.move_card(id, Location::zone(player, ZoneKind::Archive), ZonePosition::Bottom)?;
                }
                state.move_card(center, Location::zone(player, ZoneKind::Backstage), ZonePosition::Bottom)?;
                state.move_card(*card_id, Location::zone(player, ZoneKind::Center), ZonePosition::Bottom)?;
                state.players[player].baton_passed_this_turn = true;
                state.emit(EventKind::BatonPass {
                    player,
                    center_id: center,
                    backstage_id: *card_id,
                    cheer_archived: cheer_ids.clone(),
                });
            }

            GameAction::MainStepOshiSkill { skill_id } => {
                let oshi = state.players[player].oshi;
                let ctx = EffectContext::new(player, oshi, EffectTrigger::OshiSkill);
                EffectResolver::activate_oshi_skill(state, skill_id, &ctx)?;
            }

            GameAction::MainStepPlaySupport { card_id } => {
                let support = state
                    .definition(*card_id)?
                    .support
                    .clone()
                    .ok_or(ActionError::InvalidCard(*card_id))?;
                state.move_card(*card_id, Location::zone(player, ZoneKind::Resolving), ZonePosition::Bottom)?;
                if support.limited {
                    state.players[player].limited_played_this_turn = true;
                }
                let card = state.card_ref(*card_id)?;
                state.emit(EventKind::PlaySupport {
                    player,
                    card,
                    limited: support.limited,
                });

                let after = if support.sub_type.attaches() {
                    Step::AttachSupport { card: *card_id }
                } else {
                    Step::FinishSupport { card: *card_id }
                };
                state.push_step(after);
                state.push_effects(support.effects, EffectContext::new(player, *card_id, EffectTrigger::Support));
            }

            GameAction::MainStepBeginPerformance => state.push_step(Step::EnterPerformance),
            GameAction::MainStepEndTurn => state.push_step(Step::EndTurn),

            other => return Err(ActionError::UnexpectedAction(other.action_type()).into()),
        }
        Ok(())
    }

    /// Put `card` on top of `target`, keeping its place, damage and attachments.
    pub(crate) fn bloom(
        state: &mut GameState,
        player: PlayerId,
        card: InstanceId,
        target: InstanceId,
    ) -> Result<(), InvariantViolation> {
        let placement = state.zones.locate(target)?;
        let (damage, resting) = {
            let old = state.card(target)?;
            (old.damage, old.resting)
        };

        for modifier in state.modifiers.iter_mut().filter(|m| m.target == target) {
            modifier.target = card;
        }
        for kind in [AttachKind::Cheer, AttachKind::Support, AttachKind::Stacked] {
            for id in state.zones.attached(target, kind).to_vec() {
                state.relocate(id, Location::attached(card, kind), ZonePosition::Bottom)?;
            }
        }
        state.move_card(target, Location::attached(card, AttachKind::Stacked), ZonePosition::Bottom)?;
        state.move_card(card, placement.location, ZonePosition::Index(placement.index))?;

        let bloomed = state.card_mut(card)?;
        bloomed.damage = damage;
        bloomed.resting = resting;
        bloomed.mark(TurnMarker::Bloomed);

        let bloom_card = state.card_ref(card)?;
        state.emit(EventKind::Bloom {
            player,
            bloom_card,
            target_id: target,
        });

        let effects = state.definition(card)?.bloom_effects.clone();
        state.push_effects(effects, EffectContext::new(player, card, EffectTrigger::Bloom));
        Ok(())
    }

    // === Performance step ===

    fn performance_action(state: &mut GameState, decision: &Decision, action: &GameAction) -> Result<(), EngineError> {
        let Decision::PerformanceStep { available_actions } = decision else {
            return Err(InvariantViolation::Inconsistent("performance resumed without performance decision".into()).into());
        };
        if !available_actions.iter().any(|a| a.permits(action)) {
            return Err(ActionError::NotAllowed(action.action_type().to_string()).into());
        }

        match action {
            GameAction::PerformanceStepUseArt {
                performer_id,
                art_id,
                target_id,
            } => Self::use_art(state, *performer_id, art_id, *target_id)?,
            GameAction::PerformanceStepEndTurn => state.push_step(Step::EndTurn),
            other => return Err(ActionError::UnexpectedAction(other.action_type()).into()),
        }
        Ok(())
    }

    fn use_art(state: &mut GameState, performer: InstanceId, art_id: &str, target: InstanceId) -> Result<(), InvariantViolation> {
        let player = state.active_player;
        let art = state
            .definition(performer)?
            .art(art_id)
            .cloned()
            .ok_or_else(|| InvariantViolation::Inconsistent(format!("{performer} has no art {art_id}")))?;

        state.card_mut(performer)?.mark(TurnMarker::UsedArt);
        state.art = Some(ArtInProgress {
            performer,
            target,
            art_id: art.art_id.clone(),
            base_power: art.power,
            effect_boost: 0,
        });
        state.emit(EventKind::PerformArt {
            player,
            performer_id: performer,
            art_id: art.art_id.clone(),
            target_id: target,
            power: art.power,
        });

        state.push_step(Step::AfterArt { performer });
        state.push_step(Step::ArtDamage {
            performer,
            target,
            art_id: art.art_id,
        });
        state.push_effects(art.art_effects, EffectContext::for_art(player, performer, target));
        Ok(())
    }

    fn art_damage(state: &mut GameState, performer: InstanceId, target: InstanceId, art_id: &str) -> Result<(), InvariantViolation> {
        let Some(art) = state.art.clone() else {
            return Err(InvariantViolation::Inconsistent(format!("no art in progress for {art_id}")));
        };
        if !state.zones.is_on_stage(performer) {
            debug!(%performer, "performer left the stage before damage");
            return Ok(());
        }

        let player = state.card(performer)?.owner;
        let mut power = art.base_power + art.effect_boost;
        for boost in DamageResolver::modifiers(state, performer, ModifierKind::PowerBoost)? {
            power += boost.amount;
            state.emit(EventKind::BoostStat {
                player,
                holomem_id: performer,
                stat: BoostedStat::Power,
                amount: boost.amount,
                source: boost.source,
                source_id: boost.source_id,
            });
        }

        DamageResolver::incoming(
            state,
            DamageRequest {
                source: Some(performer),
                target,
                amount: power,
                special: false,
                prevent_life_loss: false,
            },
        )?;
        Ok(())
    }
}
