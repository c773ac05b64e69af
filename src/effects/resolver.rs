//! Effect resolution.
//!
//! `EffectResolver` interprets one `Effect` at a time against the game state.
//! Operations that need input post a decision and store a `Resume`; the
//! remaining effects of the frame are already back on the stack by then, so
//! resolution picks up exactly where it stopped once the answer arrives.
//!
//! ## Empty candidate sets
//!
//! | operation | no candidates |
//! |---|---|
//! | damage, restore, modifier | skipped |
//! | send / archive cheer | skipped |
//! | choose cards from a deck source | decision posted with nothing choosable |
//! | choose cards elsewhere | skipped |
//! | bloom | skipped |

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use super::condition::{Condition, ConditionEvaluator};
use super::continuation::{EffectContext, EffectTrigger, HolomemPurpose, Resume};
use super::effect::{BloomSource, CardDestination, CheerSource, CountSource, Effect, EffectKind, RemainingCards};
use super::targeting::{CardSource, HolomemScope, TargetSelector};
use crate::cards::{CardType, Color};
use crate::core::{
    ActionError, ActiveModifier, EngineError, GameAction, GameState, InstanceId, InvariantViolation, PlayerId,
};
use crate::events::{BloomOption, BoostSource, BoostedStat, CardRef, Decision, EventKind};
use crate::rules::damage::{DamageRequest, DamageResolver};
use crate::rules::{Legality, TurnMachine};
use crate::zones::{AttachKind, Location, ZoneKind, ZonePosition};

/// Interprets effect descriptors.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve the next effect of a frame. The rest of the frame goes back
    /// on the stack first.
    pub fn step(
        state: &mut GameState,
        mut queue: VecDeque<Effect>,
        ctx: EffectContext,
    ) -> Result<(), InvariantViolation> {
        let Some(effect) = queue.pop_front() else {
            return Ok(());
        };
        if !queue.is_empty() {
            state.stack.push(crate::effects::Frame::Effects {
                queue,
                ctx: ctx.clone(),
            });
        }
        Self::execute(state, effect, &ctx)
    }

    /// Resolve one effect: global conditions, usage limit, then the operation.
    pub fn execute(state: &mut GameState, effect: Effect, ctx: &EffectContext) -> Result<(), InvariantViolation> {
        if !ConditionEvaluator::all_met(state, &effect.conditions, ctx)? {
            debug!(effect = effect.kind.name(), source = %ctx.source, "conditions not met");
            return Ok(());
        }

        if let Some(limit) = &effect.limit {
            let per_game = limit.per.is_per_game();
            let player = &mut state.players[ctx.player];
            if player.has_used(&limit.id, per_game) {
                debug!(effect_id = %limit.id, player = %ctx.player, "usage limit reached, effect skipped");
                return Ok(());
            }
            player.mark_used(&limit.id, per_game);
        }

        debug!(effect = effect.kind.name(), source = %ctx.source, player = %ctx.player, "resolving effect");

        match effect.kind {
            EffectKind::PowerBoost { amount } => {
                if !Self::art_target_matches(state, &effect.conditions, ctx)? {
                    debug!(source = %ctx.source, "art target does not qualify for boost");
                    return Ok(());
                }
                Self::boost_art(state, amount, ctx)
            }

            EffectKind::PowerBoostPerCard { amount, per, max } => {
                if !Self::art_target_matches(state, &effect.conditions, ctx)? {
                    debug!(source = %ctx.source, "art target does not qualify for boost");
                    return Ok(());
                }
                let mut counted = Self::count(state, &per, ctx)?;
                if let Some(max) = max {
                    counted = counted.min(max);
                }
                Self::boost_art(state, amount * counted, ctx)
            }

            EffectKind::DealDamage {
                amount,
                special,
                prevent_life_loss,
                target,
            } => {
                let candidates = Self::holomem_candidates(state, target, &effect.conditions, ctx)?;
                let purpose = HolomemPurpose::DealDamage {
                    amount,
                    special,
                    prevent_life_loss,
                };
                Self::offer_holomem(state, ctx, purpose, candidates)
            }

            EffectKind::RestoreHp { amount, target } => {
                let candidates = Self::holomem_candidates(state, target, &effect.conditions, ctx)?;
                Self::offer_holomem(state, ctx, HolomemPurpose::RestoreHp { amount }, candidates)
            }

            EffectKind::AddModifier { modifier, target } => {
                let candidates = Self::holomem_candidates(state, target, &effect.conditions, ctx)?;
                Self::offer_holomem(state, ctx, HolomemPurpose::AddModifier { modifier }, candidates)
            }

            EffectKind::Draw {
                amount,
                opponent,
                from_bottom,
            } => {
                let player = if opponent { ctx.player.opponent() } else { ctx.player };
                if from_bottom {
                    state.draw_from_bottom(player, amount as usize)?;
                } else {
                    state.draw_cards(player, amount as usize)?;
                }
                Ok(())
            }

            EffectKind::Bloom { from, target } => {
                let options = Self::bloom_options(state, from, target, &effect.conditions, ctx)?;
                match options.as_slice() {
                    [] => {
                        debug!(source = %ctx.source, "nothing can bloom");
                        Ok(())
                    }
                    [only] => TurnMachine::bloom(state, ctx.player, only.card_id, only.target_id),
                    _ => state.post_decision(
                        ctx.player,
                        Decision::ChooseBloom {
                            effect_source: ctx.source,
                            options: options.clone(),
                        },
                        Resume::ChooseBloom {
                            ctx: ctx.clone(),
                            options,
                        },
                    ),
                }
            }

            EffectKind::ExtraTurn => {
                state.players[ctx.player].extra_turns += 1;
                info!(player = %ctx.player, source = %ctx.source, "extra turn granted");
                Ok(())
            }

            EffectKind::UseOshiSkill { skill_id } => Self::activate_oshi_skill(state, &skill_id, ctx),

            EffectKind::ChooseCards {
                from,
                to,
                amount_min,
                amount_max,
                filter,
                remaining,
                reveal,
            } => {
                let looked = TargetSelector::cards(state, from, ctx);
                let candidates = TargetSelector::filter_cards(state, &looked, &filter)?;
                Self::choose_cards(
                    state,
                    ctx,
                    ChooseRequest {
                        from,
                        to,
                        looked,
                        candidates,
                        amount_min: amount_min as usize,
                        amount_max: amount_max as usize,
                        remaining,
                        reveal,
                    },
                )
            }

            EffectKind::SendCheer {
                from,
                to,
                amount_min,
                amount_max,
                color,
            } => {
                let cheer = Self::cheer_sources(state, from, amount_max as usize, color, ctx)?;
                let targets = Self::holomem_candidates(state, to, &effect.conditions, ctx)?;
                if cheer.is_empty() || targets.is_empty() {
                    debug!("send_cheer has nothing to move");
                    return Ok(());
                }
                let amount_max = (amount_max as usize).min(cheer.len());
                let amount_min = (amount_min as usize).min(amount_max);
                Self::offer_cheer(state, ctx.player, cheer, targets, amount_min, amount_max)
            }

            EffectKind::ArchiveCheer { from, amount, color } => {
                let mut cheer = Vec::new();
                for holder in TargetSelector::holomems(state, from, ctx) {
                    for &id in state.zones.attached(holder, AttachKind::Cheer) {
                        let def = state.definition(id)?;
                        if color.map_or(true, |c| def.has_color(c)) {
                            cheer.push(id);
                        }
                    }
                }
                let amount = amount as usize;
                if cheer.len() <= amount {
                    for id in cheer {
                        Self::send_to(state, id, ctx.player, CardDestination::Archive)?;
                    }
                    return Ok(());
                }
                Self::choose_cards(
                    state,
                    ctx,
                    ChooseRequest {
                        from: CardSource::AttachedCheer { holder: from },
                        to: CardDestination::Archive,
                        looked: cheer.clone(),
                        candidates: cheer,
                        amount_min: amount,
                        amount_max: amount,
                        remaining: RemainingCards::Stay,
                        reveal: true,
                    },
                )
            }

            EffectKind::GenerateHolopower { amount } => {
                let top = state
                    .zones
                    .top_n(Location::zone(ctx.player, ZoneKind::Deck), amount as usize);
                for id in top {
                    state.move_card(id, Location::zone(ctx.player, ZoneKind::Holopower), ZonePosition::Bottom)?;
                }
                Ok(())
            }

            EffectKind::ShuffleDeck => {
                state.shuffle_zone(ctx.player, ZoneKind::Deck);
                Ok(())
            }

            EffectKind::Choice { options } => {
                if options.is_empty() {
                    return Ok(());
                }
                state.post_decision(
                    ctx.player,
                    Decision::Choice {
                        effect_source: ctx.source,
                        options: options.clone(),
                    },
                    Resume::Choice {
                        ctx: ctx.clone(),
                        options,
                    },
                )
            }

            EffectKind::Sequence { effects } => {
                state.push_effects(effects, ctx.clone());
                Ok(())
            }

            EffectKind::Pass => Ok(()),
        }
    }

    /// Continue an operation suspended on a decision. Everything is
    /// validated before anything moves.
    pub fn resume(
        state: &mut GameState,
        player: PlayerId,
        resume: Resume,
        action: &GameAction,
    ) -> Result<(), EngineError> {
        match (resume, action) {
            (
                Resume::ChooseCards {
                    ctx,
                    to,
                    looked,
                    candidates,
                    amount_min,
                    amount_max,
                    remaining,
                    ..
                },
                GameAction::EffectResolutionChooseCardsForEffect { card_ids },
            ) => {
                validate_selection(card_ids, &candidates, amount_min, amount_max)?;
                Self::finish_choose(state, &ctx, to, card_ids, &looked, remaining)?;
                Ok(())
            }

            (
                Resume::ChooseHolomem { ctx, purpose, candidates },
                GameAction::EffectResolutionChooseCardsForEffect { card_ids },
            ) => {
                validate_selection(card_ids, &candidates, 1, 1)?;
                Self::apply_to_holomem(state, &ctx, purpose, card_ids[0])?;
                Ok(())
            }

            (Resume::Choice { ctx, options }, GameAction::EffectResolutionMakeChoice { choice_index }) => {
                let chosen = options
                    .get(*choice_index)
                    .cloned()
                    .ok_or_else(|| ActionError::InvalidSelection(format!("no option {choice_index}")))?;
                state.push_effects(vec![chosen], ctx);
                Ok(())
            }

            (Resume::ChooseBloom { ctx, options }, GameAction::EffectResolutionMakeChoice { choice_index }) => {
                let chosen = options
                    .get(*choice_index)
                    .copied()
                    .ok_or_else(|| ActionError::InvalidSelection(format!("no bloom option {choice_index}")))?;
                TurnMachine::bloom(state, ctx.player, chosen.card_id, chosen.target_id)?;
                Ok(())
            }

            (Resume::OrderCards { player: owner, cards }, GameAction::EffectResolutionOrderCards { card_ids }) => {
                validate_selection(card_ids, &cards, cards.len(), cards.len())?;
                for &id in card_ids {
                    state.move_card(id, Location::zone(owner, ZoneKind::Deck), ZonePosition::Bottom)?;
                }
                Ok(())
            }

            (
                Resume::SendCheer {
                    cheer,
                    targets,
                    amount_min,
                    amount_max,
                },
                GameAction::EffectResolutionMoveCheerBetweenHolomems { placements },
            ) => {
                let cheer_ids: Vec<InstanceId> = placements.iter().map(|p| p.cheer_id).collect();
                validate_selection(&cheer_ids, &cheer, amount_min, amount_max)?;
                if let Some(bad) = placements.iter().find(|p| !targets.contains(&p.holomem_id)) {
                    return Err(ActionError::InvalidTarget(bad.holomem_id).into());
                }
                for placement in placements {
                    Self::attach_cheer(state, placement.cheer_id, placement.holomem_id)?;
                }
                debug!(%player, moved = placements.len(), "cheer placed");
                Ok(())
            }

            (_, other) => Err(ActionError::UnexpectedAction(other.action_type()).into()),
        }
    }

    /// Offer cheer to holomems. Placed automatically when there is nothing
    /// to decide.
    pub fn offer_cheer(
        state: &mut GameState,
        player: PlayerId,
        cheer: Vec<InstanceId>,
        targets: Vec<InstanceId>,
        amount_min: usize,
        amount_max: usize,
    ) -> Result<(), InvariantViolation> {
        if let [only] = targets.as_slice() {
            if amount_min == amount_max && cheer.len() == amount_max {
                for id in cheer {
                    Self::attach_cheer(state, id, *only)?;
                }
                return Ok(());
            }
        }

        let mut options = Vec::with_capacity(cheer.len());
        for &id in &cheer {
            options.push(state.card_ref(id)?);
        }
        state.post_decision(
            player,
            Decision::SendCheer {
                cheer_options: options,
                target_options: targets.clone(),
                amount_min,
                amount_max,
            },
            Resume::SendCheer {
                cheer,
                targets,
                amount_min,
                amount_max,
            },
        )
    }

    /// Apply `purpose` to one of `candidates`, asking when there are several.
    pub fn offer_holomem(
        state: &mut GameState,
        ctx: &EffectContext,
        purpose: HolomemPurpose,
        candidates: Vec<InstanceId>,
    ) -> Result<(), InvariantViolation> {
        match candidates.as_slice() {
            [] => {
                debug!(source = %ctx.source, "no holomem to target");
                Ok(())
            }
            [only] => Self::apply_to_holomem(state, ctx, purpose, *only),
            _ => state.post_decision(
                ctx.player,
                Decision::ChooseHolomemForEffect {
                    effect_source: ctx.source,
                    candidates: candidates.clone(),
                    amount_min: 1,
                    amount_max: 1,
                },
                Resume::ChooseHolomem {
                    ctx: ctx.clone(),
                    purpose,
                    candidates,
                },
            ),
        }
    }

    /// Holomems in scope that pass the effect's target predicates.
    pub fn holomem_candidates(
        state: &GameState,
        scope: HolomemScope,
        conditions: &[Condition],
        ctx: &EffectContext,
    ) -> Result<Vec<InstanceId>, InvariantViolation> {
        let mut kept = Vec::new();
        for id in TargetSelector::holomems(state, scope, ctx) {
            if ConditionEvaluator::target_matches(state, conditions, ctx, id)? {
                kept.push(id);
            }
        }
        Ok(kept)
    }

    fn apply_to_holomem(
        state: &mut GameState,
        ctx: &EffectContext,
        purpose: HolomemPurpose,
        target: InstanceId,
    ) -> Result<(), InvariantViolation> {
        match purpose {
            HolomemPurpose::DealDamage {
                amount,
                special,
                prevent_life_loss,
            } => {
                DamageResolver::incoming(
                    state,
                    DamageRequest {
                        source: Some(ctx.source),
                        target,
                        amount,
                        special,
                        prevent_life_loss,
                    },
                )?;
            }
            HolomemPurpose::RestoreHp { amount } => DamageResolver::restore_hp(state, target, amount)?,
            HolomemPurpose::AddModifier { modifier } => {
                state.modifiers.push(ActiveModifier {
                    target,
                    modifier,
                    source: ctx.source,
                });
                state.emit(EventKind::ModifierAdded {
                    player: ctx.player,
                    holomem_id: target,
                    modifier,
                });
            }
            HolomemPurpose::AttachSupport { card } => {
                state.move_card(card, Location::attached(target, AttachKind::Support), ZonePosition::Bottom)?;
            }
        }
        Ok(())
    }

    /// Pay for an oshi skill, record its use and queue its effects. The
    /// skill effects keep `ctx`'s art and damage subjects.
    pub fn activate_oshi_skill(state: &mut GameState, skill_id: &str, ctx: &EffectContext) -> Result<(), InvariantViolation> {
        let player = ctx.player;
        let oshi = state.players[player].oshi;
        let skill = state
            .definition(oshi)?
            .oshi_skill(skill_id)
            .cloned()
            .ok_or_else(|| InvariantViolation::Inconsistent(format!("{player} has no oshi skill {skill_id}")))?;

        let paid = state
            .zones
            .top_n(Location::zone(player, ZoneKind::Holopower), skill.holopower_cost as usize);
        for id in paid {
            state.move_card(id, Location::zone(player, ZoneKind::Archive), ZonePosition::Bottom)?;
        }
        state.players[player].mark_used(&skill.skill_id, skill.limit.is_per_game());
        state.emit(EventKind::OshiSkillActivated {
            player,
            skill_id: skill.skill_id.clone(),
            holopower_paid: skill.holopower_cost,
        });

        let mut skill_ctx = ctx.clone();
        skill_ctx.source = oshi;
        skill_ctx.trigger = EffectTrigger::OshiSkill;
        state.push_effects(skill.effects, skill_ctx);
        Ok(())
    }

    /// Target predicates checked against the art's target. Holds outside
    /// an art.
    fn art_target_matches(
        state: &GameState,
        conditions: &[Condition],
        ctx: &EffectContext,
    ) -> Result<bool, InvariantViolation> {
        let target = ctx.art_target.or_else(|| state.art.as_ref().map(|a| a.target));
        match target {
            Some(target) => ConditionEvaluator::target_matches(state, conditions, ctx, target),
            None => Ok(true),
        }
    }

    fn bloom_options(
        state: &GameState,
        from: BloomSource,
        scope: HolomemScope,
        conditions: &[Condition],
        ctx: &EffectContext,
    ) -> Result<Vec<BloomOption>, InvariantViolation> {
        let cards = match from {
            BloomSource::Hand => state.zones.zone(ctx.player, ZoneKind::Hand),
            BloomSource::Stacked => state.zones.attached(ctx.source, AttachKind::Stacked),
        };
        let targets = Self::holomem_candidates(state, scope, conditions, ctx)?;

        let mut options = Vec::new();
        for &card_id in cards {
            let def = state.definition(card_id)?;
            if def.card_type != CardType::HolomemBloom {
                continue;
            }
            for &target_id in &targets {
                if Legality::bloom_fits(state, def, target_id)? {
                    options.push(BloomOption { card_id, target_id });
                }
            }
        }
        Ok(options)
    }

    fn boost_art(state: &mut GameState, amount: u32, ctx: &EffectContext) -> Result<(), InvariantViolation> {
        let Some(art) = state.art.as_mut() else {
            debug!(source = %ctx.source, "power boost outside an art");
            return Ok(());
        };
        art.effect_boost += amount;
        let performer = art.performer;
        state.emit(EventKind::BoostStat {
            player: ctx.player,
            holomem_id: performer,
            stat: BoostedStat::Power,
            amount,
            source: BoostSource::ArtEffect,
            source_id: ctx.source,
        });
        Ok(())
    }

    fn count(state: &GameState, per: &CountSource, ctx: &EffectContext) -> Result<u32, InvariantViolation> {
        let player = ctx.player;
        let counted = match per {
            CountSource::PerformerCheer { color } => {
                let colors = state.attached_cheer_colors(ctx.performer.unwrap_or(ctx.source))?;
                colors.iter().filter(|c| color.map_or(true, |want| **c == want)).count()
            }
            CountSource::StageHolomemsWithTag { tag } => {
                let mut n = 0;
                for id in state.zones.stage(player) {
                    if state.definition(id)?.has_tag(tag) {
                        n += 1;
                    }
                }
                n
            }
            CountSource::OwnBackstage => state.count(player, ZoneKind::Backstage),
            CountSource::ArchiveCheer => {
                let mut n = 0;
                for &id in state.zones.zone(player, ZoneKind::Archive) {
                    if state.definition(id)?.card_type == CardType::Cheer {
                        n += 1;
                    }
                }
                n
            }
        };
        Ok(counted as u32)
    }

    fn cheer_sources(
        state: &GameState,
        from: CheerSource,
        amount_max: usize,
        color: Option<Color>,
        ctx: &EffectContext,
    ) -> Result<Vec<InstanceId>, InvariantViolation> {
        let player = ctx.player;
        let pool: Vec<InstanceId> = match from {
            CheerSource::CheerDeck => state
                .zones
                .top_n(Location::zone(player, ZoneKind::CheerDeck), amount_max),
            CheerSource::Archive => state.zones.zone(player, ZoneKind::Archive).to_vec(),
            CheerSource::ThisCard => state.zones.attached(ctx.source, AttachKind::Cheer).to_vec(),
            CheerSource::OwnStage => state
                .zones
                .stage(player)
                .into_iter()
                .flat_map(|h| state.zones.attached(h, AttachKind::Cheer).iter().copied())
                .collect(),
        };

        let mut cheer = Vec::with_capacity(pool.len());
        for id in pool {
            let def = state.definition(id)?;
            if def.card_type == CardType::Cheer && color.map_or(true, |c| def.has_color(c)) {
                cheer.push(id);
            }
        }
        Ok(cheer)
    }

    fn choose_cards(state: &mut GameState, ctx: &EffectContext, mut req: ChooseRequest) -> Result<(), InvariantViolation> {
        if req.to == CardDestination::Backstage {
            let free = state
                .config
                .max_backstage
                .saturating_sub(state.count(ctx.player, ZoneKind::Backstage));
            req.amount_max = req.amount_max.min(free);
        }
        req.amount_max = req.amount_max.min(req.candidates.len());
        req.amount_min = req.amount_min.min(req.amount_max);

        if req.looked.is_empty() || (req.candidates.is_empty() && !req.from.is_deck()) {
            debug!(source = %ctx.source, "nothing to choose");
            return Self::finish_choose(state, ctx, req.to, &[], &req.looked, req.remaining);
        }

        let mut seen = Vec::with_capacity(req.looked.len());
        for &id in &req.looked {
            seen.push(state.card_ref(id)?);
        }
        state.post_decision(
            ctx.player,
            Decision::ChooseCards {
                effect_source: ctx.source,
                from: req.from,
                to: req.to,
                cards_seen: seen,
                candidates: req.candidates.clone(),
                amount_min: req.amount_min,
                amount_max: req.amount_max,
                reveal: req.reveal,
            },
            Resume::ChooseCards {
                ctx: ctx.clone(),
                from: req.from,
                to: req.to,
                looked: req.looked,
                candidates: req.candidates,
                amount_min: req.amount_min,
                amount_max: req.amount_max,
                remaining: req.remaining,
                reveal: req.reveal,
            },
        )
    }

    fn finish_choose(
        state: &mut GameState,
        ctx: &EffectContext,
        to: CardDestination,
        chosen: &[InstanceId],
        looked: &[InstanceId],
        remaining: RemainingCards,
    ) -> Result<(), InvariantViolation> {
        for &id in chosen {
            Self::send_to(state, id, ctx.player, to)?;
        }

        let rest: Vec<InstanceId> = looked.iter().copied().filter(|id| !chosen.contains(id)).collect();
        match remaining {
            RemainingCards::Stay => {}
            RemainingCards::Shuffle => state.shuffle_zone(ctx.player, ZoneKind::Deck),
            RemainingCards::Archive => {
                for id in rest {
                    Self::send_to(state, id, ctx.player, CardDestination::Archive)?;
                }
            }
            RemainingCards::DeckBottom => match rest.as_slice() {
                [] => {}
                [only] => {
                    state.move_card(*only, Location::zone(ctx.player, ZoneKind::Deck), ZonePosition::Bottom)?;
                }
                _ => {
                    let mut refs = Vec::with_capacity(rest.len());
                    for &id in &rest {
                        refs.push(state.card_ref(id)?);
                    }
                    state.post_decision(
                        ctx.player,
                        Decision::OrderCards { cards: refs },
                        Resume::OrderCards {
                            player: ctx.player,
                            cards: rest,
                        },
                    )?;
                }
            },
        }
        Ok(())
    }

    fn send_to(
        state: &mut GameState,
        id: InstanceId,
        player: PlayerId,
        to: CardDestination,
    ) -> Result<(), InvariantViolation> {
        let owner = state.card(id)?.owner;
        let (zone, position) = match to {
            CardDestination::Hand => (ZoneKind::Hand, ZonePosition::Bottom),
            CardDestination::Archive => (ZoneKind::Archive, ZonePosition::Bottom),
            CardDestination::Backstage => (ZoneKind::Backstage, ZonePosition::Bottom),
            CardDestination::DeckBottom => (ZoneKind::Deck, ZonePosition::Bottom),
            CardDestination::Holopower => (ZoneKind::Holopower, ZonePosition::Bottom),
        };
        // Hand and stage destinations belong to the chooser; the rest to the owner.
        let dest = if matches!(to, CardDestination::Hand | CardDestination::Backstage) {
            player
        } else {
            owner
        };
        state.move_card(id, Location::zone(dest, zone), position)?;
        if to == CardDestination::Backstage {
            state.card_mut(id)?.mark(crate::cards::TurnMarker::EnteredStage);
        }
        Ok(())
    }

    fn attach_cheer(state: &mut GameState, cheer: InstanceId, holder: InstanceId) -> Result<(), InvariantViolation> {
        state.move_card(cheer, Location::attached(holder, AttachKind::Cheer), ZonePosition::Bottom)?;
        Ok(())
    }
}

struct ChooseRequest {
    from: CardSource,
    to: CardDestination,
    looked: Vec<InstanceId>,
    candidates: Vec<InstanceId>,
    amount_min: usize,
    amount_max: usize,
    remaining: RemainingCards,
    reveal: bool,
}

/// Check a chosen id list: size in range, members of `candidates`, no repeats.
pub fn validate_selection(
    chosen: &[InstanceId],
    candidates: &[InstanceId],
    amount_min: usize,
    amount_max: usize,
) -> Result<(), ActionError> {
    if chosen.len() < amount_min || chosen.len() > amount_max {
        return Err(ActionError::InvalidSelection(format!(
            "expected {amount_min}..={amount_max} cards, got {}",
            chosen.len()
        )));
    }
    let mut seen = FxHashSet::default();
    for &id in chosen {
        if !candidates.contains(&id) {
            return Err(ActionError::InvalidCard(id));
        }
        if !seen.insert(id) {
            return Err(ActionError::InvalidSelection(format!("{id} chosen twice")));
        }
    }
    Ok(())
}
