//! Whole-turn scenarios driven through the engine facade.

use super::fixtures::*;
use crate::cards::TurnMarker;
use crate::core::{EngineConfig, GameAction, GameOutcome, GameOverReason, Phase};
use crate::effects::{
    BloomSource, Effect, EffectContext, EffectKind, EffectResolver, EffectTrigger, Frame, HolomemScope,
};
use crate::events::{AvailableAction, AvailablePerformance, BloomOption, BoostSource, Decision, EventKind, GameEvent};
use crate::rules::{DamageRequest, DamageResolver, Legality};
use crate::zones::{AttachKind, Location, ZoneKind, ZonePosition};

fn kinds(events: &[GameEvent]) -> Vec<&EventKind> {
    events.iter().map(|e| &e.kind).collect()
}

// =============================================================================
// Setup
// =============================================================================

#[test]
fn test_setup_reaches_first_main_step() {
    let engine = setup_match(EngineConfig::default(), &[]);
    let state = engine.state();

    assert_eq!(state.turn_number, 1);
    assert_eq!(state.phase, Phase::Main);
    assert_eq!(state.active_player, P0);
    assert_eq!(state.first_player, Some(P0));

    // Seven dealt, one placed, no draw for the first player's first turn.
    assert_eq!(state.count(P0, ZoneKind::Hand), 6);
    assert_eq!(state.count(P1, ZoneKind::Hand), 6);
    assert_eq!(state.count(P0, ZoneKind::Life), 5);
    assert_eq!(state.count(P1, ZoneKind::Life), 5);

    let center = state.center(P0).unwrap();
    assert_eq!(state.zones.attached(center, AttachKind::Cheer).len(), 1);

    let options = main_options(&engine);
    assert!(options.contains(&AvailableAction::MainStepEndTurn));
    assert!(!options.iter().any(|a| matches!(
        a,
        AvailableAction::MainStepBloom { .. }
            | AvailableAction::MainStepPlaySupport { .. }
            | AvailableAction::MainStepBeginPerformance
    )));
}

#[test]
fn test_placements_are_revealed_together() {
    let mut engine = engine_with(EngineConfig::default());
    act(&mut engine, P0, GameAction::EffectResolutionMakeChoice { choice_index: 1 });

    // Player 1 goes first and mulligans first.
    assert_eq!(engine.state().first_player, Some(P1));
    assert_eq!(engine.pending_decision().unwrap().player, P1);
    act(&mut engine, P1, GameAction::Mulligan { do_mulligan: false });
    act(&mut engine, P0, GameAction::Mulligan { do_mulligan: true });

    let center = hand_cards(&engine, P1, DEBUT)[0];
    engine.drain_observer_events();
    act(
        &mut engine,
        P1,
        GameAction::InitialPlacement {
            center_id: center,
            backstage_ids: vec![],
        },
    );
    let observed = engine.drain_observer_events();
    assert!(!kinds(&observed)
        .iter()
        .any(|k| matches!(k, EventKind::InitialPlacement { .. })));

    let center = hand_cards(&engine, P0, DEBUT)[0];
    act(
        &mut engine,
        P0,
        GameAction::InitialPlacement {
            center_id: center,
            backstage_ids: vec![],
        },
    );
    let observed = engine.drain_observer_events();
    let placements: Vec<_> = kinds(&observed)
        .into_iter()
        .filter_map(|k| match k {
            EventKind::InitialPlacement { player, .. } => Some(*player),
            _ => None,
        })
        .collect();
    assert_eq!(placements, vec![P1, P0]);
    assert_eq!(engine.state().active_player, P1);
}

#[test]
fn test_placement_rejects_cards_not_in_hand() {
    let mut engine = engine_with(EngineConfig::default());
    act(&mut engine, P0, GameAction::EffectResolutionMakeChoice { choice_index: 0 });
    act(&mut engine, P0, GameAction::Mulligan { do_mulligan: false });
    act(&mut engine, P1, GameAction::Mulligan { do_mulligan: false });

    let opponent_card = hand_cards(&engine, P1, DEBUT)[0];
    let pending = engine.pending_decision().unwrap().id;
    engine.handle_action(
        P0,
        GameAction::InitialPlacement {
            center_id: opponent_card,
            backstage_ids: vec![],
        },
    );

    assert_eq!(engine.pending_decision().unwrap().id, pending);
    assert!(!engine.is_game_over());
    let errors: Vec<_> = engine
        .drain_events_for(P0)
        .into_iter()
        .filter_map(|e| match e.kind {
            EventKind::GameError { error_id, .. } => Some(error_id),
            _ => None,
        })
        .collect();
    assert_eq!(errors, vec!["invalid_card".to_string()]);
}

// =============================================================================
// Intake
// =============================================================================

#[test]
fn test_rejected_action_reaches_sender_only() {
    let mut engine = setup_match(EngineConfig::default(), &[]);
    engine.drain_player_events();
    engine.drain_observer_events();
    let pending = engine.pending_decision().unwrap().id;

    engine.handle_action(P1, GameAction::MainStepEndTurn);

    assert_eq!(engine.pending_decision().unwrap().id, pending);
    let p1 = engine.drain_events_for(P1);
    assert_eq!(p1.len(), 1);
    assert!(matches!(
        &p1[0].kind,
        EventKind::GameError { error_id, .. } if error_id == "not_your_decision"
    ));
    assert!(engine.drain_events_for(P0).is_empty());
    assert!(engine.drain_observer_events().is_empty());
}

#[test]
fn test_action_not_offered_is_rejected() {
    let mut engine = setup_match(EngineConfig::default(), &[]);
    let center = engine.state().center(P0).unwrap();
    let bloom = hand_cards(&engine, P0, BLOOM)[0];
    engine.drain_player_events();

    engine.handle_action(
        P0,
        GameAction::MainStepBloom {
            card_id: bloom,
            target_id: center,
        },
    );

    assert_eq!(engine.state().center(P0), Some(center));
    let errors: Vec<_> = engine
        .drain_events_for(P0)
        .into_iter()
        .filter_map(|e| match e.kind {
            EventKind::GameError { error_id, .. } => Some(error_id),
            _ => None,
        })
        .collect();
    assert_eq!(errors, vec!["action_not_allowed".to_string()]);
}

#[test]
fn test_resign_ends_match_and_later_actions_are_ignored() {
    let mut engine = setup_match(EngineConfig::default(), &[]);
    engine.handle_action(P1, GameAction::Resign);

    assert_eq!(
        engine.outcome(),
        Some(GameOutcome {
            winner: Some(P0),
            loser: Some(P1),
            reason: GameOverReason::Resigned,
        })
    );
    assert!(engine.pending_decision().is_none());

    engine.drain_player_events();
    engine.handle_action(P0, GameAction::MainStepEndTurn);
    assert!(engine.drain_player_events().is_empty());
    assert_eq!(engine.state().action_history.len(), 5 + 1);
}

// =============================================================================
// Main step
// =============================================================================

#[test]
fn test_bloom_carries_damage_and_attachments() {
    let mut engine = setup_match(EngineConfig::default().with_first_turn_bloom(true), &[]);
    let center = engine.state().center(P0).unwrap();
    engine.state_mut().card_mut(center).unwrap().damage = 30;
    let bloom = hand_cards(&engine, P0, BLOOM)[0];

    act(
        &mut engine,
        P0,
        GameAction::MainStepBloom {
            card_id: bloom,
            target_id: center,
        },
    );

    let state = engine.state();
    assert_eq!(state.center(P0), Some(bloom));
    let card = state.card(bloom).unwrap();
    assert_eq!(card.damage, 30);
    assert!(card.has_marker(TurnMarker::Bloomed));
    assert_eq!(state.zones.attached(bloom, AttachKind::Cheer).len(), 1);
    assert_eq!(state.zones.attached(bloom, AttachKind::Stacked), &[center]);

    // A holomem that bloomed this turn cannot bloom again.
    assert!(!main_options(&engine)
        .iter()
        .any(|a| matches!(a, AvailableAction::MainStepBloom { target_id, .. } if *target_id == bloom)));
}

#[test]
fn test_second_copy_blooms_without_its_limited_draw() {
    let mut engine = setup_match(EngineConfig::default().with_first_turn_bloom(true), &[DEBUT]);
    let center = engine.state().center(P0).unwrap();
    let backstage = engine.state().zones.zone(P0, ZoneKind::Backstage)[0];
    let blooms = hand_cards(&engine, P0, BLOOM);
    let hand = engine.state().count(P0, ZoneKind::Hand);
    engine.drain_observer_events();

    act(
        &mut engine,
        P0,
        GameAction::MainStepBloom {
            card_id: blooms[0],
            target_id: center,
        },
    );
    let first = engine.drain_observer_events();
    assert!(kinds(&first).iter().any(|k| matches!(k, EventKind::Bloom { .. })));
    assert!(kinds(&first).iter().any(|k| matches!(k, EventKind::Draw { .. })));
    assert_eq!(engine.state().count(P0, ZoneKind::Hand), hand);

    act(
        &mut engine,
        P0,
        GameAction::MainStepBloom {
            card_id: blooms[1],
            target_id: backstage,
        },
    );
    let second = engine.drain_observer_events();
    assert!(kinds(&second).iter().any(|k| matches!(k, EventKind::Bloom { .. })));
    assert!(!kinds(&second).iter().any(|k| matches!(k, EventKind::Draw { .. })));
    assert_eq!(engine.state().count(P0, ZoneKind::Hand), hand - 1);
}

#[test]
fn test_fan_attaches_only_to_named_member() {
    let mut engine = setup_match(EngineConfig::default(), &[DEBUT]);
    let fan = deck_card(&engine, P0, FAN);
    engine
        .state_mut()
        .relocate(fan, Location::zone(P0, ZoneKind::Hand), ZonePosition::Bottom)
        .unwrap();
    let actions = Legality::main_actions(engine.state()).unwrap();
    assert!(!actions.contains(&AvailableAction::MainStepPlaySupport { card_id: fan }));

    let mut engine = setup_match(EngineConfig::default(), &[DEBUT, SPOT]);
    let fan = deck_card(&engine, P0, FAN);
    let spot = engine.state().zones.zone(P0, ZoneKind::Backstage)[1];
    {
        let state = engine.state_mut();
        state
            .relocate(fan, Location::zone(P0, ZoneKind::Hand), ZonePosition::Bottom)
            .unwrap();
        state.pending = None;
    }
    engine.run();
    assert_eq!(Legality::attach_targets(engine.state(), P0, fan).unwrap(), vec![spot]);
    assert!(main_options(&engine).contains(&AvailableAction::MainStepPlaySupport { card_id: fan }));

    act(&mut engine, P0, GameAction::MainStepPlaySupport { card_id: fan });

    let state = engine.state();
    assert_eq!(state.zones.attached(spot, AttachKind::Support), &[fan]);
    assert_eq!(DamageResolver::current_hp(state, spot).unwrap(), 60);
}

#[test]
fn test_collab_moves_deck_top_to_holopower() {
    let mut engine = setup_match(EngineConfig::default(), &[SPOT]);
    let spot = engine.state().zones.zone(P0, ZoneKind::Backstage)[0];
    let deck_top = engine.state().zones.zone(P0, ZoneKind::Deck)[0];
    let deck = engine.state().count(P0, ZoneKind::Deck);

    act(&mut engine, P0, GameAction::MainStepCollab { card_id: spot });

    let state = engine.state();
    assert_eq!(state.collab(P0), Some(spot));
    assert_eq!(state.zones.zone(P0, ZoneKind::Holopower), &[deck_top]);
    assert_eq!(state.count(P0, ZoneKind::Deck), deck - 1);
    assert!(!main_options(&engine)
        .iter()
        .any(|a| matches!(a, AvailableAction::MainStepCollab { .. })));
}

#[test]
fn test_baton_pass_pays_cheer_and_swaps_center() {
    let mut engine = setup_match(EngineConfig::default(), &[SPOT]);
    let center = engine.state().center(P0).unwrap();
    let spot = engine.state().zones.zone(P0, ZoneKind::Backstage)[0];
    let cheer = engine.state().zones.attached(center, AttachKind::Cheer).to_vec();
    assert!(main_options(&engine).contains(&AvailableAction::MainStepBatonPass { card_id: spot, cost: 1 }));

    // Wrong amount of cheer is rejected without changing anything.
    let pending = engine.pending_decision().unwrap().id;
    engine.handle_action(
        P0,
        GameAction::MainStepBatonPass {
            card_id: spot,
            cheer_ids: vec![],
        },
    );
    assert_eq!(engine.pending_decision().unwrap().id, pending);
    assert_eq!(engine.state().center(P0), Some(center));

    act(
        &mut engine,
        P0,
        GameAction::MainStepBatonPass {
            card_id: spot,
            cheer_ids: cheer.clone(),
        },
    );

    let state = engine.state();
    assert_eq!(state.center(P0), Some(spot));
    assert_eq!(state.zones.zone(P0, ZoneKind::Backstage), &[center]);
    assert_eq!(state.zones.location(cheer[0]), Some(Location::zone(P0, ZoneKind::Archive)));
    assert!(!main_options(&engine)
        .iter()
        .any(|a| matches!(a, AvailableAction::MainStepBatonPass { .. })));
}

#[test]
fn test_limited_support_draws_and_archives() {
    let mut engine = setup_match(EngineConfig::default(), &[]);
    end_turn(&mut engine);
    assert_eq!(engine.state().active_player, P1);

    let support = hand_cards(&engine, P1, SUPPORT_DRAW)[0];
    let hand = engine.state().count(P1, ZoneKind::Hand);
    assert!(main_options(&engine).contains(&AvailableAction::MainStepPlaySupport { card_id: support }));

    act(&mut engine, P1, GameAction::MainStepPlaySupport { card_id: support });

    let state = engine.state();
    assert_eq!(state.count(P1, ZoneKind::Hand), hand - 1 + 2);
    assert_eq!(state.zones.location(support), Some(Location::zone(P1, ZoneKind::Archive)));
    assert!(state.players[P1].limited_played_this_turn);
}

#[test]
fn test_oshi_skill_boosts_the_next_art() {
    let mut engine = setup_match(EngineConfig::default(), &[SPOT]);
    end_turn(&mut engine);

    let spot = engine.state().zones.zone(P1, ZoneKind::Backstage)[0];
    act(&mut engine, P1, GameAction::MainStepCollab { card_id: spot });
    assert!(main_options(&engine).contains(&AvailableAction::MainStepOshiSkill {
        skill_id: "replacement".into(),
        cost: 1,
    }));
    act(
        &mut engine,
        P1,
        GameAction::MainStepOshiSkill {
            skill_id: "replacement".into(),
        },
    );
    assert!(!main_options(&engine)
        .iter()
        .any(|a| matches!(a, AvailableAction::MainStepOshiSkill { .. })));
    assert_eq!(engine.state().count(P1, ZoneKind::Holopower), 0);

    let performer = engine.state().center(P1).unwrap();
    let target = engine.state().center(P0).unwrap();
    act(&mut engine, P1, GameAction::MainStepBeginPerformance);
    engine.drain_observer_events();
    act(
        &mut engine,
        P1,
        GameAction::PerformanceStepUseArt {
            performer_id: performer,
            art_id: "nunnun".into(),
            target_id: target,
        },
    );

    let observed = engine.drain_observer_events();
    assert!(kinds(&observed).iter().any(|k| matches!(
        k,
        EventKind::BoostStat { amount: 20, source: BoostSource::TurnModifier, .. }
    )));
    assert!(kinds(&observed)
        .iter()
        .any(|k| matches!(k, EventKind::DamageDealt { damage: 40, .. })));
    assert_eq!(engine.state().card(target).unwrap().damage, 40);
}

// =============================================================================
// Performance and downs
// =============================================================================

#[test]
fn test_art_damage_then_turn_passes() {
    let mut engine = setup_match(EngineConfig::default(), &[]);
    end_turn(&mut engine);

    let performer = engine.state().center(P1).unwrap();
    let target = engine.state().center(P0).unwrap();
    act(&mut engine, P1, GameAction::MainStepBeginPerformance);

    let Some(Decision::PerformanceStep { available_actions }) = engine.pending_decision().map(|p| &p.decision) else {
        panic!("expected a performance decision");
    };
    assert!(available_actions.contains(&AvailablePerformance::PerformanceStepUseArt {
        performer_id: performer,
        art_id: "nunnun".into(),
        power: 20,
        valid_targets: vec![target],
    }));

    act(
        &mut engine,
        P1,
        GameAction::PerformanceStepUseArt {
            performer_id: performer,
            art_id: "nunnun".into(),
            target_id: target,
        },
    );
    cheer_to_center(&mut engine);

    // No art left to use, so the turn ended on its own.
    let state = engine.state();
    assert_eq!(state.turn_number, 3);
    assert_eq!(state.active_player, P0);
    assert_eq!(state.phase, Phase::Main);
    assert_eq!(state.card(target).unwrap().damage, 20);
}

#[test]
fn test_lethal_art_costs_life_and_promotes_backstage() {
    let mut engine = setup_match(EngineConfig::default(), &[SPOT]);
    end_turn(&mut engine);

    let performer = engine.state().center(P1).unwrap();
    let target = engine.state().center(P0).unwrap();
    let spot = engine.state().zones.zone(P0, ZoneKind::Backstage)[0];
    engine.state_mut().card_mut(target).unwrap().damage = 50;

    act(&mut engine, P1, GameAction::MainStepBeginPerformance);
    engine.drain_observer_events();
    act(
        &mut engine,
        P1,
        GameAction::PerformanceStepUseArt {
            performer_id: performer,
            art_id: "nunnun".into(),
            target_id: target,
        },
    );
    cheer_to_center(&mut engine);

    let observed = engine.drain_observer_events();
    let downs: Vec<_> = kinds(&observed)
        .into_iter()
        .filter_map(|k| match k {
            EventKind::DownedHolomem {
                target_id,
                life_lost,
                was_center,
                ..
            } => Some((*target_id, *life_lost, *was_center)),
            _ => None,
        })
        .collect();
    assert_eq!(downs, vec![(target, 1, true)]);

    let state = engine.state();
    assert_eq!(state.count(P0, ZoneKind::Life), 4);
    assert_eq!(state.zones.location(target), Some(Location::zone(P0, ZoneKind::Archive)));
    assert_eq!(state.center(P0), Some(spot));
    // Life cheer plus this turn's cheer.
    assert_eq!(state.zones.attached(spot, AttachKind::Cheer).len(), 2);
    assert_eq!(state.card(target).unwrap().damage, 0);
}

#[test]
fn test_losing_last_life_ends_match() {
    let mut engine = setup_match(EngineConfig::default(), &[SPOT]);
    let state = engine.state_mut();
    for id in state.zones.top_n(Location::zone(P0, ZoneKind::Life), 4) {
        state
            .relocate(id, Location::zone(P0, ZoneKind::Archive), ZonePosition::Bottom)
            .unwrap();
    }
    let center = state.center(P0).unwrap();

    DamageResolver::deal_damage(
        state,
        DamageRequest {
            source: None,
            target: center,
            amount: 60,
            special: true,
            prevent_life_loss: false,
        },
    )
    .unwrap();

    assert_eq!(
        engine.outcome(),
        Some(GameOutcome {
            winner: Some(P1),
            loser: Some(P0),
            reason: GameOverReason::LifeZero,
        })
    );
    assert_eq!(engine.state().phase, Phase::GameOver);
    assert!(engine.pending_decision().is_none());
}

#[test]
fn test_downing_last_holomem_ends_match() {
    let mut engine = setup_match(EngineConfig::default(), &[]);
    let state = engine.state_mut();
    let center = state.center(P1).unwrap();

    DamageResolver::deal_damage(
        state,
        DamageRequest {
            source: None,
            target: center,
            amount: 100,
            special: false,
            prevent_life_loss: true,
        },
    )
    .unwrap();

    let outcome = engine.outcome().unwrap();
    assert_eq!(outcome.loser, Some(P1));
    assert_eq!(outcome.reason, GameOverReason::NoHolomemsOnStage);
    assert_eq!(engine.state().count(P1, ZoneKind::Life), 5);
}

#[test]
fn test_owner_chooses_new_center_among_backstage() {
    let mut engine = setup_match(EngineConfig::default(), &[SPOT, DEBUT]);
    let center = engine.state().center(P0).unwrap();
    let backstage = engine.state().zones.zone(P0, ZoneKind::Backstage).to_vec();

    let state = engine.state_mut();
    state.pending = None;
    DamageResolver::deal_damage(
        state,
        DamageRequest {
            source: None,
            target: center,
            amount: 60,
            special: false,
            prevent_life_loss: true,
        },
    )
    .unwrap();
    assert!(matches!(
        state.stack.last(),
        Some(Frame::Step { .. })
    ));
    engine.run();

    let pending = engine.pending_decision().unwrap();
    assert_eq!(pending.player, P0);
    assert_eq!(
        pending.decision,
        Decision::ChooseNewCenter {
            candidates: backstage.clone()
        }
    );

    act(
        &mut engine,
        P0,
        GameAction::EffectResolutionChooseCardsForEffect {
            card_ids: vec![backstage[1]],
        },
    );
    assert_eq!(engine.state().center(P0), Some(backstage[1]));
    main_options(&engine);
}

#[test]
fn test_reactive_skill_reduces_art_damage() {
    let mut engine = setup_match(EngineConfig::default(), &[SPOT]);
    let spot = engine.state().zones.zone(P0, ZoneKind::Backstage)[0];
    act(&mut engine, P0, GameAction::MainStepCollab { card_id: spot });
    // Only main step skills are offered as actions.
    assert!(!main_options(&engine).iter().any(|a| matches!(
        a,
        AvailableAction::MainStepOshiSkill { skill_id, .. } if skill_id == "guard"
    )));
    end_turn(&mut engine);

    let performer = engine.state().center(P1).unwrap();
    let target = engine.state().center(P0).unwrap();
    act(&mut engine, P1, GameAction::MainStepBeginPerformance);
    act(
        &mut engine,
        P1,
        GameAction::PerformanceStepUseArt {
            performer_id: performer,
            art_id: "nunnun".into(),
            target_id: target,
        },
    );

    let pending = engine.pending_decision().unwrap();
    assert_eq!(pending.player, P0);
    assert_eq!(
        pending.decision,
        Decision::Choice {
            effect_source: engine.state().players[P0].oshi,
            options: vec![
                Effect::new(EffectKind::UseOshiSkill {
                    skill_id: "guard".into()
                }),
                Effect::new(EffectKind::Pass),
            ],
        }
    );
    // Nothing is dealt until the defender answers.
    assert_eq!(engine.state().card(target).unwrap().damage, 0);

    engine.drain_observer_events();
    act(&mut engine, P0, GameAction::EffectResolutionMakeChoice { choice_index: 0 });
    cheer_to_center(&mut engine);

    let observed = engine.drain_observer_events();
    assert!(kinds(&observed).iter().any(|k| matches!(
        k,
        EventKind::OshiSkillActivated { skill_id, holopower_paid: 1, .. } if skill_id == "guard"
    )));
    assert!(kinds(&observed)
        .iter()
        .any(|k| matches!(k, EventKind::DamageDealt { damage: 0, .. })));
    let state = engine.state();
    assert_eq!(state.card(target).unwrap().damage, 0);
    assert_eq!(state.count(P0, ZoneKind::Holopower), 0);
    assert!(state.players[P0].activated.contains("guard"));
}

#[test]
fn test_passing_on_reactive_skill_takes_full_damage() {
    let mut engine = setup_match(EngineConfig::default(), &[SPOT]);
    let spot = engine.state().zones.zone(P0, ZoneKind::Backstage)[0];
    act(&mut engine, P0, GameAction::MainStepCollab { card_id: spot });
    end_turn(&mut engine);

    let performer = engine.state().center(P1).unwrap();
    let target = engine.state().center(P0).unwrap();
    act(&mut engine, P1, GameAction::MainStepBeginPerformance);
    act(
        &mut engine,
        P1,
        GameAction::PerformanceStepUseArt {
            performer_id: performer,
            art_id: "nunnun".into(),
            target_id: target,
        },
    );
    act(&mut engine, P0, GameAction::EffectResolutionMakeChoice { choice_index: 1 });

    let state = engine.state();
    assert_eq!(state.card(target).unwrap().damage, 20);
    assert_eq!(state.count(P0, ZoneKind::Holopower), 1);
}

#[test]
fn test_reactive_skill_waits_for_opponent_turn() {
    let mut engine = setup_match(EngineConfig::default(), &[SPOT]);
    let spot = engine.state().zones.zone(P0, ZoneKind::Backstage)[0];
    act(&mut engine, P0, GameAction::MainStepCollab { card_id: spot });
    let center = engine.state().center(P0).unwrap();

    assert!(Legality::reactive_skills(engine.state(), P0, center).unwrap().is_empty());
    engine.state_mut().active_player = P1;
    assert_eq!(Legality::reactive_skills(engine.state(), P0, center).unwrap(), vec!["guard".to_string()]);
}

// =============================================================================
// Effect-driven turns and blooms
// =============================================================================

#[test]
fn test_extra_turn_keeps_active_player() {
    let mut engine = setup_match(EngineConfig::default(), &[]);
    let oshi = engine.state().players[P0].oshi;
    EffectResolver::execute(
        engine.state_mut(),
        Effect::new(EffectKind::ExtraTurn),
        &EffectContext::new(P0, oshi, EffectTrigger::Support),
    )
    .unwrap();
    assert_eq!(engine.state().players[P0].extra_turns, 1);

    end_turn(&mut engine);
    let state = engine.state();
    assert_eq!(state.turn_number, 2);
    assert_eq!(state.active_player, P0);
    assert_eq!(state.players[P0].turns_taken, 2);
    assert_eq!(state.players[P0].extra_turns, 0);

    end_turn(&mut engine);
    assert_eq!(engine.state().active_player, P1);
}

#[test]
fn test_draw_from_deck_bottom() {
    let mut engine = setup_match(EngineConfig::default(), &[]);
    let bottom = *engine.state().zones.zone(P0, ZoneKind::Deck).last().unwrap();
    let oshi = engine.state().players[P0].oshi;
    let state = engine.state_mut();

    EffectResolver::execute(
        state,
        Effect::new(EffectKind::Draw {
            amount: 1,
            opponent: false,
            from_bottom: true,
        }),
        &EffectContext::new(P0, oshi, EffectTrigger::OshiSkill),
    )
    .unwrap();

    assert_eq!(state.zones.location(bottom), Some(Location::zone(P0, ZoneKind::Hand)));
    assert_eq!(state.card(bottom).unwrap().card_id.as_str(), FAN);
}

#[test]
fn test_effect_blooms_holomem_placed_this_turn() {
    let mut engine = setup_match(EngineConfig::default(), &[]);
    let debut = hand_cards(&engine, P0, DEBUT)[0];
    act(&mut engine, P0, GameAction::MainStepPlaceHolomem { card_id: debut });
    assert!(engine.state().card(debut).unwrap().has_marker(TurnMarker::EnteredStage));
    assert!(!main_options(&engine)
        .iter()
        .any(|a| matches!(a, AvailableAction::MainStepBloom { .. })));

    let blooms = hand_cards(&engine, P0, BLOOM);
    let oshi = engine.state().players[P0].oshi;
    {
        let state = engine.state_mut();
        state.pending = None;
        EffectResolver::execute(
            state,
            Effect::new(EffectKind::Bloom {
                from: BloomSource::Hand,
                target: HolomemScope::OwnBackstage,
            }),
            &EffectContext::new(P0, oshi, EffectTrigger::OshiSkill),
        )
        .unwrap();
    }
    assert_eq!(
        engine.pending_decision().map(|p| &p.decision),
        Some(&Decision::ChooseBloom {
            effect_source: oshi,
            options: blooms
                .iter()
                .map(|&card_id| BloomOption {
                    card_id,
                    target_id: debut,
                })
                .collect(),
        })
    );

    act(&mut engine, P0, GameAction::EffectResolutionMakeChoice { choice_index: 1 });

    let state = engine.state();
    assert_eq!(state.zones.zone(P0, ZoneKind::Backstage), &[blooms[1]]);
    assert_eq!(state.zones.attached(blooms[1], AttachKind::Stacked), &[debut]);
    assert!(state.card(blooms[1]).unwrap().has_marker(TurnMarker::Bloomed));
    main_options(&engine);
}

#[test]
fn test_effect_blooms_from_stacked_card() {
    let mut engine = setup_match(EngineConfig::default(), &[DEBUT]);
    let center = engine.state().center(P0).unwrap();
    let backstage = engine.state().zones.zone(P0, ZoneKind::Backstage)[0];
    let bloom = hand_cards(&engine, P0, BLOOM)[0];
    let state = engine.state_mut();
    state
        .relocate(bloom, Location::attached(center, AttachKind::Stacked), ZonePosition::Bottom)
        .unwrap();

    EffectResolver::execute(
        state,
        Effect::new(EffectKind::Bloom {
            from: BloomSource::Stacked,
            target: HolomemScope::OwnBackstage,
        }),
        &EffectContext::new(P0, center, EffectTrigger::Collab),
    )
    .unwrap();

    assert_eq!(state.zones.zone(P0, ZoneKind::Backstage), &[bloom]);
    assert_eq!(state.zones.attached(bloom, AttachKind::Stacked), &[backstage]);
    assert!(state.zones.attached(center, AttachKind::Stacked).is_empty());
}
