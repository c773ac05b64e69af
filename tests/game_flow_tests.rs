//! Whole-match tests through the public engine API.
//!
//! Actions are submitted as raw `(action_type, action_data)` messages the
//! way a room layer would, and results are read back from the event feeds.

use std::sync::Arc;

use holo_rules::cards::{ArtDefinition, CheerCost, CostColor};
use holo_rules::{
    CardCatalog, CardDefinition, CardType, Color, Decision, EngineConfig, EventKind, GameEngine, GameEvent,
    GameOverReason, MatchLog, Phase, PlayerId, PlayerSetup,
};
use serde_json::json;

const OSHI: &str = "hSD01-001";
const DEBUT: &str = "hSD01-003";
const SPOT: &str = "hSD01-009";
const CHEER: &str = "hY01-001";

fn catalog() -> Arc<CardCatalog> {
    let mut oshi = CardDefinition::new(OSHI, CardType::Oshi).with_color(Color::White);
    oshi.life = 5;

    let debut = CardDefinition::new(DEBUT, CardType::HolomemDebut)
        .with_name("Tokino Sora")
        .with_color(Color::White)
        .with_hp(60)
        .with_art(ArtDefinition {
            art_id: "nunnun".into(),
            power: 30,
            costs: [CheerCost {
                color: CostColor::Any,
                amount: 1,
            }]
            .into_iter()
            .collect(),
            art_effects: Vec::new(),
        });
    let spot = CardDefinition::new(SPOT, CardType::HolomemSpot)
        .with_name("AZKi")
        .with_color(Color::Green)
        .with_hp(50);
    let cheer = CardDefinition::new(CHEER, CardType::Cheer).with_color(Color::White);

    Arc::new(CardCatalog::from_definitions([oshi, debut, spot, cheer]).unwrap())
}

fn player(id: &str) -> PlayerSetup {
    PlayerSetup::new(id, OSHI)
        .with_deck_cards(DEBUT, 14)
        .with_deck_cards(SPOT, 6)
        .with_cheer_cards(CHEER, 20)
}

fn engine(seed: u64) -> GameEngine {
    let mut engine =
        GameEngine::with_seed(catalog(), [player("alice"), player("bob")], EngineConfig::default(), seed).unwrap();
    engine.begin_game();
    engine
}

fn errors(events: &[GameEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::GameError { error_id, .. } => Some(error_id.clone()),
            _ => None,
        })
        .collect()
}

/// Answer setup and cheer decisions with the first legal option until a
/// main step is offered.
fn play_to_main(engine: &mut GameEngine) {
    while let Some(pending) = engine.pending_decision().cloned() {
        let (action_type, data) = match &pending.decision {
            Decision::ChooseFirstPlayer { .. } => ("effect_resolution_make_choice", json!({ "choice_index": 0 })),
            Decision::Mulligan { .. } => ("mulligan", json!({ "do_mulligan": false })),
            Decision::InitialPlacement { center_options, .. } => (
                "initial_placement",
                json!({ "center_id": center_options[0], "backstage_ids": [] }),
            ),
            Decision::SendCheer {
                cheer_options,
                target_options,
                amount_max,
                ..
            } => {
                let placements: Vec<_> = cheer_options
                    .iter()
                    .take(*amount_max)
                    .map(|c| json!({ "cheer_id": c.instance_id, "holomem_id": target_options[0] }))
                    .collect();
                (
                    "effect_resolution_move_cheer_between_holomems",
                    json!({ "placements": placements }),
                )
            }
            _ => return,
        };
        engine.handle_message(pending.player, action_type, data);
        assert_ne!(
            engine.pending_decision().map(|p| p.id),
            Some(pending.id),
            "{action_type} was rejected"
        );
    }
}

// =============================================================================
// Match Flow
// =============================================================================

/// Test that a seeded match reaches the first main step from raw messages.
#[test]
fn test_raw_messages_reach_main_step() {
    let mut engine = engine(7);
    play_to_main(&mut engine);

    let state = engine.state();
    assert_eq!(state.phase, Phase::Main);
    assert_eq!(state.turn_number, 1);
    assert_eq!(Some(state.active_player), state.first_player);
    assert!(matches!(
        engine.pending_decision().map(|p| &p.decision),
        Some(Decision::MainStep { .. })
    ));

    let observed = engine.drain_observer_events();
    let types: Vec<&str> = observed.iter().map(GameEvent::event_type).collect();
    for expected in ["game_started", "first_player_chosen", "initial_placement", "turn_started"] {
        assert!(types.contains(&expected), "missing {expected}");
    }
}

/// Test that observer events arrive in strictly increasing emission order.
#[test]
fn test_observer_events_are_ordered() {
    let mut engine = engine(11);
    play_to_main(&mut engine);

    let observed = engine.drain_observer_events();
    assert!(!observed.is_empty());
    assert!(observed.windows(2).all(|w| w[0].event_index < w[1].event_index));
    assert!(observed.iter().all(|e| e.event_player_id.is_none()));
    assert!(engine.drain_observer_events().is_empty());
}

/// Test that hands are hidden from observers and from the opponent.
#[test]
fn test_draws_are_redacted() {
    let mut engine = engine(3);
    play_to_main(&mut engine);

    for event in engine.drain_observer_events() {
        if let EventKind::Draw { drawn, .. } = &event.kind {
            assert!(drawn.iter().all(|c| c.card_id.is_none()));
        }
    }

    let p0 = PlayerId::new(0);
    for event in engine.drain_events_for(p0) {
        if let EventKind::Draw { player, drawn, .. } = &event.kind {
            assert_eq!(drawn.iter().all(|c| c.card_id.is_some()), *player == p0);
        }
    }
}

/// Test that the same seed and the same answers replay the same match.
#[test]
fn test_seeded_matches_replay_identically() {
    let mut a = engine(42);
    let mut b = engine(42);
    play_to_main(&mut a);
    play_to_main(&mut b);

    assert_eq!(a.drain_observer_events(), b.drain_observer_events());
    assert_eq!(a.drain_player_events(), b.drain_player_events());
}

/// Test that a late observer sees everything already broadcast.
#[test]
fn test_catchup_equals_drained_history() {
    let mut engine = engine(5);
    let mut drained = engine.drain_observer_events();
    play_to_main(&mut engine);
    drained.extend(engine.drain_observer_events());

    assert_eq!(engine.observer_catchup_events(), drained);
}

// =============================================================================
// Rejections
// =============================================================================

/// Test that an unknown action type is reported to its sender only.
#[test]
fn test_unknown_action_type_is_reported() {
    let mut engine = engine(1);
    let pending = engine.pending_decision().cloned().unwrap();
    engine.drain_player_events();

    engine.handle_message(pending.player, "cast_spell", json!({}));

    assert_eq!(errors(&engine.drain_events_for(pending.player)), vec!["unknown_action_type"]);
    assert!(errors(&engine.drain_events_for(pending.player.opponent())).is_empty());
    assert!(errors(&engine.drain_observer_events()).is_empty());
    assert_eq!(engine.pending_decision(), Some(&pending));
}

/// Test that a payload of the wrong shape is rejected without changes.
#[test]
fn test_malformed_payload_is_reported() {
    let mut engine = engine(1);
    let pending = engine.pending_decision().cloned().unwrap();

    engine.handle_message(pending.player, "effect_resolution_make_choice", json!({ "choice_index": "first" }));
    engine.handle_message(pending.player, "effect_resolution_make_choice", json!([0]));

    assert_eq!(
        errors(&engine.drain_events_for(pending.player)),
        vec!["invalid_payload", "invalid_payload"]
    );
    assert_eq!(engine.pending_decision(), Some(&pending));
}

/// Test that only the decision's player may answer it.
#[test]
fn test_other_player_cannot_answer() {
    let mut engine = engine(9);
    let pending = engine.pending_decision().cloned().unwrap();
    let other = pending.player.opponent();

    engine.handle_message(other, "effect_resolution_make_choice", json!({ "choice_index": 0 }));

    assert_eq!(errors(&engine.drain_events_for(other)), vec!["not_your_decision"]);
    assert_eq!(engine.state().first_player, None);
}

/// Test that a well-formed answer to a different decision is rejected.
#[test]
fn test_mismatched_decision_shape_is_rejected() {
    let mut engine = engine(9);
    let pending = engine.pending_decision().cloned().unwrap();

    for _ in 0..3 {
        engine.handle_message(pending.player, "mulligan", json!({ "do_mulligan": true }));
    }

    assert_eq!(errors(&engine.drain_events_for(pending.player)), vec!["invalid_action"; 3]);
    assert_eq!(engine.pending_decision(), Some(&pending));
    assert!(engine.state().action_history.is_empty());
}

/// Test that nothing is accepted before the game begins.
#[test]
fn test_actions_before_begin_are_rejected() {
    let mut engine =
        GameEngine::with_seed(catalog(), [player("alice"), player("bob")], EngineConfig::default(), 1).unwrap();
    let p0 = PlayerId::new(0);

    engine.handle_message(p0, "resign", json!(null));

    assert_eq!(errors(&engine.drain_events_for(p0)), vec!["no_decision_pending"]);
    assert!(!engine.is_game_over());
}

// =============================================================================
// Game Over and Match Log
// =============================================================================

/// Test that resigning ends the match and the log round-trips through JSON.
#[test]
fn test_resign_produces_persistable_log() {
    let mut engine = engine(21);
    play_to_main(&mut engine);
    let loser = engine.state().active_player;

    engine.handle_message(loser, "resign", json!(null));

    assert!(engine.is_game_over());
    let outcome = engine.outcome().unwrap();
    assert_eq!(outcome.loser, Some(loser));
    assert_eq!(outcome.winner, Some(loser.opponent()));
    assert_eq!(outcome.reason, GameOverReason::Resigned);

    let log = engine.get_match_log();
    assert!(log.should_persist());
    assert_eq!(log.reason, Some(GameOverReason::Resigned));
    assert_eq!(log.players[0].external_id, "alice");
    assert_eq!(log.players[1].username, "bob");
    assert_eq!(log.actions.last().map(|r| r.player), Some(loser));
    assert!(log.events.iter().any(|e| e.event_type() == "game_over"));

    let json = log.to_json().unwrap();
    let back: MatchLog = serde_json::from_str(&json).unwrap();
    assert_eq!(back, log);
}

/// Test that a match abandoned during setup is not worth persisting.
#[test]
fn test_match_ended_in_setup_is_not_persisted() {
    let mut engine = engine(2);
    engine.handle_message(PlayerId::new(1), "resign", json!({}));

    assert!(engine.is_game_over());
    assert!(!engine.get_match_log().should_persist());
}

/// Test that messages after game over are ignored without error events.
#[test]
fn test_messages_after_game_over_are_ignored() {
    let mut engine = engine(2);
    engine.handle_message(PlayerId::new(0), "resign", json!({}));
    engine.drain_player_events();
    let actions = engine.state().action_history.len();

    engine.handle_message(PlayerId::new(1), "resign", json!({}));
    engine.handle_message(PlayerId::new(1), "cast_spell", json!({}));

    assert!(engine.drain_player_events().is_empty());
    assert_eq!(engine.state().action_history.len(), actions);
    assert_eq!(engine.outcome().unwrap().loser, Some(PlayerId::new(0)));
}

/// Test that room-layer ids map to seats.
#[test]
fn test_player_id_lookup() {
    let engine = engine(1);
    assert_eq!(engine.player_id_for("alice"), Some(PlayerId::new(0)));
    assert_eq!(engine.player_id_for("bob"), Some(PlayerId::new(1)));
    assert_eq!(engine.player_id_for("carol"), None);
}
