//! Match state.
//!
//! `GameState` owns everything about one match: card instances and their
//! locations, both players, turn progress, active modifiers, the resolution
//! stack, the pending decision and the event feeds. It is mutated only by
//! the engine's action pipeline; every zone move it performs is paired with
//! an event.
//!
//! ## Layout
//!
//! - `cards`: instance table, `InstanceId -> CardInstance`
//! - `zones`: where each instance is
//! - `stack` / `pending`: suspended work (see `effects::continuation`)
//! - `events`: redacted per-viewer feeds
//! - `action_history`: persistent log of accepted actions

use std::sync::Arc;

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::action::ActionRecord;
use super::config::{EngineConfig, PlayerSetup};
use super::entity::{InstanceAllocator, InstanceId};
use super::error::{InvariantViolation, SetupError};
use super::player::{PlayerId, PlayerMap, PlayerState};
use super::rng::RandomSource;
use crate::cards::{CardCatalog, CardDefinition, CardId, CardInstance, CardType, Color};
use crate::effects::{Effect, EffectContext, Frame, Modifier, PendingDecision, Resume, Step};
use crate::events::{CardRef, Decision, EventKind, EventQueue};
use crate::zones::{AttachKind, CardMove, Location, ZoneKind, ZoneManager, ZonePosition};

/// Turn phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Reset,
    Draw,
    Cheer,
    Main,
    Performance,
    End,
    GameOver,
}

/// Why a match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    LifeZero,
    DeckOut,
    NoHolomemsOnStage,
    NoDebutInHand,
    Resigned,
    InternalError,
}

/// Final result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Option<PlayerId>,
    pub loser: Option<PlayerId>,
    pub reason: GameOverReason,
}

/// A modifier granted by an effect until the end of the current turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveModifier {
    pub target: InstanceId,
    pub modifier: Modifier,
    pub source: InstanceId,
}

/// The art currently being performed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtInProgress {
    pub performer: InstanceId,
    pub target: InstanceId,
    pub art_id: String,
    pub base_power: u32,
    /// Sum of boosts from the art's own effects so far.
    pub effect_boost: u32,
}

/// Complete state of one match.
#[derive(Debug)]
pub struct GameState {
    pub catalog: Arc<CardCatalog>,
    pub config: EngineConfig,
    pub players: PlayerMap<PlayerState>,
    pub cards: FxHashMap<InstanceId, CardInstance>,
    pub zones: ZoneManager,
    rng: Box<dyn RandomSource>,
    ids: InstanceAllocator,

    // === Progression ===
    pub phase: Phase,
    pub active_player: PlayerId,
    pub first_player: Option<PlayerId>,
    /// Turns started so far across both players. 0 during setup.
    pub turn_number: u32,

    // === Resolution ===
    pub modifiers: Vec<ActiveModifier>,
    pub art: Option<ArtInProgress>,
    pub stack: Vec<Frame>,
    pub pending: Option<PendingDecision>,
    next_decision_id: u32,

    // === Output ===
    pub events: EventQueue,
    pub outcome: Option<GameOutcome>,
    pub action_history: Vector<ActionRecord>,
}

impl GameState {
    /// Build a match from validated setups. Deck cards are placed in list
    /// order; shuffling happens when the game begins.
    pub fn new(
        catalog: Arc<CardCatalog>,
        config: EngineConfig,
        setups: &[PlayerSetup; 2],
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, SetupError> {
        if setups[0].player_id == setups[1].player_id {
            return Err(SetupError::DuplicatePlayer(setups[0].player_id.clone()));
        }

        let mut ids = InstanceAllocator::default();
        let mut cards = FxHashMap::default();
        let mut zones = ZoneManager::new();
        let mut seats = SeatLoader {
            catalog: &catalog,
            ids: &mut ids,
            cards: &mut cards,
            zones: &mut zones,
        };
        let players = [
            seats.load(PlayerId(0), &setups[0])?,
            seats.load(PlayerId(1), &setups[1])?,
        ];

        Ok(Self {
            catalog,
            config,
            players: PlayerMap::from_array(players),
            cards,
            zones,
            rng,
            ids,
            phase: Phase::Setup,
            active_player: PlayerId(0),
            first_player: None,
            turn_number: 0,
            modifiers: Vec::new(),
            art: None,
            stack: Vec::new(),
            pending: None,
            next_decision_id: 0,
            events: EventQueue::new(),
            outcome: None,
            action_history: Vector::new(),
        })
    }

    // === Lookup ===

    pub fn card(&self, id: InstanceId) -> Result<&CardInstance, InvariantViolation> {
        self.cards.get(&id).ok_or(InvariantViolation::MissingInstance(id))
    }

    pub fn card_mut(&mut self, id: InstanceId) -> Result<&mut CardInstance, InvariantViolation> {
        self.cards
            .get_mut(&id)
            .ok_or(InvariantViolation::MissingInstance(id))
    }

    /// Catalog definition of an instance.
    pub fn definition(&self, id: InstanceId) -> Result<&CardDefinition, InvariantViolation> {
        let card_id = &self.card(id)?.card_id;
        self.catalog.require(card_id)
    }

    /// Fully visible reference to a card.
    pub fn card_ref(&self, id: InstanceId) -> Result<CardRef, InvariantViolation> {
        Ok(CardRef::new(id, self.card(id)?.card_id.clone()))
    }

    #[must_use]
    pub fn count(&self, player: PlayerId, zone: ZoneKind) -> usize {
        self.zones.zone(player, zone).len()
    }

    #[must_use]
    pub fn center(&self, player: PlayerId) -> Option<InstanceId> {
        self.zones.zone(player, ZoneKind::Center).first().copied()
    }

    #[must_use]
    pub fn collab(&self, player: PlayerId) -> Option<InstanceId> {
        self.zones.zone(player, ZoneKind::Collab).first().copied()
    }

    /// Colors of the cheer attached to a holomem, one entry per cheer card.
    pub fn attached_cheer_colors(&self, holder: InstanceId) -> Result<Vec<Color>, InvariantViolation> {
        let mut colors = Vec::new();
        for &cheer in self.zones.attached(holder, AttachKind::Cheer) {
            colors.extend(self.definition(cheer)?.colors.iter().copied());
        }
        Ok(colors)
    }

    /// Whether the active player is the first player on their first turn.
    #[must_use]
    pub fn is_first_turn_of_first_player(&self) -> bool {
        self.first_player == Some(self.active_player) && self.players[self.active_player].turns_taken == 1
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Number of card instances created for this match, oshi included.
    #[must_use]
    pub fn instances_created(&self) -> u32 {
        self.ids.allocated()
    }

    // === Mutation ===

    /// Queue an event.
    pub fn emit(&mut self, kind: EventKind) {
        self.events.push(kind);
    }

    /// Move a card and emit `card_moved`.
    pub fn move_card(
        &mut self,
        id: InstanceId,
        to: Location,
        position: ZonePosition,
    ) -> Result<CardMove, InvariantViolation> {
        let mv = self.relocate(id, to, position)?;
        let card = self.card(id)?;
        let event = EventKind::CardMoved {
            owner: card.owner,
            card: CardRef::new(id, card.card_id.clone()),
            from: mv.from,
            to: mv.to,
        };
        self.emit(event);
        Ok(mv)
    }

    /// Move a card without an event. Callers emit a summary event instead.
    ///
    /// Cards leaving the stage forget damage, resting and markers.
    pub fn relocate(
        &mut self,
        id: InstanceId,
        to: Location,
        position: ZonePosition,
    ) -> Result<CardMove, InvariantViolation> {
        let mv = self.zones.move_card(id, to, position)?;
        if !to.is_stage() && mv.from.is_stage() {
            self.card_mut(id)?.reset_play_state();
            self.modifiers.retain(|m| m.target != id);
        }
        Ok(mv)
    }

    /// Shuffle one of a player's zones.
    pub fn shuffle_zone(&mut self, player: PlayerId, zone: ZoneKind) {
        self.zones.shuffle(Location::zone(player, zone), self.rng.as_mut());
        self.emit(EventKind::DeckShuffled { player, zone });
    }

    /// Pick an index in `0..len` from the match's random source.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.rng.pick_index(len)
    }

    /// Draw up to `amount` cards. Returns what was drawn.
    pub fn draw_cards(&mut self, player: PlayerId, amount: usize) -> Result<Vec<InstanceId>, InvariantViolation> {
        let drawn = self.zones.top_n(Location::zone(player, ZoneKind::Deck), amount);
        self.draw_these(player, drawn)
    }

    /// Draw up to `amount` cards from the bottom of the deck, bottom-most
    /// first.
    pub fn draw_from_bottom(&mut self, player: PlayerId, amount: usize) -> Result<Vec<InstanceId>, InvariantViolation> {
        let deck = self.zones.zone(player, ZoneKind::Deck);
        let drawn = deck.iter().rev().take(amount).copied().collect();
        self.draw_these(player, drawn)
    }

    fn draw_these(&mut self, player: PlayerId, drawn: Vec<InstanceId>) -> Result<Vec<InstanceId>, InvariantViolation> {
        let hand = Location::zone(player, ZoneKind::Hand);
        let mut refs = Vec::with_capacity(drawn.len());
        for &id in &drawn {
            self.relocate(id, hand, ZonePosition::Bottom)?;
            refs.push(self.card_ref(id)?);
        }
        let deck_remaining = self.count(player, ZoneKind::Deck);
        self.emit(EventKind::Draw {
            player,
            drawn: refs,
            deck_remaining,
        });
        Ok(drawn)
    }

    /// Push an engine step onto the resolution stack.
    pub fn push_step(&mut self, step: Step) {
        self.stack.push(Frame::step(step));
    }

    /// Push effects to resolve next. Empty lists are dropped.
    pub fn push_effects(&mut self, effects: Vec<Effect>, ctx: EffectContext) {
        if !effects.is_empty() {
            self.stack.push(Frame::effects(effects, ctx));
        }
    }

    /// Post the single outstanding decision.
    pub fn post_decision(
        &mut self,
        player: PlayerId,
        decision: Decision,
        resume: Resume,
    ) -> Result<(), InvariantViolation> {
        if let Some(existing) = &self.pending {
            return Err(InvariantViolation::Inconsistent(format!(
                "decision {} already pending",
                existing.id
            )));
        }

        let id = self.next_decision_id;
        self.next_decision_id += 1;
        self.emit(EventKind::Decision {
            decision_player: player,
            decision_id: id,
            decision: decision.clone(),
        });
        self.pending = Some(PendingDecision {
            id,
            player,
            decision,
            resume,
        });
        Ok(())
    }

    /// End the match. Later calls are ignored.
    pub fn end_game(&mut self, loser: Option<PlayerId>, reason: GameOverReason) {
        if self.outcome.is_some() {
            return;
        }

        let winner = loser.map(PlayerId::opponent);
        info!(?winner, ?loser, ?reason, turn = self.turn_number, "game over");

        self.outcome = Some(GameOutcome { winner, loser, reason });
        self.phase = Phase::GameOver;
        self.pending = None;
        self.stack.clear();
        self.art = None;
        self.emit(EventKind::GameOver { winner, loser, reason });
    }
}

/// Creates one seat's instances during `GameState::new`.
struct SeatLoader<'a> {
    catalog: &'a CardCatalog,
    ids: &'a mut InstanceAllocator,
    cards: &'a mut FxHashMap<InstanceId, CardInstance>,
    zones: &'a mut ZoneManager,
}

impl SeatLoader<'_> {
    /// Oshi first, then the deck and the cheer deck in list order.
    fn load(&mut self, player: PlayerId, setup: &PlayerSetup) -> Result<PlayerState, SetupError> {
        let unknown = |card: &CardId| SetupError::UnknownCard {
            player: setup.player_id.clone(),
            card: card.clone(),
        };

        let oshi_def = self.catalog.get(&setup.oshi_id).ok_or_else(|| unknown(&setup.oshi_id))?;
        if oshi_def.card_type != CardType::Oshi {
            return Err(SetupError::NotOshi {
                card: setup.oshi_id.clone(),
            });
        }
        if setup.deck_size() == 0 {
            return Err(SetupError::EmptyDeck(setup.player_id.clone()));
        }

        let oshi = self.ids.next();
        self.cards.insert(oshi, CardInstance::new(oshi, setup.oshi_id.clone(), player));

        let lists = [
            (&setup.deck, ZoneKind::Deck),
            (&setup.cheer_deck, ZoneKind::CheerDeck),
        ];
        for (entries, zone) in lists {
            for entry in entries {
                let def = self.catalog.get(&entry.card_id).ok_or_else(|| unknown(&entry.card_id))?;
                let fits = match zone {
                    ZoneKind::CheerDeck => def.card_type == CardType::Cheer,
                    _ => def.is_holomem() || def.card_type == CardType::Support,
                };
                if !fits {
                    return Err(SetupError::WrongDeckCard {
                        player: setup.player_id.clone(),
                        card: entry.card_id.clone(),
                    });
                }
                for _ in 0..entry.count {
                    let id = self.ids.next();
                    self.cards.insert(id, CardInstance::new(id, entry.card_id.clone(), player));
                    self.zones
                        .place(id, Location::zone(player, zone), ZonePosition::Bottom)
                        .map_err(|e| SetupError::WrongDeckCard {
                            player: e.to_string(),
                            card: entry.card_id.clone(),
                        })?;
                }
            }
        }

        Ok(PlayerState::new(
            player,
            setup.player_id.clone(),
            setup.username.clone(),
            oshi,
            setup.oshi_id.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedOrder;

    fn catalog() -> Arc<CardCatalog> {
        let mut oshi = CardDefinition::new("oshi", CardType::Oshi);
        oshi.life = 5;
        let debut = CardDefinition::new("debut", CardType::HolomemDebut)
            .with_name("Sora")
            .with_hp(60);
        let cheer = CardDefinition::new("cheer", CardType::Cheer).with_color(Color::White);
        Arc::new(CardCatalog::from_definitions([oshi, debut, cheer]).unwrap())
    }

    fn setups() -> [PlayerSetup; 2] {
        [
            PlayerSetup::new("a", "oshi")
                .with_deck_cards("debut", 3)
                .with_cheer_cards("cheer", 2),
            PlayerSetup::new("b", "oshi")
                .with_deck_cards("debut", 4)
                .with_cheer_cards("cheer", 1),
        ]
    }

    fn state() -> GameState {
        GameState::new(catalog(), EngineConfig::default(), &setups(), Box::new(FixedOrder)).unwrap()
    }

    #[test]
    fn test_new_places_decks_in_order() {
        let state = state();
        let p0 = PlayerId(0);

        assert_eq!(state.count(p0, ZoneKind::Deck), 3);
        assert_eq!(state.count(p0, ZoneKind::CheerDeck), 2);
        assert_eq!(state.count(PlayerId(1), ZoneKind::Deck), 4);

        // Oshi 1, deck 2..=4, cheer 5..=6, then player 1
        assert_eq!(state.players[p0].oshi, InstanceId(1));
        assert_eq!(state.zones.zone(p0, ZoneKind::Deck)[0], InstanceId(2));
        assert_eq!(state.instances_created(), 6 + 6);
        assert!(!state.zones.contains(state.players[p0].oshi));
    }

    #[test]
    fn test_seats_follow_setup_order() {
        let state = state();
        let p1 = PlayerId(1);

        assert_eq!(state.players[PlayerId(0)].external_id, "a");
        assert_eq!(state.players[p1].external_id, "b");
        assert_eq!(state.players[p1].id, p1);
        // Player 0 used ids 1..=6
        assert_eq!(state.players[p1].oshi, InstanceId(7));
        assert_eq!(state.zones.zone(p1, ZoneKind::Deck)[0], InstanceId(8));
        assert_eq!(state.card(InstanceId(7)).unwrap().owner, p1);
    }

    #[test]
    fn test_unknown_card_rejected() {
        let mut bad = setups();
        bad[1] = bad[1].clone().with_deck_cards("missing", 1);
        let err = GameState::new(catalog(), EngineConfig::default(), &bad, Box::new(FixedOrder)).unwrap_err();
        assert!(matches!(err, SetupError::UnknownCard { .. }));
    }

    #[test]
    fn test_cheer_in_main_deck_rejected() {
        let mut bad = setups();
        bad[0] = bad[0].clone().with_deck_cards("cheer", 1);
        let err = GameState::new(catalog(), EngineConfig::default(), &bad, Box::new(FixedOrder)).unwrap_err();
        assert!(matches!(err, SetupError::WrongDeckCard { .. }));
    }

    #[test]
    fn test_non_oshi_rejected() {
        let mut bad = setups();
        bad[0].oshi_id = CardId::from("debut");
        let err = GameState::new(catalog(), EngineConfig::default(), &bad, Box::new(FixedOrder)).unwrap_err();
        assert!(matches!(err, SetupError::NotOshi { .. }));
    }

    #[test]
    fn test_draw_emits_event() {
        let mut state = state();
        let drawn = state.draw_cards(PlayerId(0), 2).unwrap();

        assert_eq!(drawn, vec![InstanceId(2), InstanceId(3)]);
        assert_eq!(state.count(PlayerId(0), ZoneKind::Hand), 2);

        let events = state.events.drain_observer();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "draw");
    }

    #[test]
    fn test_draw_from_bottom() {
        let mut state = state();
        let p1 = PlayerId(1);
        let deck = state.zones.zone(p1, ZoneKind::Deck).to_vec();

        let drawn = state.draw_from_bottom(p1, 2).unwrap();

        assert_eq!(drawn, vec![deck[3], deck[2]]);
        assert_eq!(state.zones.zone(p1, ZoneKind::Deck), &deck[..2]);
        assert_eq!(state.zones.zone(p1, ZoneKind::Hand), drawn.as_slice());
    }

    #[test]
    fn test_leaving_stage_resets_card() {
        let mut state = state();
        let p0 = PlayerId(0);
        let id = state.zones.zone(p0, ZoneKind::Deck)[0];
        state
            .relocate(id, Location::zone(p0, ZoneKind::Center), ZonePosition::Bottom)
            .unwrap();
        state.card_mut(id).unwrap().damage = 30;

        state
            .move_card(id, Location::zone(p0, ZoneKind::Archive), ZonePosition::Bottom)
            .unwrap();
        assert_eq!(state.card(id).unwrap().damage, 0);
    }

    #[test]
    fn test_single_pending_decision() {
        let mut state = state();
        state
            .post_decision(PlayerId(0), Decision::Mulligan { hand_size: 7 }, Resume::Mulligan { player: PlayerId(0) })
            .unwrap();
        let err = state
            .post_decision(PlayerId(1), Decision::Mulligan { hand_size: 7 }, Resume::Mulligan { player: PlayerId(1) })
            .unwrap_err();
        assert!(matches!(err, InvariantViolation::Inconsistent(_)));
    }

    #[test]
    fn test_end_game_once() {
        let mut state = state();
        state.end_game(Some(PlayerId(1)), GameOverReason::DeckOut);
        state.end_game(Some(PlayerId(0)), GameOverReason::Resigned);

        let outcome = state.outcome.unwrap();
        assert_eq!(outcome.winner, Some(PlayerId(0)));
        assert_eq!(outcome.reason, GameOverReason::DeckOut);
        assert_eq!(state.phase, Phase::GameOver);
    }
}
