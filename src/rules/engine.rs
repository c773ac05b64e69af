//! Game engine facade.
//!
//! `GameEngine` owns one match. The room layer feeds it actions and drains
//! events; nothing else mutates the match.
//!
//! ## Action pipeline
//!
//! 1. Ignore everything once the game is over
//! 2. `resign` is accepted at any time from either player
//! 3. Otherwise the action must answer the pending decision: same player,
//!    matching shape, legal payload
//! 4. The answer resumes the suspended operation and the stack runs until
//!    the next decision
//!
//! A rejected action leaves the match untouched and sends a `game_error`
//! event to the sender only. An internal inconsistency ends the match.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::match_log::MatchLog;
use super::setup::Setup;
use super::turn::TurnMachine;
use crate::cards::CardCatalog;
use crate::core::{
    ActionError, ActionRecord, EngineConfig, EngineError, GameAction, GameOutcome, GameOverReason, GameRng,
    GameState, InvariantViolation, PlayerId, PlayerSetup, RandomSource, SetupError,
};
use crate::effects::PendingDecision;
use crate::events::{EventKind, GameEvent};

/// One match.
#[derive(Debug)]
pub struct GameEngine {
    state: GameState,
    started: bool,
}

impl GameEngine {
    /// Build a match. Nothing happens until `begin_game`.
    pub fn new(
        catalog: Arc<CardCatalog>,
        players: [PlayerSetup; 2],
        config: EngineConfig,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, SetupError> {
        let state = GameState::new(catalog, config, &players, rng)?;
        Ok(Self { state, started: false })
    }

    /// Build a match driven by a seeded `GameRng`.
    pub fn with_seed(
        catalog: Arc<CardCatalog>,
        players: [PlayerSetup; 2],
        config: EngineConfig,
        seed: u64,
    ) -> Result<Self, SetupError> {
        Self::new(catalog, players, config, Box::new(GameRng::new(seed)))
    }

    /// Shuffle, deal and post the first decision. Later calls do nothing.
    pub fn begin_game(&mut self) {
        if self.started {
            warn!("begin_game called twice");
            return;
        }
        self.started = true;

        let result = Setup::begin(&mut self.state).and_then(|()| TurnMachine::run(&mut self.state));
        if let Err(violation) = result {
            self.fail(violation);
        }
    }

    /// Submit a typed action.
    pub fn handle_action(&mut self, player: PlayerId, action: GameAction) {
        if self.state.is_game_over() {
            warn!(%player, action = action.action_type(), "action after game over ignored");
            return;
        }

        match self.process(player, action) {
            Ok(()) => {}
            Err(EngineError::Action(err)) => self.reject(player, &err),
            Err(EngineError::Invariant(violation)) => self.fail(violation),
        }
    }

    /// Submit a raw `(action_type, action_data)` message.
    pub fn handle_message(&mut self, player: PlayerId, action_type: &str, action_data: serde_json::Value) {
        if self.state.is_game_over() {
            warn!(%player, action_type, "message after game over ignored");
            return;
        }
        match GameAction::parse(action_type, action_data) {
            Ok(action) => self.handle_action(player, action),
            Err(err) => self.reject(player, &err),
        }
    }

    fn process(&mut self, player: PlayerId, action: GameAction) -> Result<(), EngineError> {
        if !self.started {
            return Err(ActionError::NoDecisionPending.into());
        }

        if action == GameAction::Resign {
            self.record(player, action);
            info!(%player, "player resigned");
            self.state.end_game(Some(player), GameOverReason::Resigned);
            return Ok(());
        }

        let pending = self.state.pending.as_ref().ok_or(ActionError::NoDecisionPending)?;
        if pending.player != player {
            return Err(ActionError::NotYourDecision(pending.player).into());
        }
        if !pending.decision.expects(&action) {
            return Err(ActionError::UnexpectedAction(action.action_type()).into());
        }

        let pending = self
            .state
            .pending
            .take()
            .ok_or(InvariantViolation::Inconsistent("pending decision vanished".into()))?;
        match TurnMachine::resume(&mut self.state, pending.clone(), &action) {
            Ok(()) => {}
            Err(EngineError::Action(err)) => {
                self.state.pending = Some(pending);
                return Err(err.into());
            }
            Err(violation) => return Err(violation),
        }

        self.record(player, action);
        TurnMachine::run(&mut self.state)?;
        Ok(())
    }

    fn record(&mut self, player: PlayerId, action: GameAction) {
        let sequence = self.state.action_history.len() as u32;
        let turn = self.state.turn_number;
        self.state.action_history.push_back(ActionRecord {
            player,
            action,
            turn,
            sequence,
        });
    }

    fn reject(&mut self, player: PlayerId, err: &ActionError) {
        warn!(%player, error = %err, "action rejected");
        self.state.events.push_to(
            player,
            EventKind::GameError {
                player,
                error_id: err.error_id().to_string(),
                message: err.to_string(),
            },
        );
    }

    fn fail(&mut self, violation: InvariantViolation) {
        error!(%violation, turn = self.state.turn_number, "invariant violation, ending match");
        self.state.end_game(None, GameOverReason::InternalError);
    }

    // === Event feeds ===

    /// Both players' feeds, merged in emission order.
    pub fn drain_player_events(&mut self) -> Vec<GameEvent> {
        self.state.events.drain_player_events()
    }

    pub fn drain_events_for(&mut self, player: PlayerId) -> Vec<GameEvent> {
        self.state.events.drain_for(player)
    }

    pub fn drain_observer_events(&mut self) -> Vec<GameEvent> {
        self.state.events.drain_observer()
    }

    /// Every observer event so far, for someone joining mid-match.
    #[must_use]
    pub fn observer_catchup_events(&self) -> Vec<GameEvent> {
        self.state.events.history().iter().cloned().collect()
    }

    // === Queries ===

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.state.outcome
    }

    #[must_use]
    pub fn get_match_log(&self) -> MatchLog {
        MatchLog::from_state(&self.state)
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn pending_decision(&self) -> Option<&PendingDecision> {
        self.state.pending.as_ref()
    }

    /// Seat of the player with a room-layer id.
    #[must_use]
    pub fn player_id_for(&self, external_id: &str) -> Option<PlayerId> {
        self.state
            .players
            .iter()
            .find(|(_, p)| p.external_id == external_id)
            .map(|(id, _)| id)
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Run the stack after test code changed the state directly.
    #[cfg(test)]
    pub(crate) fn run(&mut self) {
        if let Err(violation) = TurnMachine::run(&mut self.state) {
            self.fail(violation);
        }
    }
}
