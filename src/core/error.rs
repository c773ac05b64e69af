//! Error taxonomy.
//!
//! ## Kinds
//!
//! - `ActionError`: the submitted action is not acceptable right now. Turned
//!   into a `game_error` event for the submitting player; state is unchanged.
//! - `InvariantViolation`: engine state is inconsistent. Ends the match with
//!   reason `internal_error`.
//! - `CatalogError` / `SetupError`: bad card data or bad match setup,
//!   reported before any turn is played.
//!
//! `EngineError` joins the first two so action handlers can use `?` on both.

use thiserror::Error;

use super::entity::InstanceId;
use super::player::PlayerId;
use crate::cards::CardId;

/// A user action that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("unknown action type `{0}`")]
    UnknownActionType(String),

    #[error("malformed action payload: {0}")]
    MalformedPayload(String),

    #[error("no decision is pending")]
    NoDecisionPending,

    #[error("waiting on a decision from {0}")]
    NotYourDecision(PlayerId),

    #[error("action `{0}` does not answer the pending decision")]
    UnexpectedAction(&'static str),

    #[error("{0} is not a legal card for this action")]
    InvalidCard(InstanceId),

    #[error("{0} is not a legal target")]
    InvalidTarget(InstanceId),

    #[error("action is not legal now: {0}")]
    NotAllowed(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}

impl ActionError {
    /// Stable identifier carried in `game_error` events.
    #[must_use]
    pub fn error_id(&self) -> &'static str {
        match self {
            Self::UnknownActionType(_) => "unknown_action_type",
            Self::MalformedPayload(_) => "invalid_payload",
            Self::NoDecisionPending => "no_decision_pending",
            Self::NotYourDecision(_) => "not_your_decision",
            Self::UnexpectedAction(_) => "invalid_action",
            Self::InvalidCard(_) => "invalid_card",
            Self::InvalidTarget(_) => "invalid_target",
            Self::NotAllowed(_) => "action_not_allowed",
            Self::InvalidSelection(_) => "invalid_selection",
        }
    }
}

/// Engine state is inconsistent. Never caused by user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{0} does not exist")]
    MissingInstance(InstanceId),

    #[error("{0} is already placed")]
    DuplicatePlacement(InstanceId),

    #[error("no catalog definition for {0}")]
    UnknownCard(CardId),

    #[error("inconsistent state: {0}")]
    Inconsistent(String),
}

/// Either kind of failure raised while applying an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// Card catalog failed to load.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("card {0} is defined more than once")]
    Duplicate(CardId),

    #[error("card {card} is invalid: {reason}")]
    Invalid { card: CardId, reason: String },
}

/// Match could not be set up.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("configuration is not valid json: {0}")]
    Config(#[from] serde_json::Error),

    #[error("player {player} references unknown card {card}")]
    UnknownCard { player: String, card: CardId },

    #[error("{card} is not an oshi card")]
    NotOshi { card: CardId },

    #[error("player {player} deck has a card of the wrong type: {card}")]
    WrongDeckCard { player: String, card: CardId },

    #[error("player {0} has an empty deck")]
    EmptyDeck(String),

    #[error("both players use the id {0}")]
    DuplicatePlayer(String),
}
