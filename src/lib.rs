//! # holo-rules
//!
//! Authoritative rules engine for a two-player oshi/holomem trading card game.
//!
//! One `GameEngine` owns one match. The room layer submits actions, the engine
//! validates them against the single pending decision, resolves everything
//! that follows, and queues redacted events per player and for observers.
//!
//! ## Design Principles
//!
//! 1. **One writer**: all mutation goes through `GameEngine::handle_action`.
//!    Rejected actions change nothing.
//!
//! 2. **Explicit continuations**: effect resolution that waits on a player is
//!    a stack of frames plus one pending decision, never a callback.
//!
//! 3. **Data-driven cards**: card behavior comes from the JSON catalog.
//!    Rules code never branches on a card id.
//!
//! ## Modules
//!
//! - `core`: ids, players, state, actions, errors, RNG, configuration
//! - `zones`: card locations and the zone manager
//! - `cards`: card definitions, the catalog and per-instance play state
//! - `effects`: effect data, conditions, targeting and the resolver
//! - `events`: decisions, events and the per-feed event queue
//! - `rules`: setup, turn machine, legality, damage and the engine facade

pub mod cards;
pub mod core;
pub mod effects;
pub mod events;
pub mod rules;
pub mod zones;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use crate::core::{
    ActionError, ActionRecord, EngineConfig, EngineError, GameAction, GameOutcome, GameOverReason, GameRng,
    GameState, InstanceId, Phase, PlayerId, PlayerMap, PlayerSetup, RandomSource, SetupError,
};

pub use crate::cards::{CardCatalog, CardDefinition, CardId, CardType, Color};

pub use crate::events::{Decision, EventKind, GameEvent};

pub use crate::rules::{GameEngine, MatchLog};

pub use crate::zones::{Location, ZoneKind};
