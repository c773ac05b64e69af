//! Core engine types: identifiers, players, state, actions, RNG, configuration.
//!
//! Nothing here knows how a turn flows; that lives in `rules`. These are the
//! building blocks every other module shares.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{ActionRecord, CheerPlacement, GameAction};
pub use config::{DeckEntry, EngineConfig, PlayerSetup};
pub use entity::{InstanceAllocator, InstanceId};
pub use error::{ActionError, CatalogError, EngineError, InvariantViolation, SetupError};
pub use player::{PlayerId, PlayerMap, PlayerState};
pub use rng::{FixedOrder, GameRng, GameRngState, RandomSource};
pub use state::{ActiveModifier, ArtInProgress, GameOutcome, GameOverReason, GameState, Phase};
