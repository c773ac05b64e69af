//! Game rules: setup, the turn/phase state machine, legality, damage and the
//! engine facade.
//!
//! `GameEngine` is the entry point. Everything else here is driven by it
//! through `TurnMachine::run`.

pub mod damage;
pub mod engine;
pub mod legality;
pub mod match_log;
pub mod setup;
pub mod turn;

pub use damage::{AppliedModifier, DamageRequest, DamageResolver};
pub use engine::GameEngine;
pub use legality::{can_pay, Legality};
pub use match_log::{MatchLog, PlayerSummary};
pub use setup::Setup;
pub use turn::TurnMachine;
