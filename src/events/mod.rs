//! Event & decision protocol.
//!
//! ## Key Types
//!
//! - `EventKind` / `GameEvent`: Append-only record of what happened
//! - `Decision`: A typed request for player input that suspends resolution
//! - `EventQueue`: Per-player and observer feeds, each drained once

pub mod decision;
pub mod event;
pub mod queue;

pub use decision::{AvailableAction, AvailablePerformance, BloomOption, Decision};
pub use event::{BoostSource, BoostedStat, CardRef, EventKind, GameEvent};
pub use queue::EventQueue;
