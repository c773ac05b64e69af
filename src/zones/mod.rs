//! Zone system for card locations.
//!
//! ## Key Types
//!
//! - `ZoneKind`: Per-player containers (deck, hand, stage slots, life, ...)
//! - `Location`: A player zone or an attachment slot on a host card
//! - `ZoneManager`: Location tracking and atomic movement
//! - `ZonePosition`: Insertion point within a location (top = index 0)

pub mod manager;

pub use manager::{
    AttachKind, CardMove, Location, Placement, ZoneKind, ZoneManager, ZonePosition,
    ZoneVisibility,
};
