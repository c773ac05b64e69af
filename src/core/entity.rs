//! Card instance identification.
//!
//! Every physical card in a match (deck cards, cheer cards, the oshi) gets a
//! unique `InstanceId` when the match is set up. Copies of the same catalog
//! card share a `CardId` but never an `InstanceId`.
//!
//! ## Allocation
//!
//! Ids are handed out monotonically by `InstanceAllocator` and are never
//! reused, even after the card is archived. Match logs and event consumers
//! rely on this to follow a card across zones.
//!
//! ```
//! use holo_rules::core::{InstanceAllocator, InstanceId};
//!
//! let mut alloc = InstanceAllocator::default();
//! let a = alloc.next();
//! let b = alloc.next();
//!
//! assert_ne!(a, b);
//! assert_eq!(a, InstanceId::new(1));
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card instance within one match.
///
/// Serializes as a bare integer so clients can echo it back in
/// action payloads unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Create an instance id from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for InstanceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card#{}", self.0)
    }
}

/// Monotonic allocator for instance ids.
///
/// Starts at 1 so that 0 never appears in client payloads.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InstanceAllocator {
    last: u32,
}

impl InstanceAllocator {
    /// Allocate the next id.
    pub fn next(&mut self) -> InstanceId {
        self.last += 1;
        InstanceId(self.last)
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut alloc = InstanceAllocator::default();
        let ids: Vec<_> = (0..5).map(|_| alloc.next()).collect();

        assert_eq!(ids[0], InstanceId(1));
        assert_eq!(ids[4], InstanceId(5));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(alloc.allocated(), 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", InstanceId(42)), "Card#42");
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&InstanceId(7)).unwrap();
        assert_eq!(json, "7");

        let back: InstanceId = serde_json::from_str("7").unwrap();
        assert_eq!(back, InstanceId(7));
    }
}
