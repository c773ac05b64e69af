//! Event feeds.
//!
//! Each emission is redacted and queued three times: once per player and
//! once for observers. Feeds are drained independently and each event is
//! returned exactly once per feed. The observer copies are also kept in a
//! persistent history for late joiners and the match log.

use im::Vector;
use tracing::debug;

use super::event::{EventKind, GameEvent};
use crate::core::{PlayerId, PlayerMap};

/// Per-match event feeds.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    next_index: u32,
    player_feeds: PlayerMap<Vec<GameEvent>>,
    observer_feed: Vec<GameEvent>,
    history: Vector<GameEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for both players and observers.
    pub fn push(&mut self, kind: EventKind) -> u32 {
        let index = self.allocate_index();
        debug!(event_index = index, event_type = kind.event_type(), "event");

        for player in PlayerId::both() {
            self.player_feeds[player].push(GameEvent {
                event_index: index,
                event_player_id: Some(player),
                kind: kind.redacted_for(Some(player)),
            });
        }

        let observer = GameEvent {
            event_index: index,
            event_player_id: None,
            kind: kind.redacted_for(None),
        };
        self.history.push_back(observer.clone());
        self.observer_feed.push(observer);
        index
    }

    /// Queue an event for one player only. Not kept in history.
    pub fn push_to(&mut self, player: PlayerId, kind: EventKind) -> u32 {
        let index = self.allocate_index();
        debug!(event_index = index, event_type = kind.event_type(), %player, "private event");

        self.player_feeds[player].push(GameEvent {
            event_index: index,
            event_player_id: Some(player),
            kind,
        });
        index
    }

    /// Drain both player feeds, merged in emission order.
    pub fn drain_player_events(&mut self) -> Vec<GameEvent> {
        let mut all: Vec<GameEvent> = Vec::new();
        for (_, feed) in self.player_feeds.iter_mut() {
            all.append(feed);
        }
        all.sort_by_key(|e| (e.event_index, e.event_player_id));
        all
    }

    /// Drain one player's feed.
    pub fn drain_for(&mut self, player: PlayerId) -> Vec<GameEvent> {
        std::mem::take(&mut self.player_feeds[player])
    }

    /// Drain the observer feed.
    pub fn drain_observer(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.observer_feed)
    }

    /// Every observer event since the match began.
    #[must_use]
    pub fn history(&self) -> &Vector<GameEvent> {
        &self.history
    }

    /// Number of emissions so far.
    #[must_use]
    pub fn emitted(&self) -> u32 {
        self.next_index
    }

    fn allocate_index(&mut self) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        index
    }
}
