//! End-of-match record handed to the persistence layer.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::{ActionRecord, GameOverReason, GameState, PlayerId};
use crate::events::GameEvent;

/// Public information about one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player: PlayerId,
    pub external_id: String,
    pub username: String,
    pub oshi_id: CardId,
}

/// Structured record of a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchLog {
    pub players: Vec<PlayerSummary>,
    pub first_player: Option<PlayerId>,
    pub turn_number: u32,
    pub winner: Option<PlayerId>,
    pub loser: Option<PlayerId>,
    pub reason: Option<GameOverReason>,
    /// Observer-visible events in emission order.
    pub events: Vec<GameEvent>,
    pub actions: Vec<ActionRecord>,
}

impl MatchLog {
    pub fn from_state(state: &GameState) -> Self {
        let players = PlayerId::both()
            .map(|p| {
                let player = &state.players[p];
                PlayerSummary {
                    player: p,
                    external_id: player.external_id.clone(),
                    username: player.username.clone(),
                    oshi_id: player.oshi_card.clone(),
                }
            })
            .collect();

        Self {
            players,
            first_player: state.first_player,
            turn_number: state.turn_number,
            winner: state.outcome.and_then(|o| o.winner),
            loser: state.outcome.and_then(|o| o.loser),
            reason: state.outcome.map(|o| o.reason),
            events: state.events.history().iter().cloned().collect(),
            actions: state.action_history.iter().cloned().collect(),
        }
    }

    /// Matches that ended before any turn started are not worth keeping.
    #[must_use]
    pub fn should_persist(&self) -> bool {
        self.turn_number > 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
