//! Game events.
//!
//! An event records something that happened. Each emission is copied once
//! per player and once for observers; every copy is redacted for its viewer
//! before it is queued, so hidden information never reaches a feed that
//! should not see it.
//!
//! ## Wire shape
//!
//! `GameEvent` flattens its `EventKind`, so `event_type`, `event_index` and
//! `event_player_id` all sit at the top level:
//!
//! ```json
//! { "event_index": 41, "event_player_id": 0, "event_type": "damage_dealt", "target_id": 12, ... }
//! ```

use serde::{Deserialize, Serialize};

use super::decision::Decision;
use crate::cards::CardId;
use crate::core::{GameOverReason, InstanceId, Phase, PlayerId};
use crate::effects::Modifier;
use crate::zones::{Location, ZoneKind, ZoneVisibility};

/// A card as shown to one viewer. `card_id` is `None` when the viewer may
/// not know which card it is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRef {
    pub instance_id: InstanceId,
    pub card_id: Option<CardId>,
}

impl CardRef {
    pub fn new(instance_id: InstanceId, card_id: CardId) -> Self {
        Self {
            instance_id,
            card_id: Some(card_id),
        }
    }

    /// Same card with its identity removed.
    #[must_use]
    pub fn hidden(&self) -> CardRef {
        CardRef {
            instance_id: self.instance_id,
            card_id: None,
        }
    }
}

/// Stat changed by a boost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostedStat {
    Power,
    Hp,
}

/// Where a boost came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostSource {
    /// An effect resolving during the art.
    ArtEffect,
    /// A modifier added earlier this turn.
    TurnModifier,
    /// An attached support.
    Support,
    /// A passive on a stage holomem.
    Passive,
}

/// What happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventKind {
    // === Setup ===
    GameStarted {
        chooser: PlayerId,
        player_names: Vec<String>,
    },
    FirstPlayerChosen {
        first_player: PlayerId,
    },
    Mulligan {
        player: PlayerId,
        redrew: bool,
        forced: bool,
        hand_size: usize,
    },
    InitialPlacement {
        player: PlayerId,
        center: CardRef,
        backstage: Vec<CardRef>,
        life: usize,
    },

    // === Turn flow ===
    TurnStarted {
        active_player: PlayerId,
        turn_number: u32,
    },
    PhaseChanged {
        active_player: PlayerId,
        phase: Phase,
    },
    ResetStep {
        active_player: PlayerId,
        activated: Vec<InstanceId>,
        collab_returned: Option<InstanceId>,
    },
    Draw {
        player: PlayerId,
        drawn: Vec<CardRef>,
        deck_remaining: usize,
    },

    // === Movement ===
    CardMoved {
        owner: PlayerId,
        card: CardRef,
        from: Location,
        to: Location,
    },
    DeckShuffled {
        player: PlayerId,
        zone: ZoneKind,
    },

    // === Main step ===
    Bloom {
        player: PlayerId,
        bloom_card: CardRef,
        target_id: InstanceId,
    },
    Collab {
        player: PlayerId,
        collab_id: InstanceId,
        holopower_generated: usize,
    },
    BatonPass {
        player: PlayerId,
        center_id: InstanceId,
        backstage_id: InstanceId,
        cheer_archived: Vec<InstanceId>,
    },
    PlaySupport {
        player: PlayerId,
        card: CardRef,
        limited: bool,
    },
    OshiSkillActivated {
        player: PlayerId,
        skill_id: String,
        holopower_paid: u32,
    },

    // === Performance and damage ===
    PerformArt {
        player: PlayerId,
        performer_id: InstanceId,
        art_id: String,
        target_id: InstanceId,
        power: u32,
    },
    BoostStat {
        player: PlayerId,
        holomem_id: InstanceId,
        stat: BoostedStat,
        amount: u32,
        source: BoostSource,
        source_id: InstanceId,
    },
    ModifierAdded {
        player: PlayerId,
        holomem_id: InstanceId,
        modifier: Modifier,
    },
    DamageDealt {
        source_id: Option<InstanceId>,
        target_id: InstanceId,
        target_player: PlayerId,
        damage: u32,
        special: bool,
        total_damage: u32,
        died: bool,
    },
    RestoreHp {
        target_id: InstanceId,
        target_player: PlayerId,
        healed: u32,
        remaining_damage: u32,
    },
    DownedHolomem {
        target_id: InstanceId,
        target_player: PlayerId,
        was_center: bool,
        life_lost: u32,
        life_loss_prevented: bool,
        game_over: bool,
    },
    LifeLost {
        player: PlayerId,
        cards: Vec<CardRef>,
        life_remaining: usize,
    },

    // === Protocol ===
    Decision {
        decision_player: PlayerId,
        decision_id: u32,
        decision: Decision,
    },
    GameError {
        player: PlayerId,
        error_id: String,
        message: String,
    },
    GameOver {
        winner: Option<PlayerId>,
        loser: Option<PlayerId>,
        reason: GameOverReason,
    },
}

impl EventKind {
    /// Wire name of the event.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::GameStarted { .. } => "game_started",
            Self::FirstPlayerChosen { .. } => "first_player_chosen",
            Self::Mulligan { .. } => "mulligan",
            Self::InitialPlacement { .. } => "initial_placement",
            Self::TurnStarted { .. } => "turn_started",
            Self::PhaseChanged { .. } => "phase_changed",
            Self::ResetStep { .. } => "reset_step",
            Self::Draw { .. } => "draw",
            Self::CardMoved { .. } => "card_moved",
            Self::DeckShuffled { .. } => "deck_shuffled",
            Self::Bloom { .. } => "bloom",
            Self::Collab { .. } => "collab",
            Self::BatonPass { .. } => "baton_pass",
            Self::PlaySupport { .. } => "play_support",
            Self::OshiSkillActivated { .. } => "oshi_skill_activated",
            Self::PerformArt { .. } => "perform_art",
            Self::BoostStat { .. } => "boost_stat",
            Self::ModifierAdded { .. } => "modifier_added",
            Self::DamageDealt { .. } => "damage_dealt",
            Self::RestoreHp { .. } => "restore_hp",
            Self::DownedHolomem { .. } => "downed_holomem",
            Self::LifeLost { .. } => "life_lost",
            Self::Decision { .. } => "decision",
            Self::GameError { .. } => "game_error",
            Self::GameOver { .. } => "game_over",
        }
    }

    /// Copy of this event as `viewer` may see it. `None` is an observer.
    #[must_use]
    pub fn redacted_for(&self, viewer: Option<PlayerId>) -> EventKind {
        match self {
            Self::Draw {
                player,
                drawn,
                deck_remaining,
            } if viewer != Some(*player) => Self::Draw {
                player: *player,
                drawn: drawn.iter().map(CardRef::hidden).collect(),
                deck_remaining: *deck_remaining,
            },

            Self::CardMoved {
                owner,
                card,
                from,
                to,
            } if !move_visible(viewer, *owner, *from, *to) => Self::CardMoved {
                owner: *owner,
                card: card.hidden(),
                from: *from,
                to: *to,
            },

            Self::Decision {
                decision_player,
                decision_id,
                decision,
            } => Self::Decision {
                decision_player: *decision_player,
                decision_id: *decision_id,
                decision: decision.redacted_for(viewer, *decision_player),
            },

            other => other.clone(),
        }
    }
}

/// Identity of a moved card is visible when either end is public, or when
/// the viewer owns it and either end is owner-only.
fn move_visible(viewer: Option<PlayerId>, owner: PlayerId, from: Location, to: Location) -> bool {
    let ends = [from.visibility(), to.visibility()];
    if ends.contains(&ZoneVisibility::Public) {
        return true;
    }
    viewer == Some(owner) && ends.contains(&ZoneVisibility::OwnerOnly)
}

/// A queued event addressed to one feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Position in the match's emission order. Shared by all copies.
    pub event_index: u32,
    /// Recipient seat, `None` for the observer copy.
    pub event_player_id: Option<PlayerId>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl GameEvent {
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }
}
