//! Player actions: the only way anything outside the engine changes a match.
//!
//! Actions arrive from the room layer as an `action_type` string plus a JSON
//! payload. `GameAction::parse` turns that pair into a typed action; the
//! shape check against the pending decision happens in the engine.
//!
//! ```
//! use holo_rules::core::GameAction;
//! use serde_json::json;
//!
//! let action = GameAction::parse("main_step_collab", json!({ "card_id": 12 })).unwrap();
//! assert_eq!(action.action_type(), "main_step_collab");
//! ```

use serde::{Deserialize, Serialize};

use super::entity::InstanceId;
use super::error::ActionError;
use super::player::PlayerId;

/// A cheer card and the holomem it should be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheerPlacement {
    pub cheer_id: InstanceId,
    pub holomem_id: InstanceId,
}

/// A typed player action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum GameAction {
    // === Main step ===
    MainStepPlaceHolomem {
        card_id: InstanceId,
    },
    MainStepBloom {
        card_id: InstanceId,
        target_id: InstanceId,
    },
    MainStepCollab {
        card_id: InstanceId,
    },
    MainStepBatonPass {
        card_id: InstanceId,
        #[serde(default)]
        cheer_ids: Vec<InstanceId>,
    },
    MainStepOshiSkill {
        skill_id: String,
    },
    MainStepPlaySupport {
        card_id: InstanceId,
    },
    MainStepBeginPerformance,
    MainStepEndTurn,

    // === Performance step ===
    PerformanceStepUseArt {
        performer_id: InstanceId,
        art_id: String,
        target_id: InstanceId,
    },
    PerformanceStepEndTurn,

    // === Setup and administrative ===
    Resign,
    Mulligan {
        do_mulligan: bool,
    },
    InitialPlacement {
        center_id: InstanceId,
        #[serde(default)]
        backstage_ids: Vec<InstanceId>,
    },

    // === Effect resolution ===
    EffectResolutionChooseCardsForEffect {
        card_ids: Vec<InstanceId>,
    },
    EffectResolutionOrderCards {
        card_ids: Vec<InstanceId>,
    },
    EffectResolutionMakeChoice {
        choice_index: usize,
    },
    EffectResolutionMoveCheerBetweenHolomems {
        placements: Vec<CheerPlacement>,
    },
}

impl GameAction {
    /// All accepted `action_type` strings.
    pub const ACTION_TYPES: [&'static str; 17] = [
        "main_step_place_holomem",
        "main_step_bloom",
        "main_step_collab",
        "main_step_baton_pass",
        "main_step_oshi_skill",
        "main_step_play_support",
        "main_step_begin_performance",
        "main_step_end_turn",
        "performance_step_use_art",
        "performance_step_end_turn",
        "resign",
        "mulligan",
        "initial_placement",
        "effect_resolution_choose_cards_for_effect",
        "effect_resolution_order_cards",
        "effect_resolution_make_choice",
        "effect_resolution_move_cheer_between_holomems",
    ];

    /// Parse a raw `(action_type, action_data)` pair.
    ///
    /// `Null` data is treated as an empty payload.
    pub fn parse(action_type: &str, action_data: serde_json::Value) -> Result<Self, ActionError> {
        if !Self::ACTION_TYPES.iter().any(|known| *known == action_type) {
            return Err(ActionError::UnknownActionType(action_type.to_string()));
        }

        let mut payload = match action_data {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                return Err(ActionError::MalformedPayload(format!(
                    "expected an object, got {other}"
                )))
            }
        };
        payload.insert(
            "action_type".to_string(),
            serde_json::Value::String(action_type.to_string()),
        );

        serde_json::from_value(serde_json::Value::Object(payload))
            .map_err(|e| ActionError::MalformedPayload(e.to_string()))
    }

    /// The wire name of this action.
    #[must_use]
    pub fn action_type(&self) -> &'static str {
        match self {
            Self::MainStepPlaceHolomem { .. } => "main_step_place_holomem",
            Self::MainStepBloom { .. } => "main_step_bloom",
            Self::MainStepCollab { .. } => "main_step_collab",
            Self::MainStepBatonPass { .. } => "main_step_baton_pass",
            Self::MainStepOshiSkill { .. } => "main_step_oshi_skill",
            Self::MainStepPlaySupport { .. } => "main_step_play_support",
            Self::MainStepBeginPerformance => "main_step_begin_performance",
            Self::MainStepEndTurn => "main_step_end_turn",
            Self::PerformanceStepUseArt { .. } => "performance_step_use_art",
            Self::PerformanceStepEndTurn => "performance_step_end_turn",
            Self::Resign => "resign",
            Self::Mulligan { .. } => "mulligan",
            Self::InitialPlacement { .. } => "initial_placement",
            Self::EffectResolutionChooseCardsForEffect { .. } => {
                "effect_resolution_choose_cards_for_effect"
            }
            Self::EffectResolutionOrderCards { .. } => "effect_resolution_order_cards",
            Self::EffectResolutionMakeChoice { .. } => "effect_resolution_make_choice",
            Self::EffectResolutionMoveCheerBetweenHolomems { .. } => {
                "effect_resolution_move_cheer_between_holomems"
            }
        }
    }

    /// Main step actions.
    #[must_use]
    pub fn is_main_step(&self) -> bool {
        self.action_type().starts_with("main_step_")
    }

    /// Performance step actions.
    #[must_use]
    pub fn is_performance_step(&self) -> bool {
        self.action_type().starts_with("performance_step_")
    }
}

/// Record of an accepted action, kept for the match log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Who submitted the action.
    pub player: PlayerId,

    pub action: GameAction,

    /// Turn number when the action was accepted.
    pub turn: u32,

    /// Global sequence number across the match.
    pub sequence: u32,
}
