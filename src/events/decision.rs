//! Decisions: typed requests for player input.
//!
//! A decision enumerates the legal answers (candidate cards, available
//! actions, options). `expects` is the shape check: which `action_type`s can
//! answer it. Membership and counts are checked by whoever resumes it.

use serde::{Deserialize, Serialize};

use super::event::CardRef;
use crate::core::{GameAction, InstanceId, PlayerId};
use crate::effects::{CardDestination, CardSource, Effect};
use crate::zones::ZoneVisibility;

/// A legal main step action, with its parameters filled in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum AvailableAction {
    MainStepPlaceHolomem { card_id: InstanceId },
    MainStepBloom { card_id: InstanceId, target_id: InstanceId },
    MainStepCollab { card_id: InstanceId },
    /// `card_id` is the backstage holomem that becomes center.
    MainStepBatonPass { card_id: InstanceId, cost: u32 },
    MainStepOshiSkill { skill_id: String, cost: u32 },
    MainStepPlaySupport { card_id: InstanceId },
    MainStepBeginPerformance,
    MainStepEndTurn,
}

impl AvailableAction {
    /// Whether `action` is this option. Baton pass cheer ids are checked
    /// separately.
    #[must_use]
    pub fn permits(&self, action: &GameAction) -> bool {
        match (self, action) {
            (Self::MainStepPlaceHolomem { card_id }, GameAction::MainStepPlaceHolomem { card_id: c }) => card_id == c,
            (
                Self::MainStepBloom { card_id, target_id },
                GameAction::MainStepBloom { card_id: c, target_id: t },
            ) => card_id == c && target_id == t,
            (Self::MainStepCollab { card_id }, GameAction::MainStepCollab { card_id: c }) => card_id == c,
            (Self::MainStepBatonPass { card_id, .. }, GameAction::MainStepBatonPass { card_id: c, .. }) => {
                card_id == c
            }
            (Self::MainStepOshiSkill { skill_id, .. }, GameAction::MainStepOshiSkill { skill_id: s }) => {
                skill_id == s
            }
            (Self::MainStepPlaySupport { card_id }, GameAction::MainStepPlaySupport { card_id: c }) => {
                card_id == c
            }
            (Self::MainStepBeginPerformance, GameAction::MainStepBeginPerformance) => true,
            (Self::MainStepEndTurn, GameAction::MainStepEndTurn) => true,
            _ => false,
        }
    }
}

/// One way an effect may bloom: `card_id` onto `target_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloomOption {
    pub card_id: InstanceId,
    pub target_id: InstanceId,
}

/// A legal performance step action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum AvailablePerformance {
    PerformanceStepUseArt {
        performer_id: InstanceId,
        art_id: String,
        power: u32,
        valid_targets: Vec<InstanceId>,
    },
    PerformanceStepEndTurn,
}

impl AvailablePerformance {
    #[must_use]
    pub fn permits(&self, action: &GameAction) -> bool {
        match (self, action) {
            (
                Self::PerformanceStepUseArt { performer_id, art_id, valid_targets, .. },
                GameAction::PerformanceStepUseArt { performer_id: p, art_id: a, target_id },
            ) => performer_id == p && art_id == a && valid_targets.contains(target_id),
            (Self::PerformanceStepEndTurn, GameAction::PerformanceStepEndTurn) => true,
            _ => false,
        }
    }
}

/// A request for input from one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision_type", rename_all = "snake_case")]
pub enum Decision {
    /// Option 0 goes first, option 1 goes second.
    ChooseFirstPlayer { options: Vec<String> },

    Mulligan { hand_size: usize },

    InitialPlacement {
        center_options: Vec<InstanceId>,
        backstage_options: Vec<InstanceId>,
        max_backstage: usize,
    },

    MainStep { available_actions: Vec<AvailableAction> },

    PerformanceStep { available_actions: Vec<AvailablePerformance> },

    ChooseCards {
        effect_source: InstanceId,
        from: CardSource,
        to: CardDestination,
        cards_seen: Vec<CardRef>,
        candidates: Vec<InstanceId>,
        amount_min: usize,
        amount_max: usize,
        reveal: bool,
    },

    ChooseHolomemForEffect {
        effect_source: InstanceId,
        candidates: Vec<InstanceId>,
        amount_min: usize,
        amount_max: usize,
    },

    Choice {
        effect_source: InstanceId,
        options: Vec<Effect>,
    },

    /// Pick one bloom by index.
    ChooseBloom {
        effect_source: InstanceId,
        options: Vec<BloomOption>,
    },

    /// Order cards going to the bottom of the deck. They are placed in the
    /// answered order, so the last one ends up bottom-most.
    OrderCards { cards: Vec<CardRef> },

    SendCheer {
        cheer_options: Vec<CardRef>,
        target_options: Vec<InstanceId>,
        amount_min: usize,
        amount_max: usize,
    },

    ChooseNewCenter { candidates: Vec<InstanceId> },
}

impl Decision {
    /// Wire name.
    #[must_use]
    pub fn decision_type(&self) -> &'static str {
        match self {
            Self::ChooseFirstPlayer { .. } => "choose_first_player",
            Self::Mulligan { .. } => "mulligan",
            Self::InitialPlacement { .. } => "initial_placement",
            Self::MainStep { .. } => "main_step",
            Self::PerformanceStep { .. } => "performance_step",
            Self::ChooseCards { .. } => "choose_cards",
            Self::ChooseHolomemForEffect { .. } => "choose_holomem_for_effect",
            Self::Choice { .. } => "choice",
            Self::ChooseBloom { .. } => "choose_bloom",
            Self::OrderCards { .. } => "order_cards",
            Self::SendCheer { .. } => "send_cheer",
            Self::ChooseNewCenter { .. } => "choose_new_center",
        }
    }

    /// Shape check: can `action` answer this decision at all.
    #[must_use]
    pub fn expects(&self, action: &GameAction) -> bool {
        match self {
            Self::ChooseFirstPlayer { .. } | Self::Choice { .. } | Self::ChooseBloom { .. } => {
                matches!(action, GameAction::EffectResolutionMakeChoice { .. })
            }
            Self::Mulligan { .. } => matches!(action, GameAction::Mulligan { .. }),
            Self::InitialPlacement { .. } => matches!(action, GameAction::InitialPlacement { .. }),
            Self::MainStep { .. } => action.is_main_step(),
            Self::PerformanceStep { .. } => action.is_performance_step(),
            Self::ChooseCards { .. }
            | Self::ChooseHolomemForEffect { .. }
            | Self::ChooseNewCenter { .. } => {
                matches!(action, GameAction::EffectResolutionChooseCardsForEffect { .. })
            }
            Self::OrderCards { .. } => matches!(action, GameAction::EffectResolutionOrderCards { .. }),
            Self::SendCheer { .. } => {
                matches!(action, GameAction::EffectResolutionMoveCheerBetweenHolomems { .. })
            }
        }
    }

    /// Copy of this decision as `viewer` may see it. The decision's own
    /// player sees everything.
    #[must_use]
    pub fn redacted_for(&self, viewer: Option<PlayerId>, owner: PlayerId) -> Decision {
        if viewer == Some(owner) {
            return self.clone();
        }

        match self {
            Self::InitialPlacement { max_backstage, .. } => Self::InitialPlacement {
                center_options: Vec::new(),
                backstage_options: Vec::new(),
                max_backstage: *max_backstage,
            },
            Self::MainStep { .. } => Self::MainStep {
                available_actions: Vec::new(),
            },
            Self::ChooseCards {
                effect_source,
                from,
                to,
                cards_seen,
                candidates,
                amount_min,
                amount_max,
                reveal,
            } => {
                let hidden = !*reveal
                    && from.zone().is_some_and(|z| z.visibility() != ZoneVisibility::Public);
                Self::ChooseCards {
                    effect_source: *effect_source,
                    from: *from,
                    to: *to,
                    cards_seen: if hidden {
                        cards_seen.iter().map(CardRef::hidden).collect()
                    } else {
                        cards_seen.clone()
                    },
                    candidates: if hidden { Vec::new() } else { candidates.clone() },
                    amount_min: *amount_min,
                    amount_max: *amount_max,
                    reveal: *reveal,
                }
            }
            Self::OrderCards { cards } => Self::OrderCards {
                cards: cards.iter().map(CardRef::hidden).collect(),
            },
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;

    #[test]
    fn test_expects_shape() {
        let choice = Decision::Choice {
            effect_source: InstanceId(1),
            options: Vec::new(),
        };
        assert!(choice.expects(&GameAction::EffectResolutionMakeChoice { choice_index: 0 }));
        assert!(!choice.expects(&GameAction::MainStepEndTurn));

        let main = Decision::MainStep { available_actions: Vec::new() };
        assert!(main.expects(&GameAction::MainStepEndTurn));
        assert!(!main.expects(&GameAction::PerformanceStepEndTurn));

        let bloom = Decision::ChooseBloom {
            effect_source: InstanceId(1),
            options: vec![BloomOption {
                card_id: InstanceId(2),
                target_id: InstanceId(3),
            }],
        };
        assert!(bloom.expects(&GameAction::EffectResolutionMakeChoice { choice_index: 0 }));
        assert_eq!(bloom.decision_type(), "choose_bloom");

        let center = Decision::ChooseNewCenter { candidates: vec![InstanceId(4)] };
        assert!(center.expects(&GameAction::EffectResolutionChooseCardsForEffect {
            card_ids: vec![InstanceId(4)],
        }));
    }

    #[test]
    fn test_available_action_permits() {
        let bloom = AvailableAction::MainStepBloom {
            card_id: InstanceId(5),
            target_id: InstanceId(6),
        };
        assert!(bloom.permits(&GameAction::MainStepBloom {
            card_id: InstanceId(5),
            target_id: InstanceId(6),
        }));
        assert!(!bloom.permits(&GameAction::MainStepBloom {
            card_id: InstanceId(5),
            target_id: InstanceId(7),
        }));
    }

    #[test]
    fn test_art_permits_checks_target() {
        let art = AvailablePerformance::PerformanceStepUseArt {
            performer_id: InstanceId(1),
            art_id: "a".into(),
            power: 30,
            valid_targets: vec![InstanceId(9)],
        };
        assert!(art.permits(&GameAction::PerformanceStepUseArt {
            performer_id: InstanceId(1),
            art_id: "a".into(),
            target_id: InstanceId(9),
        }));
        assert!(!art.permits(&GameAction::PerformanceStepUseArt {
            performer_id: InstanceId(1),
            art_id: "a".into(),
            target_id: InstanceId(8),
        }));
    }

    #[test]
    fn test_deck_choice_hidden_from_opponent() {
        let decision = Decision::ChooseCards {
            effect_source: InstanceId(1),
            from: CardSource::DeckTop { count: 2 },
            to: CardDestination::Hand,
            cards_seen: vec![CardRef::new(InstanceId(10), CardId::from("hSD01-003"))],
            candidates: vec![InstanceId(10)],
            amount_min: 0,
            amount_max: 1,
            reveal: false,
        };

        let owner_view = decision.redacted_for(Some(PlayerId(0)), PlayerId(0));
        assert_eq!(owner_view, decision);

        match decision.redacted_for(None, PlayerId(0)) {
            Decision::ChooseCards { cards_seen, candidates, .. } => {
                assert!(cards_seen[0].card_id.is_none());
                assert!(candidates.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_archive_choice_visible_to_opponent() {
        let decision = Decision::ChooseCards {
            effect_source: InstanceId(1),
            from: CardSource::Archive,
            to: CardDestination::Hand,
            cards_seen: vec![CardRef::new(InstanceId(10), CardId::from("hSD01-003"))],
            candidates: vec![InstanceId(10)],
            amount_min: 1,
            amount_max: 1,
            reveal: false,
        };
        assert_eq!(decision.redacted_for(Some(PlayerId(1)), PlayerId(0)), decision);
    }
}
