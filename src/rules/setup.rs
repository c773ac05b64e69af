//! Match setup: first player, mulligans and opening placement.
//!
//! ```text
//! begin ─► choose_first_player ─► mulligan(first) ─► mulligan(second)
//!       ─► initial_placement(first) ─► initial_placement(second)
//!       ─► reveal, deal life ─► StartTurn
//! ```

use tracing::{debug, info};

use crate::cards::CardType;
use crate::core::{
    ActionError, EngineError, GameAction, GameOverReason, GameState, InstanceId, InvariantViolation, PlayerId,
};
use crate::effects::{Resume, Step};
use crate::events::{Decision, EventKind};
use crate::zones::{Location, ZoneKind, ZonePosition};

/// Choice index that means "go first".
const GO_FIRST: usize = 0;

pub struct Setup;

impl Setup {
    /// Shuffle, deal opening hands and ask a random player who goes first.
    pub fn begin(state: &mut GameState) -> Result<(), InvariantViolation> {
        for player in PlayerId::both() {
            state.shuffle_zone(player, ZoneKind::Deck);
            state.shuffle_zone(player, ZoneKind::CheerDeck);
        }

        let chooser = PlayerId(state.pick_index(PlayerId::COUNT) as u8);
        let player_names = PlayerId::both()
            .map(|p| state.players[p].username.clone())
            .collect();
        info!(%chooser, "game started");
        state.emit(EventKind::GameStarted { chooser, player_names });

        let hand_size = state.config.starting_hand_size;
        for player in PlayerId::both() {
            state.draw_cards(player, hand_size)?;
        }

        state.post_decision(
            chooser,
            Decision::ChooseFirstPlayer {
                options: vec!["go_first".into(), "go_second".into()],
            },
            Resume::FirstPlayerChoice,
        )
    }

    /// Answer to a setup decision.
    pub fn resume(state: &mut GameState, player: PlayerId, resume: Resume, action: &GameAction) -> Result<(), EngineError> {
        match (resume, action) {
            (Resume::FirstPlayerChoice, GameAction::EffectResolutionMakeChoice { choice_index }) => {
                if *choice_index > 1 {
                    return Err(ActionError::InvalidSelection(format!("no option {choice_index}")).into());
                }
                let first = if *choice_index == GO_FIRST { player } else { player.opponent() };
                state.first_player = Some(first);
                state.active_player = first;
                state.emit(EventKind::FirstPlayerChosen { first_player: first });
                Self::post_mulligan(state, first)?;
                Ok(())
            }

            (Resume::Mulligan { player: who }, GameAction::Mulligan { do_mulligan }) => {
                Self::mulligan(state, who, *do_mulligan)?;
                Ok(())
            }

            (
                Resume::InitialPlacement { player: who },
                GameAction::InitialPlacement {
                    center_id,
                    backstage_ids,
                },
            ) => Self::place(state, who, *center_id, backstage_ids),

            (_, other) => Err(ActionError::UnexpectedAction(other.action_type()).into()),
        }
    }

    fn first_player(state: &GameState) -> Result<PlayerId, InvariantViolation> {
        state
            .first_player
            .ok_or_else(|| InvariantViolation::Inconsistent("first player not chosen".into()))
    }

    fn post_mulligan(state: &mut GameState, player: PlayerId) -> Result<(), InvariantViolation> {
        let hand_size = state.count(player, ZoneKind::Hand);
        state.post_decision(player, Decision::Mulligan { hand_size }, Resume::Mulligan { player })
    }

    fn mulligan(state: &mut GameState, player: PlayerId, redraw: bool) -> Result<(), InvariantViolation> {
        let mut hand_size = state.config.starting_hand_size;
        if redraw {
            Self::redraw(state, player, hand_size)?;
        }
        state.emit(EventKind::Mulligan {
            player,
            redrew: redraw,
            forced: false,
            hand_size,
        });

        while !Self::hand_has_debut(state, player)? {
            let forced = state.players[player].forced_mulligans;
            if hand_size <= 1 || forced >= state.config.max_forced_mulligans {
                state.end_game(Some(player), GameOverReason::NoDebutInHand);
                return Ok(());
            }
            hand_size -= 1;
            state.players[player].forced_mulligans += 1;
            debug!(%player, hand_size, "forced mulligan");
            Self::redraw(state, player, hand_size)?;
            state.emit(EventKind::Mulligan {
                player,
                redrew: true,
                forced: true,
                hand_size,
            });
        }

        let first = Self::first_player(state)?;
        if player == first {
            Self::post_mulligan(state, first.opponent())
        } else {
            Self::post_placement(state, first)
        }
    }

    fn redraw(state: &mut GameState, player: PlayerId, size: usize) -> Result<(), InvariantViolation> {
        let deck = Location::zone(player, ZoneKind::Deck);
        for id in state.zones.zone(player, ZoneKind::Hand).to_vec() {
            state.relocate(id, deck, ZonePosition::Bottom)?;
        }
        state.shuffle_zone(player, ZoneKind::Deck);
        state.draw_cards(player, size)?;
        Ok(())
    }

    fn hand_has_debut(state: &GameState, player: PlayerId) -> Result<bool, InvariantViolation> {
        for &id in state.zones.zone(player, ZoneKind::Hand) {
            if state.definition(id)?.card_type == CardType::HolomemDebut {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn post_placement(state: &mut GameState, player: PlayerId) -> Result<(), InvariantViolation> {
        let mut center_options = Vec::new();
        let mut backstage_options = Vec::new();
        for &id in state.zones.zone(player, ZoneKind::Hand) {
            match state.definition(id)?.card_type {
                CardType::HolomemDebut => {
                    center_options.push(id);
                    backstage_options.push(id);
                }
                CardType::HolomemSpot => backstage_options.push(id),
                _ => {}
            }
        }
        let max_backstage = state.config.max_backstage;
        state.post_decision(
            player,
            Decision::InitialPlacement {
                center_options,
                backstage_options,
                max_backstage,
            },
            Resume::InitialPlacement { player },
        )
    }

    fn place(
        state: &mut GameState,
        player: PlayerId,
        center: InstanceId,
        backstage: &[InstanceId],
    ) -> Result<(), EngineError> {
        let hand = state.zones.zone(player, ZoneKind::Hand);
        if !hand.contains(&center) || state.definition(center)?.card_type != CardType::HolomemDebut {
            return Err(ActionError::InvalidCard(center).into());
        }
        if backstage.len() > state.config.max_backstage {
            return Err(ActionError::InvalidSelection(format!(
                "at most {} backstage holomems",
                state.config.max_backstage
            ))
            .into());
        }
        for (i, &id) in backstage.iter().enumerate() {
            if !hand.contains(&id) || id == center || backstage[..i].contains(&id) {
                return Err(ActionError::InvalidCard(id).into());
            }
            let card_type = state.definition(id)?.card_type;
            if !matches!(card_type, CardType::HolomemDebut | CardType::HolomemSpot) {
                return Err(ActionError::InvalidCard(id).into());
            }
        }

        state.relocate(center, Location::zone(player, ZoneKind::Center), ZonePosition::Bottom)?;
        for &id in backstage {
            state.relocate(id, Location::zone(player, ZoneKind::Backstage), ZonePosition::Bottom)?;
        }
        state.players[player].placed = true;

        if !state.players[player.opponent()].placed {
            Self::post_placement(state, player.opponent())?;
            return Ok(());
        }
        Self::reveal(state)?;
        Ok(())
    }

    /// Both placements are in: show them, deal life, start turn one.
    fn reveal(state: &mut GameState) -> Result<(), InvariantViolation> {
        let first = Self::first_player(state)?;
        for player in [first, first.opponent()] {
            let life = state.definition(state.players[player].oshi)?.life as usize;
            for id in state.zones.top_n(Location::zone(player, ZoneKind::CheerDeck), life) {
                state.relocate(id, Location::zone(player, ZoneKind::Life), ZonePosition::Bottom)?;
            }

            let center = state
                .center(player)
                .ok_or_else(|| InvariantViolation::Inconsistent(format!("{player} has no center")))?;
            let center = state.card_ref(center)?;
            let mut backstage = Vec::new();
            for &id in state.zones.zone(player, ZoneKind::Backstage) {
                backstage.push(state.card_ref(id)?);
            }
            let life = state.count(player, ZoneKind::Life);
            state.emit(EventKind::InitialPlacement {
                player,
                center,
                backstage,
                life,
            });
        }
        state.push_step(Step::StartTurn);
        Ok(())
    }
}
