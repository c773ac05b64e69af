//! Continuations: the serializable "rest of the computation".
//!
//! Resolution never blocks. Pending work lives on the resolution stack as
//! plain data:
//!
//! - `Frame::Effects`: effects still to resolve for one source, in order
//! - `Frame::Step`: an engine step (turn phases, art damage, life cheer, ...)
//!
//! When an operation needs player input it posts a `PendingDecision` whose
//! `Resume` holds the typed remainder of that one operation. Everything
//! after it stays on the stack. The engine runs the stack until it is empty
//! or a decision is pending.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::effect::{CardDestination, Effect, Modifier, RemainingCards};
use super::targeting::CardSource;
use crate::core::{InstanceId, PlayerId};
use crate::events::{BloomOption, Decision};
use crate::rules::DamageRequest;

/// What caused an effect to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTrigger {
    Art,
    Bloom,
    Collab,
    Gift,
    OshiSkill,
    Support,
    /// Conditions of a continuous passive.
    Passive,
}

/// Who is resolving what.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectContext {
    /// Controller of the effect.
    pub player: PlayerId,
    /// Card the effect is printed on.
    pub source: InstanceId,
    /// Holomem using the current art, if any.
    pub performer: Option<InstanceId>,
    /// Target of the current art, if any.
    pub art_target: Option<InstanceId>,
    /// Holomem about to take the damage a reactive skill answers.
    #[serde(default)]
    pub damaged: Option<InstanceId>,
    pub trigger: EffectTrigger,
}

impl EffectContext {
    pub fn new(player: PlayerId, source: InstanceId, trigger: EffectTrigger) -> Self {
        Self {
            player,
            source,
            performer: None,
            art_target: None,
            damaged: None,
            trigger,
        }
    }

    /// Context for an art's own effects.
    pub fn for_art(player: PlayerId, performer: InstanceId, target: InstanceId) -> Self {
        Self {
            player,
            source: performer,
            performer: Some(performer),
            art_target: Some(target),
            damaged: None,
            trigger: EffectTrigger::Art,
        }
    }
}

/// Engine continuations that are not card effects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    StartTurn,
    ResetStep,
    DrawStep,
    CheerStep,
    EnterMain,
    EnterPerformance,
    /// Compute final power and deal the art's damage.
    ArtDamage {
        performer: InstanceId,
        target: InstanceId,
        art_id: String,
    },
    /// Damage held back while the defender answered a reactive skill.
    Damage { request: DamageRequest },
    /// After-art gifts of the performer, then clear the art.
    AfterArt { performer: InstanceId },
    EndTurn,
    /// Attach a resolving support to a holomem.
    AttachSupport { card: InstanceId },
    /// Archive a support that is still resolving.
    FinishSupport { card: InstanceId },
    /// Place lost life cards as cheer.
    LifeCheer { player: PlayerId },
    /// Fill an empty center from the backstage.
    ReplaceCenter { player: PlayerId },
}

/// One entry of the resolution stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Frame {
    Effects {
        queue: VecDeque<Effect>,
        ctx: EffectContext,
    },
    Step { step: Step },
}

impl Frame {
    pub fn effects(effects: impl IntoIterator<Item = Effect>, ctx: EffectContext) -> Self {
        Self::Effects {
            queue: effects.into_iter().collect(),
            ctx,
        }
    }

    pub fn step(step: Step) -> Self {
        Self::Step { step }
    }
}

/// Why a holomem is being chosen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "purpose", rename_all = "snake_case")]
pub enum HolomemPurpose {
    DealDamage {
        amount: u32,
        special: bool,
        prevent_life_loss: bool,
    },
    RestoreHp { amount: Option<u32> },
    AddModifier { modifier: Modifier },
    AttachSupport { card: InstanceId },
}

/// The typed remainder of the operation waiting on a decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resume", rename_all = "snake_case")]
pub enum Resume {
    FirstPlayerChoice,
    Mulligan { player: PlayerId },
    InitialPlacement { player: PlayerId },
    MainStep,
    PerformanceStep,
    ChooseCards {
        ctx: EffectContext,
        from: CardSource,
        to: CardDestination,
        looked: Vec<InstanceId>,
        candidates: Vec<InstanceId>,
        amount_min: usize,
        amount_max: usize,
        remaining: RemainingCards,
        reveal: bool,
    },
    ChooseHolomem {
        ctx: EffectContext,
        purpose: HolomemPurpose,
        candidates: Vec<InstanceId>,
    },
    Choice {
        ctx: EffectContext,
        options: Vec<Effect>,
    },
    ChooseBloom {
        ctx: EffectContext,
        options: Vec<BloomOption>,
    },
    OrderCards {
        player: PlayerId,
        cards: Vec<InstanceId>,
    },
    SendCheer {
        cheer: Vec<InstanceId>,
        targets: Vec<InstanceId>,
        amount_min: usize,
        amount_max: usize,
    },
    NewCenter {
        player: PlayerId,
        candidates: Vec<InstanceId>,
    },
}

/// The single outstanding request for player input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub id: u32,
    pub player: PlayerId,
    pub decision: Decision,
    pub resume: Resume,
}
