//! Effect Resolution Engine.
//!
//! Card text is data: `Effect` descriptors with `Condition`s and usage
//! limits, loaded from the catalog. `EffectResolver` is the only place they
//! gain behavior.
//!
//! ## Key Types
//!
//! - `EffectKind`: closed set of operations, matched exhaustively
//! - `Condition`: predicates gating an effect or narrowing its targets
//! - `TargetSelector`: scopes and sources to concrete instance ids
//! - `Frame` / `Resume`: serializable continuations

pub mod condition;
pub mod continuation;
pub mod effect;
pub mod resolver;
pub mod targeting;

pub use condition::{Condition, ConditionEvaluator};
pub use continuation::{EffectContext, EffectTrigger, Frame, HolomemPurpose, PendingDecision, Resume, Step};
pub use effect::{
    BloomSource, CardDestination, CheerSource, CountSource, Effect, EffectKind, LimitScope, Modifier, ModifierKind,
    RemainingCards, UsageLimit,
};
pub use resolver::{validate_selection, EffectResolver};
pub use targeting::{CardFilter, CardSource, HolomemScope, TargetSelector};
