//! # ripple-core — Protocol vocabulary for transactional effect scheduling
//!
//! This crate defines the shared types and the three capability seams that
//! the effect manager consumes. It contains no scheduling logic itself.
//!
//! ## The Capabilities
//!
//! | Capability | Trait | What it does |
//! |------------|-------|-------------|
//! | ① Memoization | [`Memoizer`], [`Dispatch`] | Re-run a body only when a tracked read changed |
//! | ② Destruction | [`Destroyable`], [`Disposer`], [`Registration`] | Run teardown when an owner is destroyed |
//! | ③ Scheduling | [`Scheduler`], [`Revalidate`] | Decide when a phase's flush actually runs |
//!
//! ## The Vocabulary
//!
//! | Type | What it is |
//! |------|-----------|
//! | [`Phase`], [`PhaseOrder`] | Named flush buckets and their commit order |
//! | [`EffectHooks`], [`HookStage`] | The setup / update / teardown triple an effect supplies |
//! | [`Strictness`], [`ManagerConfig`] | Whether protocol contracts are checked at runtime |
//! | [`EffectError`], [`ProtocolViolation`] | Everything that can go wrong |
//!
//! ## Threading
//!
//! The model is single-threaded and cooperative. Handles are `Rc`-based and
//! none of the traits require `Send` or `Sync`.

#![deny(missing_docs)]

pub mod config;
pub mod destroy;
pub mod error;
pub mod hooks;
pub mod phase;
pub mod schedule;
pub mod tracking;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use config::{ManagerConfig, Strictness};
pub use destroy::{Destroyable, Disposer, Registration};
pub use error::{BoxError, EffectError, ProtocolViolation};
pub use hooks::{EffectHooks, FnHooks, HookResult, HookStage, fn_hooks};
pub use phase::{Phase, PhaseOrder};
pub use schedule::{Immediate, Revalidate, Scheduler};
pub use tracking::{Body, Dispatch, Memoizer};
