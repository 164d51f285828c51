#![deny(missing_docs)]
//! # ripple — umbrella crate
//!
//! A single import surface for ripple's effect scheduling. Re-exports the
//! protocol crate and its implementations behind feature flags, plus a
//! `prelude` for the common path: one [`Runtime`](ripple_tags::Runtime)
//! for memoization, [`Owner`](ripple_destroy::Owner)s for destruction and
//! an [`EffectManager`](ripple_effects::EffectManager) driving both.

#[cfg(feature = "core")]
pub use ripple_core;
#[cfg(feature = "destroy")]
pub use ripple_destroy;
#[cfg(feature = "effects")]
pub use ripple_effects;
#[cfg(feature = "effects")]
pub use ripple_queue;
#[cfg(feature = "tags")]
pub use ripple_tags;

/// Happy-path imports for wiring effects.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use ripple_core::{
        Destroyable, EffectError, EffectHooks, HookResult, HookStage, ManagerConfig, Memoizer,
        Phase, PhaseOrder, ProtocolViolation, Revalidate, Scheduler, Strictness, fn_hooks,
    };

    #[cfg(feature = "effects")]
    pub use ripple_effects::{EffectHandle, EffectManager};

    #[cfg(feature = "tags")]
    pub use ripple_tags::{Runtime, Tracked};

    #[cfg(feature = "destroy")]
    pub use ripple_destroy::Owner;
}
