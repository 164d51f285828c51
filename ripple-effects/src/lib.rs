#![deny(missing_docs)]
//! Transactional effect scheduling.
//!
//! An [`EffectManager`] keeps one ordered queue per phase. Effects are
//! registered between [`begin`](EffectManager::begin) and
//! [`commit`](EffectManager::commit); every commit flushes all phases in
//! phase order, dispatching each live effect through its memoized
//! [`Effect::create_or_update`].
//!
//! ## Ordering
//!
//! Each phase queue remembers its *committed head*, the first node as of the
//! end of the previous commit. New registrations are inserted right before
//! it, so the effects of the newest batch run first, in registration order,
//! followed by every older batch in the same relative order as before.
//!
//! ```
//! use ripple_core::test_utils::{EventLog, StubMemoizer};
//! use ripple_core::{HookStage, Phase};
//! use ripple_effects::EffectManager;
//!
//! let log = EventLog::new();
//! let manager = EffectManager::new(StubMemoizer::always());
//!
//! manager.begin().unwrap();
//! manager.register(&Phase::LAYOUT, log.hooks("a")).unwrap();
//! manager.register(&Phase::LAYOUT, log.hooks("b")).unwrap();
//! manager.commit().unwrap();
//!
//! manager.begin().unwrap();
//! manager.register(&Phase::LAYOUT, log.hooks("c")).unwrap();
//! manager.commit().unwrap();
//!
//! assert_eq!(log.labels(HookStage::Setup), vec!["a", "b", "c"]);
//! assert_eq!(log.labels(HookStage::Update), vec!["a", "b"]);
//! ```
//!
//! ## Lifetime
//!
//! Effects end either through [`EffectManager::dispose`] or, when registered
//! with [`EffectManager::register_owned`], through the owner's destruction.
//! Whichever path removes the effect from its queue first runs teardown.
//! A later owner destruction does nothing; a later `dispose` is reported
//! as a stale effect by strict managers.

mod effect;
mod manager;

pub use effect::Effect;
pub use manager::{EffectHandle, EffectManager, EffectManagerBuilder};
