//! The hook triple an effect is built from.

use crate::error::BoxError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of running a single hook.
pub type HookResult = Result<(), BoxError>;

/// Which of the three lifecycle hooks is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStage {
    /// First dispatch of an effect.
    Setup,
    /// Every dispatch after the first.
    Update,
    /// Destruction of the effect.
    Teardown,
}

impl HookStage {
    /// Lowercase stage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Update => "update",
            Self::Teardown => "teardown",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side-effecting lifecycle hooks supplied by whoever registers an effect.
///
/// The manager guarantees `setup` runs on the first dispatch, `update` on every
/// later dispatch, and `teardown` at most once when the effect is destroyed.
/// An effect may be torn down without ever having been set up.
///
/// A failing hook is not retried. In particular a failing `setup` still counts
/// as the first dispatch: the next dispatch calls `update`.
pub trait EffectHooks {
    /// Called on the first dispatch.
    fn setup(&mut self) -> HookResult;

    /// Called on every dispatch after the first.
    fn update(&mut self) -> HookResult;

    /// Called once when the effect is destroyed.
    fn teardown(&mut self) -> HookResult;
}

/// [`EffectHooks`] assembled from three closures. Build with [`fn_hooks`].
pub struct FnHooks<S, U, T> {
    setup: S,
    update: U,
    teardown: T,
}

/// Build an [`EffectHooks`] from three closures.
pub fn fn_hooks<S, U, T>(setup: S, update: U, teardown: T) -> FnHooks<S, U, T>
where
    S: FnMut() -> HookResult,
    U: FnMut() -> HookResult,
    T: FnMut() -> HookResult,
{
    FnHooks {
        setup,
        update,
        teardown,
    }
}

impl<S, U, T> EffectHooks for FnHooks<S, U, T>
where
    S: FnMut() -> HookResult,
    U: FnMut() -> HookResult,
    T: FnMut() -> HookResult,
{
    fn setup(&mut self) -> HookResult {
        (self.setup)()
    }

    fn update(&mut self) -> HookResult {
        (self.update)()
    }

    fn teardown(&mut self) -> HookResult {
        (self.teardown)()
    }
}

impl<S, U, T> fmt::Debug for FnHooks<S, U, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHooks").finish_non_exhaustive()
    }
}
