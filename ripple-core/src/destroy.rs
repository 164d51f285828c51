//! The destruction-association capability.

use crate::error::EffectError;
use std::fmt;

/// Cleanup registered against an owner. Runs at most once.
pub type Disposer = Box<dyn FnOnce() -> Result<(), EffectError>>;

/// Receipt for a registered disposer.
///
/// [`cancel`](Self::cancel) withdraws the disposer without running it.
/// Dropping the receipt leaves the disposer registered.
pub struct Registration {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Registration {
    /// A receipt whose `cancel` runs `cancel`.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A receipt with nothing left to withdraw, e.g. because the disposer
    /// already ran.
    pub fn spent() -> Self {
        Self { cancel: None }
    }

    /// Whether cancelling could still withdraw anything.
    pub fn is_spent(&self) -> bool {
        self.cancel.is_none()
    }

    /// Withdraw the disposer. A no-op when it already ran.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Something whose destruction can trigger registered cleanup.
///
/// Implementations must run each disposer at most once, at a deterministic
/// point (an explicit destroy call or the end of the owner's scope), never
/// at the whim of a collector.
pub trait Destroyable {
    /// Run `disposer` when this owner is destroyed.
    ///
    /// If the owner is already destroyed, the disposer runs immediately, its
    /// error is returned, and on success the receipt is [`Registration::spent`].
    fn on_destroy(&self, disposer: Disposer) -> Result<Registration, EffectError>;

    /// Whether the owner has been destroyed.
    fn is_destroyed(&self) -> bool;
}
