//! The scheduling hook, where the host decides when phases flush.
//!
//! On commit the manager hands the scheduler one [`Revalidate`] per phase.
//! The default [`Immediate`] scheduler runs it on the spot. Other schedulers
//! may hold it and run it later, e.g. from a host event loop, but they must
//! run it before the next commit of the same manager. Real-time ordering
//! across phases is only guaranteed for synchronous schedulers.

use crate::error::EffectError;
use crate::phase::Phase;
use std::fmt;
use std::rc::Rc;

/// Re-runs every live effect of one phase, in queue order.
///
/// Cheap to clone. Running it more than once revisits the queue each time;
/// memoization keeps unchanged effects from doing any work.
#[derive(Clone)]
pub struct Revalidate {
    phase: Phase,
    run: Rc<dyn Fn() -> Result<(), EffectError>>,
}

impl Revalidate {
    /// Wrap a revalidation closure for `phase`.
    pub fn new(phase: Phase, run: impl Fn() -> Result<(), EffectError> + 'static) -> Self {
        Self {
            phase,
            run: Rc::new(run),
        }
    }

    /// The phase this revalidation flushes.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Run the pass. Hook failures propagate and end the pass early.
    pub fn run(&self) -> Result<(), EffectError> {
        (self.run)()
    }
}

impl fmt::Debug for Revalidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Revalidate")
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

/// Decides when a phase's revalidation runs.
pub trait Scheduler {
    /// Called once per phase, in phase order, on every commit.
    fn schedule(&self, phase: &Phase, revalidate: Revalidate) -> Result<(), EffectError>;
}

/// Runs every revalidation synchronously inside `commit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Scheduler for Immediate {
    fn schedule(&self, _phase: &Phase, revalidate: Revalidate) -> Result<(), EffectError> {
        revalidate.run()
    }
}

impl<F> Scheduler for F
where
    F: Fn(&Phase, Revalidate) -> Result<(), EffectError>,
{
    fn schedule(&self, phase: &Phase, revalidate: Revalidate) -> Result<(), EffectError> {
        self(phase, revalidate)
    }
}
