use ripple_core::error::{EffectError, ProtocolViolation};
use ripple_core::hooks::{EffectHooks, HookStage};
use ripple_core::tracking::{Dispatch, Memoizer};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

struct Hooks {
    hooks: RefCell<Box<dyn EffectHooks>>,
    has_run_setup: Cell<bool>,
    // Teardown requested while another hook of this effect was running.
    teardown_pending: Cell<bool>,
}

impl Hooks {
    fn call(&self, stage: HookStage) -> Result<(), EffectError> {
        let Ok(mut hooks) = self.hooks.try_borrow_mut() else {
            if stage == HookStage::Teardown {
                self.teardown_pending.set(true);
                tracing::debug!("ripple.effect.teardown_deferred");
                return Ok(());
            }
            return Err(ProtocolViolation::ReentrantHook { stage }.into());
        };
        let result = match stage {
            HookStage::Setup => hooks.setup(),
            HookStage::Update => hooks.update(),
            HookStage::Teardown => hooks.teardown(),
        };
        drop(hooks);
        let result = result.map_err(|source| EffectError::Hook { stage, source });

        if stage == HookStage::Teardown || !self.teardown_pending.replace(false) {
            return result;
        }
        let teardown = self.call(HookStage::Teardown);
        match (result, teardown) {
            (Ok(()), teardown) => teardown,
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(teardown)) => {
                tracing::warn!(error = %teardown, "deferred teardown failed after a failed hook");
                Err(err)
            }
        }
    }

    // Setup is marked as attempted before it runs: a failed setup is not
    // retried and the next dispatch goes to update.
    fn create_or_update(&self) -> Result<(), EffectError> {
        if self.has_run_setup.replace(true) {
            self.call(HookStage::Update)
        } else {
            self.call(HookStage::Setup)
        }
    }
}

/// One registered effect: its hooks plus the memoized dispatcher around them.
pub struct Effect {
    hooks: Rc<Hooks>,
    dispatch: RefCell<Box<dyn Dispatch>>,
}

impl Effect {
    /// Wrap `hooks`, memoizing the setup-or-update body with `memoizer`.
    pub fn new(hooks: impl EffectHooks + 'static, memoizer: &dyn Memoizer) -> Self {
        let hooks = Rc::new(Hooks {
            hooks: RefCell::new(Box::new(hooks)),
            has_run_setup: Cell::new(false),
            teardown_pending: Cell::new(false),
        });
        let body_hooks = Rc::clone(&hooks);
        let dispatch = memoizer.memoize(Box::new(move || body_hooks.create_or_update()));
        Self {
            hooks,
            dispatch: RefCell::new(dispatch),
        }
    }

    /// Memoized dispatch: `setup` the first time the body runs, `update`
    /// afterwards, nothing at all while the memoizer reports no change.
    pub fn create_or_update(&self) -> Result<(), EffectError> {
        let mut dispatch = self
            .dispatch
            .try_borrow_mut()
            .map_err(|_| ProtocolViolation::ReentrantDispatch)?;
        dispatch.dispatch()
    }

    /// Run `teardown`. Does not consult or change whether setup has run and
    /// does not guard against being called twice; the manager calls it at
    /// most once.
    ///
    /// Called from inside one of this effect's own hooks, teardown runs as
    /// soon as that hook returns.
    pub fn dispose(&self) -> Result<(), EffectError> {
        self.hooks.call(HookStage::Teardown)
    }

    /// Whether setup has been attempted.
    pub fn has_run_setup(&self) -> bool {
        self.hooks.has_run_setup.get()
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("has_run_setup", &self.has_run_setup())
            .finish_non_exhaustive()
    }
}
