use crate::effect::Effect;
use ripple_core::config::{ManagerConfig, Strictness};
use ripple_core::destroy::{Destroyable, Registration};
use ripple_core::error::{EffectError, ProtocolViolation};
use ripple_core::hooks::{EffectHooks, HookResult, fn_hooks};
use ripple_core::phase::{Phase, PhaseOrder};
use ripple_core::schedule::{Immediate, Revalidate, Scheduler};
use ripple_core::tracking::Memoizer;
use ripple_queue::{NodeId, OrderedQueue};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifies one registered effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectHandle {
    phase: Phase,
    node: NodeId,
}

impl EffectHandle {
    /// The phase the effect was registered in.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The effect's queue node.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

struct PhaseQueue {
    phase: Phase,
    effects: OrderedQueue<Rc<Effect>>,
    committed_head: Option<NodeId>,
    // Set when the revalidation handed out by the latest commit has run.
    last_flush: Option<Rc<Cell<bool>>>,
    // Owner entries of owned effects, withdrawn on manual dispose.
    registrations: HashMap<NodeId, Registration>,
}

impl PhaseQueue {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            effects: OrderedQueue::new(),
            committed_head: None,
            last_flush: None,
            registrations: HashMap::new(),
        }
    }

    fn handle(&self, node: NodeId) -> EffectHandle {
        EffectHandle {
            phase: self.phase.clone(),
            node,
        }
    }

    // Removing the committed head hands the role to its successor, keeping
    // later batches ahead of every surviving committed effect.
    fn remove(&mut self, node: NodeId) -> Option<Rc<Effect>> {
        if self.committed_head == Some(node) {
            self.committed_head = self.effects.next(node);
        }
        self.effects.remove(node).ok()
    }
}

type SharedQueue = Rc<RefCell<PhaseQueue>>;

/// Owns the per-phase queues and the transaction state.
///
/// All methods take `&self`, so a manager can be shared (e.g. behind an `Rc`)
/// with the effects it runs.
pub struct EffectManager {
    strictness: Strictness,
    phases: PhaseOrder,
    queues: Vec<SharedQueue>,
    scheduler: Box<dyn Scheduler>,
    memoizer: Box<dyn Memoizer>,
    in_transaction: Cell<bool>,
}

impl EffectManager {
    /// A manager with the default config and the [`Immediate`] scheduler.
    pub fn new(memoizer: impl Memoizer + 'static) -> Self {
        Self::builder(memoizer).build()
    }

    /// Start building a manager around `memoizer`.
    pub fn builder(memoizer: impl Memoizer + 'static) -> EffectManagerBuilder {
        EffectManagerBuilder {
            config: ManagerConfig::default(),
            scheduler: Box::new(Immediate),
            memoizer: Box::new(memoizer),
        }
    }

    /// Open a transaction.
    pub fn begin(&self) -> Result<(), EffectError> {
        if self.in_transaction.get() {
            if self.strictness.is_strict() {
                return Err(ProtocolViolation::TransactionAlreadyOpen.into());
            }
            tracing::warn!("begin called while a transaction is already open");
        }
        self.in_transaction.set(true);
        tracing::debug!("ripple.transaction.begin");
        Ok(())
    }

    /// Register an effect in `phase`. Only valid inside a transaction.
    ///
    /// The effect first runs on the next commit. Its lifetime is the
    /// caller's: end it with [`dispose`](Self::dispose).
    pub fn register(
        &self,
        phase: impl AsRef<str>,
        hooks: impl EffectHooks + 'static,
    ) -> Result<EffectHandle, EffectError> {
        let phase = phase.as_ref();
        if !self.in_transaction.get() {
            if self.strictness.is_strict() {
                return Err(ProtocolViolation::NotInTransaction.into());
            }
            tracing::warn!(phase, "effect registered outside of a transaction");
        }
        let queue = self.queue(phase)?;
        let effect = Rc::new(Effect::new(hooks, self.memoizer.as_ref()));

        let mut queue = queue.borrow_mut();
        // Removal repairs the committed head, so it is always live here.
        let reference = queue.committed_head;
        debug_assert!(reference.is_none_or(|head| queue.effects.contains(head)));
        let node = queue
            .effects
            .insert_before(effect, reference)
            .map_err(|_| ProtocolViolation::StaleEffect {
                phase: queue.phase.clone(),
            })?;
        tracing::debug!(phase, node = %node, before = ?reference, "ripple.effect.register");
        Ok(queue.handle(node))
    }

    /// Register an effect from three closures.
    pub fn register_effect<S, U, T>(
        &self,
        phase: impl AsRef<str>,
        setup: S,
        update: U,
        teardown: T,
    ) -> Result<EffectHandle, EffectError>
    where
        S: FnMut() -> HookResult + 'static,
        U: FnMut() -> HookResult + 'static,
        T: FnMut() -> HookResult + 'static,
    {
        self.register(phase, fn_hooks(setup, update, teardown))
    }

    /// Register an effect whose lifetime ends when `owner` is destroyed.
    ///
    /// Destroying the owner removes the effect from its queue and runs its
    /// teardown, unless [`dispose`](Self::dispose) got there first. If the
    /// owner is already destroyed the effect is removed and torn down before
    /// this returns. Disposing the effect withdraws it from the owner.
    pub fn register_owned(
        &self,
        owner: &dyn Destroyable,
        phase: impl AsRef<str>,
        hooks: impl EffectHooks + 'static,
    ) -> Result<EffectHandle, EffectError> {
        let handle = self.register(phase, hooks)?;
        let queue = self.queue(handle.phase.as_str())?;
        let weak = Rc::downgrade(queue);
        let node = handle.node;
        let registration = owner.on_destroy(Box::new(move || teardown_node(&weak, node)))?;
        let mut queue = queue.borrow_mut();
        if !registration.is_spent() && queue.effects.contains(node) {
            queue.registrations.insert(node, registration);
        }
        Ok(handle)
    }

    /// Remove an effect and run its teardown.
    ///
    /// Disposing an effect that is no longer registered is a protocol
    /// violation; lenient managers ignore it.
    pub fn dispose(&self, handle: &EffectHandle) -> Result<(), EffectError> {
        let queue = self.queue(handle.phase.as_str())?;
        let (removed, registration) = {
            let mut queue = queue.borrow_mut();
            (queue.remove(handle.node), queue.registrations.remove(&handle.node))
        };
        if let Some(registration) = registration {
            registration.cancel();
        }
        match removed {
            Some(effect) => {
                tracing::debug!(phase = %handle.phase, node = %handle.node, "ripple.effect.dispose");
                effect.dispose()
            }
            None if self.strictness.is_strict() => Err(ProtocolViolation::StaleEffect {
                phase: handle.phase.clone(),
            }
            .into()),
            None => {
                tracing::warn!(phase = %handle.phase, node = %handle.node, "dispose of an effect that is not registered");
                Ok(())
            }
        }
    }

    /// Close the transaction and flush every phase in phase order.
    ///
    /// For each phase the scheduler receives a [`Revalidate`]; once the
    /// scheduler returns, the phase's committed head moves to the queue's
    /// current head. A hook failure stops the commit: later phases are not
    /// scheduled and the failing phase keeps its previous committed head.
    pub fn commit(&self) -> Result<(), EffectError> {
        self.in_transaction.set(false);
        tracing::debug!(phases = self.queues.len(), "ripple.transaction.commit");

        for queue in &self.queues {
            let (phase, revalidate) = {
                let mut q = queue.borrow_mut();
                if q.last_flush.as_ref().is_some_and(|ran| !ran.get()) {
                    tracing::warn!(phase = %q.phase, "revalidation from the previous commit has not run yet");
                }
                let ran = Rc::new(Cell::new(false));
                q.last_flush = Some(Rc::clone(&ran));
                (q.phase.clone(), revalidate_for(q.phase.clone(), queue, ran))
            };

            let span = tracing::debug_span!("ripple.phase.flush", phase = %phase);
            let _enter = span.enter();
            self.scheduler.schedule(&phase, revalidate)?;

            let mut q = queue.borrow_mut();
            let head = q.effects.head();
            q.committed_head = head;
        }
        Ok(())
    }

    /// Run `f` inside a transaction and commit afterwards.
    ///
    /// If `f` fails the transaction is closed without flushing and the error
    /// is returned. Effects `f` registered stay registered and run on the
    /// next commit.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&Self) -> Result<R, EffectError>,
    ) -> Result<R, EffectError> {
        self.begin()?;
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                self.in_transaction.set(false);
                tracing::debug!(error = %err, "ripple.transaction.abandon");
                Err(err)
            }
        }
    }

    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction.get()
    }

    /// The phases, in flush order.
    pub fn phases(&self) -> &PhaseOrder {
        &self.phases
    }

    /// Contract checking mode.
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Number of live effects in `phase`.
    pub fn len(&self, phase: impl AsRef<str>) -> Result<usize, EffectError> {
        Ok(self.queue(phase.as_ref())?.borrow().effects.len())
    }

    /// Whether `handle` names a live effect.
    pub fn is_registered(&self, handle: &EffectHandle) -> bool {
        self.queue(handle.phase.as_str())
            .map(|q| q.borrow().effects.contains(handle.node))
            .unwrap_or(false)
    }

    /// Whether the effect behind `handle` has attempted setup.
    pub fn has_run_setup(&self, handle: &EffectHandle) -> Option<bool> {
        let queue = self.queue(handle.phase.as_str()).ok()?;
        let queue = queue.borrow();
        queue.effects.get(handle.node).map(|e| e.has_run_setup())
    }

    /// Handles of `phase`'s live effects in the order a revalidation visits them.
    pub fn visit_order(&self, phase: impl AsRef<str>) -> Result<Vec<EffectHandle>, EffectError> {
        let queue = self.queue(phase.as_ref())?.borrow();
        Ok(queue.effects.iter().map(|(id, _)| queue.handle(id)).collect())
    }

    /// The node new registrations in `phase` are inserted before.
    pub fn committed_head(
        &self,
        phase: impl AsRef<str>,
    ) -> Result<Option<EffectHandle>, EffectError> {
        let queue = self.queue(phase.as_ref())?.borrow();
        Ok(queue.committed_head.map(|id| queue.handle(id)))
    }

    fn queue(&self, phase: &str) -> Result<&SharedQueue, EffectError> {
        self.phases
            .position(phase)
            .and_then(|i| self.queues.get(i))
            .ok_or_else(|| EffectError::UnknownPhase(phase.to_string()))
    }
}

impl fmt::Debug for EffectManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes: Vec<(String, usize)> = self
            .queues
            .iter()
            .map(|q| {
                let q = q.borrow();
                (q.phase.to_string(), q.effects.len())
            })
            .collect();
        f.debug_struct("EffectManager")
            .field("strictness", &self.strictness)
            .field("in_transaction", &self.in_transaction.get())
            .field("queues", &sizes)
            .finish_non_exhaustive()
    }
}

/// Builder for [`EffectManager`].
pub struct EffectManagerBuilder {
    config: ManagerConfig,
    scheduler: Box<dyn Scheduler>,
    memoizer: Box<dyn Memoizer>,
}

impl EffectManagerBuilder {
    /// Replace the whole config.
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the strictness.
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.config.strictness = strictness;
        self
    }

    /// Set the phase order.
    pub fn phases(mut self, phases: PhaseOrder) -> Self {
        self.config.phases = phases;
        self
    }

    /// Set the scheduling hook.
    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Box::new(scheduler);
        self
    }

    /// Build the manager, creating one empty queue per phase.
    pub fn build(self) -> EffectManager {
        let queues = self
            .config
            .phases
            .iter()
            .map(|phase| Rc::new(RefCell::new(PhaseQueue::new(phase.clone()))))
            .collect();
        EffectManager {
            strictness: self.config.strictness,
            phases: self.config.phases,
            queues,
            scheduler: self.scheduler,
            memoizer: self.memoizer,
            in_transaction: Cell::new(false),
        }
    }
}

fn revalidate_for(phase: Phase, queue: &SharedQueue, ran: Rc<Cell<bool>>) -> Revalidate {
    let queue = Rc::downgrade(queue);
    Revalidate::new(phase, move || {
        ran.set(true);
        match queue.upgrade() {
            Some(queue) => revalidate_queue(&queue),
            None => Ok(()),
        }
    })
}

// The queue is only borrowed between dispatches, so hooks may register,
// dispose or destroy owners while the pass runs.
fn revalidate_queue(queue: &RefCell<PhaseQueue>) -> Result<(), EffectError> {
    let pass = queue.borrow_mut().effects.start_pass();
    let mut visited = 0usize;
    let result = loop {
        let next = queue
            .borrow_mut()
            .effects
            .advance(&pass)
            .map(|(_, effect)| Rc::clone(effect));
        let Some(effect) = next else {
            break Ok(());
        };
        visited += 1;
        if let Err(err) = effect.create_or_update() {
            break Err(err);
        }
    };
    let mut q = queue.borrow_mut();
    q.effects.finish_pass(pass);
    tracing::trace!(phase = %q.phase, visited, "ripple.phase.revalidated");
    result
}

fn teardown_node(queue: &Weak<RefCell<PhaseQueue>>, node: NodeId) -> Result<(), EffectError> {
    let Some(queue) = queue.upgrade() else {
        return Ok(());
    };
    let removed = {
        let mut queue = queue.borrow_mut();
        queue.registrations.remove(&node);
        queue.remove(node)
    };
    match removed {
        Some(effect) => {
            tracing::debug!(node = %node, "ripple.effect.destroy");
            effect.dispose()
        }
        None => Ok(()),
    }
}
