//! RecordingHooks: records every hook call into a shared log.

use crate::error::BoxError;
use crate::hooks::{EffectHooks, HookResult, HookStage};
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCall {
    /// Label of the effect the hooks belong to.
    pub label: String,
    /// Which hook ran.
    pub stage: HookStage,
}

/// Shared, ordered record of hook calls across many effects.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    calls: Rc<RefCell<Vec<HookCall>>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks for an effect labelled `label` that record into this log.
    pub fn hooks(&self, label: impl Into<String>) -> RecordingHooks {
        RecordingHooks {
            label: label.into(),
            log: self.clone(),
            fail_on: Vec::new(),
        }
    }

    /// Snapshot of all calls so far.
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.borrow().clone()
    }

    /// Calls rendered as `"label:stage"`.
    pub fn rendered(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| format!("{}:{}", c.label, c.stage))
            .collect()
    }

    /// Labels of the calls for one stage, in call order.
    pub fn labels(&self, stage: HookStage) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.stage == stage)
            .map(|c| c.label.clone())
            .collect()
    }

    /// Number of calls of `stage` for `label`.
    pub fn count(&self, label: &str, stage: HookStage) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.label == label && c.stage == stage)
            .count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Append an arbitrary call. Useful for interleaving markers.
    pub fn record(&self, label: impl Into<String>, stage: HookStage) {
        self.calls.borrow_mut().push(HookCall {
            label: label.into(),
            stage,
        });
    }
}

/// [`EffectHooks`] that record each call, optionally failing chosen stages.
#[derive(Debug, Clone)]
pub struct RecordingHooks {
    label: String,
    log: EventLog,
    fail_on: Vec<HookStage>,
}

impl RecordingHooks {
    /// Make `stage` record its call and then fail, every time it runs.
    pub fn failing(mut self, stage: HookStage) -> Self {
        self.fail_on.push(stage);
        self
    }

    fn call(&self, stage: HookStage) -> HookResult {
        self.log.record(self.label.clone(), stage);
        if self.fail_on.contains(&stage) {
            let err: BoxError = format!("{} {stage} failed", self.label).into();
            return Err(err);
        }
        Ok(())
    }
}

impl EffectHooks for RecordingHooks {
    fn setup(&mut self) -> HookResult {
        self.call(HookStage::Setup)
    }

    fn update(&mut self) -> HookResult {
        self.call(HookStage::Update)
    }

    fn teardown(&mut self) -> HookResult {
        self.call(HookStage::Teardown)
    }
}
