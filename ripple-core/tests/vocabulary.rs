//! Acceptance tests for the ripple-core vocabulary crate.
//!
//! Tests cover:
//! - Phase order validation and serde shape
//! - Config parsing and defaults
//! - Hook assembly from closures
//! - Error display and classification
//! - The test doubles behind `test-utils`

use ripple_core::test_utils::{DeferredScheduler, EventLog, RecordingScheduler, StubMemoizer};
use ripple_core::*;
use std::cell::Cell;
use std::rc::Rc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Object safety: Box<dyn Trait> compiles
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn _assert_object_safe<T: ?Sized>() {}

#[test]
fn capability_traits_are_object_safe() {
    _assert_object_safe::<Box<dyn Memoizer>>();
    _assert_object_safe::<Box<dyn Dispatch>>();
    _assert_object_safe::<Box<dyn Destroyable>>();
    _assert_object_safe::<Box<dyn Scheduler>>();
    _assert_object_safe::<Box<dyn EffectHooks>>();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Phases
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn default_order_is_layout_only() {
    let order = PhaseOrder::default();
    assert_eq!(order.len(), 1);
    assert_eq!(order.position("layout"), Some(0));
    assert_eq!(Phase::LAYOUT.as_str(), "layout");
}

#[test]
fn static_and_owned_phases_compare_equal() {
    assert_eq!(Phase::LAYOUT, Phase::new("layout"));
    assert_eq!(Phase::from("paint"), Phase::new(String::from("paint")));
}

#[test]
fn order_preserves_listing_order() {
    let order = PhaseOrder::new(["layout", "paint", "idle"]).unwrap();
    let names: Vec<&str> = order.iter().map(Phase::as_str).collect();
    assert_eq!(names, vec!["layout", "paint", "idle"]);
    assert_eq!(order.position("idle"), Some(2));
    assert!(!order.contains("missing"));
}

#[test]
fn order_rejects_duplicates() {
    let err = PhaseOrder::new(["layout", "paint", "layout"]).unwrap_err();
    assert!(matches!(err, EffectError::Config(msg) if msg.contains("duplicate")));
}

#[test]
fn order_rejects_empty() {
    let err = PhaseOrder::new(Vec::<Phase>::new()).unwrap_err();
    assert!(matches!(err, EffectError::Config(_)));
    assert!(PhaseOrder::new([""]).is_err());
}

#[test]
fn order_serializes_as_plain_array() {
    let order = PhaseOrder::new(["layout", "paint"]).unwrap();
    let json = serde_json::to_value(&order).unwrap();
    assert_eq!(json, serde_json::json!(["layout", "paint"]));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn strictness_follows_build_profile() {
    assert_eq!(Strictness::default(), Strictness::from_build());
    assert_eq!(Strictness::from_build().is_strict(), cfg!(debug_assertions));
}

#[test]
fn config_parses_full_document() {
    let cfg =
        ManagerConfig::from_json(r#"{"strictness":"strict","phases":["layout","paint"]}"#).unwrap();
    assert_eq!(cfg.strictness, Strictness::Strict);
    assert_eq!(cfg.phases, PhaseOrder::new(["layout", "paint"]).unwrap());
}

#[test]
fn config_missing_fields_default() {
    let cfg = ManagerConfig::from_json("{}").unwrap();
    assert_eq!(cfg, ManagerConfig::default());
}

#[test]
fn config_rejects_duplicate_phases() {
    let err = ManagerConfig::from_json(r#"{"phases":["layout","layout"]}"#).unwrap_err();
    assert!(matches!(err, EffectError::Config(_)));
}

#[test]
fn config_rejects_unknown_strictness() {
    assert!(ManagerConfig::from_json(r#"{"strictness":"paranoid"}"#).is_err());
}

#[test]
fn config_builders_replace_fields() {
    let cfg = ManagerConfig::default()
        .with_strictness(Strictness::Lenient)
        .with_phases(PhaseOrder::new(["a", "b"]).unwrap());
    assert_eq!(cfg.strictness, Strictness::Lenient);
    assert_eq!(cfg.phases.len(), 2);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Hooks and errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn fn_hooks_dispatch_to_each_closure() {
    let calls = Rc::new(Cell::new(0u32));
    let (a, b, c) = (calls.clone(), calls.clone(), calls.clone());
    let mut hooks = fn_hooks(
        move || {
            a.set(a.get() + 1);
            Ok(())
        },
        move || {
            b.set(b.get() + 10);
            Ok(())
        },
        move || {
            c.set(c.get() + 100);
            Ok(())
        },
    );
    hooks.setup().unwrap();
    hooks.update().unwrap();
    hooks.update().unwrap();
    hooks.teardown().unwrap();
    assert_eq!(calls.get(), 121);
}

#[test]
fn hook_error_names_the_stage() {
    let err = EffectError::hook(HookStage::Setup, "boom");
    assert_eq!(err.to_string(), "setup hook failed: boom");
    assert!(err.as_protocol().is_none());
}

#[test]
fn hook_stages_match_exhaustively() {
    fn hook_name(stage: HookStage) -> &'static str {
        match stage {
            HookStage::Setup => "setup",
            HookStage::Update => "update",
            HookStage::Teardown => "teardown",
        }
    }
    for stage in [HookStage::Setup, HookStage::Update, HookStage::Teardown] {
        assert_eq!(hook_name(stage), stage.as_str());
    }
}

#[test]
fn registration_cancels_at_most_once() {
    let cancelled = Rc::new(Cell::new(0));
    let counter = Rc::clone(&cancelled);
    let registration = Registration::new(move || counter.set(counter.get() + 1));
    assert!(!registration.is_spent());
    registration.cancel();
    assert_eq!(cancelled.get(), 1);

    let spent = Registration::spent();
    assert!(spent.is_spent());
    spent.cancel();
    assert_eq!(cancelled.get(), 1);
}

#[test]
fn protocol_error_is_classified() {
    let err = EffectError::from(ProtocolViolation::NotInTransaction);
    assert_eq!(err.as_protocol(), Some(&ProtocolViolation::NotInTransaction));
    assert!(err.to_string().starts_with("protocol violation:"));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Test doubles
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn recording_hooks_log_in_call_order() {
    let log = EventLog::new();
    let mut a = log.hooks("a");
    let mut b = log.hooks("b");
    a.setup().unwrap();
    b.setup().unwrap();
    a.update().unwrap();
    b.teardown().unwrap();
    assert_eq!(
        log.rendered(),
        vec!["a:setup", "b:setup", "a:update", "b:teardown"]
    );
    assert_eq!(log.labels(HookStage::Setup), vec!["a", "b"]);
    assert_eq!(log.count("a", HookStage::Update), 1);
}

#[test]
fn recording_hooks_can_fail_a_stage() {
    let log = EventLog::new();
    let mut hooks = log.hooks("a").failing(HookStage::Setup);
    assert!(hooks.setup().is_err());
    assert!(hooks.update().is_ok());
    assert_eq!(log.rendered(), vec!["a:setup", "a:update"]);
}

#[test]
fn stub_memoizer_unchanged_runs_once_until_invalidated() {
    let memo = StubMemoizer::unchanged();
    let runs = Rc::new(Cell::new(0u32));
    let counter = runs.clone();
    let mut d = memo.memoize(Box::new(move || {
        counter.set(counter.get() + 1);
        Ok(())
    }));
    d.dispatch().unwrap();
    d.dispatch().unwrap();
    assert_eq!(runs.get(), 1);
    memo.invalidate();
    d.dispatch().unwrap();
    d.dispatch().unwrap();
    assert_eq!(runs.get(), 2);
}

#[test]
fn stub_memoizer_failed_body_reruns() {
    let memo = StubMemoizer::unchanged();
    let runs = Rc::new(Cell::new(0u32));
    let counter = runs.clone();
    let mut d = memo.memoize(Box::new(move || {
        counter.set(counter.get() + 1);
        if counter.get() == 1 {
            return Err(EffectError::hook(HookStage::Setup, "first run fails"));
        }
        Ok(())
    }));
    assert!(d.dispatch().is_err());
    d.dispatch().unwrap();
    d.dispatch().unwrap();
    assert_eq!(runs.get(), 2);
}

#[test]
fn stub_memoizer_always_runs_every_time() {
    let memo = StubMemoizer::always();
    let runs = Rc::new(Cell::new(0u32));
    let counter = runs.clone();
    let mut d = memo.memoize(Box::new(move || {
        counter.set(counter.get() + 1);
        Ok(())
    }));
    for _ in 0..3 {
        d.dispatch().unwrap();
    }
    assert_eq!(runs.get(), 3);
}

#[test]
fn immediate_scheduler_runs_synchronously() {
    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    let revalidate = Revalidate::new(Phase::LAYOUT, move || {
        flag.set(true);
        Ok(())
    });
    Immediate.schedule(&Phase::LAYOUT, revalidate).unwrap();
    assert!(ran.get());
}

#[test]
fn closures_are_schedulers() {
    let seen = Rc::new(Cell::new(0u32));
    let counter = seen.clone();
    let scheduler = move |_: &Phase, revalidate: Revalidate| {
        counter.set(counter.get() + 1);
        revalidate.run()
    };
    scheduler
        .schedule(&Phase::LAYOUT, Revalidate::new(Phase::LAYOUT, || Ok(())))
        .unwrap();
    assert_eq!(seen.get(), 1);
}

#[test]
fn recording_scheduler_records_then_runs() {
    let scheduler = RecordingScheduler::new();
    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    let paint = Phase::new("paint");
    scheduler
        .schedule(
            &paint,
            Revalidate::new(paint.clone(), move || {
                flag.set(true);
                Ok(())
            }),
        )
        .unwrap();
    assert!(ran.get());
    assert_eq!(scheduler.phases(), vec![paint]);
}

#[test]
fn deferred_scheduler_holds_until_run() {
    let scheduler = DeferredScheduler::new();
    let ran = Rc::new(Cell::new(0u32));
    let counter = ran.clone();
    scheduler
        .schedule(
            &Phase::LAYOUT,
            Revalidate::new(Phase::LAYOUT, move || {
                counter.set(counter.get() + 1);
                Ok(())
            }),
        )
        .unwrap();
    assert_eq!(ran.get(), 0);
    assert_eq!(scheduler.pending(), 1);
    scheduler.run_pending().unwrap();
    assert_eq!(ran.get(), 1);
    assert_eq!(scheduler.pending(), 0);
}
