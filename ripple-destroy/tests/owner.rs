use ripple_core::{Destroyable, EffectError, HookStage};
use ripple_destroy::Owner;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<&'static str>>>;

fn push(log: &Log, entry: &'static str) -> ripple_core::Disposer {
    let log = log.clone();
    Box::new(move || {
        log.borrow_mut().push(entry);
        Ok(())
    })
}

#[test]
fn destroy_runs_disposers_in_registration_order() {
    let log = Log::default();
    let owner = Owner::named("view");
    owner.on_destroy(push(&log, "a")).unwrap();
    owner.on_destroy(push(&log, "b")).unwrap();
    owner.on_destroy(push(&log, "c")).unwrap();
    assert_eq!(owner.pending(), 3);
    owner.destroy().unwrap();
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    assert!(owner.is_destroyed());
    assert_eq!(owner.pending(), 0);
}

#[test]
fn destroy_twice_runs_once() {
    let log = Log::default();
    let owner = Owner::new();
    owner.on_destroy(push(&log, "a")).unwrap();
    owner.destroy().unwrap();
    owner.destroy().unwrap();
    assert_eq!(*log.borrow(), vec!["a"]);
}

#[test]
fn dropping_last_clone_destroys() {
    let log = Log::default();
    let owner = Owner::new();
    let clone = owner.clone();
    owner.on_destroy(push(&log, "a")).unwrap();
    drop(owner);
    assert!(log.borrow().is_empty());
    drop(clone);
    assert_eq!(*log.borrow(), vec!["a"]);
}

#[test]
fn explicit_destroy_then_drop_runs_once() {
    let log = Log::default();
    let owner = Owner::new();
    owner.on_destroy(push(&log, "a")).unwrap();
    owner.destroy().unwrap();
    drop(owner);
    assert_eq!(*log.borrow(), vec!["a"]);
}

#[test]
fn registering_on_destroyed_owner_runs_immediately() {
    let log = Log::default();
    let owner = Owner::new();
    owner.destroy().unwrap();
    owner.on_destroy(push(&log, "late")).unwrap();
    assert_eq!(*log.borrow(), vec!["late"]);
}

#[test]
fn failing_disposer_does_not_stop_the_rest() {
    let log = Log::default();
    let owner = Owner::named("panel");
    owner
        .on_destroy(Box::new(|| Err(EffectError::hook(HookStage::Teardown, "broken"))))
        .unwrap();
    owner.on_destroy(push(&log, "after")).unwrap();
    let err = owner.destroy().unwrap_err();
    assert_eq!(err.failures.len(), 1);
    assert_eq!(err.owner, "panel");
    assert!(err.to_string().contains("1 disposer(s) failed"));
    assert_eq!(*log.borrow(), vec!["after"]);
}

#[test]
fn child_is_destroyed_with_parent() {
    let log = Log::default();
    let parent = Owner::named("parent");
    let child = parent.child("child");
    child.on_destroy(push(&log, "child")).unwrap();
    parent.on_destroy(push(&log, "parent")).unwrap();
    parent.destroy().unwrap();
    assert!(child.is_destroyed());
    assert_eq!(*log.borrow(), vec!["child", "parent"]);
}

#[test]
fn child_destroyed_first_is_not_torn_down_again() {
    let log = Log::default();
    let parent = Owner::new();
    let child = parent.child("child");
    child.on_destroy(push(&log, "child")).unwrap();
    child.destroy().unwrap();
    parent.destroy().unwrap();
    assert_eq!(*log.borrow(), vec!["child"]);
}

#[test]
fn child_of_destroyed_owner_starts_destroyed() {
    let parent = Owner::new();
    parent.destroy().unwrap();
    let child = parent.child("late");
    assert!(child.is_destroyed());
}

#[test]
fn reentrant_destroy_from_a_disposer_is_a_noop() {
    let log = Log::default();
    let owner = Owner::new();
    let again = owner.clone();
    let inner_log = log.clone();
    owner
        .on_destroy(Box::new(move || {
            inner_log.borrow_mut().push("first");
            again.destroy().map_err(|e| EffectError::hook(HookStage::Teardown, e))
        }))
        .unwrap();
    owner.on_destroy(push(&log, "second")).unwrap();
    owner.destroy().unwrap();
    assert_eq!(*log.borrow(), vec!["first", "second"]);
}

#[test]
fn dropping_every_child_handle_destroys_the_child() {
    let log = Log::default();
    let parent = Owner::named("parent");
    {
        let child = parent.child("child");
        child.on_destroy(push(&log, "child")).unwrap();
        assert_eq!(parent.pending(), 1);
    }
    assert_eq!(*log.borrow(), vec!["child"]);
    assert_eq!(parent.pending(), 0);
    parent.destroy().unwrap();
    assert_eq!(*log.borrow(), vec!["child"]);
}

#[test]
fn child_destroyed_first_leaves_its_parent() {
    let parent = Owner::new();
    let child = parent.child("child");
    assert_eq!(parent.pending(), 1);
    child.destroy().unwrap();
    assert_eq!(parent.pending(), 0);
}

#[test]
fn cancelled_registration_never_runs() {
    let log = Log::default();
    let owner = Owner::new();
    let kept = owner.on_destroy(push(&log, "kept")).unwrap();
    let dropped = owner.on_destroy(push(&log, "dropped")).unwrap();
    dropped.cancel();
    assert_eq!(owner.pending(), 1);
    assert!(!kept.is_spent());
    owner.destroy().unwrap();
    assert_eq!(*log.borrow(), vec!["kept"]);
}

#[test]
fn registration_on_destroyed_owner_is_spent() {
    let log = Log::default();
    let owner = Owner::new();
    owner.destroy().unwrap();
    let registration = owner.on_destroy(push(&log, "late")).unwrap();
    assert!(registration.is_spent());
    registration.cancel();
    assert_eq!(*log.borrow(), vec!["late"]);
}

#[test]
fn cancelling_after_destroy_is_a_noop() {
    let log = Log::default();
    let owner = Owner::new();
    let registration = owner.on_destroy(push(&log, "a")).unwrap();
    owner.destroy().unwrap();
    registration.cancel();
    drop(owner);
    assert_eq!(*log.borrow(), vec!["a"]);
}
