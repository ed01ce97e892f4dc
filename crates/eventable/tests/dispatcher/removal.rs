//! Tests for `Dispatcher::off` and `unbind`.

use std::sync::{Arc, Mutex};

use eventable::{Callback, Context, Dispatcher, HandlerMap, Names};

fn make_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

fn logger(log: &Arc<Mutex<Vec<String>>>, label: &str) -> Callback {
    let log = Arc::clone(log);
    let label = label.to_string();
    Callback::from_fn(move |_| log.lock().unwrap().push(label.clone()))
}

// ============================================================================
// Bulk removal
// ============================================================================

#[test]
fn off_on_fresh_dispatcher_is_a_no_op() {
    let d = Dispatcher::new();
    d.off(Names::Any, None, None);
    d.off("x", None, None);
    assert!(!d.has_events());
}

#[test]
fn off_without_arguments_clears_everything() {
    let d = Dispatcher::new();
    let log = make_log();
    let ctx = Context::new(());

    d.on("x", Some(&logger(&log, "x")), None, 0);
    d.on("y", Some(&logger(&log, "y")), Some(&ctx), 3);
    d.once("all", Some(&logger(&log, "all")), None, 0);

    d.off(Names::Any, None, None);
    d.trigger("x", &[]).unwrap();
    d.trigger("y", &[]).unwrap();

    assert!(log.lock().unwrap().is_empty());
    assert!(d.event_names().is_empty());
}

#[test]
fn off_name_only_drops_that_name() {
    let d = Dispatcher::new();
    let log = make_log();

    d.on("x", Some(&logger(&log, "x1")), None, 0);
    d.on("x", Some(&logger(&log, "x2")), None, 0);
    d.on("y", Some(&logger(&log, "y")), None, 0);

    d.off("x", None, None);
    d.trigger("x y", &[]).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["y"]);
    assert_eq!(d.event_names(), vec!["y"]);
}

#[test]
fn off_several_names_at_once() {
    let d = Dispatcher::new();
    let log = make_log();

    d.on("a b c", Some(&logger(&log, "cb")), None, 0);
    d.off("a c", None, None);

    assert_eq!(d.event_names(), vec!["b"]);
}

// ============================================================================
// Filtered removal
// ============================================================================

#[test]
fn off_by_callback_only_removes_that_callback() {
    let d = Dispatcher::new();
    let log = make_log();
    let keep = logger(&log, "keep");
    let drop = logger(&log, "drop");

    d.on("x", Some(&keep), None, 0);
    d.on("x", Some(&drop), None, 0);
    d.off("x", Some(&drop), None);
    d.trigger("x", &[]).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["keep"]);
}

#[test]
fn off_by_callback_across_every_name() {
    let d = Dispatcher::new();
    let log = make_log();
    let shared = logger(&log, "shared");
    let other = logger(&log, "other");

    d.on("a b", Some(&shared), None, 0);
    d.on("b", Some(&other), None, 0);
    d.off(Names::Any, Some(&shared), None);

    assert_eq!(d.event_names(), vec!["b"]);
    assert_eq!(d.listener_count("b"), 1);
}

#[test]
fn off_by_context_only_removes_that_context() {
    let d = Dispatcher::new();
    let log = make_log();
    let ctx1 = Context::new("one");
    let ctx2 = Context::new("two");

    d.on("x", Some(&logger(&log, "ctx1")), Some(&ctx1), 0);
    d.on("x", Some(&logger(&log, "ctx2")), Some(&ctx2), 0);
    d.off("x", None, Some(&ctx1));
    d.trigger("x", &[]).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["ctx2"]);
}

#[test]
fn off_by_callback_and_context_requires_both() {
    let d = Dispatcher::new();
    let log = make_log();
    let cb = logger(&log, "cb");
    let ctx1 = Context::new(1);
    let ctx2 = Context::new(2);

    d.on("x", Some(&cb), Some(&ctx1), 0);
    d.on("x", Some(&cb), Some(&ctx2), 0);
    d.off("x", Some(&cb), Some(&ctx2));

    assert_eq!(d.listener_count("x"), 1);
    d.off("x", Some(&cb), Some(&ctx1));
    assert!(!d.has_events());
}

#[test]
fn off_by_context_does_not_match_registrations_without_one() {
    let d = Dispatcher::new();
    let log = make_log();
    let ctx = Context::new(());

    d.on("x", Some(&logger(&log, "plain")), None, 0);
    d.off(Names::Any, None, Some(&ctx));

    assert_eq!(d.listener_count("x"), 1);
}

#[test]
fn context_matching_is_by_identity_not_value() {
    let d = Dispatcher::new();
    let log = make_log();
    let registered = Context::new(7_u32);
    let lookalike = Context::new(7_u32);

    d.on("x", Some(&logger(&log, "cb")), Some(&registered), 0);
    d.off("x", None, Some(&lookalike));
    assert_eq!(d.listener_count("x"), 1);

    d.off("x", None, Some(&registered.clone()));
    assert_eq!(d.listener_count("x"), 0);
}

#[test]
fn off_with_map_removes_each_entry() {
    let d = Dispatcher::new();
    let log = make_log();
    let a = logger(&log, "a");
    let b = logger(&log, "b");
    let c = logger(&log, "c");

    d.on(HandlerMap::new().with("x", &a).with("y", &b), None, None, 0);
    d.on("x", Some(&c), None, 0);
    d.off(HandlerMap::new().with("x", &a).with("y", &b), None, None);

    assert_eq!(d.event_names(), vec!["x"]);
    d.trigger("x", &[]).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["c"]);
}

#[test]
fn removing_last_registration_deletes_the_name() {
    let d = Dispatcher::new();
    let log = make_log();
    let cb = logger(&log, "cb");

    d.on("x", Some(&cb), None, 0);
    d.off("x", Some(&cb), None);

    assert!(d.event_names().is_empty());
    assert!(!d.has_events());
}

#[test]
fn registration_after_bulk_clear_works() {
    let d = Dispatcher::new();
    let log = make_log();

    d.on("x", Some(&logger(&log, "before")), None, 0);
    d.off(Names::Any, None, None);
    d.on("x", Some(&logger(&log, "after")), None, 0);
    d.trigger("x", &[]).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["after"]);
}

#[test]
fn unbind_is_off() {
    let d = Dispatcher::new();
    let log = make_log();
    let cb = logger(&log, "cb");

    d.on("x", Some(&cb), None, 0);
    d.unbind("x", Some(&cb), None);

    assert!(!d.has_events());
}
