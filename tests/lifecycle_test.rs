//! Lifecycle and reaction integration tests
//!
//! These tests pin the init/mount/unmount sequencing, exactly-once init
//! observation, reaction re-runs on dependency commits, and idempotent
//! disposal.

mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use formtree::{FieldNode, FieldPattern, FieldProps, Form, LifecycleEvent};

#[test_log::test]
fn test_init_observed_exactly_once_per_node() {
    let form = Form::new();
    let inits = Arc::new(Mutex::new(Vec::new()));
    let seen = inits.clone();
    let _sub = form.on_lifecycle(move |event, node| {
        if event == LifecycleEvent::FieldInit {
            seen.lock().unwrap().push(node.path().to_string());
        }
    });

    let a = form.create_field("a", FieldProps::default()).unwrap();
    form.create_field("a.b", FieldProps::default()).unwrap();
    assert!(a.initialized());

    // Mount churn must not re-report init.
    a.on_mount();
    a.on_unmount();
    a.on_mount();

    assert_eq!(*inits.lock().unwrap(), vec!["a".to_string(), "a.b".to_string()]);
}

#[test_log::test]
fn test_mount_flags_stay_consistent() {
    let form = Form::new();
    let node = form.create_field("a", FieldProps::default()).unwrap();
    assert!(!node.mounted());
    assert!(!node.unmounted());

    let events = Arc::new(Mutex::new(Vec::new()));
    let seen = events.clone();
    let _sub = form.on_lifecycle(move |event, _| seen.lock().unwrap().push(event));

    for _ in 0..3 {
        node.on_mount();
        assert!(node.mounted() && !node.unmounted());
        node.on_unmount();
        assert!(!node.mounted() && node.unmounted());
    }
    // Remounting twice in a row is harmless.
    node.on_mount();
    node.on_mount();
    assert!(node.mounted() && !node.unmounted());

    let seen = events.lock().unwrap();
    assert_eq!(seen.iter().filter(|e| **e == LifecycleEvent::FieldMount).count(), 5);
    assert_eq!(
        seen.iter().filter(|e| **e == LifecycleEvent::FieldUnmount).count(),
        3
    );
}

#[test_log::test]
fn test_reaction_runs_at_construction_and_on_commits() {
    let form = Form::new();
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = observed.clone();
    let node = form
        .create_field(
            "a",
            FieldProps {
                reactions: vec![Arc::new(move |node: &FieldNode| {
                    sink.lock().unwrap().push(node.pattern());
                })],
                ..Default::default()
            },
        )
        .unwrap();

    // Ran once during construction (after registration, before on_init
    // completes the constructor, so the initial value is the default).
    assert_eq!(observed.lock().unwrap().first(), Some(&FieldPattern::Editable));

    node.set_pattern(Some(FieldPattern::Disabled));
    assert_eq!(observed.lock().unwrap().last(), Some(&FieldPattern::Disabled));

    node.set_pattern(Some(FieldPattern::ReadOnly));
    assert_eq!(observed.lock().unwrap().last(), Some(&FieldPattern::ReadOnly));
}

#[test_log::test]
fn test_dispose_is_idempotent_and_silences_reactions() {
    let form = Form::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let counted = runs.clone();
    let node = form
        .create_field(
            "a",
            FieldProps {
                reactions: vec![Arc::new(move |_: &FieldNode| {
                    counted.fetch_add(1, Ordering::SeqCst);
                })],
                ..Default::default()
            },
        )
        .unwrap();
    let baseline = form.scope().watcher_count();
    assert_eq!(baseline, 1);

    node.dispose();
    assert_eq!(form.scope().watcher_count(), 0);

    // Second and third calls: no panic, and the teardown does not run
    // again (there is nothing left to remove).
    node.dispose();
    node.dispose();
    assert_eq!(form.scope().watcher_count(), 0);

    // Silenced for good: further commits never reach the reaction.
    let after_dispose = runs.load(Ordering::SeqCst);
    node.set_pattern(Some(FieldPattern::Disabled));
    node.set_pattern(Some(FieldPattern::Editable));
    assert_eq!(runs.load(Ordering::SeqCst), after_dispose);
}

#[test_log::test]
fn test_disposed_node_state_still_reads() {
    let form = Form::new();
    let node = form.create_field("a", FieldProps::default()).unwrap();
    node.set_pattern(Some(FieldPattern::ReadPretty));
    node.dispose();
    // Disposal releases reactions only; it does not invalidate reads.
    assert_eq!(node.pattern(), FieldPattern::ReadPretty);
    assert!(node.initialized());
}

#[test_log::test]
fn test_reaction_sees_registered_self() {
    // The registry entry must exist before reactions run, so a reaction
    // can query its own node.
    let form = Form::new();
    let found = Arc::new(AtomicUsize::new(0));
    let counted = found.clone();
    let probe = form.clone();
    form.create_field(
        "self.aware",
        FieldProps {
            reactions: vec![Arc::new(move |_: &FieldNode| {
                if probe.field("self.aware").is_some() {
                    counted.fetch_add(1, Ordering::SeqCst);
                }
            })],
            ..Default::default()
        },
    )
    .unwrap();
    assert!(found.load(Ordering::SeqCst) >= 1);
}
