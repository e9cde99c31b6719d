//! Integration tests for store wiring
//!
//! Covers the pieces a parent/child composition is built from: late
//! subscription, the child arena, bound snapshots and the async read side.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use futures::StreamExt;
use rxstore_core::{Events, Guard, Reducer, smallvec};
use rxstore_macros::Kind;
use rxstore_runtime::{Arena, Bound, Store, StoreConfig, StoreError};
use rxstore_testing::{Recorder, init_tracing};
use std::cell::RefCell;
use std::rc::Rc;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
struct LampState {
    lit: bool,
    toggles: u32,
}

#[derive(Clone, Debug, PartialEq, Kind)]
enum LampCommand {
    SwitchOn,
    SwitchOff,
}

#[derive(Clone, Debug, PartialEq, Kind)]
enum LampEvent {
    SwitchedOn,
    SwitchedOff,
}

struct LampReducer;

impl Reducer for LampReducer {
    type State = LampState;
    type Event = LampEvent;

    fn reduce(&self, state: &mut LampState, event: LampEvent) {
        state.lit = matches!(event, LampEvent::SwitchedOn);
        state.toggles += 1;
    }
}

struct LampGuard;

impl Guard for LampGuard {
    type State = LampState;
    type Command = LampCommand;
    type Event = LampEvent;
    type Environment = ();

    fn guard(&self, state: &LampState, command: &LampCommand, _env: &()) -> Events<LampEvent> {
        match command {
            LampCommand::SwitchOn if !state.lit => smallvec![LampEvent::SwitchedOn],
            LampCommand::SwitchOff if state.lit => smallvec![LampEvent::SwitchedOff],
            LampCommand::SwitchOn | LampCommand::SwitchOff => Events::new(),
        }
    }
}

type Lamp = Store<LampState, LampCommand, LampEvent>;

fn lamp(name: &str) -> Lamp {
    Store::with_config(
        LampState::default(),
        LampReducer,
        LampGuard,
        (),
        StoreConfig::new(name).with_metrics(false),
    )
    .unwrap()
}

// ============================================================================
// Replay-last semantics
// ============================================================================

#[test]
fn late_subscriber_sees_only_current_state() {
    init_tracing();
    let store = lamp("hall");
    store.start().unwrap();
    store.send(LampCommand::SwitchOn);
    store.send(LampCommand::SwitchOff);

    let states = Recorder::replay(store.state());

    assert_eq!(
        states.values(),
        vec![LampState {
            lit: false,
            toggles: 2
        }]
    );
}

#[test]
fn early_subscriber_hears_initial_state_on_start() {
    let store = lamp("porch");
    let states = Recorder::replay(store.state());
    assert!(states.is_empty());

    store.start().unwrap();

    assert_eq!(states.values(), vec![LampState::default()]);
}

#[test]
fn start_twice_leaves_observers_untouched() {
    let store = lamp("attic");
    let states = Recorder::replay(store.state());
    store.start().unwrap();

    let second = store.start();

    assert_eq!(
        second,
        Err(StoreError::AlreadyStarted {
            store: "attic".to_string()
        })
    );
    assert_eq!(states.len(), 1);
}

#[test]
fn per_kind_ports_split_the_merged_port() {
    let store = lamp("kitchen");
    let offs = store.events().filter_map(|event| match event {
        LampEvent::SwitchedOff => Some(()),
        LampEvent::SwitchedOn => None,
    });
    let recorder = Recorder::port(&offs);
    store.start().unwrap();

    store.send(LampCommand::SwitchOn);
    store.send(LampCommand::SwitchOff);
    store.send(LampCommand::SwitchOff);

    assert_eq!(recorder.len(), 1);
}

// ============================================================================
// Arena
// ============================================================================

/// A parent that counts how many of its lamps are lit
struct Panel {
    lit: Rc<RefCell<usize>>,
    arena: Arena<u32, Lamp>,
}

impl Panel {
    fn new() -> Self {
        Self {
            lit: Rc::new(RefCell::new(0)),
            arena: Arena::new(),
        }
    }

    fn add(&mut self, key: u32) -> Lamp {
        let child = lamp(&format!("lamp-{key}"));
        let lit = Rc::clone(&self.lit);
        let fold = child.updates().subscribe(move |update| {
            let mut lit = lit.borrow_mut();
            match update.event {
                LampEvent::SwitchedOn => *lit += 1,
                LampEvent::SwitchedOff => *lit -= 1,
            }
        });
        child.start().unwrap();
        self.arena.adopt(key, child.clone(), fold);
        child
    }
}

#[test]
fn arena_children_fold_into_parent() {
    let mut panel = Panel::new();
    let a = panel.add(1);
    let b = panel.add(2);

    a.send(LampCommand::SwitchOn);
    b.send(LampCommand::SwitchOn);
    b.send(LampCommand::SwitchOff);

    assert_eq!(*panel.lit.borrow(), 1);
    assert_eq!(panel.arena.keys().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn released_child_no_longer_folds() {
    let mut panel = Panel::new();
    let a = panel.add(1);

    let released = panel.arena.release(&1).unwrap();
    a.send(LampCommand::SwitchOn);

    assert!(released.current().lit);
    assert_eq!(*panel.lit.borrow(), 0);
    assert!(panel.arena.is_empty());
}

#[test]
fn adopting_over_a_key_detaches_the_previous_child() {
    let mut panel = Panel::new();
    let first = panel.add(7);
    let _second = panel.add(7);

    first.send(LampCommand::SwitchOn);

    assert_eq!(*panel.lit.borrow(), 0);
    assert_eq!(panel.arena.len(), 1);
}

// ============================================================================
// Bound snapshots
// ============================================================================

#[test]
fn bound_snapshot_commands_its_own_store() {
    let store = lamp("study");
    store.start().unwrap();

    let snapshot = Bound::new(store.current(), store.clone());
    assert!(!snapshot.lit);
    snapshot.commands().send(LampCommand::SwitchOn);

    // The snapshot is frozen; the store moved on.
    assert!(!snapshot.lit);
    assert!(store.current().lit);
}

// ============================================================================
// Async read side
// ============================================================================

#[tokio::test]
async fn changes_stream_yields_current_then_newer() {
    let store = lamp("garage");
    store.start().unwrap();
    let mut changes = Box::pin(store.changes());

    let first = changes.next().await.unwrap();
    assert_eq!(first, LampState::default());

    store.send(LampCommand::SwitchOn);
    let second = changes.next().await.unwrap();
    assert_eq!(
        second,
        LampState {
            lit: true,
            toggles: 1
        }
    );
}

#[tokio::test]
async fn changes_stream_ends_when_store_drops() {
    let store = lamp("shed");
    let mut changes = Box::pin(store.changes());
    assert!(changes.next().await.is_some());

    drop(store);

    assert!(changes.next().await.is_none());
}

#[tokio::test]
async fn watch_receiver_crosses_threads() {
    let store = lamp("cellar");
    store.start().unwrap();
    let rx = store.watch();
    store.send(LampCommand::SwitchOn);

    let lit = std::thread::spawn(move || rx.borrow().lit).join().unwrap();
    assert!(lit);
}
