//! Property tests for the layout store's history and persistence.

use std::time::Duration;

use dashgrid_layout::{Layout, WidgetPlacement};
use dashgrid_runtime::{
    DeterministicClock, HistoryPolicy, LayoutBundle, LayoutStore, LayoutVariant, MemoryStorage,
    StoreConfig,
};
use proptest::prelude::*;

fn bundle_for(y: u16) -> LayoutBundle {
    LayoutBundle::from([(
        LayoutVariant::new("desktop"),
        Layout::from(vec![WidgetPlacement::new("a", 0, y, 2, 2)]),
    )])
}

#[derive(Debug, Clone)]
enum Op {
    Set(u16),
    Undo,
    Redo,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u16..20).prop_map(Op::Set),
        1 => Just(Op::Undo),
        1 => Just(Op::Redo),
    ]
}

/// Mirror of the store's history using plain vectors.
#[derive(Debug)]
struct Model {
    past: Vec<LayoutBundle>,
    present: LayoutBundle,
    future: Vec<LayoutBundle>,
}

impl Model {
    fn apply(&mut self, op: &Op) {
        match op {
            Op::Set(y) => {
                let next = bundle_for(*y);
                if next != self.present {
                    self.past.push(std::mem::replace(&mut self.present, next));
                    self.future.clear();
                }
            }
            Op::Undo => {
                if let Some(prev) = self.past.pop() {
                    self.future.push(std::mem::replace(&mut self.present, prev));
                }
            }
            Op::Redo => {
                if let Some(next) = self.future.pop() {
                    self.past.push(std::mem::replace(&mut self.present, next));
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn store_history_matches_model(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let clock = DeterministicClock::new();
        let mut store = LayoutStore::new(bundle_for(0), MemoryStorage::new(), StoreConfig::default())
            .with_clock(clock);
        let mut model = Model { past: Vec::new(), present: bundle_for(0), future: Vec::new() };

        for op in &ops {
            match op {
                Op::Set(y) => store.set(bundle_for(*y), HistoryPolicy::Record),
                Op::Undo => { store.undo(); }
                Op::Redo => { store.redo(); }
            }
            model.apply(op);
            prop_assert_eq!(store.present(), &model.present);
            prop_assert_eq!(store.can_undo(), !model.past.is_empty());
            prop_assert_eq!(store.can_redo(), !model.future.is_empty());
        }
    }

    #[test]
    fn undo_then_redo_is_identity(ys in proptest::collection::vec(1u16..50, 1..20)) {
        let mut store = LayoutStore::new(bundle_for(0), MemoryStorage::new(), StoreConfig::default())
            .with_clock(DeterministicClock::new());
        for y in &ys {
            store.set(bundle_for(*y), HistoryPolicy::Record);
        }
        let before = store.present().clone();
        if store.undo() {
            prop_assert!(store.redo());
        }
        prop_assert_eq!(store.present(), &before);
    }

    #[test]
    fn persisted_state_matches_present_after_quiet_window(
        ys in proptest::collection::vec(0u16..10, 1..15),
    ) {
        let storage = MemoryStorage::new();
        let clock = DeterministicClock::new();
        let mut store = LayoutStore::new(bundle_for(0), storage.clone(), StoreConfig::default())
            .with_clock(clock.clone());
        for y in &ys {
            store.set(bundle_for(*y), HistoryPolicy::Record);
            clock.advance(Duration::from_millis(100));
            store.tick();
        }
        clock.advance(Duration::from_millis(1000));
        store.tick();

        let desktop = LayoutVariant::new("desktop");
        let expected = store.variant(&desktop).cloned();
        let stored = storage.get(&desktop).unwrap_or(None);
        if storage.save_count() == 0 {
            // Nothing ever differed from the defaults.
            prop_assert_eq!(expected, Some(bundle_for(0)[&desktop].clone()));
        } else {
            prop_assert_eq!(stored, expected);
            prop_assert!(storage.save_count() <= 1, "writes coalesce while edits keep arriving");
        }
    }
}

#[test]
fn hydration_is_not_undoable() {
    let stored = MemoryStorage::with_layouts(bundle_for(4));
    let mut store = LayoutStore::new(bundle_for(0), MemoryStorage::new(), StoreConfig::default())
        .with_clock(DeterministicClock::new());
    store.hydrate(&stored);
    assert!(!store.can_undo());
    assert!(!store.undo());
}
