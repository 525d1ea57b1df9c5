//! Property tests for the field store and its history.

use std::collections::HashSet;

use formkit_runtime::{FieldStore, HistoryConfig, HistoryTracker, StoreError};
use formkit_schema::{FieldId, FieldType};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(FieldType),
    Remove(usize),
    Reorder(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        proptest::sample::select(FieldType::ALL.to_vec()).prop_map(Op::Add),
        (0usize..16).prop_map(Op::Remove),
        (0usize..16, 0usize..16).prop_map(|(a, b)| Op::Reorder(a, b)),
    ]
}

fn ids(store: &FieldStore) -> Vec<FieldId> {
    store.snapshot().ids()
}

proptest! {
    #[test]
    fn surviving_ids_stay_present_and_unique(ops in proptest::collection::vec(op(), 0..40)) {
        let store = FieldStore::new();
        let mut expected: Vec<FieldId> = Vec::new();

        for op in ops {
            match op {
                Op::Add(ty) => expected.push(store.add_field(ty, None)),
                Op::Remove(i) => {
                    if let Some(id) = expected.get(i % (expected.len() + 1)).cloned() {
                        prop_assert!(store.remove_field(id.as_str()));
                        expected.retain(|e| *e != id);
                    }
                }
                Op::Reorder(a, b) => {
                    let result = store.reorder_fields(a, b);
                    if a < expected.len() && b < expected.len() {
                        prop_assert!(result.is_ok());
                        let moved = expected.remove(a);
                        expected.insert(b, moved);
                    } else {
                        let is_out_of_range =
                            matches!(result, Err(StoreError::IndexOutOfRange { .. }));
                        prop_assert!(is_out_of_range);
                    }
                }
            }

            let current = ids(&store);
            prop_assert_eq!(&current, &expected);
            let unique: HashSet<_> = current.iter().collect();
            prop_assert_eq!(unique.len(), current.len());
        }
    }

    #[test]
    fn reorder_is_reversible(n in 1usize..10, a in 0usize..10, b in 0usize..10) {
        let store = FieldStore::new();
        for _ in 0..n {
            store.add_field(FieldType::Text, None);
        }
        let (a, b) = (a % n, b % n);
        let before = ids(&store);

        store.reorder_fields(a, b).unwrap();
        store.reorder_fields(b, a).unwrap();
        prop_assert_eq!(ids(&store), before);
    }

    #[test]
    fn reorder_in_place_publishes_nothing(n in 1usize..10, i in 0usize..10) {
        let store = FieldStore::new();
        for _ in 0..n {
            store.add_field(FieldType::Email, None);
        }
        let snapshot = store.snapshot();
        store.reorder_fields(i % n, i % n).unwrap();
        prop_assert_eq!(store.snapshot(), snapshot);
    }

    #[test]
    fn undo_all_then_redo_all_is_identity(ops in proptest::collection::vec(op(), 1..25)) {
        let store = FieldStore::new();
        let history = HistoryTracker::new(&store, HistoryConfig::default());
        for op in ops {
            match op {
                Op::Add(ty) => {
                    store.add_field(ty, None);
                }
                Op::Remove(i) => {
                    if let Some(field) = store.snapshot().get(i % 4) {
                        store.remove_field(field.id().as_str());
                    }
                }
                Op::Reorder(a, b) => {
                    let _ = store.reorder_fields(a % 4, b % 4);
                }
            }
        }
        let end = store.snapshot();
        let steps = history.history_len() - 1;

        for _ in 0..steps {
            prop_assert!(history.undo());
        }
        prop_assert!(store.is_empty());
        prop_assert!(!history.can_undo());

        for _ in 0..steps {
            prop_assert!(history.redo());
        }
        prop_assert_eq!(store.snapshot(), end);
    }
}

#[test]
fn undo_after_single_add_restores_empty_and_redo_restores_same_id() {
    let store = FieldStore::new();
    let history = HistoryTracker::new(&store, HistoryConfig::default());
    let id = store.add_field(FieldType::Text, None);

    assert!(history.undo());
    assert!(store.is_empty());
    assert!(history.redo());
    assert_eq!(ids(&store), [id]);
}
