#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use formkit_runtime::{FieldStore, HistoryConfig, HistoryTracker};
use formkit_schema::{FieldPatch, FieldType};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Add(u8),
    AddChild(u8, u8),
    Remove(u8),
    Reorder(u8, u8),
    Relabel(u8, String),
    Select(u8),
    Undo,
    Redo,
}

fn pick(store: &FieldStore, n: u8) -> Option<String> {
    let snapshot = store.snapshot();
    if snapshot.is_empty() {
        return None;
    }
    Some(snapshot[usize::from(n) % snapshot.len()].id().to_string())
}

// Any operation sequence keeps ids unique across the tree and history
// within its bound. Undo and redo may leave the selection dangling; adding
// or selecting a field always leaves it resolvable.
fuzz_target!(|ops: Vec<Op>| {
    let store = FieldStore::new();
    let history = HistoryTracker::new(&store, HistoryConfig::default().with_max_entries(16));

    for op in ops.into_iter().take(256) {
        let selects = matches!(op, Op::Add(_) | Op::Select(_));
        match op {
            Op::Add(t) => {
                let ty = FieldType::ALL[usize::from(t) % FieldType::ALL.len()];
                store.add_field(ty, None);
            }
            Op::AddChild(s, t) => {
                if let Some(id) = pick(&store, s) {
                    let ty = FieldType::ALL[usize::from(t) % FieldType::ALL.len()];
                    store.add_child_field(&id, ty, None);
                }
            }
            Op::Remove(n) => {
                if let Some(id) = pick(&store, n) {
                    assert!(store.remove_field(&id));
                }
            }
            Op::Reorder(a, b) => {
                let _ = store.reorder_fields(usize::from(a), usize::from(b));
            }
            Op::Relabel(n, label) => {
                if let Some(id) = pick(&store, n) {
                    store.update_field(&id, FieldPatch::new().with_label(label));
                }
            }
            Op::Select(n) => {
                store.select_field(pick(&store, n).map(Into::into));
            }
            Op::Undo => {
                history.undo();
            }
            Op::Redo => {
                history.redo();
            }
        }

        let snapshot = store.snapshot();
        let mut seen = HashSet::new();
        for field in snapshot.iter() {
            field.walk(&mut |f| assert!(seen.insert(f.id().clone()), "duplicate id"));
        }
        assert!(history.history_len() <= 16);
        if selects {
            if let Some(id) = store.selected_id() {
                assert!(store.field(id.as_str()).is_some(), "selection does not resolve");
            }
        }
    }
});
