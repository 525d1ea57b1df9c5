#![forbid(unsafe_code)]

//! The field collection store.
//!
//! [`FieldStore`] owns the ordered field list and the selected field id. It is
//! a cheap `Clone` handle: every clone observes and mutates the same state,
//! the way a UI tree shares one context.
//!
//! # Invariants
//!
//! 1. Field ids are unique across the tree. Generated ids are fresh, and
//!    reorder only permutes the top level.
//! 2. Every effective mutation publishes exactly one new [`Snapshot`];
//!    operations that change nothing (no matching id, a patch that leaves the
//!    field as it was, `reorder_fields(i, i)`) publish nothing.
//! 3. Snapshots are never mutated in place; a published snapshot stays valid
//!    for as long as someone holds it.
//! 4. Selection is not validated: selecting an unknown id is allowed and
//!    resolves to no field.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Reorder out of range | index `>= len` | [`StoreError::IndexOutOfRange`], nothing published |
//! | Inapplicable patch attribute | `options` on a text field | attribute skipped, logged at debug |

use formkit_schema::{Field, FieldId, FieldOption, FieldPatch, FieldType};

use crate::error::StoreError;
use crate::reactive::{Binding, Observable, Subscription, bind_mapped, bind_mapped2};
use crate::snapshot::{Snapshot, find_in};

/// Shared handle to the field list and the selection.
#[derive(Clone, Debug)]
pub struct FieldStore {
    fields: Observable<Snapshot>,
    selected: Observable<Option<FieldId>>,
}

impl Default for FieldStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldStore {
    /// An empty store with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::with_fields(Vec::new())
    }

    /// A store seeded with `fields`. Seeding does not publish.
    #[must_use]
    pub fn with_fields(fields: Vec<Field>) -> Self {
        Self {
            fields: Observable::new(Snapshot::new(fields)),
            selected: Observable::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.fields.get()
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.with(|s| s.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The field with `id`, at any nesting depth.
    #[must_use]
    pub fn field(&self, id: &str) -> Option<Field> {
        self.fields.with(|s| s.find(id).cloned())
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<FieldId> {
        self.selected.get()
    }

    /// The selected field, if the selected id resolves.
    #[must_use]
    pub fn selected_field(&self) -> Option<Field> {
        let id = self.selected.get()?;
        self.field(id.as_str())
    }

    /// A live view of the selected field, for configuration panels.
    #[must_use]
    pub fn bind_selected_field(&self) -> Binding<Option<Field>> {
        bind_mapped2(&self.fields, &self.selected, |snapshot, selected| {
            selected
                .as_ref()
                .and_then(|id| snapshot.find(id.as_str()).cloned())
        })
    }

    /// A live count of top-level fields, for canvas headers.
    #[must_use]
    pub fn bind_len(&self) -> Binding<usize> {
        bind_mapped(&self.fields, |snapshot| snapshot.len())
    }

    /// Number of snapshots published since construction.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.fields.version()
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Run `callback` with every newly published snapshot.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe_fields(&self, callback: impl Fn(&Snapshot) + 'static) -> Subscription {
        self.fields.subscribe(callback)
    }

    /// Run `callback` whenever the selected id changes.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe_selection(
        &self,
        callback: impl Fn(&Option<FieldId>) + 'static,
    ) -> Subscription {
        self.selected.subscribe(callback)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Append a new field of type `ty`, select it, and return its id.
    ///
    /// `config` is merged over the defaults before the field is published.
    pub fn add_field(&self, ty: FieldType, config: Option<FieldPatch>) -> FieldId {
        let field = new_field(ty, config);
        let id = field.id().clone();
        self.mutate("add_field", |fields| {
            fields.push(field);
            Some(())
        });
        tracing::debug!(op = "add_field", field_id = %id, field_type = %ty, "field added");
        self.selected.set(Some(id.clone()));
        id
    }

    /// Append a new field to the section `section_id` and select it.
    ///
    /// Returns `None`, publishing nothing, when no section has that id.
    pub fn add_child_field(
        &self,
        section_id: &str,
        ty: FieldType,
        config: Option<FieldPatch>,
    ) -> Option<FieldId> {
        let field = new_field(ty, config);
        let id = field.id().clone();
        self.mutate("add_child_field", |fields| {
            find_mut(fields, section_id)?.children_mut()?.push(field);
            Some(())
        })?;
        tracing::debug!(
            op = "add_child_field",
            section_id,
            field_id = %id,
            field_type = %ty,
            "nested field added"
        );
        self.selected.set(Some(id.clone()));
        Some(id)
    }

    /// Set or clear the selection. Existence is not checked.
    pub fn select_field(&self, id: Option<FieldId>) {
        if self.selected.set(id) {
            tracing::trace!(
                op = "select_field",
                selected = ?self.selected.get(),
                "selection changed"
            );
        }
    }

    /// Shallow-merge `patch` into the field with `id`, at any depth.
    ///
    /// Returns whether a snapshot was published: `false` when no field
    /// matches or the merge changed nothing.
    pub fn update_field(&self, id: &str, patch: FieldPatch) -> bool {
        let mut ignored = Vec::new();
        let published = self
            .mutate("update_field", |fields| {
                let field = find_mut(fields, id)?;
                let before = field.clone();
                ignored = field.apply(patch);
                (*field != before).then_some(())
            })
            .is_some();

        if !ignored.is_empty() {
            tracing::debug!(
                op = "update_field",
                field_id = id,
                ?ignored,
                "patch attributes not applicable to the field type were skipped"
            );
        }
        if published {
            tracing::debug!(op = "update_field", field_id = id, "field updated");
        }
        published
    }

    /// Replace the option list of the field with `id`.
    pub fn update_field_options(&self, id: &str, options: Vec<FieldOption>) -> bool {
        self.update_field(id, FieldPatch::new().with_options(options))
    }

    /// Remove the field with `id`, at any depth.
    ///
    /// Clears the selection when the removed field, or one of its nested
    /// children, was selected. Returns whether anything was removed.
    pub fn remove_field(&self, id: &str) -> bool {
        let Some(removed) = self.mutate("remove_field", |fields| remove_in(fields, id)) else {
            return false;
        };
        tracing::debug!(op = "remove_field", field_id = id, "field removed");

        let selected_gone = self.selected.with(|selected| {
            selected.as_ref().is_some_and(|sel| {
                find_in(std::slice::from_ref(&removed), sel.as_str()).is_some()
            })
        });
        if selected_gone {
            self.select_field(None);
        }
        true
    }

    /// Move the top-level field at `old_index` to `new_index`, shifting the
    /// fields in between.
    pub fn reorder_fields(&self, old_index: usize, new_index: usize) -> Result<(), StoreError> {
        let len = self.len();
        for index in [old_index, new_index] {
            if index >= len {
                tracing::debug!(op = "reorder_fields", index, len, "reorder rejected");
                return Err(StoreError::IndexOutOfRange { index, len });
            }
        }
        if old_index == new_index {
            return Ok(());
        }

        self.mutate("reorder_fields", |fields| {
            let moved = fields.remove(old_index);
            fields.insert(new_index, moved);
            Some(())
        });
        tracing::debug!(op = "reorder_fields", old_index, new_index, "fields reordered");
        Ok(())
    }

    /// Replace the whole field list, as an import does.
    ///
    /// The selection is cleared when it no longer resolves.
    pub fn replace_fields(&self, fields: Vec<Field>) {
        let count = fields.len();
        self.mutate("replace_fields", |current| {
            *current = fields;
            Some(())
        });
        tracing::debug!(op = "replace_fields", count, "field list replaced");

        let dangling = self.selected.with(|selected| {
            selected
                .as_ref()
                .is_some_and(|id| self.fields.with(|s| s.find(id.as_str()).is_none()))
        });
        if dangling {
            self.select_field(None);
        }
    }

    /// Make `snapshot` the live state without copying it.
    ///
    /// Used by history replay; subscribers see the very snapshot that was
    /// recorded.
    pub(crate) fn apply_snapshot(&self, snapshot: Snapshot) {
        self.fields.set(snapshot);
    }

    /// Copy the field list, let `edit` change it, and publish the result.
    ///
    /// `edit` returns `None` to signal "nothing changed"; the copy is then
    /// discarded and nothing is published.
    fn mutate<R>(
        &self,
        op: &'static str,
        edit: impl FnOnce(&mut Vec<Field>) -> Option<R>,
    ) -> Option<R> {
        let mut fields = self.fields.with(|s| s.to_vec());
        let out = edit(&mut fields)?;
        let _span = tracing::trace_span!("publish", op).entered();
        self.fields.set(Snapshot::new(fields));
        Some(out)
    }
}

fn new_field(ty: FieldType, config: Option<FieldPatch>) -> Field {
    let mut field = Field::new(FieldId::generate(ty), ty);
    if let Some(patch) = config {
        let ignored = field.apply(patch);
        if !ignored.is_empty() {
            tracing::debug!(field_type = %ty, ?ignored, "initial config attributes skipped");
        }
    }
    field
}

fn find_mut<'a>(fields: &'a mut [Field], id: &str) -> Option<&'a mut Field> {
    for field in fields {
        if field.id() == id {
            return Some(field);
        }
        if let Some(children) = field.children_mut() {
            if let Some(found) = find_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn remove_in(fields: &mut Vec<Field>, id: &str) -> Option<Field> {
    if let Some(pos) = fields.iter().position(|f| f.id() == id) {
        return Some(fields.remove(pos));
    }
    fields
        .iter_mut()
        .find_map(|f| f.children_mut().and_then(|children| remove_in(children, id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use formkit_schema::ValidationConfig;

    fn published(store: &FieldStore) -> (Rc<RefCell<Vec<Snapshot>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let sub = store.subscribe_fields(move |s| sink.borrow_mut().push(s.clone()));
        (log, sub)
    }

    fn ids(store: &FieldStore) -> Vec<String> {
        store.snapshot().iter().map(|f| f.id().to_string()).collect()
    }

    #[test]
    fn add_field_appends_selects_and_publishes_once() {
        let store = FieldStore::new();
        let (log, _sub) = published(&store);

        let id = store.add_field(FieldType::Select, None);
        assert!(id.as_str().starts_with("select-"));
        assert_eq!(store.selected_id(), Some(id.clone()));
        assert_eq!(log.borrow().len(), 1);

        let field = store.field(id.as_str()).unwrap();
        assert_eq!(field.label, "Select Field");
        assert_eq!(field.options().unwrap().len(), 2);
    }

    #[test]
    fn add_field_applies_config() {
        let store = FieldStore::new();
        let id = store.add_field(
            FieldType::Text,
            Some(FieldPatch::new().with_label("Name").with_required(true)),
        );
        let field = store.field(id.as_str()).unwrap();
        assert_eq!(field.label, "Name");
        assert!(field.required_flag());
    }

    #[test]
    fn ids_are_unique_across_rapid_adds() {
        let store = FieldStore::new();
        for _ in 0..50 {
            store.add_field(FieldType::Text, None);
        }
        let mut all = ids(&store);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 50);
    }

    #[test]
    fn select_does_not_check_existence() {
        let store = FieldStore::new();
        store.select_field(Some(FieldId::new("ghost")));
        assert_eq!(store.selected_id(), Some(FieldId::new("ghost")));
        assert!(store.selected_field().is_none());
        store.select_field(None);
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn update_merges_and_skips_no_ops() {
        let store = FieldStore::new();
        let id = store.add_field(FieldType::Text, None);
        let (log, _sub) = published(&store);

        assert!(store.update_field(
            id.as_str(),
            FieldPatch::new().with_validation(ValidationConfig::new().with_min_length(5))
        ));
        assert_eq!(store.field(id.as_str()).unwrap().validation().min_length, Some(5));
        assert_eq!(log.borrow().len(), 1);

        assert!(!store.update_field("missing", FieldPatch::new().with_label("x")));
        assert!(!store.update_field(id.as_str(), FieldPatch::new()));
        assert!(!store.update_field_options(id.as_str(), vec![FieldOption::numbered(1)]));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn update_options_replaces_wholesale() {
        let store = FieldStore::new();
        let id = store.add_field(FieldType::Radio, None);
        assert!(store.update_field_options(id.as_str(), vec![FieldOption::new("Yes", "yes")]));
        assert_eq!(
            store.field(id.as_str()).unwrap().options().unwrap(),
            [FieldOption::new("Yes", "yes")]
        );
    }

    #[test]
    fn remove_clears_selection_only_when_selected() {
        let store = FieldStore::new();
        let a = store.add_field(FieldType::Text, None);
        let b = store.add_field(FieldType::Email, None);
        assert_eq!(store.selected_id(), Some(b.clone()));

        assert!(store.remove_field(a.as_str()));
        assert_eq!(store.selected_id(), Some(b.clone()));
        assert!(store.remove_field(b.as_str()));
        assert_eq!(store.selected_id(), None);
        assert!(!store.remove_field(b.as_str()));
        assert!(store.is_empty());
    }

    #[test]
    fn nested_fields_are_addressable() {
        let store = FieldStore::new();
        let section = store.add_field(FieldType::Section, None);
        let child = store
            .add_child_field(section.as_str(), FieldType::Number, None)
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected_id(), Some(child.clone()));

        assert!(store.update_field(child.as_str(), FieldPatch::new().with_label("Age")));
        assert_eq!(store.field(child.as_str()).unwrap().label, "Age");

        // Removing the section drops the selected child with it.
        assert!(store.remove_field(section.as_str()));
        assert_eq!(store.selected_id(), None);
        assert!(store.field(child.as_str()).is_none());
    }

    #[test]
    fn add_child_to_non_section_is_a_no_op() {
        let store = FieldStore::new();
        let text = store.add_field(FieldType::Text, None);
        let version = store.version();
        assert!(store.add_child_field(text.as_str(), FieldType::Text, None).is_none());
        assert!(store.add_child_field("missing", FieldType::Text, None).is_none());
        assert_eq!(store.version(), version);
        assert_eq!(store.selected_id(), Some(text));
    }

    #[test]
    fn reorder_moves_with_shift_and_validates_bounds() {
        let store = FieldStore::new();
        let a = store.add_field(FieldType::Text, None);
        let b = store.add_field(FieldType::Text, None);
        let c = store.add_field(FieldType::Text, None);

        store.reorder_fields(0, 2).unwrap();
        assert_eq!(ids(&store), [b.to_string(), c.to_string(), a.to_string()]);

        let version = store.version();
        assert_eq!(
            store.reorder_fields(1, 3),
            Err(StoreError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            store.reorder_fields(7, 0),
            Err(StoreError::IndexOutOfRange { index: 7, len: 3 })
        );
        store.reorder_fields(1, 1).unwrap();
        assert_eq!(store.version(), version);
    }

    #[test]
    fn every_mutation_is_a_distinct_snapshot() {
        let store = FieldStore::new();
        let (log, _sub) = published(&store);
        let a = store.add_field(FieldType::Text, None);
        store.add_field(FieldType::Checkbox, None);
        store.reorder_fields(0, 1).unwrap();
        store.update_field(a.as_str(), FieldPatch::new().with_label("A"));
        store.remove_field(a.as_str());

        let log = log.borrow();
        assert_eq!(log.len(), 5);
        for pair in log.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn replace_clears_dangling_selection() {
        let store = FieldStore::new();
        store.add_field(FieldType::Text, None);
        store.replace_fields(vec![Field::new(FieldId::new("x"), FieldType::Email)]);
        assert_eq!(store.selected_id(), None);
        assert_eq!(ids(&store), ["x"]);
    }

    #[test]
    fn selected_binding_tracks_both_sources() {
        let store = FieldStore::new();
        let selected = store.bind_selected_field();
        assert!(selected.get().is_none());

        let id = store.add_field(FieldType::Textarea, None);
        assert_eq!(selected.get().unwrap().id(), &id);

        store.update_field(id.as_str(), FieldPatch::new().with_label("Bio"));
        assert_eq!(selected.get().unwrap().label, "Bio");
    }

    #[test]
    fn len_binding_follows_snapshots() {
        let store = FieldStore::new();
        let len = store.bind_len();
        assert_eq!(len.get(), 0);
        let id = store.add_field(FieldType::Number, None);
        store.add_field(FieldType::Email, None);
        assert_eq!(len.get(), 2);
        store.remove_field(id.as_str());
        assert_eq!(len.get(), 1);
    }

    #[test]
    fn clones_share_state() {
        let store = FieldStore::new();
        let other = store.clone();
        other.add_field(FieldType::Button, None);
        assert_eq!(store.len(), 1);
    }
}
