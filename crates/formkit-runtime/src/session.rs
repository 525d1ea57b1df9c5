#![forbid(unsafe_code)]

//! One form being edited: title, description, fields, history and rules.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Rejected import | malformed JSON or document shape | [`FormError::Schema`], logged at warn, nothing changes |
//! | Invalid pattern | a field's `validation.pattern` does not compile | [`FormError::Rules`] from `rules_for` / `validate` |

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use formkit_rules::{FieldValue, RuleCache, RuleSet, SubmissionReport, validate_submission};
use formkit_schema::{Field, FieldId, FormDocument};

use crate::error::FormError;
use crate::history::{HistoryCommand, HistoryConfig, HistoryTracker};
use crate::reactive::{Binding, BindingScope, Observable, Subscription, bind_observable};
use crate::store::FieldStore;

/// Builder-style settings for a [`FormSession`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub history: HistoryConfig,
    pub title: String,
    pub description: String,
}

impl SessionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An editing session over one form.
///
/// Owns the [`FieldStore`], a [`HistoryTracker`] attached to it, and a rule
/// cache that forgets fields as they disappear from the store.
pub struct FormSession {
    title: Observable<String>,
    description: Observable<String>,
    store: FieldStore,
    history: HistoryTracker,
    rules: Rc<RefCell<RuleCache>>,
    _scope: BindingScope,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl FormSession {
    /// An empty form.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_store(FieldStore::new(), config)
    }

    /// A session over an existing store; its current fields are the first
    /// history entry.
    #[must_use]
    pub fn with_store(store: FieldStore, config: SessionConfig) -> Self {
        let history = HistoryTracker::new(&store, config.history);
        let rules = Rc::new(RefCell::new(RuleCache::new()));

        let mut scope = BindingScope::new();
        let cache = Rc::clone(&rules);
        scope.hold(store.subscribe_fields(move |snapshot| {
            let mut live = Vec::new();
            for field in snapshot.iter() {
                field.walk(&mut |f| live.push(f.id().clone()));
            }
            cache.borrow_mut().prune(&live);
        }));

        Self {
            title: Observable::new(config.title),
            description: Observable::new(config.description),
            store,
            history,
            rules,
            _scope: scope,
        }
    }

    /// A session seeded from `document`.
    #[must_use]
    pub fn from_document(document: FormDocument, history: HistoryConfig) -> Self {
        let config = SessionConfig::new()
            .with_history(history)
            .with_title(document.title)
            .with_description(document.description);
        Self::with_store(FieldStore::with_fields(document.fields), config)
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    // -----------------------------------------------------------------------
    // Title and description
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn title(&self) -> String {
        self.title.get()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.title.set(title.into());
    }

    #[must_use]
    pub fn description(&self) -> String {
        self.description.get()
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.description.set(description.into());
    }

    #[must_use]
    pub fn bind_title(&self) -> Binding<String> {
        bind_observable(&self.title)
    }

    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe_title(&self, callback: impl Fn(&String) + 'static) -> Subscription {
        self.title.subscribe(callback)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    pub fn undo(&self) -> bool {
        self.history.undo()
    }

    pub fn redo(&self) -> bool {
        self.history.redo()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Handle a key press; returns whether it mapped to a command that ran.
    pub fn handle_shortcut(&self, ctrl_or_meta: bool, shift: bool, key: char) -> bool {
        HistoryCommand::from_shortcut(ctrl_or_meta, shift, key)
            .is_some_and(|command| self.history.execute(command))
    }

    // -----------------------------------------------------------------------
    // Export / import
    // -----------------------------------------------------------------------

    /// The form as a document.
    #[must_use]
    pub fn export_document(&self) -> FormDocument {
        FormDocument::new(self.store.snapshot().to_vec())
            .with_title(self.title.get())
            .with_description(self.description.get())
    }

    /// The form as indented JSON.
    pub fn export_json(&self) -> Result<String, FormError> {
        Ok(self.export_document().to_json_pretty()?)
    }

    /// Replace the form with the document in `text`.
    ///
    /// All or nothing: on error the fields, selection, title and description
    /// are untouched. A successful import is one undoable edit of the fields.
    pub fn import_json(&self, text: &str) -> Result<(), FormError> {
        match FormDocument::from_json(text) {
            Ok(document) => {
                self.import_document(document);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "rejected form import");
                Err(err.into())
            }
        }
    }

    /// Replace the form with `document`.
    pub fn import_document(&self, document: FormDocument) {
        let FormDocument {
            title,
            description,
            fields,
        } = document;
        tracing::info!(fields = fields.len(), title = %title, "form imported");
        self.title.set(title);
        self.description.set(description);
        self.store.replace_fields(fields);
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Rules for the field with `id`, memoized until the field changes.
    pub fn rules_for(&self, id: &str) -> Result<Option<Arc<RuleSet>>, FormError> {
        let Some(field) = self.store.field(id) else {
            return Ok(None);
        };
        Ok(Some(self.rules.borrow_mut().rules_for(&field)?))
    }

    /// Check a filled-in form against the current fields.
    pub fn validate(
        &self,
        values: &HashMap<FieldId, FieldValue>,
    ) -> Result<SubmissionReport, FormError> {
        let snapshot = self.store.snapshot();
        let report = validate_submission(&snapshot, values)?;
        tracing::debug!(
            errors = report.errors().len(),
            valid = report.is_valid(),
            "submission validated"
        );
        Ok(report)
    }

    /// A live view of the selected field.
    #[must_use]
    pub fn bind_selected_field(&self) -> Binding<Option<Field>> {
        self.store.bind_selected_field()
    }

    /// Number of fields with memoized rules.
    #[must_use]
    pub fn cached_rules(&self) -> usize {
        self.rules.borrow().len()
    }
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("title", &self.title.get())
            .field("fields", &self.store.len())
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}
