//! Memoized rule derivation.
//!
//! Rendering re-derives rules for every visible field on every frame. Since
//! [`derive_rules`] is referentially transparent, the cache keys on the field
//! id and re-derives only when the stored field is no longer structurally
//! equal to the one being asked about.
//!
//! # Invariants
//!
//! 1. `rules_for(f)` always equals `derive_rules(f)`.
//! 2. A failed derivation is never cached.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use formkit_schema::{Field, FieldId};

use crate::derive::derive_rules;
use crate::error::RuleError;
use crate::rule::RuleSet;

/// Per-field rule memo.
#[derive(Debug, Default)]
pub struct RuleCache {
    entries: HashMap<FieldId, (Field, Arc<RuleSet>)>,
    hits: u64,
    misses: u64,
}

impl RuleCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for `field`, derived on first use or after the field changed.
    pub fn rules_for(&mut self, field: &Field) -> Result<Arc<RuleSet>, RuleError> {
        if let Some((cached, rules)) = self.entries.get(field.id()) {
            if cached == field {
                self.hits += 1;
                return Ok(Arc::clone(rules));
            }
        }

        self.misses += 1;
        let rules = Arc::new(derive_rules(field)?);
        self.entries
            .insert(field.id().clone(), (field.clone(), Arc::clone(&rules)));
        Ok(rules)
    }

    /// Drop entries for ids not in `live`, e.g. after fields were removed.
    pub fn prune<'a>(&mut self, live: impl IntoIterator<Item = &'a FieldId>) {
        let live: HashSet<&FieldId> = live.into_iter().collect();
        self.entries.retain(|id, _| live.contains(id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since construction.
    #[must_use]
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_schema::{FieldPatch, FieldType, ValidationConfig};

    #[test]
    fn unchanged_field_hits() {
        let mut cache = RuleCache::new();
        let f = Field::new(FieldId::new("a"), FieldType::Email);
        let first = cache.rules_for(&f).unwrap();
        let second = cache.rules_for(&f.clone()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn edited_field_rederives() {
        let mut cache = RuleCache::new();
        let mut f = Field::new(FieldId::new("a"), FieldType::Text);
        let before = cache.rules_for(&f).unwrap();
        f.apply(FieldPatch::new().with_validation(ValidationConfig::new().with_max_length(3)));
        let after = cache.rules_for(&f).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*after, derive_rules(&f).unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached_and_prune_drops_dead_ids() {
        let mut cache = RuleCache::new();
        let mut bad = Field::new(FieldId::new("b"), FieldType::Text);
        bad.apply(FieldPatch::new().with_validation(ValidationConfig::new().with_pattern("(")));
        assert!(cache.rules_for(&bad).is_err());
        assert!(cache.is_empty());

        let keep = Field::new(FieldId::new("k"), FieldType::Text);
        let gone = Field::new(FieldId::new("g"), FieldType::Text);
        cache.rules_for(&keep).unwrap();
        cache.rules_for(&gone).unwrap();
        cache.prune([keep.id()]);
        assert_eq!(cache.len(), 1);
    }
}
