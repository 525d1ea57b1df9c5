//! Immutable field-list snapshots.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use formkit_schema::{Field, FieldId};

/// An immutable copy of the field list at one point in time.
///
/// Equality is identity: two snapshots are equal only when they are the same
/// allocation. Every store mutation publishes a fresh snapshot, so "changed"
/// is a pointer comparison and never a deep walk of the tree. Use
/// [`same_content`](Self::same_content) for structural comparison.
#[derive(Clone)]
pub struct Snapshot(Rc<[Field]>);

impl Snapshot {
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        Self(Rc::from(fields))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The fields, top level only.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    /// Structural equality, regardless of identity.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }

    /// Ids of the top-level fields, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<FieldId> {
        self.0.iter().map(|f| f.id().clone()).collect()
    }

    /// Find a field by id at any nesting depth.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Field> {
        find_in(&self.0, id)
    }
}

pub(crate) fn find_in<'a>(fields: &'a [Field], id: &str) -> Option<&'a Field> {
    fields.iter().find_map(|f| {
        if f.id() == id {
            Some(f)
        } else {
            find_in(f.children(), id)
        }
    })
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Snapshot {
    type Target = [Field];

    fn deref(&self) -> &[Field] {
        &self.0
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|field| field.id().as_str()))
            .finish()
    }
}
