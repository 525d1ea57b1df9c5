#![forbid(unsafe_code)]

//! Read bindings over [`Observable`] state, and scopes that own
//! subscriptions.
//!
//! A [`Binding<T>`] wraps an evaluation closure over one or more observables.
//! Editor panels use them to read derived values (the selected field, the
//! undo button state) without holding on to the store itself.
//!
//! # Invariants
//!
//! 1. `Binding::get()` always returns the current value; nothing is cached.
//! 2. Bindings are `Clone` and clones share the same sources.
//! 3. Dropping a [`BindingScope`] releases every subscription it holds, so no
//!    callback registered through it fires afterwards.
//!
//! # Failure Modes
//!
//! - Transform panic: propagates to the caller of `get()`.
//! - Source dropped while a binding is alive: the binding keeps the shared
//!   state alive and still works.

use std::rc::Rc;

use super::observable::{Observable, Subscription};

// ---------------------------------------------------------------------------
// Binding<T>
// ---------------------------------------------------------------------------

/// A read-only, lazily evaluated view of reactive state.
pub struct Binding<T> {
    eval: Rc<dyn Fn() -> T>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            eval: Rc::clone(&self.eval),
        }
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("value", &self.get())
            .finish()
    }
}

impl<T: 'static> Binding<T> {
    /// A binding that evaluates `f` on each `get()` call.
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Self { eval: Rc::new(f) }
    }

    #[must_use]
    pub fn get(&self) -> T {
        (self.eval)()
    }

    /// Apply a further transform.
    pub fn then<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Binding<U> {
        Binding {
            eval: Rc::new(move || f((self.eval)())),
        }
    }
}

/// A binding that reads `source` unchanged.
pub fn bind_observable<T: Clone + PartialEq + 'static>(source: &Observable<T>) -> Binding<T> {
    let src = source.clone();
    Binding::new(move || src.get())
}

/// A binding that maps the borrowed value of `source`.
pub fn bind_mapped<S: Clone + PartialEq + 'static, T: 'static>(
    source: &Observable<S>,
    map: impl Fn(&S) -> T + 'static,
) -> Binding<T> {
    let src = source.clone();
    Binding::new(move || src.with(|v| map(v)))
}

/// A binding over two sources, e.g. the field list and the selected id.
pub fn bind_mapped2<
    S1: Clone + PartialEq + 'static,
    S2: Clone + PartialEq + 'static,
    T: 'static,
>(
    s1: &Observable<S1>,
    s2: &Observable<S2>,
    map: impl Fn(&S1, &S2) -> T + 'static,
) -> Binding<T> {
    let src1 = s1.clone();
    let src2 = s2.clone();
    Binding::new(move || src1.with(|v1| src2.with(|v2| map(v1, v2))))
}

// ---------------------------------------------------------------------------
// BindingScope
// ---------------------------------------------------------------------------

/// Owns the subscriptions of one logical component.
///
/// Subscriptions are released when the scope drops or on [`clear`](Self::clear).
#[derive(Default)]
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `sub` alive for the lifetime of the scope.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Subscribe to `source` within this scope.
    pub fn subscribe<T: Clone + PartialEq + 'static>(
        &mut self,
        source: &Observable<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        self.subscriptions.push(source.subscribe(callback));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release all subscriptions now; the scope stays usable.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn mapped_binding_follows_source() {
        let title = Observable::new(String::from("Signup"));
        let heading = bind_mapped(&title, |t| format!("{t} form"));
        assert_eq!(heading.get(), "Signup form");

        title.set("Survey".into());
        assert_eq!(heading.get(), "Survey form");
    }

    #[test]
    fn two_source_binding() {
        let ids = Observable::new(vec!["a", "b"]);
        let selected = Observable::new(Some("b"));
        let position = bind_mapped2(&ids, &selected, |ids, sel| {
            sel.and_then(|s| ids.iter().position(|id| *id == s))
        });
        assert_eq!(position.get(), Some(1));

        ids.set(vec!["b"]);
        assert_eq!(position.get(), Some(0));
        selected.set(None);
        assert_eq!(position.get(), None);
    }

    #[test]
    fn then_chains_and_clones_share_source() {
        let count = Observable::new(0usize);
        let empty = bind_observable(&count).then(|n| n == 0);
        let other = empty.clone();
        count.set(3);
        assert!(!empty.get());
        assert!(!other.get());
    }

    #[test]
    fn scope_releases_on_drop_and_clear() {
        let obs = Observable::new(0);
        let seen = Rc::new(Cell::new(0));
        {
            let mut scope = BindingScope::new();
            let s = Rc::clone(&seen);
            scope.subscribe(&obs, move |v| s.set(*v));
            let s = Rc::clone(&seen);
            scope.hold(obs.subscribe(move |v| s.set(s.get() + *v)));
            assert_eq!(scope.len(), 2);
            obs.set(1);
            assert_eq!(seen.get(), 2);

            scope.clear();
            assert!(scope.is_empty());
            obs.set(5);
            assert_eq!(seen.get(), 2);

            let s = Rc::clone(&seen);
            scope.subscribe(&obs, move |v| s.set(*v));
            obs.set(7);
            assert_eq!(seen.get(), 7);
        }
        obs.set(100);
        assert_eq!(seen.get(), 7);
    }
}
