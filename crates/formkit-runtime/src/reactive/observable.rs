#![forbid(unsafe_code)]

//! Shared, version-tracked values with change notification.
//!
//! # Invariants
//!
//! 1. The version increments exactly once per `set` that changes the value.
//! 2. Setting a value equal to the current one is a no-op: no version bump,
//!    no notifications.
//! 3. Subscribers are notified in registration order, after the new value is
//!    stored, with no internal borrow held. A callback may therefore read the
//!    observable or `set` it again; subscribers not yet reached then see only
//!    the newer value, never the superseded one.
//! 4. Dropping a [`Subscription`] stops its callback before the next
//!    notification. Dead entries are removed lazily.
//!
//! # Failure Modes
//!
//! - Callback panic: propagates to the caller of `set`; the value has already
//!   been updated.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = dyn Fn(&T);

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared value wrapper. Clones share state.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// A clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not call [`set`](Self::set) on the same observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value and notify subscribers. Returns whether it changed.
    pub fn set(&self, value: T) -> bool {
        let (version, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks = inner
                .subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect::<Vec<_>>();
            (inner.version, callbacks)
        };

        if !callbacks.is_empty() {
            let value = self.get();
            for callback in callbacks {
                // A nested `set` already notified everyone with a newer value.
                if self.version() != version {
                    break;
                }
                callback(&value);
            }
        }
        true
    }

    /// Register `callback`; it runs on every change until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&callback));
        Subscription {
            _callback: Box::new(callback),
        }
    }

    /// Number of changes since construction.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

/// RAII handle for a subscription; dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    // Holds the only strong reference to the callback.
    _callback: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn set_bumps_version_and_notifies() {
        let obs = Observable::new(1);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let _sub = obs.subscribe(move |v| s.set(*v));

        assert!(obs.set(5));
        assert_eq!(seen.get(), 5);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn equal_value_is_a_no_op() {
        let obs = Observable::new(String::from("a"));
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let _sub = obs.subscribe(move |_| c.set(c.get() + 1));

        assert!(!obs.set("a".into()));
        assert_eq!(calls.get(), 0);
        assert_eq!(obs.version(), 0);
    }

    #[test]
    fn dropped_subscription_stops_callbacks() {
        let obs = Observable::new(0);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let sub = obs.subscribe(move |v| s.set(*v));
        assert_eq!(obs.subscriber_count(), 1);

        drop(sub);
        obs.set(9);
        assert_eq!(seen.get(), 0);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn callbacks_may_read_and_write_the_source() {
        let obs = Observable::new(0);
        let echo = obs.clone();
        let _sub = obs.subscribe(move |v| {
            // Clamp into range from inside the notification.
            if *v > 10 {
                echo.set(10);
            }
            assert_eq!(echo.get(), (*v).min(10));
        });
        obs.set(42);
        assert_eq!(obs.get(), 10);
    }

    #[test]
    fn nested_set_supersedes_the_outer_value() {
        let obs = Observable::new(0);
        let echo = obs.clone();
        let _clamp = obs.subscribe(move |v| {
            if *v > 10 {
                echo.set(10);
            }
        });
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        let _later = obs.subscribe(move |v| l.borrow_mut().push(*v));

        obs.set(42);
        assert_eq!(*log.borrow(), [10]);
        assert_eq!(obs.get(), 10);
        assert_eq!(obs.version(), 2);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<_> = (0..3)
            .map(|i| {
                let log = Rc::clone(&log);
                obs.subscribe(move |_| log.borrow_mut().push(i))
            })
            .collect();
        obs.set(1);
        assert_eq!(*log.borrow(), [0, 1, 2]);
        drop(subs);
    }
}
