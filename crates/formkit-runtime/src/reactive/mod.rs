#![forbid(unsafe_code)]

//! Change-tracking primitives the store is built on.
//!
//! - [`Observable`]: a shared, version-tracked value with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Binding`]: a lazily evaluated read view over one or two observables.
//! - [`BindingScope`]: owner of a component's subscriptions.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` callbacks and cleaned up
//! lazily during notification. Nothing here is `Send`: the editor runs on one
//! thread, like the UI event loop that drives it.

pub mod binding;
pub mod observable;

pub use binding::{Binding, BindingScope, bind_mapped, bind_mapped2, bind_observable};
pub use observable::{Observable, Subscription};
