#![forbid(unsafe_code)]

//! Editing runtime for formkit forms.
//!
//! - [`FieldStore`]: the ordered field list and the selection, published as
//!   immutable [`Snapshot`]s to subscribers.
//! - [`HistoryTracker`]: linear undo/redo over those snapshots.
//! - [`FormSession`]: a store, its history, the form title and description,
//!   rule memoization and JSON export/import, bundled for an editor.
//!
//! Everything here is single-threaded (`!Send`) and synchronous: every
//! operation completes before the next one is observed.
//!
//! # Example
//!
//! ```
//! use formkit_runtime::{FormSession, SessionConfig};
//! use formkit_schema::FieldType;
//!
//! let session = FormSession::new(SessionConfig::new().with_title("Signup"));
//! let id = session.store().add_field(FieldType::Email, None);
//! assert_eq!(session.store().selected_id(), Some(id));
//!
//! session.undo();
//! assert!(session.store().is_empty());
//! ```

pub mod error;
pub mod history;
pub mod reactive;
pub mod session;
pub mod snapshot;
pub mod store;

pub use error::{FormError, StoreError};
pub use history::{HistoryCommand, HistoryConfig, HistoryTracker};
pub use reactive::{Binding, BindingScope, Observable, Subscription};
pub use session::{FormSession, SessionConfig};
pub use snapshot::Snapshot;
pub use store::FieldStore;
