#![forbid(unsafe_code)]

//! Linear undo/redo over field-list snapshots.
//!
//! The tracker listens to the store. Every newly published snapshot that is
//! not the top of `history` becomes a new entry and clears `future`. Undo and
//! redo move snapshots between the two stacks and replay them into the store
//! under a replay guard, so replays are never recorded as edits.
//!
//! ```text
//! history: [s0, s1, s2]   future: []        live = s2
//!   undo -> [s0, s1]              [s2]      live = s1
//!   undo -> [s0]                  [s1, s2]  live = s0
//!   redo -> [s0, s1]              [s2]      live = s1
//!   edit -> [s0, s1, s3]          []        live = s3
//! ```
//!
//! # Invariants
//!
//! 1. `history` is never empty; its last entry is the live snapshot.
//! 2. Undo with one entry and redo with an empty `future` are no-ops.
//! 3. A replayed snapshot is the very snapshot that was recorded, so
//!    identity-based change detection sees the restore.
//! 4. With [`HistoryConfig::with_max_entries`], the oldest entries are
//!    dropped first and at least one entry always remains.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::reactive::Subscription;
use crate::snapshot::Snapshot;
use crate::store::FieldStore;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// History limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Upper bound on `history` entries; `None` keeps everything.
    pub max_entries: Option<usize>,
}

impl HistoryConfig {
    /// Keep every entry.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { max_entries: None }
    }

    /// Keep at most `n` entries (at least one).
    #[must_use]
    pub const fn with_max_entries(mut self, n: usize) -> Self {
        self.max_entries = Some(if n == 0 { 1 } else { n });
        self
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// An undo or redo request, usually from a toolbar or a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryCommand {
    Undo,
    Redo,
}

impl HistoryCommand {
    /// Map a key press to a command.
    ///
    /// | Keys | Command |
    /// |------|---------|
    /// | Ctrl/Cmd + Z | Undo |
    /// | Ctrl/Cmd + Shift + Z | Redo |
    /// | Ctrl/Cmd + Y | Redo |
    #[must_use]
    pub fn from_shortcut(ctrl_or_meta: bool, shift: bool, key: char) -> Option<Self> {
        if !ctrl_or_meta {
            return None;
        }
        match key.to_ascii_lowercase() {
            'z' if shift => Some(Self::Redo),
            'z' => Some(Self::Undo),
            'y' => Some(Self::Redo),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Timeline {
    history: VecDeque<Snapshot>,
    future: VecDeque<Snapshot>,
    max_entries: Option<usize>,
}

impl Timeline {
    fn record(&mut self, snapshot: Snapshot) -> bool {
        if self.history.back() == Some(&snapshot) {
            return false;
        }
        self.history.push_back(snapshot);
        self.future.clear();
        self.trim();
        true
    }

    fn trim(&mut self) {
        if let Some(max) = self.max_entries {
            while self.history.len() > max.max(1) {
                self.history.pop_front();
            }
        }
    }
}

/// Sets the shared replay flag for its lifetime.
struct ReplayGuard {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl ReplayGuard {
    fn engage(flag: &Rc<Cell<bool>>) -> Self {
        let previous = flag.replace(true);
        Self {
            flag: Rc::clone(flag),
            previous,
        }
    }
}

impl Drop for ReplayGuard {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// Undo/redo stacks attached to one [`FieldStore`].
///
/// Recording stops when the tracker is dropped.
pub struct HistoryTracker {
    store: FieldStore,
    timeline: Rc<RefCell<Timeline>>,
    replaying: Rc<Cell<bool>>,
    _subscription: Subscription,
}

impl HistoryTracker {
    /// Start tracking `store`; its current snapshot is the initial entry.
    #[must_use]
    pub fn new(store: &FieldStore, config: HistoryConfig) -> Self {
        let timeline = Rc::new(RefCell::new(Timeline {
            history: VecDeque::from([store.snapshot()]),
            future: VecDeque::new(),
            max_entries: config.max_entries,
        }));
        let replaying = Rc::new(Cell::new(false));

        let subscription = {
            let timeline = Rc::clone(&timeline);
            let replaying = Rc::clone(&replaying);
            store.subscribe_fields(move |snapshot| {
                if replaying.get() {
                    return;
                }
                let mut timeline = timeline.borrow_mut();
                if timeline.record(snapshot.clone()) {
                    tracing::debug!(
                        history = timeline.history.len(),
                        "history entry recorded"
                    );
                }
            })
        };

        Self {
            store: store.clone(),
            timeline,
            replaying,
            _subscription: subscription,
        }
    }

    /// Whether there is an earlier state to return to.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.timeline.borrow().history.len() > 1
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.timeline.borrow().future.is_empty()
    }

    /// Number of `history` entries, the live state included.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.timeline.borrow().history.len()
    }

    #[must_use]
    pub fn future_len(&self) -> usize {
        self.timeline.borrow().future.len()
    }

    /// Restore the previous snapshot. Returns whether anything happened.
    pub fn undo(&self) -> bool {
        let target = {
            let mut timeline = self.timeline.borrow_mut();
            if timeline.history.len() <= 1 {
                return false;
            }
            let Some(current) = timeline.history.pop_back() else {
                return false;
            };
            timeline.future.push_front(current);
            timeline.history.back().cloned()
        };
        let Some(target) = target else {
            return false;
        };

        self.replay(target);
        tracing::debug!(
            history = self.history_len(),
            future = self.future_len(),
            "undo"
        );
        true
    }

    /// Re-apply the nearest undone snapshot. Returns whether anything
    /// happened.
    pub fn redo(&self) -> bool {
        let target = {
            let mut timeline = self.timeline.borrow_mut();
            let Some(next) = timeline.future.pop_front() else {
                return false;
            };
            timeline.history.push_back(next.clone());
            timeline.trim();
            next
        };

        self.replay(target);
        tracing::debug!(
            history = self.history_len(),
            future = self.future_len(),
            "redo"
        );
        true
    }

    /// Run `command`. Returns whether anything happened.
    pub fn execute(&self, command: HistoryCommand) -> bool {
        match command {
            HistoryCommand::Undo => self.undo(),
            HistoryCommand::Redo => self.redo(),
        }
    }

    fn replay(&self, snapshot: Snapshot) {
        let _guard = ReplayGuard::engage(&self.replaying);
        self.store.apply_snapshot(snapshot);
    }
}

impl fmt::Debug for HistoryTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryTracker")
            .field("history", &self.history_len())
            .field("future", &self.future_len())
            .finish_non_exhaustive()
    }
}
