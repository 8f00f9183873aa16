//! Read-state synchronization: counters, animations, undo and dispatch.
//!
//! Everything in here runs on the single event-loop task. The counter store
//! and the undo slot are the only state shared between components and both
//! check their invariants on every mutation.

pub mod choreography;
pub mod counters;
pub mod dispatch;
pub mod scheduler;
pub mod undo;

pub use choreography::{AnimationChoreographer, Phase, TimerTask, COLLAPSE_DURATION, FLASH_DURATION};
pub use counters::{CounterDisplay, UnreadCounterStore};
pub use dispatch::{Completion, DispatchError, Dispatched, OptimisticActionDispatcher};
pub use scheduler::{Scheduler, TimerId};
pub use undo::{PendingUndo, UndoManager};

/// Which article list the page is showing. Resolved once when the session
/// starts and never re-queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Read and unread articles; read rows are dimmed in place.
    #[default]
    All,
    /// Unread articles only; read rows collapse out of the list.
    UnreadOnly,
}

impl ViewMode {
    pub fn from_unread_flag(unread_only: bool) -> Self {
        if unread_only {
            ViewMode::UnreadOnly
        } else {
            ViewMode::All
        }
    }
}
