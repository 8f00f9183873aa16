use crate::config::Config;
use crate::input::{GestureRecognizer, ModalCoordinator, SearchFilterEngine, UserEvent};
use crate::page::{FeedId, Page};
use crate::sync::{OptimisticActionDispatcher, Scheduler, TimerTask};
use crate::transport::{Ack, RequestId, TransportError};
use std::borrow::Cow;
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Confirmation Dialog
// ============================================================================

/// Pending confirmation action for irreversible operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Delete a feed and every article of it on the page.
    DeleteFeed { feed_id: FeedId, title: String },
    /// Mark one feed, or every feed when `None`, read.
    MarkAllRead { feed_id: Option<FeedId> },
}

impl ConfirmAction {
    /// What the modal names.
    pub fn subject(&self, page: &Page) -> String {
        match self {
            ConfirmAction::DeleteFeed { title, .. } => format!("Delete feed \"{}\"?", title),
            ConfirmAction::MarkAllRead { feed_id: None } => "Mark all articles read?".to_string(),
            ConfirmAction::MarkAllRead {
                feed_id: Some(feed_id),
            } => match page.feed_title(*feed_id) {
                Some(title) => format!("Mark all of \"{}\" read?", title),
                None => format!("Mark all of feed {} read?", feed_id),
            },
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Everything the event loop reacts to besides timers and signals.
#[derive(Debug)]
pub enum AppEvent {
    /// One user interaction from the input stream.
    Input(UserEvent),
    /// The input stream reached end of file.
    InputClosed,
    /// A request task finished.
    RequestCompleted {
        request_id: RequestId,
        result: Result<Ack, TransportError>,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Behavior switches taken from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub confirm_mark_all_read: bool,
    pub confirm_delete_feed: bool,
    pub status_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            confirm_mark_all_read: config.confirm_mark_all_read,
            confirm_delete_feed: config.confirm_delete_feed,
            status_ttl: config.status_ttl(),
        }
    }
}

/// Central session state. Owned by the event loop; nothing here is shared
/// across tasks.
pub struct App {
    pub page: Page,
    /// Animation timers on the session clock.
    pub scheduler: Scheduler<TimerTask>,
    pub dispatcher: OptimisticActionDispatcher,
    pub search: SearchFilterEngine,
    pub gestures: GestureRecognizer,
    pub modal: ModalCoordinator<ConfirmAction>,
    pub settings: Settings,

    /// Status message with expiry; `Cow` avoids allocation for static literals.
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary renders.
    pub needs_redraw: bool,

    /// Set once the input stream has ended. The loop then exits as soon as
    /// no request or animation is outstanding.
    pub input_closed: bool,
}

impl App {
    pub fn new(page: Page, dispatcher: OptimisticActionDispatcher, settings: Settings) -> Self {
        Self {
            page,
            scheduler: Scheduler::new(),
            dispatcher,
            search: SearchFilterEngine::new(),
            gestures: GestureRecognizer::new(),
            modal: ModalCoordinator::new(),
            settings,
            status_message: None,
            needs_redraw: true,
            input_closed: false,
        }
    }

    /// Set status message (expires after the configured TTL).
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= self.settings.status_ttl {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    pub fn status(&self) -> Option<&str> {
        self.status_message.as_ref().map(|(msg, _)| msg.as_ref())
    }

    /// Fire every animation timer due at or before `now` (session time).
    /// Returns the number of timers that changed a row.
    pub fn advance_clock(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        while let Some((timer, task)) = self.scheduler.pop_due(now) {
            if self
                .dispatcher
                .on_timer(&mut self.page, &mut self.scheduler, timer, task)
                .is_some()
            {
                fired += 1;
            }
        }
        if fired > 0 {
            self.needs_redraw = true;
        }
        fired
    }

    /// Session time of the next animation step, if any.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// No request in flight and no animation pending.
    pub fn is_settled(&self) -> bool {
        self.dispatcher.in_flight() == 0 && self.scheduler.pending() == 0
    }
}
