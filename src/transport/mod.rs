//! State-changing requests and the transports that deliver them.
//!
//! The sync layer only needs to know that a request targeting one article or
//! feed was submitted and, later, whether it succeeded. Completions are
//! delivered back to the event loop as `AppEvent::RequestCompleted` and may
//! arrive in any order.

mod http;

pub use http::{send_request, HttpTransport};

use crate::page::{ArticleId, FeedId};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Identifies one submitted request so its completion can be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A per-article state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleAction {
    MarkRead,
    MarkUnread,
    ToggleSave,
}

impl ArticleAction {
    pub fn name(self) -> &'static str {
        match self {
            ArticleAction::MarkRead => "mark-read",
            ArticleAction::MarkUnread => "mark-unread",
            ArticleAction::ToggleSave => "toggle-save",
        }
    }
}

/// A state-changing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Article {
        article_id: ArticleId,
        action: ArticleAction,
    },
    /// Mark every article of a feed read, or of all feeds when `None`.
    MarkAllRead { feed_id: Option<FeedId> },
    DeleteFeed { feed_id: FeedId },
}

impl ActionRequest {
    /// Endpoint path on the reader server.
    pub fn path(&self) -> String {
        match self {
            ActionRequest::Article { article_id, action } => match action {
                ArticleAction::MarkRead => format!("/articles/{article_id}/read"),
                ArticleAction::MarkUnread => format!("/articles/{article_id}/unread"),
                ArticleAction::ToggleSave => format!("/articles/{article_id}/save"),
            },
            ActionRequest::MarkAllRead { .. } => "/articles/mark-all-read".to_string(),
            ActionRequest::DeleteFeed { feed_id } => format!("/feeds/{feed_id}/delete"),
        }
    }

    /// Whether two requests must not be in flight at the same time.
    pub fn conflicts_with(&self, other: &ActionRequest) -> bool {
        match (self, other) {
            (
                ActionRequest::Article { article_id: a, .. },
                ActionRequest::Article { article_id: b, .. },
            ) => a == b,
            _ => self == other,
        }
    }
}

/// Successful response body. Every field is optional: an empty body or a
/// non-JSON body on a 2xx status still counts as success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: Option<bool>,
    /// Saved flag after a toggle, when the server reports it.
    #[serde(default)]
    pub is_saved: Option<bool>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Server rejected the request")]
    Rejected,
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Request task panicked: {0}")]
    TaskPanicked(String),
}

/// Delivers requests. Implementations must not block: the outcome is reported
/// later through the event queue (or by the caller, for test transports).
pub trait ActionTransport {
    fn submit(&self, id: RequestId, request: ActionRequest);
}

/// Transport that only records what was submitted. Whoever drives the
/// session feeds completions back by hand; used for scripted sessions and
/// tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    submitted: Rc<RefCell<Vec<(RequestId, ActionRequest)>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything submitted so far, in order.
    pub fn submitted(&self) -> Vec<(RequestId, ActionRequest)> {
        self.submitted.borrow().clone()
    }

    pub fn last(&self) -> Option<(RequestId, ActionRequest)> {
        self.submitted.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.submitted.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.submitted.borrow().is_empty()
    }
}

impl ActionTransport for RecordingTransport {
    fn submit(&self, id: RequestId, request: ActionRequest) {
        self.submitted.borrow_mut().push((id, request));
    }
}
