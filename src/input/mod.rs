//! Intent recognition: swipe gestures, live search and confirmation modals.

pub mod gesture;
pub mod modal;
pub mod search;

pub use gesture::{DragFeedback, GestureRecognizer, GestureSession, Swipe};
pub use modal::{ModalCoordinator, PendingConfirm};
pub use search::{SearchFilterEngine, SearchSummary};

use crate::page::{ArticleId, FeedId};
use serde::Deserialize;

/// One user interaction, as delivered by the page.
///
/// Read as JSON lines, e.g. `{"type": "touch_move", "article_id": 3, "x": 120}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserEvent {
    /// The article's title link was followed.
    TitleClick { article_id: ArticleId },
    /// The row's Mark Read / Mark Unread form was submitted.
    ToggleRead { article_id: ArticleId },
    /// The star button was pressed.
    ToggleSave { article_id: ArticleId },
    TouchStart { article_id: ArticleId, x: f64 },
    TouchMove { article_id: ArticleId, x: f64 },
    TouchEnd { article_id: ArticleId },
    /// Keystroke in the search box; carries the whole current value.
    SearchInput { query: String },
    /// The search box clear button.
    SearchClear,
    UndoClick,
    UndoDismiss,
    /// Mark a feed read, or everything when `feed_id` is absent.
    MarkAllRead {
        #[serde(default)]
        feed_id: Option<FeedId>,
    },
    DeleteFeed { feed_id: FeedId },
    ModalConfirm,
    ModalCancel,
    /// Click on the backdrop outside the modal body.
    ModalOutsideClick,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_event_json() {
        let event: UserEvent =
            serde_json::from_str(r#"{"type": "touch_move", "article_id": 3, "x": 120}"#).unwrap();
        assert_eq!(
            event,
            UserEvent::TouchMove {
                article_id: ArticleId(3),
                x: 120.0
            }
        );

        let event: UserEvent = serde_json::from_str(r#"{"type": "mark_all_read"}"#).unwrap();
        assert_eq!(event, UserEvent::MarkAllRead { feed_id: None });

        let event: UserEvent = serde_json::from_str(r#"{"type": "undo_click"}"#).unwrap();
        assert_eq!(event, UserEvent::UndoClick);
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        assert!(serde_json::from_str::<UserEvent>(r#"{"type": "scroll"}"#).is_err());
    }
}
