//! Integration tests for whole interaction sequences.
//!
//! Each test loads a page snapshot, drives it with user events through the
//! public runtime entry points and answers requests by hand through a
//! recording transport, so timing and completion order are fully scripted.

use pretty_assertions::assert_eq;
use skim_live::app::{App, AppEvent, Settings};
use skim_live::input::UserEvent;
use skim_live::page::{ArticleId, FeedId, PageSnapshot};
use skim_live::runtime::{handle_app_event, render, Action};
use skim_live::sync::{OptimisticActionDispatcher, UnreadCounterStore, ViewMode};
use skim_live::transport::{Ack, ActionRequest, ArticleAction, RecordingTransport, TransportError};
use std::time::Duration;

const SNAPSHOT: &str = r#"{
    "feeds": [
        {"id": 1, "title": "Rust Blog", "unread_count": 3},
        {"id": 2, "title": "LWN", "unread_count": 7}
    ],
    "groups": [
        {"id": "today", "article_ids": [10, 11]},
        {"id": "older", "article_ids": [20]}
    ],
    "articles": [
        {"id": 10, "feed_id": 1, "title": "Alpha release notes", "summary": "alpha and beta"},
        {"id": 11, "feed_id": 1, "title": "Async closures", "summary": "Stabilized at last"},
        {"id": 20, "feed_id": 2, "title": "Beta kernels", "summary": "The BETA cycle"},
        {"id": 21, "feed_id": 2, "title": "Old news", "is_read": true}
    ]
}"#;

struct Session {
    app: App,
    transport: RecordingTransport,
}

impl Session {
    fn new(mode: ViewMode) -> Self {
        let snapshot = PageSnapshot::from_json(SNAPSHOT).unwrap();
        let transport = RecordingTransport::new();
        let dispatcher = OptimisticActionDispatcher::new(
            mode,
            UnreadCounterStore::new(snapshot.unread_counts()),
            Box::new(transport.clone()),
        );
        let app = App::new(snapshot.to_page(), dispatcher, Settings::default());
        Self { app, transport }
    }

    fn send(&mut self, event: UserEvent) -> Action {
        handle_app_event(&mut self.app, AppEvent::Input(event))
    }

    fn respond(&mut self, result: Result<Ack, TransportError>) {
        let (request_id, _) = self.transport.last().expect("a request was issued");
        handle_app_event(
            &mut self.app,
            AppEvent::RequestCompleted { request_id, result },
        );
    }

    fn succeed(&mut self) {
        self.respond(Ok(Ack::default()));
    }

    fn advance(&mut self, ms: u64) {
        let now = self.app.scheduler.now() + Duration::from_millis(ms);
        self.app.advance_clock(now);
    }

    fn swipe(&mut self, id: i64, dx: f64) {
        let article_id = ArticleId(id);
        self.send(UserEvent::TouchStart { article_id, x: 400.0 });
        self.send(UserEvent::TouchMove {
            article_id,
            x: 400.0 + dx,
        });
        self.send(UserEvent::TouchEnd { article_id });
    }

    fn count(&self, feed: i64) -> Option<u32> {
        self.app.dispatcher.counters().get(FeedId(feed))
    }

    fn aggregate(&self) -> u64 {
        self.app.dispatcher.counters().aggregate()
    }

    fn visible(&self, id: i64) -> bool {
        self.app
            .page
            .get(ArticleId(id))
            .is_some_and(|a| a.is_visible())
    }
}

// ============================================================================
// Undo scenario
// ============================================================================

#[test]
fn test_mark_read_then_undo_in_unread_view() {
    let mut s = Session::new(ViewMode::UnreadOnly);
    assert_eq!(s.count(1), Some(3));
    assert_eq!(s.aggregate(), 10);

    s.send(UserEvent::ToggleRead {
        article_id: ArticleId(11),
    });
    s.succeed();
    s.advance(400);
    s.advance(300);

    assert_eq!(s.count(1), Some(2));
    assert_eq!(s.aggregate(), 9);
    assert!(!s.visible(11));
    let pending = s.app.dispatcher.undo().pending().unwrap();
    assert_eq!(pending.article_id, ArticleId(11));
    assert_eq!(pending.label, "Marked read: Async closures");

    s.send(UserEvent::UndoClick);
    assert_eq!(
        s.transport.last().unwrap().1,
        ActionRequest::Article {
            article_id: ArticleId(11),
            action: ArticleAction::MarkUnread
        }
    );
    s.succeed();

    assert_eq!(s.count(1), Some(3));
    assert_eq!(s.aggregate(), 10);
    assert!(s.visible(11));
    assert!(!s.app.dispatcher.undo().is_visible());
    assert_eq!(s.app.status(), Some("Restored"));
}

#[test]
fn test_second_removal_finalizes_first() {
    let mut s = Session::new(ViewMode::UnreadOnly);
    s.send(UserEvent::TitleClick {
        article_id: ArticleId(10),
    });
    s.succeed();
    s.advance(700);

    s.send(UserEvent::TitleClick {
        article_id: ArticleId(20),
    });
    s.succeed();
    s.advance(700);

    assert!(!s.app.page.contains(ArticleId(10)));
    assert_eq!(
        s.app.dispatcher.undo().pending().unwrap().article_id,
        ArticleId(20)
    );

    // Undo now only affects the second removal.
    s.send(UserEvent::UndoClick);
    s.succeed();
    assert!(s.visible(20));
    assert!(!s.app.page.contains(ArticleId(10)));
    assert_eq!(s.count(1), Some(2));
    assert_eq!(s.count(2), Some(7));
}

#[test]
fn test_dismiss_removes_row_for_good() {
    let mut s = Session::new(ViewMode::UnreadOnly);
    s.send(UserEvent::TitleClick {
        article_id: ArticleId(10),
    });
    s.succeed();
    s.advance(700);
    s.send(UserEvent::UndoDismiss);

    assert!(!s.app.page.contains(ArticleId(10)));
    assert!(!s.app.dispatcher.undo().is_visible());
    let requests = s.transport.len();
    s.send(UserEvent::UndoClick);
    assert_eq!(s.transport.len(), requests);
}

// ============================================================================
// Gestures
// ============================================================================

#[test]
fn test_swipe_boundaries() {
    let mut s = Session::new(ViewMode::All);

    s.swipe(10, -79.0);
    assert!(s.transport.is_empty());

    s.swipe(10, -80.0);
    assert!(s.transport.is_empty());

    s.swipe(10, -81.0);
    assert_eq!(
        s.transport.last().unwrap().1,
        ActionRequest::Article {
            article_id: ArticleId(10),
            action: ArticleAction::MarkRead
        }
    );
}

#[test]
fn test_swipe_then_complete_dims_row_in_all_view() {
    let mut s = Session::new(ViewMode::All);
    s.swipe(20, -120.0);
    s.succeed();
    assert!(s.app.page.get(ArticleId(20)).unwrap().visual.just_read);

    s.advance(400);
    let article = s.app.page.get(ArticleId(20)).unwrap();
    assert!(article.visual.is_read);
    assert!(article.is_visible());
    assert_eq!(article.visual.offset_px, 0.0);
    assert_eq!(s.count(2), Some(6));
    assert!(!s.app.dispatcher.undo().is_visible());
}

#[test]
fn test_swipe_left_during_collapse_marks_unread() {
    let mut s = Session::new(ViewMode::UnreadOnly);
    s.send(UserEvent::TitleClick {
        article_id: ArticleId(11),
    });
    s.succeed();
    s.advance(450);
    assert!(s.app.dispatcher.undo().is_visible());

    s.swipe(11, -100.0);
    assert_eq!(
        s.transport.last().unwrap().1,
        ActionRequest::Article {
            article_id: ArticleId(11),
            action: ArticleAction::MarkUnread
        }
    );
    s.succeed();

    assert!(!s.app.dispatcher.undo().is_visible());
    assert!(s.visible(11));
    assert_eq!(s.app.page.get(ArticleId(11)).unwrap().visual.max_height, None);
    assert_eq!(s.count(1), Some(3));
    assert_eq!(s.aggregate(), 10);

    s.advance(1000);
    assert!(s.visible(11));
}

#[test]
fn test_tap_does_nothing() {
    let mut s = Session::new(ViewMode::All);
    s.swipe(10, 5.0);
    assert!(s.transport.is_empty());
    assert_eq!(s.app.page.get(ArticleId(10)).unwrap().visual.opacity, 1.0);
}

// ============================================================================
// Dispatch edge cases
// ============================================================================

#[test]
fn test_mark_read_on_read_article_is_a_no_op() {
    let mut s = Session::new(ViewMode::All);
    s.send(UserEvent::TitleClick {
        article_id: ArticleId(21),
    });
    assert!(s.transport.is_empty());
    assert_eq!(s.aggregate(), 10);
}

#[test]
fn test_failed_request_leaves_page_unchanged() {
    let mut s = Session::new(ViewMode::UnreadOnly);
    let before = render(&s.app);
    s.send(UserEvent::TitleClick {
        article_id: ArticleId(10),
    });
    s.respond(Err(TransportError::Timeout));
    s.advance(1000);

    s.app.status_message = None;
    assert_eq!(render(&s.app), before);
    assert_eq!(s.aggregate(), 10);
}

#[test]
fn test_busy_row_rejects_second_action() {
    let mut s = Session::new(ViewMode::All);
    s.send(UserEvent::TitleClick {
        article_id: ArticleId(10),
    });
    s.send(UserEvent::ToggleSave {
        article_id: ArticleId(10),
    });
    assert_eq!(s.transport.len(), 1);
    assert_eq!(
        s.app.status(),
        Some("Error: Article 10 already has a request in flight")
    );
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn test_requery_restores_previous_highlights() {
    let mut s = Session::new(ViewMode::All);
    s.send(UserEvent::SearchInput {
        query: "alpha".to_string(),
    });
    assert!(s.visible(10));
    assert!(!s.visible(20));

    s.send(UserEvent::SearchInput {
        query: "beta".to_string(),
    });
    let alpha = s.app.page.get(ArticleId(10)).unwrap();
    assert_eq!(alpha.title.content(), "Alpha release notes");
    assert_eq!(alpha.summary.content(), "alpha and <mark>beta</mark>");
    assert!(s.visible(20));
    assert!(!s.visible(11));
    assert!(s.app.page.groups().iter().all(|g| !g.search_hidden));

    s.send(UserEvent::SearchClear);
    assert!(s
        .app
        .page
        .articles()
        .all(|a| !a.title.is_highlighted() && !a.summary.is_highlighted()));
}

// ============================================================================
// Modal-gated actions
// ============================================================================

#[test]
fn test_delete_feed_after_confirmation() {
    let mut s = Session::new(ViewMode::All);
    s.send(UserEvent::DeleteFeed { feed_id: FeedId(2) });
    assert!(s.transport.is_empty());
    assert!(render(&s.app).contains("[confirm] Delete feed \"LWN\"?"));

    s.send(UserEvent::ModalConfirm);
    s.succeed();

    assert_eq!(s.count(2), None);
    assert_eq!(s.aggregate(), 3);
    assert!(!s.app.page.contains(ArticleId(20)));
    assert!(!s.app.page.contains(ArticleId(21)));
    assert_eq!(s.app.page.feeds().len(), 1);
    assert_eq!(s.app.status(), Some("Feed deleted"));
}

#[test]
fn test_cancelled_mark_all_read_sends_nothing() {
    let mut s = Session::new(ViewMode::All);
    s.send(UserEvent::MarkAllRead { feed_id: None });
    s.send(UserEvent::ModalCancel);
    s.send(UserEvent::ModalConfirm);
    assert!(s.transport.is_empty());
    assert_eq!(s.aggregate(), 10);
}

#[test]
fn test_mark_feed_read_in_all_view_dims_rows() {
    let mut s = Session::new(ViewMode::All);
    s.send(UserEvent::MarkAllRead {
        feed_id: Some(FeedId(1)),
    });
    s.send(UserEvent::ModalConfirm);
    s.succeed();

    assert_eq!(s.count(1), Some(0));
    assert_eq!(s.aggregate(), 7);
    for id in [10, 11] {
        let article = s.app.page.get(ArticleId(id)).unwrap();
        assert!(article.read && article.visual.is_read);
    }
    assert!(render(&s.app).starts_with("== All Feeds (7) [all] ==\nRust Blog | LWN (7)\n"));
}

#[test]
fn test_quit_ends_session() {
    let mut s = Session::new(ViewMode::All);
    assert_eq!(s.send(UserEvent::Quit), Action::Quit);
}
