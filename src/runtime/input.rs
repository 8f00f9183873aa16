//! User input handling.
//!
//! Maps each `UserEvent` to the component that owns the intent: touch events
//! go through the gesture recognizer, row controls straight to the
//! dispatcher, irreversible actions through the confirmation modal.

use super::loop_runner::Action;
use crate::app::{App, ConfirmAction};
use crate::input::{DragFeedback, Swipe, UserEvent};
use crate::page::{ArticleId, FeedId, ToggleLabel, Transition};
use crate::sync::{DispatchError, Dispatched};
use crate::transport::ArticleAction;
use anyhow::Result;

/// Handle one user interaction.
///
/// Dispatch precondition failures come back as errors; the caller reports
/// them and carries on. Nothing on the page has changed in that case.
pub fn handle_input(app: &mut App, event: UserEvent) -> Result<Action> {
    app.needs_redraw = true;

    match event {
        UserEvent::Quit => return Ok(Action::Quit),

        // Following the title link reads the article.
        UserEvent::TitleClick { article_id } => {
            transition(app, article_id, ArticleAction::MarkRead)?;
        }
        UserEvent::ToggleRead { article_id } => {
            let action = match app.page.get(article_id).map(|a| a.toggle) {
                Some(ToggleLabel::MarkUnread) => ArticleAction::MarkUnread,
                _ => ArticleAction::MarkRead,
            };
            transition(app, article_id, action)?;
        }
        UserEvent::ToggleSave { article_id } => {
            transition(app, article_id, ArticleAction::ToggleSave)?;
        }

        UserEvent::TouchStart { article_id, x } => handle_touch_start(app, article_id, x),
        UserEvent::TouchMove { article_id, x } => {
            if let Some(feedback) = app.gestures.touch_move(article_id, x) {
                apply_feedback(app, article_id, feedback, Transition::Disabled);
            } else {
                app.needs_redraw = false;
            }
        }
        UserEvent::TouchEnd { article_id } => handle_touch_end(app, article_id)?,

        UserEvent::SearchInput { query } => {
            let summary = app.search.apply_query(&mut app.page, &query);
            tracing::debug!(shown = summary.shown, hidden = summary.hidden, "Search input");
        }
        UserEvent::SearchClear => app.search.clear(&mut app.page),

        UserEvent::UndoClick => {
            if let Dispatched::Issued(request_id) = app.dispatcher.commit_undo(&app.page)? {
                tracing::debug!(request_id = %request_id, "Undo requested");
            }
        }
        UserEvent::UndoDismiss => {
            app.dispatcher
                .dismiss_undo(&mut app.page, &mut app.scheduler);
        }

        UserEvent::MarkAllRead { feed_id } => {
            if let Some(feed_id) = feed_id {
                ensure_feed(app, feed_id)?;
            }
            let action = ConfirmAction::MarkAllRead { feed_id };
            if app.settings.confirm_mark_all_read {
                open_modal(app, action);
            } else {
                run_confirmed(app, action)?;
            }
        }
        UserEvent::DeleteFeed { feed_id } => {
            ensure_feed(app, feed_id)?;
            let title = app
                .page
                .feed_title(feed_id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Feed {}", feed_id));
            let action = ConfirmAction::DeleteFeed { feed_id, title };
            if app.settings.confirm_delete_feed {
                open_modal(app, action);
            } else {
                run_confirmed(app, action)?;
            }
        }

        UserEvent::ModalConfirm => {
            if let Some(action) = app.modal.confirm() {
                run_confirmed(app, action)?;
            }
        }
        UserEvent::ModalCancel | UserEvent::ModalOutsideClick => {
            if app.modal.cancel() {
                tracing::debug!("Confirmation cancelled");
            }
        }
    }

    Ok(Action::Continue)
}

fn transition(app: &mut App, article_id: ArticleId, action: ArticleAction) -> Result<()> {
    match app
        .dispatcher
        .perform_transition(&app.page, article_id, action)?
    {
        Dispatched::Issued(request_id) => {
            tracing::debug!(request_id = %request_id, article_id = %article_id, action = action.name(), "Transition requested");
        }
        Dispatched::Skipped => {}
    }
    Ok(())
}

fn ensure_feed(app: &App, feed_id: FeedId) -> Result<(), DispatchError> {
    if app.page.feed_title(feed_id).is_none() && !app.dispatcher.counters().contains(feed_id) {
        return Err(DispatchError::UnknownFeed(feed_id));
    }
    Ok(())
}

fn open_modal(app: &mut App, action: ConfirmAction) {
    let subject = action.subject(&app.page);
    app.modal.open(subject, action);
}

/// Execute an irreversible action the user has agreed to.
fn run_confirmed(app: &mut App, action: ConfirmAction) -> Result<()> {
    match action {
        ConfirmAction::DeleteFeed { feed_id, title } => {
            if let Dispatched::Issued(_) = app.dispatcher.delete_feed(&app.page, feed_id)? {
                app.set_status(format!("Deleting {}...", title));
            }
        }
        ConfirmAction::MarkAllRead { feed_id } => {
            if let Dispatched::Issued(_) = app.dispatcher.mark_all_read(&app.page, feed_id)? {
                app.set_status("Marking all read...");
            }
        }
    }
    Ok(())
}

// ============================================================================
// Touch
// ============================================================================

fn handle_touch_start(app: &mut App, article_id: ArticleId, x: f64) {
    let Some(article) = app.page.get_mut(article_id) else {
        return;
    };
    if !article.is_visible() {
        return;
    }
    // Follow the finger exactly while tracking.
    article.visual.transition = Transition::Disabled;
    app.gestures.touch_start(article_id, x);
}

fn handle_touch_end(app: &mut App, article_id: ArticleId) -> Result<()> {
    let Some(swipe) = app.gestures.touch_end(article_id) else {
        app.needs_redraw = false;
        return Ok(());
    };
    apply_feedback(
        app,
        article_id,
        DragFeedback::RESET,
        DragFeedback::reset_transition(),
    );

    match swipe {
        Swipe::Left => {
            let read = app.page.get(article_id).is_some_and(|a| a.read);
            let action = if read {
                ArticleAction::MarkUnread
            } else {
                ArticleAction::MarkRead
            };
            transition(app, article_id, action)
        }
        Swipe::Right => transition(app, article_id, ArticleAction::ToggleSave),
        Swipe::None => Ok(()),
    }
}

fn apply_feedback(
    app: &mut App,
    article_id: ArticleId,
    feedback: DragFeedback,
    transition: Transition,
) {
    if let Some(article) = app.page.get_mut(article_id) {
        article.visual.offset_px = feedback.offset_px;
        article.visual.opacity = feedback.opacity;
        article.visual.transition = transition;
    }
}
