//! Application event handling.
//!
//! Processes input forwarded from the reader task and request completions
//! from the transport.

use super::input::handle_input;
use super::loop_runner::Action;
use crate::app::{App, AppEvent};
use crate::page::ArticleId;
use crate::sync::Completion;
use crate::transport::{ActionRequest, ArticleAction};
use std::borrow::Cow;

/// Handle one event from the channel.
pub fn handle_app_event(app: &mut App, event: AppEvent) -> Action {
    match event {
        AppEvent::Input(input) => match handle_input(app, input) {
            Ok(action) => return action,
            Err(e) => {
                tracing::warn!(error = %e, "Input rejected");
                app.set_status(format!("Error: {}", e));
            }
        },
        AppEvent::InputClosed => {
            tracing::debug!("Input stream closed");
            app.input_closed = true;
        }
        AppEvent::RequestCompleted { request_id, result } => {
            let Some(completion) =
                app.dispatcher
                    .complete(&mut app.page, &mut app.scheduler, request_id, result)
            else {
                return Action::Continue;
            };
            app.needs_redraw = true;
            handle_completion(app, completion);
        }
    }
    Action::Continue
}

fn handle_completion(app: &mut App, completion: Completion) {
    match completion {
        Completion::Applied { request, via_undo } => {
            if matches!(
                request,
                ActionRequest::MarkAllRead { .. } | ActionRequest::DeleteFeed { .. }
            ) {
                // Rows left the page; group visibility depends on membership.
                app.search.refresh(&mut app.page);
            }
            if let Some(msg) = applied_message(app, &request, via_undo) {
                app.set_status(msg);
            }
        }
        Completion::Failed {
            request,
            via_undo,
            error,
        } => {
            let what = if via_undo {
                "Undo"
            } else {
                request_label(&request)
            };
            app.set_status(format!("{} failed: {}", what, error));
        }
    }
}

fn applied_message(
    app: &App,
    request: &ActionRequest,
    via_undo: bool,
) -> Option<Cow<'static, str>> {
    match request {
        ActionRequest::Article { .. } if via_undo => Some(Cow::Borrowed("Restored")),
        ActionRequest::Article {
            article_id,
            action: ArticleAction::ToggleSave,
        } => Some(Cow::Borrowed(if is_saved(app, *article_id) {
            "Saved"
        } else {
            "Removed from saved"
        })),
        ActionRequest::Article { .. } => None,
        ActionRequest::MarkAllRead { feed_id: None } => Some(Cow::Borrowed("All articles marked read")),
        ActionRequest::MarkAllRead { feed_id: Some(_) } => Some(Cow::Borrowed("Feed marked read")),
        ActionRequest::DeleteFeed { .. } => Some(Cow::Borrowed("Feed deleted")),
    }
}

fn is_saved(app: &App, article_id: ArticleId) -> bool {
    app.page.get(article_id).is_some_and(|a| a.saved)
}

fn request_label(request: &ActionRequest) -> &'static str {
    match request {
        ActionRequest::Article { action, .. } => match action {
            ArticleAction::MarkRead => "Mark read",
            ArticleAction::MarkUnread => "Mark unread",
            ArticleAction::ToggleSave => "Save",
        },
        ActionRequest::MarkAllRead { .. } => "Mark all read",
        ActionRequest::DeleteFeed { .. } => "Delete feed",
    }
}
