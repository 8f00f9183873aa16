//! Request dispatch and confirmed-then-applied state transitions.
//!
//! Every user intent becomes exactly one request. Nothing on the page changes
//! until that request completes successfully; a failed request leaves the row
//! exactly as it was so the user can simply try again. Completions are matched
//! by `RequestId` and may arrive in any order, so each effect re-checks the
//! row's current state before applying.

use super::choreography::{AnimationChoreographer, Phase, TimerTask};
use super::counters::UnreadCounterStore;
use super::scheduler::{Scheduler, TimerId};
use super::undo::{PendingUndo, UndoManager};
use super::ViewMode;
use crate::page::{ArticleId, FeedId, Page, ToggleLabel};
use crate::transport::{
    Ack, ActionRequest, ActionTransport, ArticleAction, RequestId, TransportError,
};
use std::collections::HashMap;
use thiserror::Error;

/// Local precondition failures. The triggering action is aborted with no side
/// effects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Article {0} is not on the page")]
    UnknownArticle(ArticleId),
    #[error("Feed {0} is not on the page")]
    UnknownFeed(FeedId),
    #[error("Article {0} already has a request in flight")]
    ArticleBusy(ArticleId),
    #[error("The same request is already in flight")]
    DuplicateRequest,
}

/// Result of a dispatch call that passed its preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Issued(RequestId),
    /// Nothing to do (already read, nothing pending); no request was made.
    Skipped,
}

/// What a completion did, for status reporting.
#[derive(Debug)]
pub enum Completion {
    Applied {
        request: ActionRequest,
        via_undo: bool,
    },
    Failed {
        request: ActionRequest,
        via_undo: bool,
        error: TransportError,
    },
}

#[derive(Debug)]
enum Origin {
    Direct,
    Undo(PendingUndo),
}

#[derive(Debug)]
struct InFlight {
    request: ActionRequest,
    origin: Origin,
}

/// Orchestrates requests, counters, animations and the undo slot.
pub struct OptimisticActionDispatcher {
    view_mode: ViewMode,
    counters: UnreadCounterStore,
    choreographer: AnimationChoreographer,
    undo: UndoManager,
    transport: Box<dyn ActionTransport>,
    next_request: u64,
    in_flight: HashMap<RequestId, InFlight>,
}

impl OptimisticActionDispatcher {
    pub fn new(
        view_mode: ViewMode,
        counters: UnreadCounterStore,
        transport: Box<dyn ActionTransport>,
    ) -> Self {
        Self {
            view_mode,
            counters,
            choreographer: AnimationChoreographer::new(view_mode),
            undo: UndoManager::new(),
            transport,
            next_request: 0,
            in_flight: HashMap::new(),
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn counters(&self) -> &UnreadCounterStore {
        &self.counters
    }

    pub fn undo(&self) -> &UndoManager {
        &self.undo
    }

    pub fn choreographer(&self) -> &AnimationChoreographer {
        &self.choreographer
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a request for `article_id` is awaiting its completion.
    pub fn is_busy(&self, article_id: ArticleId) -> bool {
        self.in_flight.values().any(|f| {
            matches!(f.request, ActionRequest::Article { article_id: id, .. } if id == article_id)
        })
    }

    // ------------------------------------------------------------------------
    // Issuing
    // ------------------------------------------------------------------------

    /// Request a read/unread/save transition for one rendered article.
    pub fn perform_transition(
        &mut self,
        page: &Page,
        article_id: ArticleId,
        action: ArticleAction,
    ) -> Result<Dispatched, DispatchError> {
        let article = page
            .get(article_id)
            .ok_or(DispatchError::UnknownArticle(article_id))?;

        if action != ArticleAction::ToggleSave && !self.counters.contains(article.feed_id) {
            return Err(DispatchError::UnknownFeed(article.feed_id));
        }

        if action == ArticleAction::MarkRead && article.read {
            tracing::debug!(article_id = %article_id, "Already read, skipping request");
            return Ok(Dispatched::Skipped);
        }

        let request = ActionRequest::Article { article_id, action };
        self.issue(request, Origin::Direct).map(Dispatched::Issued)
    }

    /// Undo the pending removal: issue mark-unread for it and clear the slot.
    /// The row is restored once the request succeeds.
    pub fn commit_undo(&mut self, page: &Page) -> Result<Dispatched, DispatchError> {
        let Some(pending) = self.undo.pending() else {
            return Ok(Dispatched::Skipped);
        };
        let article_id = pending.article_id;
        if !page.contains(article_id) {
            return Err(DispatchError::UnknownArticle(article_id));
        }
        if self.is_busy(article_id) {
            return Err(DispatchError::ArticleBusy(article_id));
        }
        let Some(entry) = self.undo.commit() else {
            return Ok(Dispatched::Skipped);
        };

        let request = ActionRequest::Article {
            article_id,
            action: ArticleAction::MarkUnread,
        };
        self.issue(request, Origin::Undo(entry))
            .map(Dispatched::Issued)
    }

    /// Close the undo toast; the pending row is removed for good.
    pub fn dismiss_undo(&mut self, page: &mut Page, scheduler: &mut Scheduler<TimerTask>) {
        if let Some(entry) = self.undo.dismiss(page) {
            self.choreographer.cancel(scheduler, entry.article_id);
        }
    }

    /// Mark a whole feed (or every feed) read.
    pub fn mark_all_read(
        &mut self,
        page: &Page,
        feed_id: Option<FeedId>,
    ) -> Result<Dispatched, DispatchError> {
        if let Some(feed_id) = feed_id {
            if !self.counters.contains(feed_id) && page.feed_title(feed_id).is_none() {
                return Err(DispatchError::UnknownFeed(feed_id));
            }
        }
        self.issue(ActionRequest::MarkAllRead { feed_id }, Origin::Direct)
            .map(Dispatched::Issued)
    }

    pub fn delete_feed(
        &mut self,
        page: &Page,
        feed_id: FeedId,
    ) -> Result<Dispatched, DispatchError> {
        if !self.counters.contains(feed_id) && page.feed_title(feed_id).is_none() {
            return Err(DispatchError::UnknownFeed(feed_id));
        }
        self.issue(ActionRequest::DeleteFeed { feed_id }, Origin::Direct)
            .map(Dispatched::Issued)
    }

    fn issue(&mut self, request: ActionRequest, origin: Origin) -> Result<RequestId, DispatchError> {
        if let Some(busy) = self
            .in_flight
            .values()
            .find(|f| f.request.conflicts_with(&request))
        {
            return Err(match busy.request {
                ActionRequest::Article { article_id, .. } => DispatchError::ArticleBusy(article_id),
                _ => DispatchError::DuplicateRequest,
            });
        }

        self.next_request += 1;
        let id = RequestId(self.next_request);
        tracing::debug!(request_id = %id, path = %request.path(), "Issuing request");
        self.transport.submit(id, request.clone());
        self.in_flight.insert(id, InFlight { request, origin });
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Completion
    // ------------------------------------------------------------------------

    /// Apply the outcome of a request. Returns `None` for an unknown id.
    pub fn complete(
        &mut self,
        page: &mut Page,
        scheduler: &mut Scheduler<TimerTask>,
        request_id: RequestId,
        result: Result<Ack, TransportError>,
    ) -> Option<Completion> {
        let Some(InFlight { request, origin }) = self.in_flight.remove(&request_id) else {
            tracing::warn!(request_id = %request_id, "Completion for unknown request ignored");
            return None;
        };
        let via_undo = matches!(origin, Origin::Undo(_));

        let ack = match result {
            Ok(ack) => ack,
            Err(error) => {
                tracing::warn!(
                    request_id = %request_id,
                    path = %request.path(),
                    error = %error,
                    "Request failed, page left unchanged"
                );
                if let Origin::Undo(entry) = origin {
                    self.restore_failed_undo(page, entry);
                }
                return Some(Completion::Failed {
                    request,
                    via_undo,
                    error,
                });
            }
        };

        match &request {
            ActionRequest::Article { article_id, action } => match action {
                ArticleAction::MarkRead => self.apply_read(page, scheduler, *article_id),
                ArticleAction::MarkUnread => self.apply_unread(page, scheduler, *article_id),
                ArticleAction::ToggleSave => self.apply_save(page, *article_id, &ack),
            },
            ActionRequest::MarkAllRead { feed_id } => {
                self.apply_mark_all_read(page, scheduler, *feed_id)
            }
            ActionRequest::DeleteFeed { feed_id } => {
                self.apply_delete_feed(page, scheduler, *feed_id)
            }
        }

        Some(Completion::Applied { request, via_undo })
    }

    /// The undo request failed: the row is still read on the server. Put it
    /// back in the slot so the user can retry, unless a newer removal took
    /// the slot, in which case the removal becomes permanent.
    fn restore_failed_undo(&mut self, page: &mut Page, entry: PendingUndo) {
        if self.undo.pending().is_none() && page.contains(entry.article_id) {
            self.undo.offer(page, entry.article_id, entry.feed_id);
        } else {
            page.detach(entry.article_id);
        }
    }

    fn apply_read(
        &mut self,
        page: &mut Page,
        scheduler: &mut Scheduler<TimerTask>,
        article_id: ArticleId,
    ) {
        let Some(article) = page.get_mut(article_id) else {
            tracing::debug!(article_id = %article_id, "Mark-read completed for detached row");
            return;
        };
        if article.read {
            return;
        }
        article.read = true;
        let feed_id = article.feed_id;
        self.counters.decrement(feed_id);
        self.choreographer.start_read(page, scheduler, article_id);
    }

    fn apply_unread(
        &mut self,
        page: &mut Page,
        scheduler: &mut Scheduler<TimerTask>,
        article_id: ArticleId,
    ) {
        self.choreographer.cancel(scheduler, article_id);
        self.undo.invalidate(article_id);

        let Some(article) = page.get_mut(article_id) else {
            tracing::debug!(article_id = %article_id, "Mark-unread completed for detached row");
            return;
        };
        let was_read = article.read;
        article.read = false;
        article.visual.expand();
        article.visual.is_read = false;
        article.toggle = ToggleLabel::MarkRead;
        let feed_id = article.feed_id;

        if was_read {
            self.counters.increment(feed_id);
        }
    }

    fn apply_save(&mut self, page: &mut Page, article_id: ArticleId, ack: &Ack) {
        let Some(article) = page.get_mut(article_id) else {
            return;
        };
        let saved = ack.is_saved.unwrap_or(!article.saved);
        article.saved = saved;
        article.visual.is_saved = saved;
    }

    fn apply_mark_all_read(
        &mut self,
        page: &mut Page,
        scheduler: &mut Scheduler<TimerTask>,
        feed_id: Option<FeedId>,
    ) {
        let ids = page.article_ids_for(feed_id);
        for id in ids {
            self.choreographer.cancel(scheduler, id);
            match self.view_mode {
                ViewMode::UnreadOnly => {
                    self.undo.invalidate(id);
                    page.detach(id);
                }
                ViewMode::All => {
                    if let Some(article) = page.get_mut(id) {
                        article.read = true;
                        article.visual.just_read = false;
                        article.visual.is_read = true;
                        article.toggle = ToggleLabel::MarkUnread;
                    }
                }
            }
        }

        match feed_id {
            Some(feed_id) => {
                self.counters.clear(feed_id);
            }
            None => self.counters.clear_all(),
        }
        tracing::info!(feed_id = ?feed_id, "Marked all read");
    }

    fn apply_delete_feed(
        &mut self,
        page: &mut Page,
        scheduler: &mut Scheduler<TimerTask>,
        feed_id: FeedId,
    ) {
        for id in page.article_ids_for(Some(feed_id)) {
            self.choreographer.cancel(scheduler, id);
        }
        self.undo.invalidate_feed(feed_id);
        let removed = page.remove_feed(feed_id);
        self.counters.remove(feed_id);
        tracing::info!(feed_id = %feed_id, articles_removed = removed.len(), "Feed deleted");
    }

    // ------------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------------

    /// Advance the animation for a fired timer. When a row starts collapsing
    /// out of the unread view it becomes the pending undo.
    pub fn on_timer(
        &mut self,
        page: &mut Page,
        scheduler: &mut Scheduler<TimerTask>,
        timer: TimerId,
        task: TimerTask,
    ) -> Option<Phase> {
        let phase = self.choreographer.on_timer(page, scheduler, timer, task)?;
        if phase == Phase::Collapsing {
            if let TimerTask::FlashEnd(article_id) = task {
                if let Some(feed_id) = page.get(article_id).map(|a| a.feed_id) {
                    if let Some(previous) = self.undo.offer(page, article_id, feed_id) {
                        self.choreographer.cancel(scheduler, previous.article_id);
                    }
                }
            }
        }
        Some(phase)
    }
}
