//! Timed visual sequence for a row that was just marked read.
//!
//! ```text
//!   0 ms        just-read flash
//! 400 ms        flash removed ─┬─ all view:    is-read (dimmed, terminal)
//!                              └─ unread view: max-height captured, layout
//!                                              forced, collapsing added
//! 700 ms        collapse finished, row leaves layout
//! ```
//!
//! The explicit height capture is required because a height transition cannot
//! start from an implicit `auto` height.

use super::scheduler::{Scheduler, TimerId};
use super::ViewMode;
use crate::page::{ArticleId, Page, ToggleLabel};
use std::collections::HashMap;
use std::time::Duration;

/// Duration of the `just-read` flash.
pub const FLASH_DURATION: Duration = Duration::from_millis(400);

/// Duration of the height-to-zero collapse transition.
pub const COLLAPSE_DURATION: Duration = Duration::from_millis(300);

/// Timer payloads used by the sync layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    FlashEnd(ArticleId),
    CollapseEnd(ArticleId),
}

/// What a fired timer did to its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Flash over, row dimmed in place.
    Dimmed,
    /// Flash over, collapse started.
    Collapsing,
    /// Collapse finished.
    Collapsed,
}

#[derive(Debug)]
pub struct AnimationChoreographer {
    view_mode: ViewMode,
    /// The one live timer per animating row.
    timers: HashMap<ArticleId, TimerId>,
}

impl AnimationChoreographer {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            timers: HashMap::new(),
        }
    }

    pub fn is_animating(&self, id: ArticleId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Start the read sequence. Returns false if the row is gone.
    pub fn start_read(
        &mut self,
        page: &mut Page,
        scheduler: &mut Scheduler<TimerTask>,
        id: ArticleId,
    ) -> bool {
        let Some(article) = page.get_mut(id) else {
            return false;
        };
        article.visual.just_read = true;
        self.cancel(scheduler, id);
        let timer = scheduler.schedule(FLASH_DURATION, TimerTask::FlashEnd(id));
        self.timers.insert(id, timer);
        tracing::debug!(article_id = %id, "Read flash started");
        true
    }

    /// Cancel whatever phase is pending for `id`. Returns true if a timer was
    /// live.
    pub fn cancel(&mut self, scheduler: &mut Scheduler<TimerTask>, id: ArticleId) -> bool {
        match self.timers.remove(&id) {
            Some(timer) => scheduler.cancel(timer).is_some(),
            None => false,
        }
    }

    /// Advance the sequence for a fired timer. Returns `None` when the timer
    /// is stale: superseded by a newer phase, or its row is no longer in the
    /// page.
    pub fn on_timer(
        &mut self,
        page: &mut Page,
        scheduler: &mut Scheduler<TimerTask>,
        timer: TimerId,
        task: TimerTask,
    ) -> Option<Phase> {
        let id = match task {
            TimerTask::FlashEnd(id) | TimerTask::CollapseEnd(id) => id,
        };
        if self.timers.get(&id) != Some(&timer) {
            tracing::debug!(article_id = %id, ?task, "Ignoring superseded animation timer");
            return None;
        }
        self.timers.remove(&id);

        if !page.contains(id) {
            tracing::debug!(article_id = %id, ?task, "Animation timer fired for detached row");
            return None;
        }

        match task {
            TimerTask::FlashEnd(_) => Some(self.finish_flash(page, scheduler, id)),
            TimerTask::CollapseEnd(_) => {
                let article = page.get_mut(id)?;
                if !article.visual.collapsing {
                    return None;
                }
                article.visual.collapsing = false;
                article.visual.collapsed = true;
                tracing::debug!(article_id = %id, "Row collapsed");
                Some(Phase::Collapsed)
            }
        }
    }

    fn finish_flash(
        &mut self,
        page: &mut Page,
        scheduler: &mut Scheduler<TimerTask>,
        id: ArticleId,
    ) -> Phase {
        match self.view_mode {
            ViewMode::All => {
                if let Some(article) = page.get_mut(id) {
                    article.visual.just_read = false;
                    article.visual.is_read = true;
                    article.toggle = ToggleLabel::MarkUnread;
                }
                Phase::Dimmed
            }
            ViewMode::UnreadOnly => {
                let height = page.force_layout(id);
                if let Some(article) = page.get_mut(id) {
                    article.visual.just_read = false;
                    article.visual.max_height = height;
                    article.visual.collapsing = true;
                }
                let timer = scheduler.schedule(COLLAPSE_DURATION, TimerTask::CollapseEnd(id));
                self.timers.insert(id, timer);
                Phase::Collapsing
            }
        }
    }
}
