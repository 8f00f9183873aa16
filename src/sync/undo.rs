//! Single-slot undo for rows removed from the unread-only view.
//!
//! Only one removal can be undone at a time. Offering a new one finalizes the
//! previous removal immediately; the earlier row cannot be recovered after
//! that.

use crate::page::{ArticleId, FeedId, Page};
use crate::util::truncate_to_width;

/// Maximum display width of the title shown in the undo toast.
const TOAST_TITLE_WIDTH: usize = 48;

/// The removal that can currently be undone. The row itself stays owned by
/// the page and is looked up by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUndo {
    pub article_id: ArticleId,
    pub feed_id: FeedId,
    /// Toast text, e.g. `Marked read: Async closures`.
    pub label: String,
}

#[derive(Debug, Default)]
pub struct UndoManager {
    slot: Option<PendingUndo>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&PendingUndo> {
        self.slot.as_ref()
    }

    /// Whether the undo toast is shown.
    pub fn is_visible(&self) -> bool {
        self.slot.is_some()
    }

    /// Make `article_id` the pending undo. A previous entry has its row removed
    /// from the page for good, without animation, and is returned.
    pub fn offer(
        &mut self,
        page: &mut Page,
        article_id: ArticleId,
        feed_id: FeedId,
    ) -> Option<PendingUndo> {
        let title = page
            .get(article_id)
            .map(|a| a.title.plain_text().to_string())
            .unwrap_or_default();
        let label = format!(
            "Marked read: {}",
            truncate_to_width(&title, TOAST_TITLE_WIDTH)
        );

        let superseded = self.slot.replace(PendingUndo {
            article_id,
            feed_id,
            label,
        });
        if let Some(previous) = &superseded {
            page.detach(previous.article_id);
            tracing::debug!(
                superseded = %previous.article_id,
                article_id = %article_id,
                "Pending undo superseded, earlier removal is now permanent"
            );
        }
        superseded
    }

    /// Take the pending entry so its reversal can be issued. `None` when
    /// nothing is pending.
    pub fn commit(&mut self) -> Option<PendingUndo> {
        self.slot.take()
    }

    /// Close the toast and remove the pending row for good.
    pub fn dismiss(&mut self, page: &mut Page) -> Option<PendingUndo> {
        let entry = self.slot.take()?;
        page.detach(entry.article_id);
        tracing::debug!(article_id = %entry.article_id, "Undo dismissed");
        Some(entry)
    }

    /// Drop the pending entry if it refers to `article_id`, leaving the row in
    /// the page. Returns true if an entry was dropped.
    pub fn invalidate(&mut self, article_id: ArticleId) -> bool {
        if self
            .slot
            .as_ref()
            .is_some_and(|p| p.article_id == article_id)
        {
            self.slot = None;
            tracing::debug!(article_id = %article_id, "Pending undo invalidated");
            return true;
        }
        false
    }

    /// Drop the pending entry if it belongs to `feed_id` (feed deleted).
    pub fn invalidate_feed(&mut self, feed_id: FeedId) -> bool {
        if self.slot.as_ref().is_some_and(|p| p.feed_id == feed_id) {
            self.slot = None;
            return true;
        }
        false
    }
}
