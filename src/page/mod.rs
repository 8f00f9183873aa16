//! Model of the rendered article list.
//!
//! The page is a registration pass over the server-rendered markup: every
//! article row, filter group and sidebar feed row is captured once at start and
//! then addressed by stable identifier. Components never hold references into
//! the page; they look elements up by id and tolerate their absence.

mod snapshot;
mod types;

pub use snapshot::{PageSnapshot, SnapshotError};
pub use types::{
    star_glyph, ArticleElement, ArticleId, FeedId, FeedRow, FilterGroup, TextNode, ToggleLabel,
    Transition, VisualState,
};

use std::collections::HashMap;

/// Row height used when the snapshot does not carry a measurement.
pub const DEFAULT_ROW_HEIGHT: u32 = 96;

/// The live render tree.
#[derive(Debug, Default)]
pub struct Page {
    articles: HashMap<ArticleId, ArticleElement>,
    /// Document order of article rows.
    order: Vec<ArticleId>,
    groups: Vec<FilterGroup>,
    feeds: Vec<FeedRow>,
    layout_passes: u64,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an article row. Returns false if a row with that id is already
    /// live (at most one representation per id).
    pub fn insert(&mut self, article: ArticleElement) -> bool {
        if self.articles.contains_key(&article.id) {
            tracing::warn!(article_id = %article.id, "Duplicate article row ignored");
            return false;
        }
        self.order.push(article.id);
        self.articles.insert(article.id, article);
        true
    }

    pub fn add_group(&mut self, id: impl Into<String>, members: Vec<ArticleId>) {
        self.groups.push(FilterGroup {
            id: id.into(),
            members,
            search_hidden: false,
        });
    }

    pub fn add_feed(&mut self, id: FeedId, title: impl Into<String>) {
        self.feeds.push(FeedRow {
            id,
            title: title.into(),
        });
    }

    pub fn contains(&self, id: ArticleId) -> bool {
        self.articles.contains_key(&id)
    }

    pub fn get(&self, id: ArticleId) -> Option<&ArticleElement> {
        self.articles.get(&id)
    }

    pub fn get_mut(&mut self, id: ArticleId) -> Option<&mut ArticleElement> {
        self.articles.get_mut(&id)
    }

    /// Article rows in document order.
    pub fn articles(&self) -> impl Iterator<Item = &ArticleElement> {
        self.order.iter().filter_map(|id| self.articles.get(id))
    }

    pub fn articles_mut(&mut self) -> impl Iterator<Item = &mut ArticleElement> {
        self.articles.values_mut()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Ids of the rendered articles belonging to `feed_id`, or all articles
    /// when `feed_id` is `None`.
    pub fn article_ids_for(&self, feed_id: Option<FeedId>) -> Vec<ArticleId> {
        self.articles()
            .filter(|a| feed_id.is_none_or(|f| a.feed_id == f))
            .map(|a| a.id)
            .collect()
    }

    /// Remove an article row from the render tree permanently.
    pub fn detach(&mut self, id: ArticleId) -> Option<ArticleElement> {
        let removed = self.articles.remove(&id)?;
        self.order.retain(|a| *a != id);
        tracing::debug!(article_id = %id, "Detached article row");
        Some(removed)
    }

    /// Measure a row, forcing a synchronous layout pass. Returns `None` when
    /// the row is gone.
    pub fn force_layout(&mut self, id: ArticleId) -> Option<u32> {
        let height = self.articles.get(&id)?.height;
        self.layout_passes += 1;
        Some(height)
    }

    /// Number of forced layout passes since load.
    pub fn layout_passes(&self) -> u64 {
        self.layout_passes
    }

    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    /// Recompute group visibility: a group is hidden when `filtering` is on
    /// and none of its live members are visible.
    pub fn refresh_group_visibility(&mut self, filtering: bool) {
        let articles = &self.articles;
        for group in &mut self.groups {
            let any_visible = group
                .members
                .iter()
                .filter_map(|id| articles.get(id))
                .any(|a| !a.visual.search_hidden);
            group.search_hidden = filtering && !any_visible;
        }
    }

    pub fn feeds(&self) -> &[FeedRow] {
        &self.feeds
    }

    pub fn feed_title(&self, id: FeedId) -> Option<&str> {
        self.feeds
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.title.as_str())
    }

    /// Remove a feed's sidebar row and every article row it owns. Returns the
    /// detached article ids.
    pub fn remove_feed(&mut self, id: FeedId) -> Vec<ArticleId> {
        self.feeds.retain(|f| f.id != id);
        let ids = self.article_ids_for(Some(id));
        for article_id in &ids {
            self.detach(*article_id);
        }
        ids
    }
}
