//! Page snapshot loading.
//!
//! A snapshot is the JSON description of the server-rendered page: sidebar
//! feeds with their unread badges, article rows and filter groups. Reloading
//! the page means loading a fresh snapshot; nothing else is persisted.

use super::{ArticleElement, ArticleId, FeedId, Page, DEFAULT_ROW_HEIGHT};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read page snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid page snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Page snapshot is {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Article {0} appears more than once in the snapshot")]
    DuplicateArticle(ArticleId),

    #[error("Feed {0} appears more than once in the snapshot")]
    DuplicateFeed(FeedId),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSnapshot {
    pub id: FeedId,
    pub title: String,
    #[serde(default)]
    pub unread_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleSnapshot {
    pub id: ArticleId,
    pub feed_id: FeedId,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_height() -> u32 {
    DEFAULT_ROW_HEIGHT
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupSnapshot {
    pub id: String,
    pub article_ids: Vec<ArticleId>,
}

/// Serialized form of the rendered page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageSnapshot {
    /// `?unread=1` in the page address.
    pub unread_only: Option<bool>,
    pub feeds: Vec<FeedSnapshot>,
    pub groups: Vec<GroupSnapshot>,
    pub articles: Vec<ArticleSnapshot>,
}

impl PageSnapshot {
    /// Maximum snapshot file size (16 MiB)
    pub const MAX_FILE_SIZE: u64 = 16 * 1_048_576;

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let size = std::fs::metadata(path)?.len();
        if size > Self::MAX_FILE_SIZE {
            return Err(SnapshotError::TooLarge {
                size,
                max: Self::MAX_FILE_SIZE,
            });
        }
        let content = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds = snapshot.feeds.len(),
            articles = snapshot.articles.len(),
            "Loaded page snapshot"
        );
        Ok(snapshot)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: PageSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.articles.len());
        for article in &self.articles {
            if !seen.insert(article.id) {
                return Err(SnapshotError::DuplicateArticle(article.id));
            }
        }
        let mut feeds = HashSet::with_capacity(self.feeds.len());
        for feed in &self.feeds {
            if !feeds.insert(feed.id) {
                return Err(SnapshotError::DuplicateFeed(feed.id));
            }
        }
        Ok(())
    }

    /// Per-feed unread counts as rendered in the sidebar.
    pub fn unread_counts(&self) -> Vec<(FeedId, u32)> {
        self.feeds.iter().map(|f| (f.id, f.unread_count)).collect()
    }

    /// Build the render tree.
    pub fn to_page(&self) -> Page {
        let mut page = Page::new();
        for feed in &self.feeds {
            page.add_feed(feed.id, feed.title.clone());
        }
        for a in &self.articles {
            let element = ArticleElement::new(
                a.id,
                a.feed_id,
                a.title.clone(),
                a.summary.clone(),
                a.is_read,
                a.is_saved,
            )
            .with_height(a.height);
            page.insert(element);
        }
        for group in &self.groups {
            page.add_group(group.id.clone(), group.article_ids.clone());
        }
        page
    }
}
