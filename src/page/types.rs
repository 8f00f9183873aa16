use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============================================================================
// Identifiers
// ============================================================================

/// Stable identifier of a rendered article (`data-id` in the markup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub i64);

/// Stable identifier of a feed (`data-feed-id` in the markup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(pub i64);

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Text Nodes
// ============================================================================

/// A title or summary text node that may temporarily hold highlighted markup.
///
/// Invariant: `snapshot` is `Some` if and only if `content` is highlighted
/// markup. The snapshot is taken on the first highlight and is never
/// overwritten by later highlight passes, so restoring is always byte-exact
/// with the text the page was rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    content: String,
    snapshot: Option<String>,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content: text.into(),
            snapshot: None,
        }
    }

    /// Current content: plain text, or highlighted markup.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The plain text this node was rendered with, regardless of highlighting.
    pub fn plain_text(&self) -> &str {
        self.snapshot.as_deref().unwrap_or(&self.content)
    }

    pub fn is_highlighted(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Replace the content with highlighted markup, snapshotting the original
    /// text first if no snapshot exists yet.
    pub fn apply_markup(&mut self, markup: String) {
        let previous = std::mem::replace(&mut self.content, markup);
        if self.snapshot.is_none() {
            self.snapshot = Some(previous);
        }
    }

    /// Restore the original text. Returns true if the node was highlighted.
    pub fn restore(&mut self) -> bool {
        match self.snapshot.take() {
            Some(original) => {
                self.content = original;
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Visual State
// ============================================================================

/// CSS transition currently applied to an article row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    /// Stylesheet default.
    #[default]
    Inherit,
    /// `transition: none` while a finger is tracking the row.
    Disabled,
    /// `transform`/`opacity` ease back to rest.
    Ease(Duration),
}

/// Classes and inline style of an article row.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualState {
    /// `just-read` flash.
    pub just_read: bool,
    /// Terminal dimmed state.
    pub is_read: bool,
    /// Height transition to zero in progress.
    pub collapsing: bool,
    /// Collapse finished; the row no longer takes part in layout.
    pub collapsed: bool,
    pub search_hidden: bool,
    pub is_saved: bool,
    /// Inline `max-height` captured before collapsing.
    pub max_height: Option<u32>,
    /// Horizontal drag offset in px.
    pub offset_px: f64,
    pub opacity: f64,
    pub transition: Transition,
}

impl VisualState {
    pub fn new(is_read: bool, is_saved: bool) -> Self {
        Self {
            just_read: false,
            is_read,
            collapsing: false,
            collapsed: false,
            search_hidden: false,
            is_saved,
            max_height: None,
            offset_px: 0.0,
            opacity: 1.0,
            transition: Transition::Inherit,
        }
    }

    /// Clear everything the collapse sequence applied.
    pub fn expand(&mut self) {
        self.just_read = false;
        self.collapsing = false;
        self.collapsed = false;
        self.max_height = None;
    }
}

/// Label of the read/unread toggle control on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleLabel {
    MarkRead,
    MarkUnread,
}

impl ToggleLabel {
    pub fn for_read_state(read: bool) -> Self {
        if read {
            ToggleLabel::MarkUnread
        } else {
            ToggleLabel::MarkRead
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            ToggleLabel::MarkRead => "Mark Read",
            ToggleLabel::MarkUnread => "Mark Unread",
        }
    }
}

/// Star glyph for the saved indicator.
pub fn star_glyph(saved: bool) -> &'static str {
    if saved {
        "★"
    } else {
        "☆"
    }
}

// ============================================================================
// Article Element
// ============================================================================

/// One rendered article row.
///
/// `read` and `saved` are the server-confirmed flags; `visual` is what the row
/// currently looks like. They diverge while an animation is running.
#[derive(Debug, Clone)]
pub struct ArticleElement {
    pub id: ArticleId,
    pub feed_id: FeedId,
    pub read: bool,
    pub saved: bool,
    pub title: TextNode,
    pub summary: TextNode,
    /// Rendered height in px, as measured by layout.
    pub height: u32,
    pub visual: VisualState,
    pub toggle: ToggleLabel,
}

impl ArticleElement {
    pub fn new(
        id: ArticleId,
        feed_id: FeedId,
        title: impl Into<String>,
        summary: impl Into<String>,
        read: bool,
        saved: bool,
    ) -> Self {
        Self {
            id,
            feed_id,
            read,
            saved,
            title: TextNode::new(title),
            summary: TextNode::new(summary),
            height: super::DEFAULT_ROW_HEIGHT,
            visual: VisualState::new(read, saved),
            toggle: ToggleLabel::for_read_state(read),
        }
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// True when the row takes part in layout and is not filtered out.
    pub fn is_visible(&self) -> bool {
        !self.visual.collapsed && !self.visual.search_hidden
    }
}

// ============================================================================
// Filter Groups and Feed Rows
// ============================================================================

/// A grouping container (`.filter-group`) around several article rows.
#[derive(Debug, Clone)]
pub struct FilterGroup {
    pub id: String,
    pub members: Vec<ArticleId>,
    pub search_hidden: bool,
}

/// A sidebar navigation row for one feed.
#[derive(Debug, Clone)]
pub struct FeedRow {
    pub id: FeedId,
    pub title: String,
}
