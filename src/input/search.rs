//! Live filtering and highlighting of the rendered articles.
//!
//! Works only on what is already on the page: no request is made. Matching is
//! a case-insensitive literal substring match against the plain text of each
//! title and summary; the query is escaped so regex metacharacters are taken
//! literally. Highlighting wraps every match in `<mark>` and is undone by
//! restoring each node's snapshot, so clearing the query returns the exact
//! original text.

use crate::page::{Page, TextNode};
use crate::util::escape_markup;
use regex::{Regex, RegexBuilder};

pub const HIGHLIGHT_OPEN: &str = "<mark>";
pub const HIGHLIGHT_CLOSE: &str = "</mark>";

/// Outcome of applying a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchSummary {
    pub shown: usize,
    pub hidden: usize,
}

#[derive(Debug, Default)]
pub struct SearchFilterEngine {
    query: String,
    pattern: Option<Regex>,
}

impl SearchFilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active (trimmed) query; empty when not filtering.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    /// Filter and highlight the page for `raw_query`.
    pub fn apply_query(&mut self, page: &mut Page, raw_query: &str) -> SearchSummary {
        let query = raw_query.trim();
        if query.is_empty() {
            self.clear(page);
            return SearchSummary {
                shown: page.len(),
                hidden: 0,
            };
        }

        let pattern = match RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::warn!(error = %e, "Search pattern rejected, clearing filter");
                self.clear(page);
                return SearchSummary {
                    shown: page.len(),
                    hidden: 0,
                };
            }
        };

        self.query = query.to_string();
        let summary = filter_page(page, &pattern);
        self.pattern = Some(pattern);
        tracing::debug!(query = %self.query, shown = summary.shown, hidden = summary.hidden, "Search applied");
        summary
    }

    /// Re-run the active query after rows were added or removed.
    pub fn refresh(&mut self, page: &mut Page) {
        if let Some(pattern) = &self.pattern {
            filter_page(page, pattern);
        }
    }

    /// Remove every hidden and highlighted state.
    pub fn clear(&mut self, page: &mut Page) {
        self.query.clear();
        self.pattern = None;
        for article in page.articles_mut() {
            article.visual.search_hidden = false;
            article.title.restore();
            article.summary.restore();
        }
        page.refresh_group_visibility(false);
    }
}

fn filter_page(page: &mut Page, pattern: &Regex) -> SearchSummary {
    let mut summary = SearchSummary::default();
    for article in page.articles_mut() {
        let matched = pattern.is_match(article.title.plain_text())
            || pattern.is_match(article.summary.plain_text());
        article.visual.search_hidden = !matched;
        if matched {
            summary.shown += 1;
            highlight_node(&mut article.title, pattern);
            highlight_node(&mut article.summary, pattern);
        } else {
            summary.hidden += 1;
            article.title.restore();
            article.summary.restore();
        }
    }
    page.refresh_group_visibility(true);
    summary
}

/// Highlight a node from its original text. Nodes without a match are
/// restored, so no marker from an earlier query survives.
fn highlight_node(node: &mut TextNode, pattern: &Regex) {
    match highlight_markup(node.plain_text(), pattern) {
        Some(markup) => node.apply_markup(markup),
        None => {
            node.restore();
        }
    }
}

/// Wrap every match of `pattern` in `text` with highlight markers. Text
/// between matches is escaped. Returns `None` when nothing matches.
pub fn highlight_markup(text: &str, pattern: &Regex) -> Option<String> {
    let mut matches = pattern.find_iter(text).peekable();
    matches.peek()?;

    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for m in matches {
        out.push_str(&escape_markup(&text[last..m.start()]));
        out.push_str(HIGHLIGHT_OPEN);
        out.push_str(&escape_markup(m.as_str()));
        out.push_str(HIGHLIGHT_CLOSE);
        last = m.end();
    }
    out.push_str(&escape_markup(&text[last..]));
    Some(out)
}
