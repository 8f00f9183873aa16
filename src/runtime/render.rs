//! Plain-text rendering of the session state.
//!
//! Each frame lists the badges, the visible rows in document order and any
//! overlay (undo toast, confirmation modal, status line). Row text is printed
//! as the page holds it, so search highlight markers are visible.

use crate::app::App;
use crate::page::{star_glyph, ArticleElement, Transition};
use crate::sync::ViewMode;
use crate::util::{sanitize_label, truncate_to_width};
use std::fmt::Write as _;

/// Maximum display width of a row title.
const TITLE_WIDTH: usize = 72;

/// Render one frame.
pub fn render(app: &App) -> String {
    let mut out = String::new();
    render_header(&mut out, app);
    render_rows(&mut out, app);
    render_overlays(&mut out, app);
    out
}

fn render_header(out: &mut String, app: &App) {
    let mode = match app.dispatcher.view_mode() {
        ViewMode::All => "all",
        ViewMode::UnreadOnly => "unread only",
    };
    let aggregate = app.dispatcher.counters().aggregate_display();
    let _ = write!(out, "== All Feeds");
    if aggregate.visible {
        let _ = write!(out, " ({})", aggregate.value);
    }
    let _ = writeln!(out, " [{}] ==", mode);

    let counters = app.dispatcher.counters();
    let badges: Vec<String> = app
        .page
        .feeds()
        .iter()
        .map(|feed| {
            let title = sanitize_label(&feed.title);
            match counters.display(feed.id) {
                Some(badge) if badge.visible => format!("{} ({})", title, badge.value),
                _ => title.into_owned(),
            }
        })
        .collect();
    if !badges.is_empty() {
        let _ = writeln!(out, "{}", badges.join(" | "));
    }

    if app.search.is_active() {
        let _ = writeln!(out, "Search: \"{}\"", sanitize_label(app.search.query()));
    }
}

fn render_rows(out: &mut String, app: &App) {
    let mut filtered = 0;
    for article in app.page.articles() {
        if article.visual.collapsed {
            continue;
        }
        if article.visual.search_hidden {
            filtered += 1;
            continue;
        }
        let _ = writeln!(out, "{}", row_line(article));
    }
    if filtered > 0 {
        let _ = writeln!(out, "({} hidden by search)", filtered);
    }
    let hidden_groups = app.page.groups().iter().filter(|g| g.search_hidden).count();
    if hidden_groups > 0 {
        let _ = writeln!(out, "({} groups hidden)", hidden_groups);
    }
}

fn row_line(article: &ArticleElement) -> String {
    let visual = &article.visual;
    let state = if visual.collapsing {
        "closing"
    } else if visual.just_read {
        "flash"
    } else if visual.is_read {
        "read"
    } else {
        "unread"
    };
    let title = sanitize_label(article.title.content());
    let mut line = format!(
        "{} #{} {:<7} {} [{}]",
        star_glyph(visual.is_saved),
        article.id,
        state,
        truncate_to_width(&title, TITLE_WIDTH),
        article.toggle.text()
    );
    if visual.offset_px != 0.0 || visual.opacity < 1.0 {
        let _ = write!(
            line,
            " <drag {:+.0}px opacity {:.2}>",
            visual.offset_px, visual.opacity
        );
    } else if let Transition::Ease(d) = visual.transition {
        let _ = write!(line, " <settling {}ms>", d.as_millis());
    }
    line
}

fn render_overlays(out: &mut String, app: &App) {
    if let Some(pending) = app.dispatcher.undo().pending() {
        let _ = writeln!(out, "[undo] {} (Undo | x)", sanitize_label(&pending.label));
    }
    if let Some(subject) = app.modal.subject() {
        let _ = writeln!(out, "[confirm] {} (Confirm | Cancel)", sanitize_label(subject));
    }
    if let Some(status) = app.status() {
        let _ = writeln!(out, "[status] {}", status);
    }
}
