use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Ellipsis appended to truncated text.
const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within `max_width` terminal columns, appending
/// "..." when text was cut.
///
/// Widths are Unicode-aware (CJK and emoji take two columns). Returns
/// `Cow::Borrowed` when the string already fits. For widths of three columns
/// or fewer no ellipsis is added; as many characters as fit are kept.
///
/// # Examples
///
/// ```
/// use skim_live::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if UnicodeWidthStr::width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, ellipsis) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut width = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        end = idx + c.len_utf8();
    }
    Cow::Owned(format!("{}{}", &s[..end], ellipsis))
}

/// Escapes text for inclusion in markup: `&`, `<`, `>` and `"`.
///
/// Returns `Cow::Borrowed` when nothing needs escaping.
pub fn escape_markup(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Removes control characters (including ESC, so ANSI sequences are
/// neutralised) from text that will be written to the terminal. Tabs are
/// kept; newlines become spaces so a label stays on one line.
pub fn sanitize_label(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.chars()
            .filter_map(|c| match c {
                '\t' => Some(c),
                '\n' | '\r' => Some(' '),
                c if c.is_control() => None,
                c => Some(c),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("Hello", 5), "Hello");
        assert!(matches!(truncate_to_width("Hello", 5), Cow::Borrowed(_)));
    }

    #[test]
    fn test_cjk_truncation() {
        // 你好世界 is 8 columns; 7 leaves room for two CJK chars + "..."
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
    }

    #[test]
    fn test_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_markup("a < b & \"c\" > d"), "a &lt; b &amp; &quot;c&quot; &gt; d");
        assert!(matches!(escape_markup("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("Feed\x1b[31m red"), "Feed[31m red");
        assert_eq!(sanitize_label("two\nlines"), "two lines");
        assert_eq!(sanitize_label("tab\there"), "tab\there");
        assert!(matches!(sanitize_label("clean"), Cow::Borrowed(_)));
    }
}
