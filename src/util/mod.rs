//! Utility functions for common operations.
//!
//! - **Text processing**: Unicode-aware truncation, markup escaping and
//!   terminal-safe labels
//!
//! # Examples
//!
//! ```
//! use skim_live::util::{escape_markup, truncate_to_width};
//!
//! assert_eq!(escape_markup("<b>"), "&lt;b&gt;");
//! assert_eq!(truncate_to_width("Long article title", 15), "Long article...");
//! ```

mod text;

pub use text::{escape_markup, sanitize_label, truncate_to_width};
