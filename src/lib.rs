//! Client-side read-state sync and gesture engine for the skim web reader.
//!
//! The page the server rendered is loaded once as a snapshot. User events
//! (clicks, touches, search keystrokes, modal answers) are turned into
//! requests against the reader server; the page, the unread badges and the
//! undo toast change only after the server confirms.
//!
//! - [`page`] - the rendered article list, addressed by id
//! - [`sync`] - counters, animation timers, undo slot and the dispatcher
//! - [`input`] - swipe recognition, live search and the confirmation modal
//! - [`transport`] - HTTP delivery of state-changing requests
//! - [`runtime`] - the event loop tying it together

pub mod app;
pub mod config;
pub mod input;
pub mod page;
pub mod runtime;
pub mod sync;
pub mod transport;
pub mod util;
