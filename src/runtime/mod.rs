//! Session runtime.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and the stdin event reader
//! - `input` - User event handling
//! - `events` - Request completion and channel event processing
//! - `render` - Plain-text frame rendering
//! - `helpers` - Shared utility functions

mod events;
mod helpers;
mod input;
mod loop_runner;
mod render;

pub(crate) use helpers::catch_task_panic;

pub use events::handle_app_event;
pub use input::handle_input;
pub use loop_runner::{run, spawn_input_reader, Action};
pub use render::render;
