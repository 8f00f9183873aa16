//! Main event loop.
//!
//! This module contains the loop that multiplexes user input, request
//! completions, animation deadlines and shutdown signals.

use crate::app::{App, AppEvent};
use crate::input::UserEvent;
use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{self as io, AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::render::render;

/// Input lines longer than this are dropped unparsed.
const MAX_INPUT_LINE: usize = 64 * 1024;

/// Result of handling a user event.
///
/// Returned by input handlers to signal whether the session should continue
/// or terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// End the session.
    Quit,
}

/// Runs the session event loop.
///
/// Uses `tokio::select!` to multiplex:
/// - **Events**: user input and request completions via the `AppEvent` channel
/// - **Timers**: the next animation step or status expiry
/// - **Signals**: SIGTERM/SIGINT for graceful shutdown (Unix only)
///
/// A frame is written to `out` after every change. The loop ends on
/// `Quit`, on a signal, or once the input has closed and no request or
/// animation is outstanding.
pub async fn run<W: Write>(
    app: &mut App,
    mut event_rx: mpsc::Receiver<AppEvent>,
    out: &mut W,
) -> Result<()> {
    let start = Instant::now();

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        app.advance_clock(start.elapsed());

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Only render when state has changed
        if app.needs_redraw {
            writeln!(out, "{}", render(app)).context("Failed to write frame")?;
            out.flush().context("Failed to flush output")?;
            app.needs_redraw = false;
        }

        if app.input_closed && app.is_settled() {
            tracing::info!("Input finished and nothing outstanding, exiting");
            break;
        }

        let wakeup = next_wakeup(app, start);

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_rx.recv() => {
                let Some(event) = maybe_event else {
                    tracing::debug!("Event channel closed");
                    break;
                };
                // Timers scheduled while handling the event start from now,
                // not from when the loop went to sleep.
                app.advance_clock(start.elapsed());
                if handle_app_event(app, event) == Action::Quit {
                    break;
                }
            }

            _ = sleep_until(wakeup) => {}
        }
    }

    Ok(())
}

/// The earliest of the next animation step and the status expiry.
fn next_wakeup(app: &mut App, start: Instant) -> Option<Instant> {
    let animation = app.next_deadline().map(|d| start + d);
    let status = app
        .status_message
        .as_ref()
        .map(|(_, set_at)| *set_at + app.settings.status_ttl);
    match (animation, status) {
        (Some(a), Some(s)) => Some(a.min(s)),
        (a, s) => a.or(s),
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Read user events as JSON lines and forward them to the loop. Sends
/// `AppEvent::InputClosed` when the reader is exhausted.
///
/// Malformed lines are logged and skipped. A line longer than
/// `MAX_INPUT_LINE` is discarded without being buffered in full.
pub fn spawn_input_reader<R>(reader: R, tx: mpsc::Sender<AppEvent>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut line_no = 0usize;
        loop {
            let line = match read_line(&mut reader, &mut buf).await {
                Ok(InputLine::Text) => &buf,
                Ok(InputLine::TooLong) => {
                    line_no += 1;
                    tracing::warn!(line = line_no, limit = MAX_INPUT_LINE, "Input line too long, ignoring");
                    continue;
                }
                Ok(InputLine::Eof) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read input");
                    break;
                }
            };
            line_no += 1;

            let line = match std::str::from_utf8(line) {
                Ok(line) => line.trim(),
                Err(e) => {
                    tracing::warn!(line = line_no, error = %e, "Input line is not UTF-8, ignoring");
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<UserEvent>(line) {
                Ok(event) => {
                    if let Err(e) = tx.send(AppEvent::Input(event)).await {
                        tracing::warn!(error = %e, event = "Input", "Channel send failed (receiver dropped)");
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(line = line_no, error = %e, "Malformed input event, ignoring");
                }
            }
        }

        if let Err(e) = tx.send(AppEvent::InputClosed).await {
            tracing::warn!(error = %e, event = "InputClosed", "Channel send failed (receiver dropped)");
        }
    })
}

enum InputLine {
    /// `buf` holds the line, newline included if there was one.
    Text,
    TooLong,
    Eof,
}

/// Read one line into `buf`, buffering at most `MAX_INPUT_LINE` bytes of it.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<InputLine>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = MAX_INPUT_LINE as u64 + 1;
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(InputLine::Eof);
    }
    if buf.last() == Some(&b'\n') || buf.len() <= MAX_INPUT_LINE {
        return Ok(InputLine::Text);
    }
    skip_rest_of_line(reader).await?;
    Ok(InputLine::TooLong)
}

async fn skip_rest_of_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}
