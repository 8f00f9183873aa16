use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use skim_live::app::{App, AppEvent, Settings};
use skim_live::config::{parse_base_url, Config};
use skim_live::page::PageSnapshot;
use skim_live::runtime;
use skim_live::sync::{OptimisticActionDispatcher, UnreadCounterStore, ViewMode};
use skim_live::transport::HttpTransport;

/// Get the config directory path (~/.config/skim/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("skim");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(
    name = "skim-live",
    about = "Read-state sync, swipe gestures and live search for the skim web reader"
)]
struct Args {
    /// JSON snapshot of the rendered article list
    #[arg(long, value_name = "FILE")]
    snapshot: PathBuf,

    /// Config file (default: ~/.config/skim/live.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reader server root, overrides the config file
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Show unread articles only
    #[arg(long)]
    unread_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the rendered frames
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("live.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let base_url = match &args.base_url {
        Some(raw) => parse_base_url(raw)?,
        None => config.base_url()?,
    };

    let snapshot = PageSnapshot::load(&args.snapshot).with_context(|| {
        format!("Failed to load page snapshot {}", args.snapshot.display())
    })?;

    // CLI flag, then what the page was rendered with, then the config file
    let view_mode = ViewMode::from_unread_flag(
        args.unread_only || snapshot.unread_only.unwrap_or(config.unread_only),
    );

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(64);

    let transport = HttpTransport::new(base_url.clone(), config.request_timeout(), event_tx.clone())
        .context("Failed to create HTTP client")?;
    let dispatcher = OptimisticActionDispatcher::new(
        view_mode,
        UnreadCounterStore::new(snapshot.unread_counts()),
        Box::new(transport),
    );
    let mut app = App::new(snapshot.to_page(), dispatcher, Settings::from(&config));

    tracing::info!(
        base_url = %base_url,
        view_mode = ?view_mode,
        articles = app.page.len(),
        feeds = app.page.feeds().len(),
        "Session started"
    );

    let _reader = runtime::spawn_input_reader(tokio::io::stdin(), event_tx);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runtime::run(&mut app, event_rx, &mut out).await?;

    Ok(())
}
