//! airsync-sw (Sync Window) - Schedule sync diagnostics
//!
//! Computes the sync window the reconciliation pass would use and, given a
//! dump of remote playouts, shows the snapshot that pass would store.

use airsync_common::config::SyncConfig;
use airsync_common::time::{parse_instant, Clock, SystemClock};
use airsync_common::{
    compute_sync_window_in, PlayoutRecord, SnapshotStore, SyncWindow, SyncWindowInput, TzdbCivilTime,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "airsync-sw", version, about = "Broadcast schedule sync window diagnostics")]
struct Cli {
    /// Config file (overrides AIRSYNC_CONFIG and the platform default)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::Args)]
struct WindowArgs {
    /// Reference instant, RFC 3339 (defaults to now)
    #[arg(long)]
    now: Option<String>,

    /// Start of the show currently on air, RFC 3339
    #[arg(long)]
    current_show_start: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the sync window as JSON
    Window(WindowArgs),

    /// Store a playout dump as a snapshot and print it back
    Snapshot {
        /// JSON array of playout records from the remote scheduler
        #[arg(long)]
        playouts: PathBuf,

        #[command(flatten)]
        window: WindowArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SyncConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(parse_level(&config.log_level).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting airsync-sw v{}", env!("CARGO_PKG_VERSION"));

    // Timezone lookup failure is an environment error: abort before doing anything
    let civil = config
        .civil_time()
        .with_context(|| format!("Cannot use configured timezone {:?}", config.timezone))?;
    info!("Civil timezone: {}", config.timezone);

    match cli.command {
        Command::Window(args) => {
            let window = compute_window(&args, &civil)?;
            println!("{}", serde_json::to_string_pretty(&window)?);
        }
        Command::Snapshot { playouts, window } => {
            let window = compute_window(&window, &civil)?;
            let records = load_playouts(&playouts)?;
            let in_window = playouts_in_window(&window, records);

            let store = SnapshotStore::with_ttl(Arc::new(SystemClock), config.snapshot_ttl());
            let saved = store.save_snapshot(&window, &in_window);
            info!("Saved snapshot {} with {} playouts", saved.id, saved.playouts.len());

            let fetched = store
                .get_snapshot(&saved.id)
                .context("Snapshot vanished immediately after save")?;
            println!("{}", serde_json::to_string_pretty(&fetched)?);
        }
    }

    Ok(())
}

fn compute_window(args: &WindowArgs, civil: &TzdbCivilTime) -> Result<SyncWindow> {
    let now = match &args.now {
        Some(now) => parse_instant("now", now)?,
        None => SystemClock.now(),
    };
    let mut input = SyncWindowInput::new(now);
    if let Some(start) = &args.current_show_start {
        input = input.with_current_show_start(parse_instant("currentShowStartUtc", start)?);
    }
    Ok(compute_sync_window_in(&input, civil)?)
}

fn load_playouts(path: &Path) -> Result<Vec<PlayoutRecord>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<PlayoutRecord> =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    info!("Loaded {} playouts from {}", records.len(), path.display());
    Ok(records)
}

/// Keep playouts starting inside the window; unparsable start times are kept as-is
fn playouts_in_window(window: &SyncWindow, records: Vec<PlayoutRecord>) -> Vec<PlayoutRecord> {
    records
        .into_iter()
        .filter(|record| match parse_instant("startsAt", &record.starts_at) {
            Ok(starts_at) => window.contains(starts_at).unwrap_or(true),
            Err(e) => {
                warn!("Playout {}: {}", record.playout_id, e);
                true
            }
        })
        .collect()
}

fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
