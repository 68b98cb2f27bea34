use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lol_odds_monitor::api::{EsportsMatrixClient, OddsFeed};
use lol_odds_monitor::config::Config;
use lol_odds_monitor::display;
use lol_odds_monitor::extract::{extract, MatchPayload};
use lol_odds_monitor::models::{ParentMatchInfo, PersistedRecord};
use lol_odds_monitor::storage::{StorageFormat, StorageSink};
use lol_odds_monitor::workers::{PollSettings, Poller, Termination};

/// Monitor live League of Legends odds until the tracked matches end
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Specific game number to monitor (1, 2, 3, ...)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    game: Option<u32>,

    /// Monitor all games (ignores --game)
    #[arg(long, default_value_t = false)]
    all_games: bool,

    /// Update interval in seconds
    #[arg(long, default_value_t = 3)]
    interval: u64,

    /// Maximum number of checks (default: unlimited)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_iterations: Option<u64>,

    /// List current live matches and exit
    #[arg(long, default_value_t = false)]
    list: bool,

    /// Print the odds of one series from the detail endpoint and exit
    #[arg(long, value_name = "MATCH_ID")]
    detail: Option<i64>,

    /// Data storage format (json, csv or sqlite)
    #[arg(long, default_value = "sqlite")]
    storage: StorageFormat,

    /// Directory to store data files in
    #[arg(long, default_value = "./odds_data")]
    storage_path: PathBuf,

    /// Log file, written alongside console output
    #[arg(long, default_value = "live_odds_monitor.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let _guard = init_logging(&args.log_file)?;

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");

    let client = EsportsMatrixClient::new(&config).context("Failed to build HTTP client")?;
    let target_game = if args.all_games { None } else { args.game };

    if args.list {
        let live = client.list_live_matches().await;
        println!("{}", display::format_live_listing(&live));
        return Ok(());
    }

    if let Some(match_id) = args.detail {
        print_match_detail(&client, match_id, target_game).await;
        return Ok(());
    }

    let sink = StorageSink::open(args.storage, &args.storage_path)
        .await
        .with_context(|| {
            format!(
                "Failed to initialize {} storage in {}",
                args.storage,
                args.storage_path.display()
            )
        })?;
    info!("Storing odds as {} in {}", args.storage, sink.path().display());

    let settings = PollSettings {
        interval: Duration::from_secs(args.interval),
        max_iterations: args.max_iterations,
        target_game,
    };

    let summary = Poller::new(client, sink, settings)
        .run(shutdown_signal())
        .await;

    info!(
        "Session finished ({:?}): {} ticks, {} records stored, {} failed",
        summary.termination, summary.ticks, summary.records_stored, summary.failed_appends
    );

    if summary.termination == Termination::Fault {
        anyhow::bail!("Monitoring aborted by an unexpected fault");
    }
    Ok(())
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn print_match_detail(client: &EsportsMatrixClient, match_id: i64, target_game: Option<u32>) {
    let Some(detail) = client.get_match_detail(match_id).await else {
        println!("No details available for match {}", match_id);
        return;
    };

    let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
    let records: Vec<PersistedRecord> = extract(MatchPayload::Detail(&detail), target_game)
        .into_iter()
        .map(|game| PersistedRecord::new(&timestamp, game, ParentMatchInfo::default()))
        .collect();

    let shown = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    println!("{}", display::format_odds(&records, &shown));
}

/// Console + file logging. The returned guard must live until exit so the
/// file writer drains.
fn init_logging(log_file: &Path) -> Result<WorkerGuard> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .context("--log-file must name a file")?;

    // rolling::never panics if it cannot create the file
    std::fs::create_dir_all(dir).context("Failed to create log directory")?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Cannot write log file {}", log_file.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lol_odds_monitor=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}
