use std::future::Future;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use futures::FutureExt;
use tokio::time;
use tracing::{error, info, warn};

use crate::api::OddsFeed;
use crate::display;
use crate::extract::{extract, MatchPayload};
use crate::models::{LiveMatchSummary, ParentMatchInfo, PersistedRecord};
use crate::storage::StorageSink;
use crate::tracking::{diff, snapshot, MatchTracker, OddsChange, OddsSnapshot, TrackerState};

/// Loop settings fixed for one session
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Stop after this many fetches
    pub max_iterations: Option<u64>,
    /// Only record this game number of each series
    pub target_game: Option<u32>,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every tracked series left the live listing
    Completed,
    IterationCap,
    /// Shutdown signal received
    Cancelled,
    /// A tick failed or panicked
    Fault,
}

/// What one tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No cohort yet
    Waiting,
    Observed {
        records: usize,
        stored: usize,
        changes: Vec<OddsChange>,
    },
    /// Cohort finished; no further fetches
    Complete,
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub termination: Termination,
    /// Listing fetches performed
    pub ticks: u64,
    /// Records durably stored this session
    pub records_stored: usize,
    /// Appends that failed and were dropped or left buffered
    pub failed_appends: usize,
    pub storage_path: PathBuf,
    /// Human-readable storage line
    pub storage: String,
}

/// Drives the poll -> track -> extract -> diff -> persist loop.
///
/// Owns the tracker, the previous odds snapshot and the sink; nothing is shared.
pub struct Poller<F: OddsFeed> {
    feed: F,
    sink: StorageSink,
    tracker: MatchTracker,
    previous: OddsSnapshot,
    settings: PollSettings,
    failed_appends: usize,
    out: Box<dyn Write + Send>,
}

impl<F: OddsFeed> Poller<F> {
    /// Create a poller with an uninitialized tracker and no prior snapshot
    pub fn new(feed: F, sink: StorageSink, settings: PollSettings) -> Self {
        Self {
            feed,
            sink,
            tracker: MatchTracker::new(),
            previous: OddsSnapshot::new(),
            settings,
            failed_appends: 0,
            out: Box::new(std::io::stdout()),
        }
    }

    /// Print ticks and the final summary to `out` instead of stdout
    pub fn with_output(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Cohort state as of the last tick
    pub fn tracker(&self) -> &MatchTracker {
        &self.tracker
    }

    /// Run until the cohort completes, the iteration cap is hit, `shutdown`
    /// resolves, or a tick faults. Storage is flushed exactly once on the way out.
    pub async fn run<S>(mut self, shutdown: S) -> SessionSummary
    where
        S: Future<Output = ()>,
    {
        let game_desc = self
            .settings
            .target_game
            .map(|g| g.to_string())
            .unwrap_or_else(|| "ALL".to_string());
        info!("Starting odds monitoring for Game {}", game_desc);
        info!("Update interval: {:?}", self.settings.interval);

        tokio::pin!(shutdown);
        let mut ticks: u64 = 0;

        let termination = loop {
            if let Some(max) = self.settings.max_iterations {
                if ticks >= max {
                    info!("Reached maximum iterations ({})", max);
                    break Termination::IterationCap;
                }
            }
            let fetched = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Monitoring stopped by user");
                    break Termination::Cancelled;
                }
                fetched = AssertUnwindSafe(self.feed.list_live_matches()).catch_unwind() => fetched,
            };
            ticks += 1;
            let live = match fetched {
                Ok(live) => live,
                Err(_) => {
                    error!("Tick {}: live match fetch panicked", ticks);
                    break Termination::Fault;
                }
            };

            match AssertUnwindSafe(self.step(ticks, live)).catch_unwind().await {
                Ok(Ok(TickOutcome::Complete)) => break Termination::Completed,
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    error!("Tick {}: unexpected error during monitoring: {:#}", ticks, e);
                    break Termination::Fault;
                }
                Err(_) => {
                    error!("Tick {}: processing panicked", ticks);
                    break Termination::Fault;
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Monitoring stopped by user");
                    break Termination::Cancelled;
                }
                _ = time::sleep(self.settings.interval) => {}
            }
        };

        self.finish(termination, ticks).await
    }

    /// Process one listing: update the cohort, extract and persist records,
    /// print the tick and log odds changes against the previous tick.
    pub async fn step(&mut self, tick: u64, live: Vec<LiveMatchSummary>) -> Result<TickOutcome> {
        let now = Local::now();
        let timestamp = now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        let shown = now.format("%Y-%m-%d %H:%M:%S").to_string();

        let update = self.tracker.filter_to_cohort(live);
        if update.is_complete {
            return Ok(TickOutcome::Complete);
        }
        if self.tracker.state() == TrackerState::Uninitialized {
            return Ok(TickOutcome::Waiting);
        }

        let mut records = Vec::new();
        for summary in &update.matches {
            let parent = ParentMatchInfo {
                league: summary.league_name.clone(),
                series_score: summary.series_score(),
                match_type: summary.match_type.clone(),
            };

            for game in extract(MatchPayload::Summary(summary), self.settings.target_game) {
                records.push(PersistedRecord::new(&timestamp, game, parent.clone()));
            }
        }

        let stored = self.persist(tick, &records).await;

        let rendered = if records.is_empty() {
            display::format_status(&update.matches, &shown)
        } else {
            display::format_odds(&records, &shown)
        };
        writeln!(self.out, "\n{}", rendered)?;

        let current = snapshot(records.iter().map(|r| &r.game));
        let changes = diff(&self.previous, &current);
        for change in &changes {
            info!("ODDS CHANGE - {}", change);
        }
        self.previous = current;

        Ok(TickOutcome::Observed {
            records: records.len(),
            stored,
            changes,
        })
    }

    /// Append every record; a failed append is logged and skipped
    async fn persist(&mut self, tick: u64, records: &[PersistedRecord]) -> usize {
        let mut stored = 0;

        for record in records {
            match self.sink.append_record(record).await {
                Ok(()) => stored += 1,
                Err(e) => {
                    self.failed_appends += 1;
                    warn!(
                        "Tick {}: failed to store odds for match {} game {}: {}",
                        tick,
                        record.game.match_id,
                        record
                            .game
                            .game_number
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| "unknown".to_string()),
                        e
                    );
                }
            }
        }

        stored
    }

    async fn finish(mut self, termination: Termination, ticks: u64) -> SessionSummary {
        info!("Monitoring ended ({:?}) after {} ticks", termination, ticks);

        if let Err(e) = self.sink.flush().await {
            error!("Failed to flush {} storage: {}", self.sink.format(), e);
        }

        let storage = self.sink.summary().await;
        info!("Data storage complete: {}", storage);
        if let Err(e) = writeln!(self.out, "\nData Storage Summary: {}", storage) {
            warn!("Failed to print storage summary: {}", e);
        }

        self.sink.close().await;

        SessionSummary {
            termination,
            ticks,
            records_stored: self.sink.stored(),
            failed_appends: self.failed_appends,
            storage_path: self.sink.path().to_path_buf(),
            storage,
        }
    }
}
