use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::models::LiveMatchSummary;

/// Lifecycle of one monitoring session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No cohort yet; waiting for the first non-empty listing
    Uninitialized,
    /// Observing the cohort
    Tracking,
    /// Every tracked series has left the live listing
    Completed,
}

/// Result of filtering one listing against the cohort
#[derive(Debug, Clone)]
pub struct CohortUpdate {
    /// Tracked series still live this tick, in listing order
    pub matches: Vec<LiveMatchSummary>,
    pub is_complete: bool,
}

/// Holds the cohort of series observed for the session.
///
/// The cohort is captured from the first non-empty listing and never grows.
/// A series counts as live while its id is in the listing, even if it has no
/// game in progress.
#[derive(Debug)]
pub struct MatchTracker {
    state: TrackerState,
    cohort: BTreeSet<i64>,
}

impl MatchTracker {
    /// Create a tracker with no cohort yet
    pub fn new() -> Self {
        Self {
            state: TrackerState::Uninitialized,
            cohort: BTreeSet::new(),
        }
    }

    /// Current tracking state
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Series ids locked in at the first non-empty listing
    pub fn cohort(&self) -> &BTreeSet<i64> {
        &self.cohort
    }

    /// Apply one listing: capture the cohort if needed, then keep only the
    /// tracked series that are still live.
    pub fn filter_to_cohort(&mut self, live_matches: Vec<LiveMatchSummary>) -> CohortUpdate {
        match self.state {
            TrackerState::Completed => {
                return CohortUpdate {
                    matches: Vec::new(),
                    is_complete: true,
                };
            }
            TrackerState::Uninitialized => {
                if live_matches.is_empty() {
                    warn!("No live matches found to start monitoring");
                    return CohortUpdate {
                        matches: Vec::new(),
                        is_complete: false,
                    };
                }

                self.cohort = live_matches.iter().map(|m| m.match_id).collect();
                self.state = TrackerState::Tracking;
                info!(
                    "Tracking {} matches: {:?}",
                    self.cohort.len(),
                    self.cohort
                );
            }
            TrackerState::Tracking => {}
        }

        let matches: Vec<LiveMatchSummary> = live_matches
            .into_iter()
            .filter(|m| self.cohort.contains(&m.match_id))
            .collect();

        if matches.is_empty() {
            info!("All tracked matches have ended. Monitoring complete.");
            self.state = TrackerState::Completed;
            return CohortUpdate {
                matches,
                is_complete: true,
            };
        }

        CohortUpdate {
            matches,
            is_complete: false,
        }
    }
}

impl Default for MatchTracker {
    fn default() -> Self {
        Self::new()
    }
}
