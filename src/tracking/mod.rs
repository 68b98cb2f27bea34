pub mod change_detector;
pub mod match_tracker;

pub use change_detector::{diff, snapshot, OddsChange, OddsSnapshot, SnapshotKey};
pub use match_tracker::{CohortUpdate, MatchTracker, TrackerState};
