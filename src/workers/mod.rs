pub mod poller;

pub use poller::{PollSettings, Poller, SessionSummary, Termination, TickOutcome};
