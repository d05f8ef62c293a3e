//! Run State Machine (C4): lifecycle, statistics, and recent-error
//! diagnostics for a single named crawl run (spec §3/§4.4).

pub mod errors_ring;
pub mod state_machine;
pub mod stats;

pub use errors_ring::{RecentError, RecentErrorsRing};
pub use state_machine::{RunState, RunStatus};
pub use stats::{Progress, Stats};
