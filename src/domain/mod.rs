//! Per-domain politeness state, scope checks, and the dispatch scheduler
//! (spec §4.3).

pub mod scheduler;
pub mod scope;
pub mod state;

pub use scheduler::{dispatch_batch, effective_min_delay_ms, GlobalRateLimiter};
pub use state::DomainState;
