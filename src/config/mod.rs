//! Configuration: per-run [`RunConfig`] (mutable via `POST /configure`, per
//! spec §3/§9) and process-wide [`ProcessConfig`] (loaded once at startup).
//!
//! ```no_run
//! use ripplectl::config::load_process_config;
//! use std::path::Path;
//!
//! let config = load_process_config(Path::new("ripplectl.toml")).unwrap();
//! println!("binding to {}", config.bind_address);
//! ```

mod merge;
mod parser;
pub mod registry;
mod types;
mod validation;

pub use merge::merge_run_config;
pub use parser::{compute_config_hash, load_process_config, load_process_config_with_hash};
pub use registry::{compute_run_config_hash, ConfigPreset, ConfigRegistry};
pub use types::{
    ContentFilteringConfig, CrawlBehaviorConfig, DomainScopeConfig, ProcessConfig,
    RateLimitingConfig, RenderingConfig, RunConfig,
};
pub use validation::validate;
