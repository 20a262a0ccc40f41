//! Configuration and usage accounting shared across the workspace.

pub mod config;
pub mod usage;

pub use config::Config;
pub use usage::{UsageRecord, UsageStats, UsageTracker};
