mod active_config;

pub use active_config::{log_snapshot_summary, ActiveConfig};
