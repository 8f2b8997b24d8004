use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReloadConfig {
    /// Poll the configuration file for changes and reload it automatically.
    #[serde(default = "default_watch")]
    pub watch: bool,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            watch: default_watch(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_watch() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    2000
}
