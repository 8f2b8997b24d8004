use serde::{Deserialize, Serialize};

/// Per-attempt patience for the upstream forwarder.
///
/// Attempt `i` (zero-based) waits `base_timeout_ms + i * timeout_step_ms`
/// before moving on to the next nameserver.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForwardingConfig {
    #[serde(default = "default_base_timeout_ms")]
    pub base_timeout_ms: u64,

    #[serde(default = "default_timeout_step_ms")]
    pub timeout_step_ms: u64,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            base_timeout_ms: default_base_timeout_ms(),
            timeout_step_ms: default_timeout_step_ms(),
        }
    }
}

fn default_base_timeout_ms() -> u64 {
    350
}

fn default_timeout_step_ms() -> u64 {
    100
}
