use super::config::{ConfigError, ForwardingConfig};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DNS_PORT: u16 = 53;

/// Parse a nameserver entry: a bare IP (port 53 implied) or `IP:port`.
pub fn parse_nameserver(entry: &str) -> Result<SocketAddr, ConfigError> {
    let entry = entry.trim();
    if let Ok(addr) = entry.parse::<SocketAddr>() {
        return Ok(addr);
    }
    entry
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|_| ConfigError::Validation(format!("Invalid nameserver address '{}'", entry)))
}

/// Ordered nameserver list plus the per-attempt timeout schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPlan {
    pub nameservers: Vec<SocketAddr>,
    pub base_timeout: Duration,
    pub timeout_step: Duration,
}

impl UpstreamPlan {
    pub fn new(nameservers: Vec<SocketAddr>) -> Self {
        let defaults = ForwardingConfig::default();
        Self {
            nameservers,
            base_timeout: Duration::from_millis(defaults.base_timeout_ms),
            timeout_step: Duration::from_millis(defaults.timeout_step_ms),
        }
    }

    pub fn with_timeouts(mut self, base_timeout: Duration, timeout_step: Duration) -> Self {
        self.base_timeout = base_timeout;
        self.timeout_step = timeout_step;
        self
    }

    pub fn from_config(
        nameservers: &[String],
        forwarding: &ForwardingConfig,
    ) -> Result<Self, ConfigError> {
        if nameservers.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream nameservers configured".to_string(),
            ));
        }
        if forwarding.base_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Forwarding base timeout cannot be 0".to_string(),
            ));
        }
        if forwarding.timeout_step_ms == 0 {
            return Err(ConfigError::Validation(
                "Forwarding timeout step cannot be 0".to_string(),
            ));
        }

        let nameservers = nameservers
            .iter()
            .map(|entry| parse_nameserver(entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(nameservers).with_timeouts(
            Duration::from_millis(forwarding.base_timeout_ms),
            Duration::from_millis(forwarding.timeout_step_ms),
        ))
    }

    /// How long attempt `index` (zero-based) waits for a reply.
    pub fn attempt_timeout(&self, index: usize) -> Duration {
        self.base_timeout + self.timeout_step * index as u32
    }

    pub fn attempts(&self) -> usize {
        self.nameservers.len()
    }

    /// Upper bound on the time a forward can take before it is exhausted.
    pub fn total_budget(&self) -> Duration {
        (0..self.attempts()).map(|i| self.attempt_timeout(i)).sum()
    }
}
