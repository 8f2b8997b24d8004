use super::config::{Config, ConfigError};
use super::{PolicyTable, UpstreamPlan};

/// Everything a single query needs from configuration, compiled once per
/// (re)load and shared read-only between in-flight queries.
#[derive(Debug, Clone)]
pub struct ProxySnapshot {
    pub upstream: UpstreamPlan,
    pub policy: PolicyTable,
}

impl ProxySnapshot {
    pub fn new(upstream: UpstreamPlan, policy: PolicyTable) -> Self {
        Self { upstream, policy }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let upstream = UpstreamPlan::from_config(&config.nameservers, &config.forwarding)?;
        let policy = PolicyTable::from_config(&config.domain_overwrites, &config.domain_blacklists)?;
        Ok(Self::new(upstream, policy))
    }
}
