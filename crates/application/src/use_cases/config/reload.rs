use crate::services::{log_snapshot_summary, ActiveConfig};
use lechr_dns_domain::{Config, DomainError, ProxySnapshot};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Re-reads the configuration file and atomically publishes the new
/// nameserver list and policy table.
///
/// Listener settings (port, bind address) are read only at startup; a
/// reload never rebinds the socket. On any error the active snapshot is
/// left untouched.
pub struct ReloadConfigUseCase {
    active: Arc<ActiveConfig>,
}

impl ReloadConfigUseCase {
    pub fn new(active: Arc<ActiveConfig>) -> Self {
        Self { active }
    }

    pub fn execute(&self, config_path: &Path) -> Result<Arc<ProxySnapshot>, DomainError> {
        let new_config = Config::from_file(config_path)
            .map_err(|e| DomainError::ConfigError(format!("Config load error: {}", e)))?;

        new_config
            .validate()
            .map_err(|e| DomainError::ConfigError(format!("Config validation error: {}", e)))?;

        let snapshot = new_config
            .snapshot()
            .map_err(|e| DomainError::ConfigError(format!("Config snapshot error: {}", e)))?;

        self.active.replace(snapshot);
        let current = self.active.load();

        info!(
            "Configuration reloaded successfully from: {}",
            config_path.display()
        );
        log_snapshot_summary(&current);

        Ok(current)
    }
}
