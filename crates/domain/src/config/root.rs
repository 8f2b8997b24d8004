use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use super::errors::ConfigError;
use super::forwarding::ForwardingConfig;
use super::logging::LoggingConfig;
use super::policy::{BlacklistConfig, OverwriteConfig};
use super::reload::ReloadConfig;
use super::server::ServerConfig;
use crate::snapshot::ProxySnapshot;

const LOCAL_CONFIG_PATH: &str = "lechr-dns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/lechr-dns/config.toml";

/// Main configuration structure for Lechr DNS
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Listener configuration (port, bind address)
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Upstream attempt timeouts
    #[serde(default)]
    pub forwarding: ForwardingConfig,

    /// Configuration file watching
    #[serde(default)]
    pub reload: ReloadConfig,

    /// Upstream recursive nameservers, tried in order
    #[serde(default = "default_nameservers")]
    pub nameservers: Vec<String>,

    /// Forced answers keyed by exact domain name
    #[serde(default, alias = "domainOverwrites")]
    pub domain_overwrites: BTreeMap<String, OverwriteConfig>,

    /// Suppressed domains keyed by exact domain name
    #[serde(default, alias = "domainBlacklists")]
    pub domain_blacklists: BTreeMap<String, BlacklistConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            forwarding: ForwardingConfig::default(),
            reload: ReloadConfig::default(),
            nameservers: default_nameservers(),
            domain_overwrites: BTreeMap::new(),
            domain_blacklists: BTreeMap::new(),
        }
    }
}

fn default_nameservers() -> Vec<String> {
    vec!["1.1.1.1".to_string(), "8.8.8.8".to_string()]
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. lechr-dns.toml in current directory
    /// 3. /etc/lechr-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match Self::locate(path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Resolve which configuration file `load` would read, if any.
    ///
    /// An explicit path is returned as-is even when it does not exist, so
    /// that reading it reports the error instead of silently using defaults.
    pub fn locate(path: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = path {
            return Some(PathBuf::from(path));
        }
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists())
    }

    /// Load configuration from a specific file.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            format: "TOML",
            reason: e.to_string(),
        })
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
            format: "JSON",
            reason: e.to_string(),
        })
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.reload.watch && self.reload.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "Reload poll interval cannot be 0".to_string(),
            ));
        }

        self.listen_address()?;
        self.snapshot().map(|_| ())
    }

    /// Compile the runtime view (nameserver addresses, attempt schedule,
    /// policy table) of this configuration.
    pub fn snapshot(&self) -> Result<ProxySnapshot, ConfigError> {
        ProxySnapshot::from_config(self)
    }

    pub fn listen_address(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.server.bind_address.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "Invalid bind address '{}'",
                self.server.bind_address
            ))
        })?;
        Ok(SocketAddr::new(ip, self.server.dns_port))
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}
