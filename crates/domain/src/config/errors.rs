/// Why a configuration document could not be turned into a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Invalid {format} configuration: {reason}")]
    Parse {
        format: &'static str,
        reason: String,
    },

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
