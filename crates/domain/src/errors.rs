use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid DNS message: {0}")]
    InvalidDnsMessage(String),

    #[error("Failed to encode DNS message: {0}")]
    EncodeFailed(String),

    #[error("Encoded DNS message is {0} bytes, over the 4096 byte limit")]
    MessageTooLarge(usize),

    #[error("No upstream nameservers configured")]
    NoNameservers,

    #[error("Upstream transport error with {server}: {reason}")]
    UpstreamTransport { server: String, reason: String },

    #[error("All {attempts} upstream attempts timed out")]
    UpstreamExhausted { attempts: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
