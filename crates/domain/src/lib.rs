//! Lechr DNS Domain Layer
pub mod cache_key;
pub mod config;
pub mod errors;
pub mod policy;
pub mod question;
pub mod record_kind;
pub mod snapshot;
pub mod upstream;

pub use cache_key::CacheKey;
pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use policy::{OverwriteData, PolicyOverwrite, PolicyTable, DEFAULT_OVERWRITE_TTL};
pub use question::Question;
pub use record_kind::RecordKind;
pub use snapshot::ProxySnapshot;
pub use upstream::{parse_nameserver, UpstreamPlan, DNS_PORT};
