pub mod errors;
pub mod forwarding;
pub mod logging;
pub mod policy;
pub mod reload;
pub mod root;
pub mod server;

pub use errors::ConfigError;
pub use forwarding::ForwardingConfig;
pub use logging::LoggingConfig;
pub use policy::{BlacklistConfig, OverwriteConfig};
pub use reload::ReloadConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
