pub mod dns;
pub mod signals;

pub use dns::start_dns_server;
pub use signals::{spawn_reload_on_sighup, wait_for_shutdown};
