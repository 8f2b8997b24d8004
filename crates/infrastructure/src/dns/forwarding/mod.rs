pub mod forwarder;
pub mod state;

pub use forwarder::UdpForwarder;
pub use state::{AttemptState, AttemptStateMachine};
