pub mod cache;
pub mod codec;
pub mod forwarding;
pub mod listener;

pub use cache::{CacheMetrics, ResponseCache};
pub use codec::HickoryCodec;
pub use forwarding::{AttemptState, AttemptStateMachine, UdpForwarder};
pub use listener::UdpDnsListener;
