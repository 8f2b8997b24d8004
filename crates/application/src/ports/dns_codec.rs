use hickory_proto::op::Message;
use lechr_dns_domain::DomainError;

/// Largest reply the proxy will put on the wire.
pub const MAX_MESSAGE_SIZE: usize = 4096;

/// Wire-format boundary. Every datagram the proxy reads or writes passes
/// through one of these two calls.
pub trait DnsCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Message, DomainError>;

    /// Fails with [`DomainError::MessageTooLarge`] past [`MAX_MESSAGE_SIZE`].
    fn encode(&self, message: &Message) -> Result<Vec<u8>, DomainError>;
}
