//! Wire codec backed by `hickory-proto`.

use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use lechr_dns_application::ports::{DnsCodec, MAX_MESSAGE_SIZE};
use lechr_dns_domain::DomainError;

/// Decodes inbound datagrams and encodes replies, refusing anything that
/// would not fit in a single 4096-byte datagram.
#[derive(Debug, Default, Clone, Copy)]
pub struct HickoryCodec;

impl HickoryCodec {
    pub fn new() -> Self {
        Self
    }
}

impl DnsCodec for HickoryCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Message, DomainError> {
        if bytes.len() > MAX_MESSAGE_SIZE {
            return Err(DomainError::MessageTooLarge(bytes.len()));
        }
        Message::from_vec(bytes).map_err(|e| DomainError::InvalidDnsMessage(e.to_string()))
    }

    fn encode(&self, message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message
            .emit(&mut encoder)
            .map_err(|e| DomainError::EncodeFailed(e.to_string()))?;

        if buf.len() > MAX_MESSAGE_SIZE {
            return Err(DomainError::MessageTooLarge(buf.len()));
        }
        Ok(buf)
    }
}
