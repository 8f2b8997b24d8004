#![allow(dead_code)]

mod mocks;

pub use mocks::{MockForwarder, MockResponseCache, TestCodec};

use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

pub const CLIENT: &str = "192.168.1.100:40000";

pub fn client() -> SocketAddr {
    CLIENT.parse().unwrap()
}

pub fn query_message(id: u16, domain: &str, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message.set_id(id);
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(domain).unwrap(), record_type));
    message
}

pub fn query_bytes(id: u16, domain: &str, record_type: RecordType) -> Vec<u8> {
    encode(&query_message(id, domain, record_type))
}

/// Upstream-style answer to `query`, one A record per address.
pub fn a_response(query: &Message, addrs: &[Ipv4Addr], ttl: u32) -> Message {
    let mut response = query.clone();
    response.set_message_type(MessageType::Response);
    response.set_recursion_available(true);
    let name = query.queries()[0].name().clone();
    for addr in addrs {
        response.add_answer(Record::from_rdata(name.clone(), ttl, RData::A(A(*addr))));
    }
    response
}

pub fn encode(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

pub fn decode(bytes: &[u8]) -> Message {
    Message::from_vec(bytes).unwrap()
}

pub fn a_addresses(message: &Message) -> Vec<Ipv4Addr> {
    message
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RData::A(a) => Some(a.0),
            _ => None,
        })
        .collect()
}
