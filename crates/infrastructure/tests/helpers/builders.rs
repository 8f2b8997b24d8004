#![allow(dead_code)]
use hickory_proto::op::{Message, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use lechr_dns_domain::UpstreamPlan;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub struct QueryBuilder;

impl QueryBuilder {
    pub fn message(id: u16, domain: &str, record_type: RecordType) -> Message {
        let mut message = Message::new();
        message.set_id(id);
        message.set_recursion_desired(true);
        message.add_query(Query::query(Name::from_str(domain).unwrap(), record_type));
        message
    }

    pub fn bytes(id: u16, domain: &str, record_type: RecordType) -> Vec<u8> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        Self::message(id, domain, record_type)
            .emit(&mut encoder)
            .unwrap();
        buf
    }
}

pub struct ResponseBuilder;

impl ResponseBuilder {
    pub fn a_record(domain: &str, addr: Ipv4Addr, ttl: u32) -> Arc<Message> {
        let mut message = QueryBuilder::message(1, domain, RecordType::A);
        message.add_answer(Record::from_rdata(
            Name::from_str(domain).unwrap(),
            ttl,
            RData::A(A(addr)),
        ));
        Arc::new(message)
    }
}

pub struct PlanBuilder;

impl PlanBuilder {
    /// Short timeouts keep socket tests fast while preserving the schedule's
    /// shape (base + step * attempt).
    pub fn fast(servers: &[SocketAddr]) -> UpstreamPlan {
        UpstreamPlan::new(servers.to_vec())
            .with_timeouts(Duration::from_millis(150), Duration::from_millis(50))
    }

    /// A loopback address nothing listens on.
    pub fn unreachable() -> SocketAddr {
        let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.local_addr().unwrap()
    }
}
