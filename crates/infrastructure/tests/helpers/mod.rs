pub mod builders;
pub mod dns_server_mock;

pub use builders::{PlanBuilder, QueryBuilder, ResponseBuilder};
pub use dns_server_mock::{MockBehavior, MockDnsServer};
