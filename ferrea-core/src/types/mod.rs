//! Core types shared by providers, the aggregator and the HTTP boundary

mod context;
mod health;
mod record;

pub use context::{RequestContext, CORRELATION_HEADER};
pub use health::{AggregateHealth, HealthStatus, ProviderHealth};
pub use record::{BookRecord, BookRecordBuilder};
