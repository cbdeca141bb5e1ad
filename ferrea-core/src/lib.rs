//! Ferrea Core Library
//!
//! This crate looks books up by ISBN across external bibliographic providers
//! and normalizes their heterogeneous JSON responses into one canonical
//! [`BookRecord`]. Provider adapters extract fields with the small
//! [`path`] query language and reduce publication dates to a year with
//! [`date::parse_year`]; the [`Aggregator`] fans lookups and health checks out
//! to every configured provider and combines the results.

pub mod aggregator;
pub mod config;
pub mod date;
pub mod error;
pub mod path;
pub mod providers;
pub mod types;

pub use aggregator::{merge, Aggregator, MergePolicy};
pub use config::Settings;
pub use error::{ConfigError, FerreaError, PathError, ProviderError, Result};
pub use path::{extract, JsonPath};
pub use providers::{BookProvider, GoogleBooksProvider, OpenLibraryProvider, ProviderKind};
pub use types::{
    AggregateHealth, BookRecord, BookRecordBuilder, HealthStatus, ProviderHealth, RequestContext,
    CORRELATION_HEADER,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_build_an_aggregator() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        let aggregator = Aggregator::from_settings(&settings).unwrap();
        let names: Vec<&str> = aggregator.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["GoogleBooks", "OpenLibrary"]);
        assert_eq!(aggregator.policy(), MergePolicy::FillGaps);
    }
}
