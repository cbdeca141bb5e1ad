//! Fan-out over every configured provider
//!
//! Provider calls run as concurrent tasks. Their results are always folded
//! in configured order, so the outcome does not depend on which provider
//! answers first. A provider task that panics counts as absent (for
//! lookups) or unhealthy (for health checks).

use crate::config::Settings;
use crate::error::{ConfigError, FerreaError};
use crate::providers::{build_providers, BookProvider};
use crate::types::{AggregateHealth, BookRecord, ProviderHealth, RequestContext};
use futures::future::join_all;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

/// How results from several providers are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// The first provider in list order with a record wins outright
    FirstMatch,
    /// The first record found is the base; fields it lacks are filled from
    /// later providers, in list order
    #[default]
    FillGaps,
}

impl FromStr for MergePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "first-match" | "first" => Ok(MergePolicy::FirstMatch),
            "fill-gaps" | "merge" => Ok(MergePolicy::FillGaps),
            _ => Err(ConfigError::InvalidValue {
                key: "FERREA_MERGE_POLICY".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MergePolicy::FirstMatch => "first-match",
            MergePolicy::FillGaps => "fill-gaps",
        })
    }
}

/// Combine per-provider results, given in precedence order
pub fn merge<I>(results: I, policy: MergePolicy) -> Option<BookRecord>
where
    I: IntoIterator<Item = Option<BookRecord>>,
{
    let mut found = results.into_iter().flatten();
    let first = found.next()?;
    match policy {
        MergePolicy::FirstMatch => Some(first),
        MergePolicy::FillGaps => Some(found.fold(first, |acc, next| acc.fill_gaps_from(&next))),
    }
}

/// Queries providers and combines what they return
#[derive(Clone)]
pub struct Aggregator {
    providers: Vec<Arc<dyn BookProvider>>,
    policy: MergePolicy,
}

impl Aggregator {
    /// Create an aggregator over providers listed in precedence order
    pub fn new(providers: Vec<Arc<dyn BookProvider>>, policy: MergePolicy) -> Self {
        Self { providers, policy }
    }

    /// Build the configured providers and wrap them
    pub fn from_settings(settings: &Settings) -> Result<Self, FerreaError> {
        let providers = build_providers(settings)?;
        Ok(Self::new(providers, settings.merge_policy))
    }

    pub fn providers(&self) -> &[Arc<dyn BookProvider>] {
        &self.providers
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Find a configured provider by name, ignoring case
    pub fn provider(&self, name: &str) -> Option<Arc<dyn BookProvider>> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Look an ISBN up across every provider
    pub async fn lookup(&self, isbn: &str, ctx: &RequestContext) -> Option<BookRecord> {
        let span = info_span!(
            "lookup",
            correlation_id = %ctx.correlation_id,
            app = %ctx.app_name,
            isbn
        );

        async {
            info!(providers = self.providers.len(), policy = %self.policy, "searching external datasources");
            let tasks = self
                .providers
                .iter()
                .map(|provider| search_task(provider.clone(), isbn, ctx));
            let results = join_all(tasks).await;

            let record = merge(results, self.policy);
            info!(found = record.is_some(), "search finished");
            record
        }
        .instrument(span)
        .await
    }

    /// Look an ISBN up with a single provider
    pub async fn lookup_with(
        &self,
        provider: Arc<dyn BookProvider>,
        isbn: &str,
        ctx: &RequestContext,
    ) -> Option<BookRecord> {
        let span = info_span!(
            "lookup",
            correlation_id = %ctx.correlation_id,
            app = %ctx.app_name,
            isbn
        );
        search_task(provider, isbn, ctx).instrument(span).await
    }

    /// Probe every provider and fold the results
    pub async fn check_health(&self, ctx: &RequestContext) -> AggregateHealth {
        let span = info_span!(
            "health",
            correlation_id = %ctx.correlation_id,
            app = %ctx.app_name
        );

        async {
            let tasks = self
                .providers
                .iter()
                .map(|provider| health_task(provider.clone(), ctx));
            let health = AggregateHealth::from_entities(join_all(tasks).await);
            info!(status = ?health.status, "health check finished");
            health
        }
        .instrument(span)
        .await
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("policy", &self.policy)
            .finish()
    }
}

async fn search_task(
    provider: Arc<dyn BookProvider>,
    isbn: &str,
    ctx: &RequestContext,
) -> Option<BookRecord> {
    let name = provider.name().to_string();
    let span = info_span!("provider", provider = %name);
    let isbn = isbn.to_string();
    let ctx = ctx.clone();

    let handle = tokio::spawn(async move { provider.search(&isbn, &ctx).await }.instrument(span));
    match handle.await {
        Ok(record) => record,
        Err(e) => {
            error!(provider = %name, error = %e, "provider task failed");
            None
        }
    }
}

async fn health_task(provider: Arc<dyn BookProvider>, ctx: &RequestContext) -> ProviderHealth {
    let name = provider.name().to_string();
    let span = info_span!("provider", provider = %name);
    let ctx = ctx.clone();

    let handle = tokio::spawn(async move { provider.healthy(&ctx).await }.instrument(span));
    let healthy = match handle.await {
        Ok(healthy) => healthy,
        Err(e) => {
            error!(provider = %name, error = %e, "health task failed");
            false
        }
    };
    ProviderHealth::new(name, healthy)
}
