//! Application state

use anyhow::{Context, Result};
use ferrea_core::{Aggregator, RequestContext, Settings};
use std::sync::Arc;

/// Shared application state
///
/// Holds only immutable configuration; every request builds its own
/// [`RequestContext`].
#[derive(Clone)]
pub struct AppState {
    /// Providers and merge policy shared by every request
    pub aggregator: Arc<Aggregator>,

    /// Name reported in every request context
    pub app_name: Arc<str>,
}

impl AppState {
    pub fn new(aggregator: Aggregator, app_name: impl Into<Arc<str>>) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            app_name: app_name.into(),
        }
    }

    /// Build state from loaded settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let aggregator =
            Aggregator::from_settings(settings).context("Failed to build providers")?;
        Ok(Self::new(aggregator, settings.app_name.as_str()))
    }

    /// Context for one inbound request, keyed by its correlation header
    pub fn request_context(&self, correlation_id: Option<&str>) -> RequestContext {
        RequestContext::from_header(correlation_id, self.app_name.as_ref())
    }
}
