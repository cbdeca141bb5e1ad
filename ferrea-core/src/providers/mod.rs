//! External bibliographic data providers
//!
//! Each adapter owns one provider's request shapes, response parsing and
//! field mapping into [`BookRecord`]. Adapters never fail a lookup: a
//! provider that does not know the ISBN, answers with an unexpected status or
//! cannot be reached yields `None`, and the reason is logged.

mod google;
mod openlibrary;

pub use google::GoogleBooksProvider;
pub use openlibrary::OpenLibraryProvider;

use crate::config::Settings;
use crate::error::{ConfigError, ProviderError};
use crate::path::extract;
use crate::types::{BookRecord, RequestContext};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// A source of book metadata
#[async_trait]
pub trait BookProvider: Send + Sync {
    /// Constant identifier, e.g. `GoogleBooks`
    fn name(&self) -> &str;

    /// Look up an ISBN; `None` when the provider has nothing usable
    async fn search(&self, isbn: &str, ctx: &RequestContext) -> Option<BookRecord>;

    /// Whether the provider currently answers
    async fn healthy(&self, ctx: &RequestContext) -> bool;
}

/// The providers this crate knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    GoogleBooks,
    OpenLibrary,
}

impl ProviderKind {
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::GoogleBooks => GoogleBooksProvider::NAME,
            ProviderKind::OpenLibrary => OpenLibraryProvider::NAME,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "googlebooks" | "google" => Ok(ProviderKind::GoogleBooks),
            "openlibrary" => Ok(ProviderKind::OpenLibrary),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Build a single provider from settings
pub fn build_provider(
    kind: ProviderKind,
    settings: &Settings,
) -> Result<Arc<dyn BookProvider>, ProviderError> {
    Ok(match kind {
        ProviderKind::GoogleBooks => Arc::new(GoogleBooksProvider::new(
            &settings.google,
            settings.http_timeout,
        )?),
        ProviderKind::OpenLibrary => Arc::new(OpenLibraryProvider::new(
            &settings.openlibrary,
            settings.http_timeout,
        )?),
    })
}

/// Build every configured provider, in precedence order
pub fn build_providers(settings: &Settings) -> Result<Vec<Arc<dyn BookProvider>>, ProviderError> {
    settings
        .providers
        .iter()
        .map(|kind| build_provider(*kind, settings))
        .collect()
}

/// Build the HTTP client an adapter owns
pub(crate) fn build_client(timeout: Duration) -> Result<Client, ProviderError> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .default_headers(default_headers)
        .user_agent(concat!("ferrea-core/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::Client)
}

/// Append path segments to a base URL, percent-encoding each one
pub(crate) fn endpoint(
    provider: &'static str,
    base: &Url,
    segments: &[&str],
) -> Result<Url, ProviderError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ProviderError::InvalidUrl {
            provider,
            url: base.to_string(),
            reason: "base URL cannot carry a path".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Send a GET and return the status, without reading the body
pub(crate) async fn get_status(
    provider: &'static str,
    client: &Client,
    url: Url,
    query: &[(&str, &str)],
) -> Result<StatusCode, ProviderError> {
    debug!(provider, %url, "GET");
    let response = client
        .get(url.clone())
        .query(query)
        .send()
        .await
        .map_err(|source| ProviderError::Transport {
            provider,
            url: url.to_string(),
            source,
        })?;
    Ok(response.status())
}

/// Send a GET and decode a JSON body
///
/// 404 and 410 mean "not found" and yield `Ok(None)`; any other non-2xx
/// status is an [`ProviderError::UnexpectedStatus`].
pub(crate) async fn get_json(
    provider: &'static str,
    client: &Client,
    url: Url,
    query: &[(&str, &str)],
) -> Result<Option<Value>, ProviderError> {
    debug!(provider, %url, "GET");
    let response = client
        .get(url.clone())
        .query(query)
        .send()
        .await
        .map_err(|source| ProviderError::Transport {
            provider,
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if is_not_found(status) {
        debug!(provider, %url, status = status.as_u16(), "not found");
        return Ok(None);
    }
    if !status.is_success() {
        return Err(ProviderError::UnexpectedStatus {
            provider,
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .json::<Value>()
        .await
        .map(Some)
        .map_err(|source| ProviderError::Decode {
            provider,
            url: url.to_string(),
            source,
        })
}

pub(crate) fn is_not_found(status: StatusCode) -> bool {
    matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE)
}

/// Log the outcome of an adapter lookup and fold it into an option
pub(crate) fn settle(
    provider: &'static str,
    isbn: &str,
    ctx: &RequestContext,
    outcome: Result<Option<BookRecord>, ProviderError>,
) -> Option<BookRecord> {
    match outcome {
        Ok(Some(record)) => {
            debug!(provider, isbn, correlation_id = %ctx.correlation_id, "record found");
            Some(record)
        }
        Ok(None) => {
            info!(provider, isbn, correlation_id = %ctx.correlation_id, "unable to find book");
            None
        }
        Err(e) => {
            warn!(
                provider,
                isbn,
                correlation_id = %ctx.correlation_id,
                transport = e.is_transport(),
                timeout = e.is_timeout(),
                error = %e,
                "lookup failed"
            );
            None
        }
    }
}

/// Evaluate a path expression against a provider document
///
/// Adapter expressions are constants; a malformed one is a bug and trips a
/// debug assertion.
pub(crate) fn field(document: &Value, expression: &str) -> Option<Value> {
    match extract(document, expression) {
        Ok(value) => value,
        Err(e) => {
            error!(error = %e, "invalid path expression");
            debug_assert!(false, "{e}");
            None
        }
    }
}

/// A string field; values of any other shape degrade to `None`
pub(crate) fn string_field(document: &Value, expression: &str) -> Option<String> {
    match field(document, expression)? {
        Value::String(s) => Some(s),
        other => {
            debug!(path = expression, found = %other, "ignoring non-string field");
            None
        }
    }
}

/// A list of strings; non-string entries are dropped and a lone string is
/// promoted to a one-element list
pub(crate) fn string_list(document: &Value, expression: &str) -> Vec<String> {
    match field(document, expression) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    }
}

/// An absolute URL field; anything unparsable degrades to `None`
pub(crate) fn url_field(document: &Value, expression: &str) -> Option<Url> {
    let raw = string_field(document, expression)?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!(path = expression, value = %raw, error = %e, "ignoring malformed URL");
            None
        }
    }
}

/// Last path component of a namespaced key such as `/authors/OL1A`
pub(crate) fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
