//! Error types for Ferrea Core

use thiserror::Error;

/// Result type alias using FerreaError
pub type Result<T> = std::result::Result<T, FerreaError>;

/// Top-level error type for all Ferrea operations
#[derive(Debug, Error)]
pub enum FerreaError {
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while compiling a path expression
///
/// These are programming errors: they depend only on the expression text,
/// never on the shape of the document being searched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Invalid path expression {expression:?} at offset {position}: {reason}")]
    InvalidPathExpression {
        expression: String,
        position: usize,
        reason: String,
    },
}

/// Errors that occur while talking to an external provider
///
/// A provider simply not knowing an ISBN is not an error; adapters report
/// that as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider}: transport failure calling {url}: {source}")]
    Transport {
        provider: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider}: unexpected status {status} from {url}")]
    UnexpectedStatus {
        provider: &'static str,
        url: String,
        status: u16,
    },

    #[error("{provider}: malformed response body from {url}: {source}")]
    Decode {
        provider: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider}: cannot build request for {url}: {reason}")]
    InvalidUrl {
        provider: &'static str,
        url: String,
        reason: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProviderError {
    /// Whether the failure happened below HTTP (connect, DNS, timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, ProviderError::Transport { .. })
    }

    /// Whether the failure was a request timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            ProviderError::Transport { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

/// Errors that occur while loading configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key}: {value:?} is not an absolute http(s) URL")]
    InvalidUrl { key: String, value: String },

    #[error("{key}: invalid value {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("No providers configured")]
    NoProviders,
}
