//! Environment-driven configuration
//!
//! Every key is optional and prefixed with `FERREA_`; see [`Settings::from_lookup`]
//! for the full list and defaults.

use crate::aggregator::MergePolicy;
use crate::error::ConfigError;
use crate::providers::ProviderKind;
use std::time::Duration;
use url::Url;

pub const DEFAULT_APP_NAME: &str = "ferrea-datasources";
pub const DEFAULT_GOOGLE_API_URL: &str = "https://www.googleapis.com/books/v1";
pub const DEFAULT_OPENLIBRARY_API_URL: &str = "https://openlibrary.org";
pub const DEFAULT_OPENLIBRARY_COVER_URL: &str = "https://covers.openlibrary.org";
pub const DEFAULT_OPENLIBRARY_HEALTH_PATH: &str = "/health";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Settings for the volume-search provider
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleSettings {
    pub api_url: Url,
}

/// Settings for the library-catalog provider
#[derive(Debug, Clone, PartialEq)]
pub struct OpenLibrarySettings {
    pub api_url: Url,
    pub cover_url: Url,
    pub health_path: String,
}

/// Application settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Name reported in every request context
    pub app_name: String,

    pub google: GoogleSettings,

    pub openlibrary: OpenLibrarySettings,

    /// Timeout applied to each outbound request
    pub http_timeout: Duration,

    /// Providers to query; list order is precedence order
    pub providers: Vec<ProviderKind>,

    /// How results from several providers are combined
    pub merge_policy: MergePolicy,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    ///
    /// | Key                              | Default                               |
    /// |----------------------------------|---------------------------------------|
    /// | `FERREA_APP_NAME`                | `ferrea-datasources`                  |
    /// | `FERREA_GOOGLE_API_URL`          | `https://www.googleapis.com/books/v1` |
    /// | `FERREA_OPENLIBRARY_API_URL`     | `https://openlibrary.org`             |
    /// | `FERREA_OPENLIBRARY_COVER_URL`   | `https://covers.openlibrary.org`      |
    /// | `FERREA_OPENLIBRARY_HEALTH_PATH` | `/health`                             |
    /// | `FERREA_HTTP_TIMEOUT_SECS`       | `10`                                  |
    /// | `FERREA_PROVIDERS`               | `googlebooks,openlibrary`             |
    /// | `FERREA_MERGE_POLICY`            | `fill-gaps`                           |
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let app_name = get("FERREA_APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        let google = GoogleSettings {
            api_url: base_url("FERREA_GOOGLE_API_URL", get("FERREA_GOOGLE_API_URL"), DEFAULT_GOOGLE_API_URL)?,
        };

        let health_path = get("FERREA_OPENLIBRARY_HEALTH_PATH")
            .unwrap_or_else(|| DEFAULT_OPENLIBRARY_HEALTH_PATH.to_string());
        let openlibrary = OpenLibrarySettings {
            api_url: base_url(
                "FERREA_OPENLIBRARY_API_URL",
                get("FERREA_OPENLIBRARY_API_URL"),
                DEFAULT_OPENLIBRARY_API_URL,
            )?,
            cover_url: base_url(
                "FERREA_OPENLIBRARY_COVER_URL",
                get("FERREA_OPENLIBRARY_COVER_URL"),
                DEFAULT_OPENLIBRARY_COVER_URL,
            )?,
            health_path: format!("/{}", health_path.trim().trim_start_matches('/')),
        };

        let http_timeout = match get("FERREA_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "FERREA_HTTP_TIMEOUT_SECS".to_string(),
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let providers = match get("FERREA_PROVIDERS") {
            Some(raw) => parse_providers(&raw)?,
            None => vec![ProviderKind::GoogleBooks, ProviderKind::OpenLibrary],
        };

        let merge_policy = match get("FERREA_MERGE_POLICY") {
            Some(raw) => raw.parse::<MergePolicy>()?,
            None => MergePolicy::default(),
        };

        Ok(Self {
            app_name,
            google,
            openlibrary,
            http_timeout,
            providers,
            merge_policy,
        })
    }
}

fn base_url(key: &str, value: Option<String>, default: &str) -> Result<Url, ConfigError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    let invalid = || ConfigError::InvalidUrl {
        key: key.to_string(),
        value: raw.clone(),
    };

    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url)
}

fn parse_providers(raw: &str) -> Result<Vec<ProviderKind>, ConfigError> {
    let mut providers = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind: ProviderKind = name.parse()?;
        if !providers.contains(&kind) {
            providers.push(kind);
        }
    }
    if providers.is_empty() {
        return Err(ConfigError::NoProviders);
    }
    Ok(providers)
}
