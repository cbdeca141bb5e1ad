//! Library-catalog provider (OpenLibrary API)
//!
//! A lookup fetches the edition by ISBN, then for every listed author the
//! author record and, from the image host, the author's portrait. The image
//! host serves a placeholder for unknown images unless asked with
//! `default=false`, in which case a missing portrait is a 404.
//! See <https://openlibrary.org/developers/api>.

use super::{
    basename, build_client, endpoint, field, get_json, get_status, is_not_found, settle,
    string_field, string_list, BookProvider,
};
use crate::config::OpenLibrarySettings;
use crate::date::{parse_year, YearParsing};
use crate::error::ProviderError;
use crate::types::{BookRecord, RequestContext};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const AUTHOR_KEYS: &str = "authors[].key";
const AUTHOR_NAME: &str = "name";
const TITLE: &str = "title";
const FIRST_PUBLISHER: &str = "publishers[0]";
const PUBLISH_DATE: &str = "publish_date";
const FIRST_COVER_ID: &str = "covers[0]";
const FIRST_SENTENCE: &str = "first_sentence.value";
const FIRST_SENTENCE_TEXT: &str = "first_sentence";
const LANGUAGE_KEYS: &str = "languages[].key";
const TYPE_KEY: &str = "type.key";

/// Client for an OpenLibrary-style catalog and its image host
pub struct OpenLibraryProvider {
    client: Client,
    api_url: Url,
    cover_url: Url,
    health_path: String,
}

impl OpenLibraryProvider {
    pub const NAME: &'static str = "OpenLibrary";

    pub fn new(settings: &OpenLibrarySettings, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url: settings.api_url.clone(),
            cover_url: settings.cover_url.clone(),
            health_path: settings.health_path.clone(),
        })
    }

    async fn fetch_edition(&self, isbn: &str) -> Result<Option<Value>, ProviderError> {
        let url = endpoint(Self::NAME, &self.api_url, &["isbn", isbn])?;
        get_json(Self::NAME, &self.client, url, &[]).await
    }

    async fn fetch_author(&self, author_id: &str) -> Result<Option<Value>, ProviderError> {
        let resource = format!("{author_id}.json");
        let url = endpoint(Self::NAME, &self.api_url, &["authors", &resource])?;
        get_json(Self::NAME, &self.client, url, &[]).await
    }

    /// URL of the author's portrait, if the image host has one
    async fn fetch_portrait(&self, author_id: &str) -> Result<Option<Url>, ProviderError> {
        let image = format!("{author_id}-M.jpg");
        let url = endpoint(Self::NAME, &self.cover_url, &["a", "olid", &image])?;
        let status = get_status(Self::NAME, &self.client, url.clone(), &[("default", "false")]).await?;

        if status.is_success() {
            Ok(Some(url))
        } else if is_not_found(status) {
            Ok(None)
        } else {
            Err(ProviderError::UnexpectedStatus {
                provider: Self::NAME,
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }

    /// Name and portrait for one author; `None` drops the author entirely
    async fn author_entry(&self, author_id: &str) -> Option<(String, Option<Url>)> {
        let (author, portrait) =
            tokio::join!(self.fetch_author(author_id), self.fetch_portrait(author_id));

        let name = match author {
            Ok(Some(record)) => string_field(&record, AUTHOR_NAME),
            Ok(None) => None,
            Err(e) => {
                warn!(provider = Self::NAME, author_id, error = %e, "author fetch failed");
                None
            }
        };
        let Some(name) = name else {
            info!(provider = Self::NAME, author_id, "skipping author without a record");
            return None;
        };

        let portrait = match portrait {
            Ok(url) => url,
            Err(e) => {
                warn!(provider = Self::NAME, author_id, error = %e, "portrait fetch failed");
                None
            }
        };
        if portrait.is_none() {
            debug!(provider = Self::NAME, author_id, "no portrait");
        }
        Some((name, portrait))
    }

    /// The health path sits under the API base, like every other endpoint
    async fn probe_health(&self) -> Result<StatusCode, ProviderError> {
        let segments: Vec<&str> = self
            .health_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let url = endpoint(Self::NAME, &self.api_url, &segments)?;
        get_status(Self::NAME, &self.client, url, &[]).await
    }

    async fn fetch(&self, isbn: &str) -> Result<Option<BookRecord>, ProviderError> {
        let Some(edition) = self.fetch_edition(isbn).await? else {
            return Ok(None);
        };

        let author_ids = string_list(&edition, AUTHOR_KEYS);
        let authors: Vec<(String, Option<Url>)> =
            join_all(author_ids.iter().map(|key| self.author_entry(basename(key))))
                .await
                .into_iter()
                .flatten()
                .collect();

        Ok(Some(normalize(&edition, authors, &self.cover_url)))
    }
}

/// Map an edition record plus its resolved authors into a record
pub(crate) fn normalize(
    edition: &Value,
    authors: Vec<(String, Option<Url>)>,
    cover_base: &Url,
) -> BookRecord {
    // Older editions store the first sentence as a bare string
    let plot = string_field(edition, FIRST_SENTENCE)
        .or_else(|| string_field(edition, FIRST_SENTENCE_TEXT));

    BookRecord::builder()
        .title(string_field(edition, TITLE))
        .authors_with_portraits(authors)
        .publisher(string_field(edition, FIRST_PUBLISHER))
        .published_year(parse_year(
            string_field(edition, PUBLISH_DATE).as_deref(),
            YearParsing::Freeform,
        ))
        .cover_url(cover_url(edition, cover_base))
        .plot(plot)
        .languages(
            string_list(edition, LANGUAGE_KEYS)
                .iter()
                .map(|key| basename(key).to_string())
                .collect(),
        )
        .formats(
            string_field(edition, TYPE_KEY)
                .map(|key| basename(&key).to_string())
                .into_iter()
                .collect(),
        )
        .build()
}

/// Cover image URL built from the first numeric cover ID
///
/// The catalog uses `-1` for "no cover", so only positive IDs count.
fn cover_url(edition: &Value, cover_base: &Url) -> Option<Url> {
    let cover_id = match field(edition, FIRST_COVER_ID)? {
        Value::Number(n) => n.as_u64().filter(|id| *id > 0),
        other => {
            debug!(found = %other, "ignoring non-numeric cover id");
            None
        }
    }?;
    let image = format!("{cover_id}-M.jpg");
    endpoint(OpenLibraryProvider::NAME, cover_base, &["b", "id", &image]).ok()
}

#[async_trait]
impl BookProvider for OpenLibraryProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn search(&self, isbn: &str, ctx: &RequestContext) -> Option<BookRecord> {
        settle(Self::NAME, isbn, ctx, self.fetch(isbn).await)
    }

    async fn healthy(&self, ctx: &RequestContext) -> bool {
        match self.probe_health().await {
            Ok(status) => status.is_success(),
            Err(e) => {
                warn!(
                    provider = Self::NAME,
                    correlation_id = %ctx.correlation_id,
                    error = %e,
                    "health probe failed"
                );
                false
            }
        }
    }
}
