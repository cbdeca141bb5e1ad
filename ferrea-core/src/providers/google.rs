//! Volume-search provider (Google Books API)
//!
//! Lookups take two calls: a lite search by `isbn:` query to learn the
//! volume ID, then a fetch of the full volume resource.
//! See <https://developers.google.com/books/docs/v1/using>.

use super::{
    build_client, endpoint, get_json, get_status, settle, string_field, string_list, url_field,
    BookProvider,
};
use crate::config::GoogleSettings;
use crate::date::{parse_year, YearParsing};
use crate::error::ProviderError;
use crate::types::{BookRecord, RequestContext};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const TOTAL_ITEMS: &str = "totalItems";
const FIRST_VOLUME_ID: &str = "items[0].id";
const TITLE: &str = "volumeInfo.title";
const AUTHORS: &str = "volumeInfo.authors";
const PUBLISHER: &str = "volumeInfo.publisher";
const PUBLISHED_DATE: &str = "volumeInfo.publishedDate";
const THUMBNAIL: &str = "volumeInfo.imageLinks.thumbnail";
const DESCRIPTION: &str = "volumeInfo.description";
const LANGUAGE: &str = "volumeInfo.language";
const PRINT_TYPE: &str = "volumeInfo.printType";

/// Client for a Google-Books-style volume API
pub struct GoogleBooksProvider {
    client: Client,
    api_url: Url,
}

impl GoogleBooksProvider {
    pub const NAME: &'static str = "GoogleBooks";

    pub fn new(settings: &GoogleSettings, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url: settings.api_url.clone(),
        })
    }

    /// Search by ISBN and return the ID of the first matching volume
    async fn find_volume_id(&self, isbn: &str) -> Result<Option<String>, ProviderError> {
        let url = endpoint(Self::NAME, &self.api_url, &["volumes"])?;
        let query = format!("isbn:{isbn}");
        let Some(results) = get_json(
            Self::NAME,
            &self.client,
            url,
            &[("q", query.as_str()), ("projection", "lite")],
        )
        .await?
        else {
            return Ok(None);
        };

        if results.get(TOTAL_ITEMS).and_then(Value::as_u64) == Some(0) {
            debug!(provider = Self::NAME, isbn, "search returned zero items");
            return Ok(None);
        }
        Ok(string_field(&results, FIRST_VOLUME_ID))
    }

    async fn fetch_volume(&self, volume_id: &str) -> Result<Option<Value>, ProviderError> {
        let url = endpoint(Self::NAME, &self.api_url, &["volumes", volume_id])?;
        get_json(Self::NAME, &self.client, url, &[]).await
    }

    async fn fetch(&self, isbn: &str) -> Result<Option<BookRecord>, ProviderError> {
        let Some(volume_id) = self.find_volume_id(isbn).await? else {
            return Ok(None);
        };
        let volume = self.fetch_volume(&volume_id).await?;
        Ok(volume.map(|v| normalize(&v)))
    }
}

/// Map a full volume resource into a record
pub(crate) fn normalize(volume: &Value) -> BookRecord {
    BookRecord::builder()
        .title(string_field(volume, TITLE))
        .authors(string_list(volume, AUTHORS))
        .publisher(string_field(volume, PUBLISHER))
        .published_year(parse_year(
            string_field(volume, PUBLISHED_DATE).as_deref(),
            YearParsing::Strict,
        ))
        .cover_url(url_field(volume, THUMBNAIL))
        .plot(string_field(volume, DESCRIPTION))
        .languages(string_field(volume, LANGUAGE).into_iter().collect())
        .formats(string_field(volume, PRINT_TYPE).into_iter().collect())
        .build()
}

#[async_trait]
impl BookProvider for GoogleBooksProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn search(&self, isbn: &str, ctx: &RequestContext) -> Option<BookRecord> {
        settle(Self::NAME, isbn, ctx, self.fetch(isbn).await)
    }

    /// Reachable when the base endpoint answers with anything below 500
    async fn healthy(&self, ctx: &RequestContext) -> bool {
        match get_status(Self::NAME, &self.client, self.api_url.clone(), &[]).await {
            Ok(status) => !status.is_server_error(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::JsonPath;
    use serde_json::json;

    #[test]
    fn test_paths_compile() {
        for expression in [
            TOTAL_ITEMS,
            FIRST_VOLUME_ID,
            TITLE,
            AUTHORS,
            PUBLISHER,
            PUBLISHED_DATE,
            THUMBNAIL,
            DESCRIPTION,
            LANGUAGE,
            PRINT_TYPE,
        ] {
            JsonPath::compile(expression).unwrap();
        }
    }

    #[test]
    fn test_normalize_full_volume() {
        let volume = json!({
            "id": "mXPU2T--gPQC",
            "volumeInfo": {
                "title": "Identity",
                "authors": ["Milan Kundera"],
                "publisher": "HarperCollins",
                "publishedDate": "1999-04-21",
                "description": "There are situations in which we fail...",
                "imageLinks": {
                    "thumbnail": "http://books.google.com/books/content?id=mXPU2T--gPQC&printsec=frontcover&img=1&zoom=1&source=gbs_api"
                },
                "language": "en",
                "printType": "BOOK"
            }
        });

        let record = normalize(&volume);
        assert_eq!(record.title(), Some("Identity"));
        assert_eq!(record.authors(), ["Milan Kundera".to_string()]);
        assert_eq!(record.publisher(), Some("HarperCollins"));
        assert_eq!(record.published_year(), Some(1999));
        assert_eq!(
            record.cover_url().map(Url::as_str),
            Some("http://books.google.com/books/content?id=mXPU2T--gPQC&printsec=frontcover&img=1&zoom=1&source=gbs_api")
        );
        assert_eq!(record.languages(), ["en".to_string()]);
        assert_eq!(record.formats(), ["BOOK".to_string()]);
        assert!(record.author_portraits().is_empty());
    }

    #[test]
    fn test_normalize_partial_volume() {
        let volume = json!({
            "volumeInfo": {
                "title": "Untitled Draft",
                "publishedDate": "Spring 2001",
                "imageLinks": {"thumbnail": "/relative/cover.jpg"}
            }
        });

        let record = normalize(&volume);
        assert_eq!(record.title(), Some("Untitled Draft"));
        assert!(record.authors().is_empty());
        assert_eq!(record.published_year(), None);
        assert_eq!(record.cover_url(), None);
        assert!(record.languages().is_empty());
        assert!(record.formats().is_empty());
    }
}
