//! The canonical book record every provider normalizes into

use serde::Serialize;
use url::Url;

/// Provider-agnostic book metadata
///
/// Records are built once through [`BookRecordBuilder`] and never mutated.
/// `author_portraits` is either empty or exactly as long as `authors`, with
/// entry `i` describing `authors[i]`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BookRecord {
    title: Option<String>,
    authors: Vec<String>,
    publisher: Option<String>,
    published_year: Option<i32>,
    cover_url: Option<Url>,
    plot: Option<String>,
    languages: Vec<String>,
    formats: Vec<String>,
    author_portraits: Vec<Option<Url>>,
}

impl BookRecord {
    /// Start building a new record
    pub fn builder() -> BookRecordBuilder {
        BookRecordBuilder::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn published_year(&self) -> Option<i32> {
        self.published_year
    }

    pub fn cover_url(&self) -> Option<&Url> {
        self.cover_url.as_ref()
    }

    pub fn plot(&self) -> Option<&str> {
        self.plot.as_deref()
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn author_portraits(&self) -> &[Option<Url>] {
        &self.author_portraits
    }

    /// Get the primary author (first listed)
    pub fn primary_author(&self) -> Option<&str> {
        self.authors.first().map(|s| s.as_str())
    }

    /// Produce a new record where every field missing here is taken from
    /// `other`.
    ///
    /// Authors and portraits travel together: authors are only borrowed when
    /// this record has none, and portraits are only borrowed when both
    /// records list the same authors in the same order.
    pub fn fill_gaps_from(self, other: &BookRecord) -> BookRecord {
        let (authors, author_portraits) = if self.authors.is_empty() {
            (other.authors.clone(), other.author_portraits.clone())
        } else if self.author_portraits.is_empty() && self.authors == other.authors {
            (self.authors, other.author_portraits.clone())
        } else {
            (self.authors, self.author_portraits)
        };

        BookRecord {
            title: self.title.or_else(|| other.title.clone()),
            authors,
            publisher: self.publisher.or_else(|| other.publisher.clone()),
            published_year: self.published_year.or(other.published_year),
            cover_url: self.cover_url.or_else(|| other.cover_url.clone()),
            plot: self.plot.or_else(|| other.plot.clone()),
            languages: non_empty_or(self.languages, &other.languages),
            formats: non_empty_or(self.formats, &other.formats),
            author_portraits,
        }
    }
}

fn non_empty_or(mine: Vec<String>, theirs: &[String]) -> Vec<String> {
    if mine.is_empty() {
        theirs.to_vec()
    } else {
        mine
    }
}

/// Builder for [`BookRecord`]
#[derive(Debug, Default)]
pub struct BookRecordBuilder {
    record: BookRecord,
}

impl BookRecordBuilder {
    pub fn title(mut self, title: Option<String>) -> Self {
        self.record.title = title;
        self
    }

    /// Set the authors; clears any portraits, which would no longer line up
    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.record.authors = authors;
        self.record.author_portraits.clear();
        self
    }

    /// Set authors together with their portraits, one pair per author
    pub fn authors_with_portraits(mut self, pairs: Vec<(String, Option<Url>)>) -> Self {
        let (authors, portraits): (Vec<String>, Vec<Option<Url>>) = pairs.into_iter().unzip();
        self.record.authors = authors;
        self.record.author_portraits = portraits;
        self
    }

    pub fn publisher(mut self, publisher: Option<String>) -> Self {
        self.record.publisher = publisher;
        self
    }

    /// Set the publication year; anything that is not a 4-digit year is ignored
    pub fn published_year(mut self, year: Option<i32>) -> Self {
        self.record.published_year = year.filter(|y| (1000..=9999).contains(y));
        self
    }

    pub fn cover_url(mut self, cover_url: Option<Url>) -> Self {
        self.record.cover_url = cover_url;
        self
    }

    pub fn plot(mut self, plot: Option<String>) -> Self {
        self.record.plot = plot;
        self
    }

    pub fn languages(mut self, languages: Vec<String>) -> Self {
        self.record.languages = languages;
        self
    }

    pub fn formats(mut self, formats: Vec<String>) -> Self {
        self.record.formats = formats;
        self
    }

    pub fn build(self) -> BookRecord {
        self.record
    }
}
