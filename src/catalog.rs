//! Book records and the provider's wire format.
//!
//! `SearchResponse` mirrors the Open Library `search.json` payload; the rest
//! of the crate only sees `BookRecord`, `Suggestion` and `SearchPage`.

use serde::{Deserialize, Serialize};

/// Author label used when a record lists no authors.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Year label used when a record has no first publish year.
pub const UNKNOWN_YEAR: &str = "N/A";

/// A single catalog entry, as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub first_publish_year: Option<i32>,
}

impl BookRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            first_publish_year: None,
        }
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.first_publish_year = Some(year);
        self
    }

    /// Authors joined with ", ", or "Unknown" when there are none.
    pub fn author_summary(&self) -> String {
        if self.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            self.authors.join(", ")
        }
    }

    pub fn year_label(&self) -> String {
        self.first_publish_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
    }
}

/// One autocomplete entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub author_summary: String,
}

impl From<&BookRecord> for Suggestion {
    fn from(record: &BookRecord) -> Self {
        Self {
            title: record.title.clone(),
            author_summary: record.author_summary(),
        }
    }
}

/// A page of results plus the provider's total match count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub total_match_count: u64,
    pub records: Vec<BookRecord>,
}

impl SearchPage {
    /// Number of pages needed for `total_match_count` at `page_size`, never below 1.
    pub fn total_pages(&self, page_size: u32) -> u32 {
        total_pages(self.total_match_count, page_size)
    }
}

/// `ceil(total / page_size)`, floored at 1 and saturated at `u32::MAX`.
pub fn total_pages(total_match_count: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total_match_count.div_ceil(page_size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Raw `search.json` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

/// Raw document inside `docs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchDoc {
    /// Present but `null` on some catalog entries.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Option<Vec<String>>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
}

impl From<SearchDoc> for BookRecord {
    fn from(doc: SearchDoc) -> Self {
        Self {
            title: doc.title.unwrap_or_default(),
            authors: doc.author_name.unwrap_or_default(),
            first_publish_year: doc.first_publish_year,
        }
    }
}

impl From<SearchResponse> for SearchPage {
    fn from(resp: SearchResponse) -> Self {
        Self {
            total_match_count: resp.num_found,
            records: resp.docs.into_iter().map(BookRecord::from).collect(),
        }
    }
}
