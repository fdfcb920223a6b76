//! Book search provider: the external collaborator behind every fetch.
//!
//! `BookProvider` is the seam the controller's fetches go through.
//! `OpenLibraryProvider` implements it against `search.json` with a
//! synchronous `ureq` agent; tests substitute in-memory providers.

use std::time::Duration;

use crate::catalog::{SearchPage, SearchResponse, Suggestion};
use crate::config::FinderConfig;
use crate::error::{ProviderError, ProviderResult};

/// Fields requested from the provider; everything else is ignored.
const SEARCH_FIELDS: &str = "title,author_name,first_publish_year";

/// The two call shapes the client needs from a catalog.
pub trait BookProvider: Send + Sync {
    /// One page of results for a title query. `page` is 1-based.
    fn search_page(&self, query: &str, page: u32, page_size: u32) -> ProviderResult<SearchPage>;

    /// Up to `limit` title matches for autocomplete.
    fn suggest(&self, query: &str, limit: u32) -> ProviderResult<Vec<Suggestion>>;
}

/// HTTP client for an Open Library compatible `search.json` endpoint.
pub struct OpenLibraryProvider {
    base_url: String,
    http: ureq::Agent,
}

impl OpenLibraryProvider {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Self {
        let http = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn from_config(config: &FinderConfig) -> Self {
        Self::new(
            &config.base_url,
            config.request_timeout(),
            &config.user_agent,
        )
    }

    pub fn search_url(&self) -> String {
        format!("{}/search.json", self.base_url)
    }

    fn get_search(&self, params: &[(&str, &str)]) -> ProviderResult<SearchResponse> {
        let url = self.search_url();
        let mut request = self.http.get(&url);
        for (name, value) in params {
            request = request.query(name, value);
        }

        let resp = match request.call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                return Err(ProviderError::Status { status });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ProviderError::Request {
                    url,
                    message: transport.to_string(),
                });
            }
        };

        resp.into_json::<SearchResponse>()
            .map_err(|e| ProviderError::Decode {
                message: e.to_string(),
            })
    }
}

impl BookProvider for OpenLibraryProvider {
    fn search_page(&self, query: &str, page: u32, page_size: u32) -> ProviderResult<SearchPage> {
        let page = page.max(1).to_string();
        let limit = page_size.to_string();
        let resp = self.get_search(&[
            ("title", query),
            ("page", page.as_str()),
            ("limit", limit.as_str()),
            ("fields", SEARCH_FIELDS),
        ])?;
        tracing::debug!(query, page = %page, found = resp.num_found, "results page fetched");
        Ok(SearchPage::from(resp))
    }

    fn suggest(&self, query: &str, limit: u32) -> ProviderResult<Vec<Suggestion>> {
        let limit_param = limit.to_string();
        let resp = self.get_search(&[
            ("title", query),
            ("limit", limit_param.as_str()),
            ("fields", SEARCH_FIELDS),
        ])?;
        let page = SearchPage::from(resp);
        Ok(page
            .records
            .iter()
            .take(limit as usize)
            .map(Suggestion::from)
            .collect())
    }
}
