//! Query and suggestion controller.
//!
//! Owns the search state (query text, page, results, loading flag) and the
//! suggestion panel state, and turns user intents into [`FetchRequest`]s.
//! It performs no I/O: requests are queued for the event loop to dispatch
//! and outcomes are fed back through [`SearchController::apply`].
//!
//! Each state slot (results, suggestions) carries its own sequence number.
//! Only the outcome matching the latest request for a slot is applied, so a
//! slow response for an old query can never overwrite a newer one.

use std::time::{Duration, Instant};

use crate::catalog::{BookRecord, Suggestion};
use crate::config::FinderConfig;
use crate::fetch::{FetchOutcome, FetchRequest};
use crate::pagination::{PageControl, PageWindow};

/// The text actually sent for a results fetch: trimmed, or `default_query` when blank.
pub fn resolve_query(text: &str, default_query: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        default_query.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Search state shown in the results area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub query_text: String,
    /// 1-based.
    pub current_page: u32,
    /// Never below 1.
    pub total_pages: u32,
    pub results: Vec<BookRecord>,
    pub is_loading: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query_text: String::new(),
            current_page: 1,
            total_pages: 1,
            results: Vec::new(),
            is_loading: false,
        }
    }
}

/// Autocomplete panel state.
///
/// `highlighted` is always a valid index into `items` when set; it resets
/// whenever `items` is replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    pub items: Vec<Suggestion>,
    pub is_visible: bool,
    pub highlighted: Option<usize>,
}

impl SuggestionState {
    fn replace(&mut self, items: Vec<Suggestion>) {
        self.items = items;
        self.highlighted = None;
    }

    /// Whether the panel has anything to draw.
    pub fn is_shown(&self) -> bool {
        self.is_visible && !self.items.is_empty()
    }

    pub fn highlighted_item(&self) -> Option<&Suggestion> {
        self.highlighted.and_then(|i| self.items.get(i))
    }
}

/// Keys the suggestion panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
    Escape,
}

/// Whether the controller handled a key.
///
/// An `Ignored` Enter is a search submission for the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Consumed,
    Ignored,
}

/// Tunables the controller reads from [`FinderConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub default_query: String,
    pub page_size: u32,
    pub suggestion_limit: u32,
    pub page_cap: u32,
    pub max_visible_pages: u32,
    pub suggest_debounce: Option<Duration>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&FinderConfig::default())
    }
}

impl From<&FinderConfig> for ControllerSettings {
    fn from(config: &FinderConfig) -> Self {
        Self {
            default_query: config.default_query.clone(),
            page_size: config.page_size.max(1),
            suggestion_limit: config.suggestion_limit,
            page_cap: config.page_cap,
            max_visible_pages: config.max_visible_pages,
            suggest_debounce: config.suggest_debounce(),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingSuggest {
    query: String,
    due: Instant,
}

/// Drives search and autocomplete state from user intents.
#[derive(Debug)]
pub struct SearchController {
    settings: ControllerSettings,
    search: SearchState,
    suggestions: SuggestionState,
    results_seq: u64,
    suggest_seq: u64,
    pending_suggest: Option<PendingSuggest>,
    outbox: Vec<FetchRequest>,
}

impl SearchController {
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            settings,
            search: SearchState::default(),
            suggestions: SuggestionState::default(),
            results_seq: 0,
            suggest_seq: 0,
            pending_suggest: None,
            outbox: Vec::new(),
        }
    }

    pub fn from_config(config: &FinderConfig) -> Self {
        Self::new(ControllerSettings::from(config))
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn suggestions(&self) -> &SuggestionState {
        &self.suggestions
    }

    /// Initial load: page 1 of the default term.
    pub fn start(&mut self) {
        tracing::info!(query = %self.settings.default_query, "initial results fetch");
        self.search.current_page = 1;
        self.request_results(self.settings.default_query.clone(), 1);
    }

    /// Search for the current query text from page 1.
    pub fn submit_search(&mut self) {
        let query = self.effective_query(&self.search.query_text);
        self.search.current_page = 1;
        self.suggestions.is_visible = false;
        self.pending_suggest = None;
        self.request_results(query, 1);
    }

    /// Replace the query text, then search for it from page 1.
    pub fn submit_search_text(&mut self, text: impl Into<String>) {
        self.search.query_text = text.into();
        self.submit_search();
    }

    /// Fetch `page` of the current query text. The caller keeps `page` in range.
    pub fn on_page_change(&mut self, page: u32) {
        let page = page.max(1);
        let query = self.effective_query(&self.search.query_text);
        self.search.current_page = page;
        self.request_results(query, page);
    }

    /// The user edited the query box.
    pub fn on_query_text_change(&mut self, text: impl Into<String>) {
        self.on_query_text_change_at(text, Instant::now());
    }

    /// [`on_query_text_change`](Self::on_query_text_change) with an explicit clock.
    pub fn on_query_text_change_at(&mut self, text: impl Into<String>, now: Instant) {
        self.search.query_text = text.into();
        self.suggestions.is_visible = true;

        let query = self.search.query_text.trim().to_string();
        if query.is_empty() {
            // Invalidate whatever suggestion fetch is still in flight.
            self.suggest_seq += 1;
            self.pending_suggest = None;
            self.suggestions.replace(Vec::new());
            return;
        }

        match self.settings.suggest_debounce {
            Some(quiet) => {
                self.pending_suggest = Some(PendingSuggest {
                    query,
                    due: now + quiet,
                });
            }
            None => self.request_suggestions(query),
        }
    }

    /// Commit a suggestion: it becomes the query and is searched from page 1.
    pub fn on_suggestion_chosen(&mut self, title: impl Into<String>) {
        let title = title.into();
        tracing::debug!(title = %title, "suggestion chosen");
        self.search.query_text = title;
        self.submit_search();
    }

    /// Keyboard navigation for the suggestion panel.
    pub fn on_key(&mut self, key: NavKey) -> KeyDisposition {
        if !self.suggestions.is_visible {
            return KeyDisposition::Ignored;
        }
        let len = self.suggestions.items.len();
        match key {
            NavKey::Down => {
                self.suggestions.highlighted = match self.suggestions.highlighted {
                    None if len > 0 => Some(0),
                    Some(i) if i + 1 < len => Some(i + 1),
                    other => other,
                };
                KeyDisposition::Consumed
            }
            NavKey::Up => {
                if let Some(i) = self.suggestions.highlighted.filter(|&i| i > 0) {
                    self.suggestions.highlighted = Some(i - 1);
                }
                KeyDisposition::Consumed
            }
            NavKey::Enter => match self.suggestions.highlighted_item() {
                Some(item) => {
                    let title = item.title.clone();
                    self.on_suggestion_chosen(title);
                    KeyDisposition::Consumed
                }
                None => KeyDisposition::Ignored,
            },
            NavKey::Escape => {
                self.suggestions.is_visible = false;
                KeyDisposition::Consumed
            }
        }
    }

    /// A click landed outside the input and the suggestion panel.
    pub fn on_outside_click(&mut self) {
        self.suggestions.is_visible = false;
    }

    /// Dispatch a debounced suggestion fetch once its quiet period is over.
    pub fn tick(&mut self, now: Instant) {
        if !self.pending_suggest.as_ref().is_some_and(|p| p.due <= now) {
            return;
        }
        if let Some(pending) = self.pending_suggest.take() {
            self.request_suggestions(pending.query);
        }
    }

    /// When the next debounced fetch is due, if one is waiting.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_suggest.as_ref().map(|p| p.due)
    }

    /// Take the requests queued since the last call.
    pub fn drain_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Fold a finished fetch into state. Outcomes for superseded requests are dropped.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Results { seq, result } => {
                if seq != self.results_seq {
                    tracing::debug!(seq, latest = self.results_seq, "discarding stale results");
                    return;
                }
                self.search.is_loading = false;
                match result {
                    Ok(mut page) => {
                        self.search.total_pages = page.total_pages(self.settings.page_size);
                        page.records.truncate(self.settings.page_size as usize);
                        self.search.results = page.records;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "results fetch failed");
                        self.search.results.clear();
                    }
                }
            }
            FetchOutcome::Suggestions { seq, result } => {
                if seq != self.suggest_seq {
                    tracing::debug!(seq, latest = self.suggest_seq, "discarding stale suggestions");
                    return;
                }
                match result {
                    Ok(mut items) => {
                        items.truncate(self.settings.suggestion_limit as usize);
                        self.suggestions.replace(items);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "suggestion fetch failed");
                        self.suggestions.replace(Vec::new());
                    }
                }
            }
        }
    }

    /// Pagination window for the current state; `None` when there is one page.
    pub fn page_window(&self) -> Option<PageWindow> {
        PageWindow::compute_with(
            self.search.current_page,
            self.search.total_pages,
            self.settings.page_cap,
            self.settings.max_visible_pages,
        )
    }

    /// The rendered control strip, empty when there is one page.
    pub fn page_controls(&self) -> Vec<PageControl> {
        self.page_window()
            .map(|w| w.controls())
            .unwrap_or_default()
    }

    fn effective_query(&self, text: &str) -> String {
        resolve_query(text, &self.settings.default_query)
    }

    fn request_results(&mut self, query: String, page: u32) {
        self.results_seq += 1;
        self.search.is_loading = true;
        self.outbox.push(FetchRequest::Results {
            seq: self.results_seq,
            query,
            page,
        });
    }

    fn request_suggestions(&mut self, query: String) {
        self.suggest_seq += 1;
        self.outbox.push(FetchRequest::Suggestions {
            seq: self.suggest_seq,
            query,
        });
    }
}
