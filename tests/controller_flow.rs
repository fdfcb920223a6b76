//! End-to-end tests for the search controller driven through the background
//! fetcher, with an in-memory catalog standing in for the network.
//!
//! These exercise the same request/outcome loop the TUI runs: the controller
//! queues requests, the fetcher performs them on threads, and outcomes are
//! folded back in.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use book_finder::catalog::{BookRecord, SearchPage, Suggestion};
use book_finder::controller::{ControllerSettings, KeyDisposition, NavKey, SearchController};
use book_finder::error::{ProviderError, ProviderResult};
use book_finder::fetch::Fetcher;
use book_finder::provider::BookProvider;

/// Catalog of titles matched by case-insensitive substring.
struct MemoryCatalog {
    books: Vec<BookRecord>,
    calls: Mutex<Vec<String>>,
    fail_results: bool,
}

impl MemoryCatalog {
    fn new(books: Vec<BookRecord>) -> Self {
        Self {
            books,
            calls: Mutex::new(Vec::new()),
            fail_results: false,
        }
    }

    fn matching(&self, query: &str) -> Vec<BookRecord> {
        let needle = query.to_lowercase();
        self.books
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl BookProvider for MemoryCatalog {
    fn search_page(&self, query: &str, page: u32, page_size: u32) -> ProviderResult<SearchPage> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("results:{query}:{page}"));
        if self.fail_results {
            return Err(ProviderError::Status { status: 502 });
        }
        let all = self.matching(query);
        let skip = (page.saturating_sub(1) * page_size) as usize;
        Ok(SearchPage {
            total_match_count: all.len() as u64,
            records: all.into_iter().skip(skip).take(page_size as usize).collect(),
        })
    }

    fn suggest(&self, query: &str, limit: u32) -> ProviderResult<Vec<Suggestion>> {
        self.calls.lock().unwrap().push(format!("suggest:{query}"));
        Ok(self
            .matching(query)
            .iter()
            .take(limit as usize)
            .map(Suggestion::from)
            .collect())
    }
}

fn library() -> Vec<BookRecord> {
    let mut books: Vec<BookRecord> = (1..=45)
        .map(|i| BookRecord::new(format!("A Book Volume {i}")).with_year(1900 + i))
        .collect();
    books.push(BookRecord::new("Dune").with_authors(["Frank Herbert"]).with_year(1965));
    books.push(BookRecord::new("Dune Messiah").with_authors(["Frank Herbert"]).with_year(1969));
    books.push(BookRecord::new("Dubliners").with_authors(["James Joyce"]).with_year(1914));
    books
}

/// Dispatch everything queued and fold outcomes back until the fetcher is idle.
fn settle(controller: &mut SearchController, fetcher: &mut Fetcher) {
    fetcher.dispatch_all(controller.drain_requests());
    while fetcher.in_flight() > 0 {
        let outcome = fetcher
            .wait(Duration::from_secs(5))
            .expect("fetch should complete");
        controller.apply(outcome);
        fetcher.dispatch_all(controller.drain_requests());
    }
}

fn setup(catalog: MemoryCatalog) -> (SearchController, Fetcher, Arc<MemoryCatalog>) {
    let catalog = Arc::new(catalog);
    let settings = ControllerSettings::default();
    let fetcher = Fetcher::new(
        Arc::clone(&catalog) as Arc<dyn BookProvider>,
        settings.page_size,
        settings.suggestion_limit,
    );
    (SearchController::new(settings), fetcher, catalog)
}

#[test]
fn initial_load_searches_default_term() {
    let (mut controller, mut fetcher, catalog) = setup(MemoryCatalog::new(library()));
    controller.start();
    settle(&mut controller, &mut fetcher);

    assert_eq!(catalog.calls(), vec!["results:book:1".to_string()]);
    let search = controller.search();
    assert!(!search.is_loading);
    assert_eq!(search.results.len(), 20);
    assert_eq!(search.total_pages, 3);
}

#[test]
fn paging_walks_through_results() {
    let (mut controller, mut fetcher, _catalog) = setup(MemoryCatalog::new(library()));
    controller.submit_search_text("volume");
    settle(&mut controller, &mut fetcher);
    assert_eq!(controller.search().total_pages, 3);

    controller.on_page_change(3);
    settle(&mut controller, &mut fetcher);
    let search = controller.search();
    assert_eq!(search.current_page, 3);
    assert_eq!(search.results.len(), 5);
    assert_eq!(search.results[0].title, "A Book Volume 41");

    let window = controller.page_window().unwrap();
    assert!(!window.can_go_next());
    assert_eq!(window.visible_pages, vec![2]);
}

#[test]
fn typing_then_choosing_a_suggestion() {
    let (mut controller, mut fetcher, catalog) = setup(MemoryCatalog::new(library()));
    controller.on_query_text_change("du");
    settle(&mut controller, &mut fetcher);

    let titles: Vec<&str> = controller
        .suggestions()
        .items
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Dune", "Dune Messiah", "Dubliners"]);
    assert_eq!(controller.suggestions().items[2].author_summary, "James Joyce");

    controller.on_key(NavKey::Down);
    controller.on_key(NavKey::Down);
    assert_eq!(controller.on_key(NavKey::Enter), KeyDisposition::Consumed);
    settle(&mut controller, &mut fetcher);

    let search = controller.search();
    assert_eq!(search.query_text, "Dune Messiah");
    assert_eq!(search.results.len(), 1);
    assert_eq!(search.results[0].year_label(), "1969");
    assert!(!controller.suggestions().is_visible);
    assert_eq!(
        catalog.calls(),
        vec![
            "suggest:du".to_string(),
            "results:Dune Messiah:1".to_string()
        ]
    );
}

#[test]
fn empty_match_shows_no_results_and_single_page() {
    let (mut controller, mut fetcher, _catalog) = setup(MemoryCatalog::new(library()));
    controller.submit_search_text("zzzz");
    settle(&mut controller, &mut fetcher);
    assert!(controller.search().results.is_empty());
    assert_eq!(controller.search().total_pages, 1);
    assert!(controller.page_window().is_none());
}

#[test]
fn provider_failure_leaves_controller_usable() {
    let mut catalog = MemoryCatalog::new(library());
    catalog.fail_results = true;
    let (mut controller, mut fetcher, _catalog) = setup(catalog);

    controller.submit_search_text("dune");
    settle(&mut controller, &mut fetcher);
    assert!(!controller.search().is_loading);
    assert!(controller.search().results.is_empty());

    // Suggestions still work after a failed results fetch.
    controller.on_query_text_change("dun");
    settle(&mut controller, &mut fetcher);
    assert_eq!(controller.suggestions().items.len(), 2);
}
