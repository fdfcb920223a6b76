//! Interactive ratatui front end.
//!
//! The event loop owns the [`SearchController`] and a [`Fetcher`]. Each turn
//! it folds finished fetches into the controller, fires any debounced
//! suggestion fetch, dispatches queued requests, redraws, then waits briefly
//! for a key or mouse event.

pub mod widgets;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use miette::IntoDiagnostic;

use crate::config::FinderConfig;
use crate::controller::{KeyDisposition, NavKey, SearchController};
use crate::fetch::Fetcher;
use crate::provider::BookProvider;

use widgets::{Hit, HitMap};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to wait for input: the poll interval, shortened so a pending
/// debounced fetch goes out on time.
pub fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Duration {
    deadline.map_or(POLL_INTERVAL, |due| {
        due.saturating_duration_since(now).min(POLL_INTERVAL)
    })
}

/// Terminal mouse reporting, switched off again when dropped.
pub struct MouseCapture {
    _private: (),
}

impl MouseCapture {
    pub fn enable() -> io::Result<Self> {
        crossterm::execute!(io::stdout(), EnableMouseCapture)?;
        Ok(Self { _private: () })
    }
}

impl Drop for MouseCapture {
    fn drop(&mut self) {
        if let Err(e) = crossterm::execute!(io::stdout(), DisableMouseCapture) {
            tracing::warn!(error = %e, "failed to disable mouse capture");
        }
    }
}

/// Input handling on top of the controller, independent of the terminal.
pub struct App {
    controller: SearchController,
    should_quit: bool,
}

impl App {
    pub fn new(controller: SearchController) -> Self {
        Self {
            controller,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SearchController {
        &mut self.controller
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
            }
            KeyCode::Home if ctrl => self.go_to_first_page(),
            KeyCode::End if ctrl => self.go_to_last_page(),
            KeyCode::Char(c) if !ctrl => {
                let mut text = self.controller.search().query_text.clone();
                text.push(c);
                self.controller.on_query_text_change(text);
            }
            KeyCode::Backspace => {
                let mut text = self.controller.search().query_text.clone();
                if text.pop().is_some() {
                    self.controller.on_query_text_change(text);
                }
            }
            KeyCode::Down => {
                self.controller.on_key(NavKey::Down);
            }
            KeyCode::Up => {
                self.controller.on_key(NavKey::Up);
            }
            KeyCode::Enter => {
                if self.controller.on_key(NavKey::Enter) == KeyDisposition::Ignored {
                    self.controller.submit_search();
                }
            }
            KeyCode::Esc => {
                if self.controller.on_key(NavKey::Escape) == KeyDisposition::Ignored {
                    self.should_quit = true;
                }
            }
            KeyCode::PageUp => self.step_page(false),
            KeyCode::PageDown => self.step_page(true),
            _ => {}
        }
    }

    /// Left click resolved against the last frame.
    pub fn handle_click(&mut self, hit: Hit) {
        match hit {
            Hit::Input | Hit::Panel => {}
            Hit::Suggestion(i) => {
                let title = self
                    .controller
                    .suggestions()
                    .items
                    .get(i)
                    .map(|s| s.title.clone());
                if let Some(title) = title {
                    self.controller.on_suggestion_chosen(title);
                }
            }
            Hit::Page(target) => {
                self.controller.on_outside_click();
                if let Some(page) = target {
                    if page != self.controller.search().current_page {
                        self.controller.on_page_change(page);
                    }
                }
            }
            Hit::Outside => self.controller.on_outside_click(),
        }
    }

    fn step_page(&mut self, forward: bool) {
        let Some(window) = self.controller.page_window() else {
            return;
        };
        let current = window.current_page;
        if forward && window.can_go_next() {
            self.controller.on_page_change(current + 1);
        } else if !forward && window.can_go_previous() {
            self.controller.on_page_change(current - 1);
        }
    }

    fn go_to_first_page(&mut self) {
        if self.controller.page_window().is_some_and(|w| w.can_go_previous()) {
            self.controller.on_page_change(1);
        }
    }

    fn go_to_last_page(&mut self) {
        if let Some(window) = self.controller.page_window() {
            if window.can_go_next() {
                self.controller.on_page_change(window.last_page);
            }
        }
    }
}

/// Full-screen search session.
pub struct FinderTui {
    app: App,
    fetcher: Fetcher,
    base_url: String,
    hits: HitMap,
}

impl FinderTui {
    pub fn new(config: &FinderConfig, provider: Arc<dyn BookProvider>) -> Self {
        Self {
            app: App::new(SearchController::from_config(config)),
            fetcher: Fetcher::new(provider, config.page_size, config.suggestion_limit),
            base_url: config.base_url.clone(),
            hits: HitMap::default(),
        }
    }

    /// Run the TUI event loop.
    pub fn run(&mut self) -> miette::Result<()> {
        let mut terminal = ratatui::init();
        let result = match MouseCapture::enable() {
            Ok(mouse) => {
                let result = self.event_loop(&mut terminal);
                drop(mouse);
                result
            }
            Err(e) => Err(e).into_diagnostic(),
        };
        ratatui::restore();
        tracing::info!("tui closed");
        result
    }

    fn event_loop(&mut self, terminal: &mut ratatui::DefaultTerminal) -> miette::Result<()> {
        tracing::info!(base_url = %self.base_url, "tui started");
        self.app.controller_mut().start();

        loop {
            self.pump();

            let controller = self.app.controller();
            let base_url = self.base_url.as_str();
            let mut hits = HitMap::default();
            terminal
                .draw(|frame| hits = widgets::render(frame, controller, base_url))
                .into_diagnostic()?;
            self.hits = hits;

            if self.app.should_quit() {
                break;
            }

            let timeout = poll_timeout(self.app.controller().next_deadline(), Instant::now());
            if event::poll(timeout).into_diagnostic()? {
                match event::read().into_diagnostic()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.app.handle_key(key.code, key.modifiers);
                    }
                    Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                        let hit = self.hits.locate(mouse.column, mouse.row);
                        self.app.handle_click(hit);
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Move outcomes in and requests out.
    fn pump(&mut self) {
        let controller = self.app.controller_mut();
        for outcome in self.fetcher.drain() {
            controller.apply(outcome);
        }
        controller.tick(Instant::now());
        self.fetcher.dispatch_all(controller.drain_requests());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SearchPage, Suggestion};
    use crate::controller::ControllerSettings;
    use crate::fetch::{FetchOutcome, FetchRequest};

    fn app() -> App {
        App::new(SearchController::new(ControllerSettings::default()))
    }

    fn answer_results(app: &mut App, total: u64) {
        let seq = match app.controller_mut().drain_requests().pop() {
            Some(FetchRequest::Results { seq, .. }) => seq,
            other => panic!("expected results request, got {other:?}"),
        };
        app.controller_mut().apply(FetchOutcome::Results {
            seq,
            result: Ok(SearchPage {
                total_match_count: total,
                records: Vec::new(),
            }),
        });
    }

    fn answer_suggestions(app: &mut App, titles: &[&str]) {
        let seq = app.controller_mut().drain_requests().pop().unwrap().seq();
        app.controller_mut().apply(FetchOutcome::Suggestions {
            seq,
            result: Ok(titles
                .iter()
                .map(|t| Suggestion {
                    title: t.to_string(),
                    author_summary: "Unknown".into(),
                })
                .collect()),
        });
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn poll_timeout_shrinks_for_pending_debounce() {
        let now = Instant::now();
        assert_eq!(poll_timeout(None, now), POLL_INTERVAL);
        assert_eq!(
            poll_timeout(Some(now + Duration::from_millis(20)), now),
            Duration::from_millis(20)
        );
        assert_eq!(poll_timeout(Some(now + Duration::from_secs(2)), now), POLL_INTERVAL);
        assert_eq!(poll_timeout(Some(now), now + Duration::from_millis(5)), Duration::ZERO);
    }

    #[test]
    fn debounced_typing_sets_the_loop_deadline() {
        let mut app = App::new(SearchController::new(ControllerSettings {
            suggest_debounce: Some(Duration::from_millis(30)),
            ..ControllerSettings::default()
        }));
        type_text(&mut app, "du");
        assert!(app.controller_mut().drain_requests().is_empty());
        let deadline = app.controller().next_deadline().unwrap();
        assert!(poll_timeout(Some(deadline), Instant::now()) <= Duration::from_millis(30));

        app.controller_mut().tick(deadline);
        assert_eq!(app.controller_mut().drain_requests().len(), 1);
    }

    #[test]
    fn typing_edits_query_and_requests_suggestions() {
        let mut app = app();
        type_text(&mut app, "dun");
        app.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.controller().search().query_text, "du");
        assert_eq!(app.controller_mut().drain_requests().len(), 4);
    }

    #[test]
    fn unconsumed_enter_submits_search() {
        let mut app = app();
        type_text(&mut app, "dune");
        app.controller_mut().drain_requests();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        match app.controller_mut().drain_requests().as_slice() {
            [FetchRequest::Results { query, page, .. }] => {
                assert_eq!((query.as_str(), *page), ("dune", 1));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn arrows_then_enter_commit_a_suggestion() {
        let mut app = app();
        type_text(&mut app, "h");
        answer_suggestions(&mut app, &["Hamlet", "Heidi"]);
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.controller().search().query_text, "Heidi");
        assert!(!app.controller().suggestions().is_visible);
    }

    #[test]
    fn escape_closes_panel_before_quitting() {
        let mut app = app();
        type_text(&mut app, "h");
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.should_quit());
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert!(app.should_quit());
    }

    #[test]
    fn ctrl_c_quits_without_editing() {
        let mut app = app();
        app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit());
        assert_eq!(app.controller().search().query_text, "");
    }

    #[test]
    fn page_keys_respect_boundaries() {
        let mut app = app();
        app.controller_mut().start();
        answer_results(&mut app, 60);

        app.handle_key(KeyCode::PageUp, KeyModifiers::NONE);
        assert!(app.controller_mut().drain_requests().is_empty());

        app.handle_key(KeyCode::PageDown, KeyModifiers::NONE);
        assert_eq!(app.controller().search().current_page, 2);
        app.handle_key(KeyCode::End, KeyModifiers::CONTROL);
        assert_eq!(app.controller().search().current_page, 3);
        app.controller_mut().drain_requests();

        app.handle_key(KeyCode::PageDown, KeyModifiers::NONE);
        assert!(app.controller_mut().drain_requests().is_empty());
        app.handle_key(KeyCode::Home, KeyModifiers::CONTROL);
        assert_eq!(app.controller().search().current_page, 1);
    }

    #[test]
    fn clicks_choose_suggestions_and_pages() {
        let mut app = app();
        app.controller_mut().start();
        answer_results(&mut app, 100);
        type_text(&mut app, "e");
        answer_suggestions(&mut app, &["Emma"]);

        app.handle_click(Hit::Input);
        assert!(app.controller().suggestions().is_visible);

        app.handle_click(Hit::Outside);
        assert!(!app.controller().suggestions().is_visible);
        assert_eq!(app.controller().search().query_text, "e");

        app.handle_click(Hit::Page(Some(4)));
        assert_eq!(app.controller().search().current_page, 4);
        app.handle_click(Hit::Page(None));
        assert_eq!(app.controller().search().current_page, 4);

        type_text(&mut app, "m");
        answer_suggestions(&mut app, &["Emma", "Emmanuel"]);
        app.handle_click(Hit::Suggestion(1));
        assert_eq!(app.controller().search().query_text, "Emmanuel");
        assert_eq!(app.controller().search().current_page, 1);
    }
}
