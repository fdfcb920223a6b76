//! Background fetch dispatcher.
//!
//! The controller never talks to the network itself: it queues
//! [`FetchRequest`]s, the event loop hands them to a [`Fetcher`], and the
//! fetcher runs each one on its own short-lived thread. Outcomes come back
//! over an `mpsc` channel that the event loop drains between frames, so all
//! controller state stays on the loop's thread.
//!
//! Every dispatched request yields exactly one outcome, success or error;
//! the controller relies on that to clear its loading flag.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::catalog::{SearchPage, Suggestion};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::BookProvider;

/// A fetch the controller wants performed.
///
/// `seq` is the controller's per-slot sequence number; it comes back
/// unchanged in the matching [`FetchOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Results { seq: u64, query: String, page: u32 },
    Suggestions { seq: u64, query: String },
}

impl FetchRequest {
    pub fn seq(&self) -> u64 {
        match self {
            FetchRequest::Results { seq, .. } | FetchRequest::Suggestions { seq, .. } => *seq,
        }
    }

    pub fn query(&self) -> &str {
        match self {
            FetchRequest::Results { query, .. } | FetchRequest::Suggestions { query, .. } => query,
        }
    }

    /// Outcome reporting that this request could not be performed.
    pub fn failed(&self, error: ProviderError) -> FetchOutcome {
        match *self {
            FetchRequest::Results { seq, .. } => FetchOutcome::Results {
                seq,
                result: Err(error),
            },
            FetchRequest::Suggestions { seq, .. } => FetchOutcome::Suggestions {
                seq,
                result: Err(error),
            },
        }
    }
}

/// The provider's answer to a [`FetchRequest`].
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Results {
        seq: u64,
        result: ProviderResult<SearchPage>,
    },
    Suggestions {
        seq: u64,
        result: ProviderResult<Vec<Suggestion>>,
    },
}

impl FetchOutcome {
    pub fn seq(&self) -> u64 {
        match self {
            FetchOutcome::Results { seq, .. } | FetchOutcome::Suggestions { seq, .. } => *seq,
        }
    }

    pub fn is_ok(&self) -> bool {
        match self {
            FetchOutcome::Results { result, .. } => result.is_ok(),
            FetchOutcome::Suggestions { result, .. } => result.is_ok(),
        }
    }
}

/// Perform one request synchronously against `provider`.
pub fn run_request(
    provider: &dyn BookProvider,
    request: &FetchRequest,
    page_size: u32,
    suggestion_limit: u32,
) -> FetchOutcome {
    match request {
        FetchRequest::Results { seq, query, page } => FetchOutcome::Results {
            seq: *seq,
            result: provider.search_page(query, *page, page_size),
        },
        FetchRequest::Suggestions { seq, query } => FetchOutcome::Suggestions {
            seq: *seq,
            result: provider.suggest(query, suggestion_limit),
        },
    }
}

/// Runs fetches on background threads and collects their outcomes.
pub struct Fetcher {
    provider: Arc<dyn BookProvider>,
    page_size: u32,
    suggestion_limit: u32,
    tx: mpsc::Sender<FetchOutcome>,
    rx: mpsc::Receiver<FetchOutcome>,
    in_flight: usize,
}

impl Fetcher {
    pub fn new(provider: Arc<dyn BookProvider>, page_size: u32, suggestion_limit: u32) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            provider,
            page_size,
            suggestion_limit,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Requests dispatched whose outcome has not been collected yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start `request` on a new thread.
    pub fn dispatch(&mut self, request: FetchRequest) {
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        let (page_size, limit) = (self.page_size, self.suggestion_limit);
        let name = match request {
            FetchRequest::Results { .. } => "fetch-results",
            FetchRequest::Suggestions { .. } => "fetch-suggest",
        };
        tracing::debug!(seq = request.seq(), query = request.query(), name, "dispatching fetch");

        let thread_request = request.clone();
        let spawned = thread::Builder::new().name(name.into()).spawn(move || {
            let outcome = run_request(provider.as_ref(), &thread_request, page_size, limit);
            // The receiver is gone only when the loop has shut down.
            let _ = tx.send(outcome);
        });

        self.in_flight += 1;
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "failed to spawn fetch thread");
            let _ = self.tx.send(request.failed(ProviderError::Request {
                url: String::new(),
                message: format!("failed to spawn fetch thread: {e}"),
            }));
        }
    }

    pub fn dispatch_all(&mut self, requests: impl IntoIterator<Item = FetchRequest>) {
        for request in requests {
            self.dispatch(request);
        }
    }

    /// Non-blocking poll for one finished fetch.
    pub fn try_recv(&mut self) -> Option<FetchOutcome> {
        let outcome = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(outcome)
    }

    /// Collect every outcome that has already arrived.
    pub fn drain(&mut self) -> Vec<FetchOutcome> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Block up to `timeout` for the next outcome.
    pub fn wait(&mut self, timeout: Duration) -> Option<FetchOutcome> {
        let outcome = self.rx.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(outcome)
    }
}
