// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # book-finder
//!
//! Title search over an Open Library compatible catalog, with paginated
//! results and live autocomplete suggestions.
//!
//! ## Architecture
//!
//! - **Catalog** (`catalog`): book records, suggestions, and the `search.json` wire format
//! - **Provider** (`provider`): the `BookProvider` seam and its `ureq` implementation
//! - **Controller** (`controller`): search and suggestion state driven by user intents
//! - **Fetching** (`fetch`): background threads reporting outcomes over a channel
//! - **Pagination** (`pagination`): the page-number window around the current page
//! - **Front end** (`tui`): ratatui event loop, widgets, and mouse hit-testing
//!
//! ## Library usage
//!
//! ```
//! use book_finder::controller::{ControllerSettings, SearchController};
//! use book_finder::fetch::FetchRequest;
//!
//! let mut controller = SearchController::new(ControllerSettings::default());
//! controller.submit_search_text("  ");
//! match controller.drain_requests().as_slice() {
//!     [FetchRequest::Results { query, page, .. }] => {
//!         assert_eq!(query, "book");
//!         assert_eq!(*page, 1);
//!     }
//!     other => panic!("unexpected requests: {other:?}"),
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod pagination;
pub mod paths;
pub mod provider;
pub mod tui;
