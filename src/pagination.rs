//! Pagination window calculator.
//!
//! Given the current page and the provider's page count, decides which
//! page-number buttons to show: page 1 and the last (capped) page are always
//! pinned, a window of up to `max_visible` pages sits between them, and
//! ellipses mark the gaps. Everything here is a pure function of its inputs.

use serde::Serialize;

/// Highest page number ever offered.
pub const DEFAULT_PAGE_CAP: u32 = 100;

/// Number of page buttons between the pinned first and last pages.
pub const DEFAULT_MAX_VISIBLE: u32 = 5;

/// The page buttons to render around `current_page`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub current_page: u32,
    pub first_page: u32,
    /// `min(total_pages, page_cap)`.
    pub last_page: u32,
    /// Contiguous, never contains page 1. Empty when `last_page == 2`.
    pub visible_pages: Vec<u32>,
    pub show_leading_ellipsis: bool,
    pub show_trailing_ellipsis: bool,
}

impl PageWindow {
    /// Compute the window with the default cap (100) and width (5).
    ///
    /// Returns `None` when there is at most one page: no controls are rendered.
    pub fn compute(current_page: u32, total_pages: u32) -> Option<Self> {
        Self::compute_with(current_page, total_pages, DEFAULT_PAGE_CAP, DEFAULT_MAX_VISIBLE)
    }

    pub fn compute_with(
        current_page: u32,
        total_pages: u32,
        page_cap: u32,
        max_visible: u32,
    ) -> Option<Self> {
        let capped_total = total_pages.min(page_cap);
        if capped_total <= 1 {
            return None;
        }
        let max_visible = max_visible.max(1);

        let start = current_page.saturating_sub(2).max(2);
        let end = (capped_total - 1).min(start.saturating_add(max_visible - 1));
        // Slide the window back so it stays full near the last page.
        let start = (end + 1).saturating_sub(max_visible).max(2);

        Some(Self {
            current_page,
            first_page: 1,
            last_page: capped_total,
            visible_pages: (start..=end).collect(),
            show_leading_ellipsis: start > 2,
            show_trailing_ellipsis: end < capped_total - 1,
        })
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_page != 1
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page != self.last_page
    }

    /// Flatten into the rendered control strip:
    /// `Previous, 1, [...], window, [...], last, Next`.
    pub fn controls(&self) -> Vec<PageControl> {
        let mut controls = Vec::with_capacity(self.visible_pages.len() + 6);
        controls.push(PageControl::Previous {
            enabled: self.can_go_previous(),
        });
        controls.push(self.page(self.first_page));
        if self.show_leading_ellipsis {
            controls.push(PageControl::Ellipsis);
        }
        controls.extend(self.visible_pages.iter().map(|&n| self.page(n)));
        if self.show_trailing_ellipsis {
            controls.push(PageControl::Ellipsis);
        }
        controls.push(self.page(self.last_page));
        controls.push(PageControl::Next {
            enabled: self.can_go_next(),
        });
        controls
    }

    fn page(&self, number: u32) -> PageControl {
        PageControl::Page {
            number,
            current: number == self.current_page,
        }
    }
}

/// One element of the pagination strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageControl {
    Previous { enabled: bool },
    Page { number: u32, current: bool },
    Ellipsis,
    Next { enabled: bool },
}

impl PageControl {
    pub fn label(&self) -> String {
        match self {
            PageControl::Previous { .. } => "Previous".to_string(),
            PageControl::Page { number, .. } => number.to_string(),
            PageControl::Ellipsis => "...".to_string(),
            PageControl::Next { .. } => "Next".to_string(),
        }
    }

    /// Page this control navigates to from `current_page`, if it is clickable.
    pub fn target(&self, current_page: u32) -> Option<u32> {
        match *self {
            PageControl::Previous { enabled: true } => Some(current_page.saturating_sub(1).max(1)),
            PageControl::Next { enabled: true } => Some(current_page + 1),
            PageControl::Page { number, .. } => Some(number),
            _ => None,
        }
    }
}

/// Render the strip as plain text, e.g. `(Previous) [1] 2 3 4 5 6 ... 20 Next`.
///
/// The current page is bracketed and disabled arrows are parenthesized.
pub fn render_strip(window: &PageWindow) -> String {
    window
        .controls()
        .iter()
        .map(|control| match control {
            PageControl::Page { current: true, .. } => format!("[{}]", control.label()),
            PageControl::Previous { enabled: false } | PageControl::Next { enabled: false } => {
                format!("({})", control.label())
            }
            _ => control.label(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
