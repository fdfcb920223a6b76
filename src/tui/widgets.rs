//! TUI widget rendering: search input, results table, suggestion panel,
//! pagination strip, status bar.
//!
//! `render` also returns a [`HitMap`] describing where the clickable parts
//! landed, so mouse events can be resolved against the last frame.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table};

use crate::controller::SearchController;
use crate::pagination::PageControl;

/// What a click at a given cell refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Input,
    /// Index into the suggestion items.
    Suggestion(usize),
    /// Inside the panel but not on an item (the border).
    Panel,
    /// A page control; `None` for ellipses and disabled arrows.
    Page(Option<u32>),
    Outside,
}

/// Clickable regions of the last rendered frame.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub input: Rect,
    pub panel: Option<Rect>,
    pub suggestion_rows: Vec<(Rect, usize)>,
    pub page_controls: Vec<(Rect, Option<u32>)>,
}

impl HitMap {
    pub fn locate(&self, column: u16, row: u16) -> Hit {
        let pos = Position::new(column, row);
        if let Some(panel) = self.panel {
            if panel.contains(pos) {
                return self
                    .suggestion_rows
                    .iter()
                    .find(|(rect, _)| rect.contains(pos))
                    .map_or(Hit::Panel, |&(_, i)| Hit::Suggestion(i));
            }
        }
        if self.input.contains(pos) {
            return Hit::Input;
        }
        self.page_controls
            .iter()
            .find(|(rect, _)| rect.contains(pos))
            .map_or(Hit::Outside, |&(_, target)| Hit::Page(target))
    }
}

/// Lay the control strip out left to right, one space apart, clipped to `area`.
pub fn layout_controls(
    controls: &[PageControl],
    current_page: u32,
    area: Rect,
) -> Vec<(Rect, PageControl, Option<u32>)> {
    let mut placed = Vec::with_capacity(controls.len());
    let right = area.x.saturating_add(area.width);
    let mut x = area.x;
    for control in controls {
        let width = control.label().len() as u16;
        if x.saturating_add(width) > right {
            break;
        }
        let rect = Rect::new(x, area.y, width, 1);
        placed.push((rect, *control, control.target(current_page)));
        x = x.saturating_add(width + 1);
    }
    placed
}

fn control_style(control: &PageControl) -> Style {
    match control {
        PageControl::Page { current: true, .. } => Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        PageControl::Previous { enabled: false } | PageControl::Next { enabled: false } => {
            Style::default().fg(Color::DarkGray)
        }
        PageControl::Ellipsis => Style::default().fg(Color::DarkGray),
        _ => Style::default().fg(Color::White),
    }
}

/// Main TUI layout rendering.
pub fn render(frame: &mut Frame, controller: &SearchController, base_url: &str) -> HitMap {
    let [header_area, input_area, results_area, pages_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let search = controller.search();
    let suggestions = controller.suggestions();
    let mut hits = HitMap {
        input: input_area,
        ..HitMap::default()
    };

    // Header.
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " book-finder ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" :: {base_url} ")),
    ]));
    frame.render_widget(header, header_area);

    // Input.
    let input = Paragraph::new(search.query_text.as_str())
        .block(Block::default().borders(Borders::ALL).title(" Search by title "))
        .style(Style::default().fg(Color::White));
    frame.render_widget(input, input_area);
    let cursor_x = input_area
        .x
        .saturating_add(1)
        .saturating_add(search.query_text.chars().count() as u16)
        .min(input_area.right().saturating_sub(2));
    frame.set_cursor_position(Position::new(cursor_x, input_area.y + 1));

    // Results.
    let results_block = Block::default().borders(Borders::ALL).title(" Results ");
    if search.is_loading {
        frame.render_widget(
            Paragraph::new("Loading...")
                .style(Style::default().fg(Color::Yellow))
                .block(results_block),
            results_area,
        );
    } else if search.results.is_empty() {
        frame.render_widget(
            Paragraph::new("No books found")
                .style(Style::default().fg(Color::DarkGray))
                .block(results_block),
            results_area,
        );
    } else {
        let rows = search.results.iter().map(|record| {
            Row::new(vec![
                record.title.clone(),
                record.author_summary(),
                record.year_label(),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Fill(3),
                Constraint::Fill(2),
                Constraint::Length(18),
            ],
        )
        .header(
            Row::new(vec!["Title", "Author(s)", "First Publish Year"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(results_block);
        frame.render_widget(table, results_area);
    }

    // Pagination strip.
    let placed = layout_controls(&controller.page_controls(), search.current_page, pages_area);
    let mut spans = Vec::with_capacity(placed.len() * 2);
    for (i, (_, control, _)) in placed.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(control.label(), control_style(control)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), pages_area);
    hits.page_controls = placed
        .into_iter()
        .map(|(rect, _, target)| (rect, target))
        .collect();

    // Status bar.
    let status = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" page {}/{} ", search.current_page, search.total_pages),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("| "),
        Span::styled(
            "Enter search  Up/Down suggestions  PgUp/PgDn page  Esc close  Ctrl+C quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    frame.render_widget(status, status_area);

    // Suggestion panel, drawn last so it overlays the results.
    if suggestions.is_shown() {
        let below = input_area.y.saturating_add(input_area.height);
        let room = frame.area().bottom().saturating_sub(below);
        let height = (suggestions.items.len() as u16 + 2).min(room);
        if height > 2 {
            let panel = Rect::new(input_area.x, below, input_area.width, height);
            let items: Vec<ListItem> = suggestions
                .items
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let style = if suggestions.highlighted == Some(i) {
                        Style::default().fg(Color::Black).bg(Color::Cyan)
                    } else {
                        Style::default()
                    };
                    ListItem::new(format!("{} by {}", s.title, s.author_summary)).style(style)
                })
                .collect();
            frame.render_widget(Clear, panel);
            frame.render_widget(
                List::new(items).block(Block::default().borders(Borders::ALL)),
                panel,
            );

            let rows = (height - 2) as usize;
            hits.suggestion_rows = (0..suggestions.items.len().min(rows))
                .map(|i| {
                    let rect = Rect::new(
                        panel.x + 1,
                        panel.y + 1 + i as u16,
                        panel.width.saturating_sub(2),
                        1,
                    );
                    (rect, i)
                })
                .collect();
            hits.panel = Some(panel);
        }
    }

    hits
}
