//! UI Components for the terminal browser

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::models::Nade;
use crate::store::NadeFilters;

fn facet(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("all")
}

/// Header showing active filters and the match count
pub struct StatusPanel {
    filters: NadeFilters,
    count: usize,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            filters: NadeFilters::default(),
            count: 0,
        }
    }

    pub fn set(&mut self, filters: &NadeFilters, count: usize) {
        self.filters = filters.clone();
        self.count = count;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let label = Style::default().fg(Color::Gray);
        let value = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let mut spans = vec![
            Span::styled(" map ", label),
            Span::styled(facet(&self.filters.map).to_string(), value),
            Span::styled("  side ", label),
            Span::styled(facet(&self.filters.side).to_string(), value),
            Span::styled("  type ", label),
            Span::styled(facet(&self.filters.nade_type).to_string(), value),
            Span::styled("  sort ", label),
            Span::styled(self.filters.sort.to_string(), value),
        ];
        if let Some(search) = self.filters.search.as_deref().filter(|s| !s.is_empty()) {
            spans.push(Span::styled("  search ", label));
            spans.push(Span::styled(format!("\"{}\"", search), value));
        }
        spans.push(Span::styled(format!("  ({} found)", self.count), label));

        let lines = vec![
            Line::from(spans),
            Line::from(Span::styled(
                " [m]ap  [c] side  [t]ype  [s]ort  [o]pen video  [r]efresh  [q]uit",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Nade Catalog ")
            .border_style(Style::default().fg(Color::Blue));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Selectable list of nades
pub struct NadeListPanel {
    items: Vec<Nade>,
    state: ListState,
}

impl NadeListPanel {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            state: ListState::default(),
        }
    }

    /// Replace the items, keeping the same nade selected when it is still listed
    pub fn set_items(&mut self, items: Vec<Nade>) {
        let previous = self.selected().map(|n| n.id);
        self.items = items;

        let index = previous
            .and_then(|id| self.items.iter().position(|n| n.id == id))
            .or(if self.items.is_empty() { None } else { Some(0) });
        self.state.select(index);
    }

    pub fn selected(&self) -> Option<&Nade> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let next = match self.state.selected() {
            Some(i) if i + 1 < self.items.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let prev = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(prev));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Lineups ")
            .border_style(Style::default().fg(Color::Blue));

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|nade| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<9}", nade.map),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(
                        format!("{:<8}", nade.nade_type),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(nade.title.clone()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

/// Details of the selected nade
pub struct DetailPanel {
    nade: Option<Nade>,
    file_found: Option<bool>,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self {
            nade: None,
            file_found: None,
        }
    }

    /// `file_found` is the presence check result for the nade's local video, if it has one
    pub fn set(&mut self, nade: Option<Nade>, file_found: Option<bool>) {
        self.nade = nade;
        self.file_found = file_found;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Details ")
            .border_style(Style::default().fg(Color::Blue));

        let Some(nade) = &self.nade else {
            let empty = Paragraph::new(" No nade selected").block(block);
            frame.render_widget(empty, area);
            return;
        };

        let label = Style::default().fg(Color::Gray);
        let field = |name: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!(" {:<8}", name), label),
                Span::raw(value),
            ])
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!(" {}", nade.title),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            field("Map", format!("{} ({})", nade.map, nade.side)),
            field("Type", nade.nade_type.clone()),
            field("From", nade.start_position.clone()),
            field("To", nade.target_position.clone()),
            field("Tags", nade.tag_list().join(", ")),
        ];

        if let Some(url) = &nade.video_url {
            lines.push(field("Video", url.clone()));
        }
        if let Some(path) = &nade.local_video_path {
            let (status, color) = match self.file_found {
                Some(true) => ("file found", Color::Green),
                _ => ("file not found", Color::Red),
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<8}", "File"), label),
                Span::raw(format!("{} ", path)),
                Span::styled(format!("({})", status), Style::default().fg(color)),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(format!(" {}", nade.description)));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

/// Log panel showing recent activity
pub struct LogPanel {
    entries: Vec<String>,
    max_entries: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 50,
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Activity ")
            .border_style(Style::default().fg(Color::Blue));

        let visible_height = area.height.saturating_sub(2) as usize; // -2 for borders
        let start = self.entries.len().saturating_sub(visible_height);

        let items: Vec<ListItem> = self.entries[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == self.entries.len() - start - 1 {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Span::styled(format!(" {}", entry), style))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}
