//! Terminal browser using ratatui
//!
//! Read-only list/detail view over the catalog:
//! - Filter header (map, side, type, search, sort)
//! - Lineup list with selection
//! - Detail panel for the selected lineup, including a local video check
//! - Activity log

mod components;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::{Frame, Terminal};
use std::io::{self, Stdout};

use crate::commands::{CommandFacade, LinkOpener, SystemOpener};
use crate::store::NadeFilters;
use components::{DetailPanel, LogPanel, NadeListPanel, StatusPanel};

/// Utility types offered by the type filter
pub const NADE_TYPES: &[&str] = &["smoke", "flash", "molotov", "he"];

/// Sides offered by the side filter
pub const SIDES: &[&str] = &["T", "CT"];

/// Advance a filter through `options`, wrapping back to unset after the last one
fn cycle_option<S: AsRef<str>>(current: &Option<String>, options: &[S]) -> Option<String> {
    let next = match current {
        None => 0,
        Some(value) => match options.iter().position(|o| o.as_ref() == value) {
            Some(i) => i + 1,
            None => return None,
        },
    };
    options.get(next).map(|o| o.as_ref().to_string())
}

/// Browser state and key handling, independent of the terminal
pub struct BrowserState {
    filters: NadeFilters,
    maps: Vec<String>,
    status: StatusPanel,
    list: NadeListPanel,
    detail: DetailPanel,
    log: LogPanel,
}

impl BrowserState {
    pub fn new(filters: NadeFilters) -> Self {
        Self {
            filters,
            maps: Vec::new(),
            status: StatusPanel::new(),
            list: NadeListPanel::new(),
            detail: DetailPanel::new(),
            log: LogPanel::new(),
        }
    }

    pub fn filters(&self) -> &NadeFilters {
        &self.filters
    }

    pub fn list(&self) -> &NadeListPanel {
        &self.list
    }

    pub fn last_message(&self) -> Option<&str> {
        self.log.last()
    }

    /// Reload maps and nades from the catalog
    pub fn refresh<O: LinkOpener>(&mut self, facade: &CommandFacade<O>) -> Result<()> {
        self.maps = facade.list_maps()?.into_iter().map(|m| m.name).collect();
        self.list.set_items(facade.list_nades(&self.filters)?);
        self.status.set(&self.filters, self.list.len());
        self.update_detail(facade);
        Ok(())
    }

    fn update_detail<O: LinkOpener>(&mut self, facade: &CommandFacade<O>) {
        let nade = self.list.selected().cloned();
        let file_found = nade
            .as_ref()
            .and_then(|n| n.local_video_path.as_deref())
            .map(|path| facade.check_file_exists(path));
        self.detail.set(nade, file_found);
    }

    fn open_selected<O: LinkOpener>(&mut self, facade: &CommandFacade<O>) -> Result<()> {
        let Some(nade) = self.list.selected() else {
            return Ok(());
        };

        let target = match (&nade.video_url, &nade.local_video_path) {
            (Some(url), _) => url.clone(),
            (None, Some(path)) if facade.check_file_exists(path) => path.clone(),
            (None, Some(path)) => {
                self.log.add(format!("Video file not found: {}", path));
                return Ok(());
            }
            (None, None) => {
                self.log.add(format!("'{}' has no video", nade.title));
                return Ok(());
            }
        };

        facade.open_external_link(&target)?;
        self.log.add(format!("Opened {}", target));
        Ok(())
    }

    /// Apply one key press. Returns true when the browser should quit.
    pub fn handle_key<O: LinkOpener>(
        &mut self,
        code: KeyCode,
        facade: &CommandFacade<O>,
    ) -> Result<bool> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.select_next();
                self.update_detail(facade);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.select_previous();
                self.update_detail(facade);
            }
            KeyCode::Char('m') => {
                self.filters.map = cycle_option(&self.filters.map, &self.maps);
                self.refresh(facade)?;
            }
            KeyCode::Char('c') => {
                self.filters.side = cycle_option(&self.filters.side, SIDES);
                self.refresh(facade)?;
            }
            KeyCode::Char('t') => {
                self.filters.nade_type = cycle_option(&self.filters.nade_type, NADE_TYPES);
                self.refresh(facade)?;
            }
            KeyCode::Char('s') => {
                self.filters.sort = self.filters.sort.next();
                self.refresh(facade)?;
            }
            KeyCode::Char('r') => {
                self.refresh(facade)?;
                self.log.add("Refreshed");
            }
            KeyCode::Char('o') | KeyCode::Enter => {
                if let Err(err) = self.open_selected(facade) {
                    self.log.add(format!("Failed to open video: {}", err));
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn render(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Filters
                Constraint::Min(8),    // List + details
                Constraint::Length(5), // Activity
            ])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[1]);

        self.status.render(frame, rows[0]);
        self.list.render(frame, columns[0]);
        self.detail.render(frame, columns[1]);
        self.log.render(frame, rows[2]);
    }
}

/// Full-screen terminal browser bound to a façade
pub struct Browser<'a, O: LinkOpener = SystemOpener> {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    facade: &'a CommandFacade<O>,
    state: BrowserState,
}

impl<'a, O: LinkOpener> Browser<'a, O> {
    /// Load the catalog and enter the alternate screen
    pub fn new(facade: &'a CommandFacade<O>, filters: NadeFilters) -> Result<Self> {
        let mut state = BrowserState::new(filters);
        state.refresh(facade)?;

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            facade,
            state,
        })
    }

    fn draw(&mut self) -> Result<()> {
        let state = &mut self.state;
        self.terminal.draw(|frame| state.render(frame))?;
        Ok(())
    }

    /// Draw and handle keys until the user quits
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.draw()?;

            if let CrosstermEvent::Key(KeyEvent { code, kind, .. }) = event::read()? {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if self.state.handle_key(code, self.facade)? {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Restore the terminal
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl<O: LinkOpener> Drop for Browser<'_, O> {
    fn drop(&mut self) {
        // Best effort cleanup
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CatalogStore;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingOpener {
        opened: RefCell<Vec<String>>,
    }

    impl LinkOpener for RecordingOpener {
        fn open(&self, target: &str) -> io::Result<()> {
            self.opened.borrow_mut().push(target.to_string());
            Ok(())
        }
    }

    fn facade() -> CommandFacade<RecordingOpener> {
        let store = CatalogStore::open_in_memory().unwrap();
        CommandFacade::with_opener(store, RecordingOpener::default())
    }

    #[test]
    fn test_cycle_option() {
        let options = ["a", "b"];
        assert_eq!(cycle_option(&None, &options), Some("a".to_string()));
        assert_eq!(cycle_option(&Some("a".into()), &options), Some("b".to_string()));
        assert_eq!(cycle_option(&Some("b".into()), &options), None);
        assert_eq!(cycle_option(&Some("zzz".into()), &options), None);
    }

    #[test]
    fn test_type_filter_key() {
        let facade = facade();
        let mut state = BrowserState::new(NadeFilters::default());
        state.refresh(&facade).unwrap();
        assert_eq!(state.list().len(), 3);

        // smoke, then flash
        state.handle_key(KeyCode::Char('t'), &facade).unwrap();
        assert_eq!(state.list().len(), 2);
        state.handle_key(KeyCode::Char('t'), &facade).unwrap();
        assert_eq!(state.filters().nade_type.as_deref(), Some("flash"));
        assert_eq!(state.list().len(), 1);
        assert_eq!(state.list().selected().unwrap().map, "Dust2");
    }

    #[test]
    fn test_open_key_uses_video_url() {
        let facade = facade();
        let mut state = BrowserState::new(NadeFilters {
            map: Some("Inferno".into()),
            ..Default::default()
        });
        state.refresh(&facade).unwrap();

        state.handle_key(KeyCode::Char('o'), &facade).unwrap();
        assert_eq!(
            facade.opener().opened.borrow().as_slice(),
            ["https://www.youtube.com/watch?v=example2"]
        );
        assert!(state.last_message().unwrap().starts_with("Opened"));
    }

    #[test]
    fn test_missing_local_file_is_reported() {
        let facade = facade();
        let mut input = crate::store::demo_nades().remove(0);
        input.video_url = None;
        input.local_video_path = Some("/definitely/not/here.mp4".into());
        input.map = "Nuke".into();
        facade.create_nade(&input).unwrap();

        let mut state = BrowserState::new(NadeFilters {
            map: Some("Nuke".into()),
            ..Default::default()
        });
        state.refresh(&facade).unwrap();
        state.handle_key(KeyCode::Enter, &facade).unwrap();

        assert!(facade.opener().opened.borrow().is_empty());
        assert_eq!(
            state.last_message(),
            Some("Video file not found: /definitely/not/here.mp4")
        );
    }

    #[test]
    fn test_quit_keys() {
        let facade = facade();
        let mut state = BrowserState::new(NadeFilters::default());
        assert!(state.handle_key(KeyCode::Char('q'), &facade).unwrap());
        assert!(state.handle_key(KeyCode::Esc, &facade).unwrap());
        assert!(!state.handle_key(KeyCode::Char('x'), &facade).unwrap());
    }
}
