use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tracing::{info, warn};

use crate::grid::layout::GridLayout;
use crate::grid::{Action, CellCoord, GridEngine};
use crate::io::{config_io, ledger_io};
use crate::model::{Ledger, TallyConfig, ledger};

use super::input::{self, ClickTracker};
use super::render;
use super::theme::Theme;

/// Where the open option list was drawn last frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayGeom {
    /// Outer rect including the border
    pub rect: Rect,
    /// Option index shown on the first list row
    pub first: usize,
    /// Number of options on screen
    pub shown: usize,
}

impl OverlayGeom {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.rect.x
            && x < self.rect.x + self.rect.width
            && y >= self.rect.y
            && y < self.rect.y + self.rect.height
    }

    /// Option under a terminal position; the border maps to nothing
    pub fn option_at(&self, x: u16, y: u16) -> Option<usize> {
        if !self.contains(x, y) || x == self.rect.x || x + 1 == self.rect.x + self.rect.width {
            return None;
        }
        let line = y.checked_sub(self.rect.y + 1)? as usize;
        (line < self.shown).then_some(self.first + line)
    }
}

/// Main application state
pub struct App {
    pub ledger: Ledger,
    pub ledger_path: PathBuf,
    pub config: TallyConfig,
    pub engine: GridEngine,
    pub theme: Theme,
    pub should_quit: bool,
    /// First data row on screen
    pub scroll: usize,
    /// Grid geometry from the last frame, for mouse hit-testing
    pub layout: Option<GridLayout>,
    pub overlay: Option<OverlayGeom>,
    /// Option under the mouse pointer in the open list
    pub hover: Option<usize>,
    /// Terminal caret position requested by the inline editor
    pub caret: Option<(u16, u16)>,
    /// Display columns of editor text scrolled off to the left
    pub editor_scroll: usize,
    pub clicks: ClickTracker,
    /// One-line message shown in the status row until the next input
    pub notice: Option<String>,
}

impl App {
    pub fn new(ledger: Ledger, ledger_path: PathBuf, config: TallyConfig) -> Self {
        let theme = Theme::from_config(&config.ui);
        let mut engine = GridEngine::new(ledger::columns(&config));
        engine.set_rows(ledger.movements());
        let clicks = ClickTracker::new(Duration::from_millis(config.ui.double_click_ms));
        let mut app = App {
            ledger,
            ledger_path,
            config,
            engine,
            theme,
            should_quit: false,
            scroll: 0,
            layout: None,
            overlay: None,
            hover: None,
            caret: None,
            editor_scroll: 0,
            clicks,
            notice: None,
        };
        app.engine.focus_first(&mut app.ledger);
        app
    }

    /// Remount the grid from the ledger and pick up any rejected edits
    pub fn sync_rows(&mut self) {
        self.engine.set_rows(self.ledger.movements());
        if let Some(message) = self.ledger.take_notices().pop() {
            self.notice = Some(message);
        }
        if self.engine.state().focused_cell.is_none() {
            self.engine.focus_first(&mut self.ledger);
        }
    }

    /// Write the ledger if anything changed since the last save
    pub fn save_if_dirty(&mut self) {
        if !self.ledger.is_dirty() {
            return;
        }
        match ledger_io::write_ledger(&self.ledger_path, &self.ledger) {
            Ok(()) => self.ledger.mark_clean(),
            Err(e) => {
                warn!(path = %self.ledger_path.display(), error = %e, "save failed");
                self.notice = Some(format!("save failed: {e}"));
            }
        }
    }

    /// Called after every input event
    pub fn after_input(&mut self) {
        self.sync_rows();
        self.save_if_dirty();
    }

    /// Focus a cell on the given row, keeping the current column
    pub fn focus_row(&mut self, row: usize) {
        let col = self.engine.state().focused_cell.map_or(0, |c| c.col);
        self.engine
            .dispatch(Action::SetFocus(CellCoord::new(row, col)), &mut self.ledger);
    }
}

/// Run the TUI application
pub fn run(ledger_path: &Path, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::read_config(config_path)?;
    let ledger = ledger_io::read_ledger(ledger_path)?;
    info!(
        ledger = %ledger_path.display(),
        movements = ledger.len(),
        "starting tui"
    );

    let mut app = App::new(ledger, ledger_path.to_path_buf(), config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        original_hook(panic_info);
    }));

    // Run event loop
    let result = run_event_loop(&mut terminal, &mut app);

    // Last chance to persist
    app.save_if_dirty();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse, Instant::now()),
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
