use std::path::PathBuf;

use chrono::NaiveDate;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::grid::RowId;
use crate::io::config_io::CONFIG_TEMPLATE;
use crate::model::{Ledger, Movement, TallyConfig};
use crate::tui::app::App;

pub const TERM_W: u16 = 100;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Full-screen render of the app; also refreshes its layout and overlay.
pub fn render_app(app: &mut App) -> String {
    render_to_string(TERM_W, TERM_H, |frame, _| super::render(frame, app))
}

/// Draw once so mouse hit-testing has geometry to work with.
pub fn draw(app: &mut App, w: u16, h: u16) {
    render_to_string(w, h, |frame, _| super::render(frame, app));
}

/// The starter config written by `tally init`.
pub fn template_config() -> TallyConfig {
    toml::from_str(CONFIG_TEMPLATE).unwrap()
}

pub fn movement(description: &str, amount: f64) -> Movement {
    let mut m = Movement::new(RowId(0), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    m.description = description.into();
    m.amount = amount;
    m
}

/// Build an App over the ledger, with ids renumbered from 1.
pub fn app_with_ledger(ledger: Ledger) -> App {
    let movements = ledger
        .movements()
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let mut m = m.clone();
            m.id = RowId(i as u64 + 1);
            m
        })
        .collect();
    App::new(
        Ledger::new(movements),
        PathBuf::from("unused.json"),
        template_config(),
    )
}

/// Build an App with one expense per (description, amount).
pub fn app_with_movements(items: &[(&str, f64)]) -> App {
    let movements = items.iter().map(|&(d, a)| movement(d, a)).collect();
    app_with_ledger(Ledger::new(movements))
}

/// Index of the column editing `field`.
pub fn column_of(app: &App, field: &str) -> usize {
    app.engine
        .columns()
        .iter()
        .position(|c| c.cell.field() == Some(field))
        .unwrap()
}
