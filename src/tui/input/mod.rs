mod mouse;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::grid::{Action, CellCoord, KeyOutcome, RowSink};
use crate::model::fields;

use super::app::App;

pub use mouse::{ClickTracker, Release, handle_mouse};

/// Rows moved by PageUp/PageDown when the grid has not been drawn yet
const DEFAULT_PAGE: usize = 10;

/// Handle a key event: the grid gets it first, the app handles what the
/// grid leaves alone
pub fn handle_key(app: &mut App, key: KeyEvent) {
    app.notice = None;
    route_key(app, key);
    app.after_input();
}

fn route_key(app: &mut App, key: KeyEvent) {
    let dims = app.engine.dims();
    match app.engine.handle_key(key, dims, &mut app.ledger) {
        KeyOutcome::Ignored => handle_app_key(app, key),
        KeyOutcome::Rejected(e) => app.notice = Some(e.to_string()),
        KeyOutcome::Handled | KeyOutcome::Swallowed => {}
    }
}

fn handle_app_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') if ctrl => app.should_quit = true,
        KeyCode::Char('n') if ctrl => new_movement(app),
        KeyCode::Char('d') if ctrl => delete_focused(app),
        KeyCode::PageDown => page(app, true),
        KeyCode::PageUp => page(app, false),
        KeyCode::Home if ctrl => app.focus_row(0),
        KeyCode::End if ctrl => {
            if let Some(last) = app.engine.dims().rows.checked_sub(1) {
                app.focus_row(last);
            }
        }
        _ => {}
    }
}

/// Append a movement and put focus on its description
fn new_movement(app: &mut App) {
    app.ledger.create_requested();
    app.sync_rows();
    let Some(last) = app.engine.dims().rows.checked_sub(1) else {
        return;
    };
    let col = app
        .engine
        .columns()
        .iter()
        .position(|c| c.cell.field() == Some(fields::DESCRIPTION))
        .unwrap_or(0);
    debug!(row = last, "new movement");
    app.engine
        .dispatch(Action::SetFocus(CellCoord::new(last, col)), &mut app.ledger);
}

fn delete_focused(app: &mut App) {
    let Some(focus) = app.engine.state().focused_cell else {
        return;
    };
    let Some(row_id) = app.engine.rows().get(focus.row).map(|w| w.row_id()) else {
        return;
    };
    app.ledger.delete_requested(row_id);
}

fn page(app: &mut App, down: bool) {
    let Some(focus) = app.engine.state().focused_cell else {
        return;
    };
    let rows = app.engine.dims().rows;
    let step = app
        .layout
        .as_ref()
        .map_or(DEFAULT_PAGE, |l| l.body_height().max(1));
    let target = if down {
        (focus.row + step).min(rows.saturating_sub(1))
    } else {
        focus.row.saturating_sub(step)
    };
    if target != focus.row {
        app.focus_row(target);
    }
}

/// Bracketed paste from the terminal
pub fn handle_paste(app: &mut App, text: &str) {
    // Cells are single-line
    let line = text.lines().next().unwrap_or("");
    app.notice = None;
    app.engine.paste(line, &mut app.ledger);
    app.after_input();
}
