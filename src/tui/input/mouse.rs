use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use tracing::trace;

use crate::grid::{CellCoord, Gesture};

use super::super::app::App;

/// What a button release amounts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Released somewhere other than where it was pressed
    Stray,
    Click,
    /// Second click on the same cell inside the double-click window
    DoubleClick,
}

/// Turns raw press/release pairs into clicks and double-clicks
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window: Duration,
    pressed: Option<CellCoord>,
    last_click: Option<(CellCoord, Instant)>,
}

impl ClickTracker {
    pub fn new(window: Duration) -> Self {
        ClickTracker {
            window,
            pressed: None,
            last_click: None,
        }
    }

    pub fn press(&mut self, coord: CellCoord) {
        self.pressed = Some(coord);
    }

    /// Forget everything, e.g. after a press outside the grid
    pub fn cancel(&mut self) {
        self.pressed = None;
        self.last_click = None;
    }

    pub fn release(&mut self, coord: CellCoord, now: Instant) -> Release {
        if self.pressed.take() != Some(coord) {
            self.last_click = None;
            return Release::Stray;
        }
        match self.last_click.take() {
            Some((prev, at)) if prev == coord && now.duration_since(at) <= self.window => {
                Release::DoubleClick
            }
            _ => {
                self.last_click = Some((coord, now));
                Release::Click
            }
        }
    }
}

/// Handle a mouse event against last frame's geometry
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    let (x, y) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.notice = None;
            mouse_down(app, x, y);
            app.after_input();
        }
        MouseEventKind::Up(MouseButton::Left) => {
            mouse_up(app, x, y, now);
            app.after_input();
        }
        MouseEventKind::Moved => {
            app.hover = app.overlay.and_then(|o| o.option_at(x, y));
        }
        MouseEventKind::ScrollDown => wheel(app, true),
        MouseEventKind::ScrollUp => wheel(app, false),
        _ => {}
    }
}

fn mouse_down(app: &mut App, x: u16, y: u16) {
    // The open list floats above the cells, so it is hit-tested first
    if let Some(overlay) = app.overlay
        && overlay.contains(x, y)
    {
        app.clicks.cancel();
        if let Some(index) = overlay.option_at(x, y) {
            trace!(index, "option picked with mouse");
            app.engine.select_option(index, &mut app.ledger);
        }
        return;
    }

    match app.layout.as_ref().and_then(|l| l.hit_test(x, y)) {
        Some(coord) => {
            app.clicks.press(coord);
            app.engine
                .handle_gesture(coord, Gesture::MouseDown, &mut app.ledger);
        }
        None => {
            app.clicks.cancel();
            app.engine.outside_mouse_down(&mut app.ledger);
        }
    }
}

fn mouse_up(app: &mut App, x: u16, y: u16, now: Instant) {
    let Some(coord) = app.layout.as_ref().and_then(|l| l.hit_test(x, y)) else {
        app.clicks.cancel();
        return;
    };
    let release = app.clicks.release(coord, now);
    if release == Release::Stray {
        return;
    }

    let editing_here = app.engine.editor().is_some_and(|s| s.coord() == coord);
    app.engine
        .handle_gesture(coord, Gesture::Click, &mut app.ledger);
    if release == Release::DoubleClick {
        app.engine
            .handle_gesture(coord, Gesture::DoubleClick, &mut app.ledger);
    }

    // A click inside an editor that was already open moves the caret under
    // the pointer; a fresh double-click edit keeps its caret at the end
    if editing_here
        && let Some(rect) = app.layout.as_ref().and_then(|l| l.slot_rect(coord))
    {
        let col = app.editor_scroll + x.saturating_sub(rect.x) as usize;
        app.engine.place_caret(coord, col);
    }
}

/// The wheel moves focus a row at a time; the view follows focus
fn wheel(app: &mut App, down: bool) {
    if app.engine.state().active_dropdown.is_some() || app.engine.state().is_editing {
        return;
    }
    let Some(focus) = app.engine.state().focused_cell else {
        return;
    };
    let rows = app.engine.dims().rows;
    let target = if down {
        (focus.row + 1).min(rows.saturating_sub(1))
    } else {
        focus.row.saturating_sub(1)
    };
    if target != focus.row {
        app.focus_row(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RowId;
    use crate::model::{Ledger, Movement, MovementKind, TallyConfig, fields};
    use crate::tui::render::test_helpers::{TERM_H, TERM_W, draw};
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;
    use std::path::PathBuf;

    const WINDOW: Duration = Duration::from_millis(400);

    fn cell(row: usize, col: usize) -> CellCoord {
        CellCoord::new(row, col)
    }

    #[test]
    fn press_and_release_on_same_cell_is_a_click() {
        let mut t = ClickTracker::new(WINDOW);
        let now = Instant::now();
        t.press(cell(0, 1));
        assert_eq!(t.release(cell(0, 1), now), Release::Click);
    }

    #[test]
    fn release_elsewhere_is_stray() {
        let mut t = ClickTracker::new(WINDOW);
        t.press(cell(0, 1));
        assert_eq!(t.release(cell(1, 1), Instant::now()), Release::Stray);
        // Release without a press
        assert_eq!(t.release(cell(1, 1), Instant::now()), Release::Stray);
    }

    #[test]
    fn two_quick_clicks_make_a_double_click() {
        let mut t = ClickTracker::new(WINDOW);
        let start = Instant::now();
        t.press(cell(2, 1));
        assert_eq!(t.release(cell(2, 1), start), Release::Click);
        t.press(cell(2, 1));
        assert_eq!(
            t.release(cell(2, 1), start + Duration::from_millis(150)),
            Release::DoubleClick
        );
        // A third click starts over
        t.press(cell(2, 1));
        assert_eq!(
            t.release(cell(2, 1), start + Duration::from_millis(200)),
            Release::Click
        );
    }

    #[test]
    fn slow_second_click_is_single() {
        let mut t = ClickTracker::new(WINDOW);
        let start = Instant::now();
        t.press(cell(2, 1));
        t.release(cell(2, 1), start);
        t.press(cell(2, 1));
        assert_eq!(
            t.release(cell(2, 1), start + Duration::from_millis(900)),
            Release::Click
        );
    }

    #[test]
    fn clicks_on_different_cells_are_not_double() {
        let mut t = ClickTracker::new(WINDOW);
        let start = Instant::now();
        t.press(cell(2, 1));
        t.release(cell(2, 1), start);
        t.press(cell(3, 1));
        assert_eq!(t.release(cell(3, 1), start), Release::Click);
    }

    // -- Whole-app mouse flows against a drawn frame --

    fn app() -> App {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let movements = (1..=3)
            .map(|i| {
                let mut m = Movement::new(RowId(i), date);
                m.description = format!("item {i}");
                m
            })
            .collect();
        let mut app = App::new(
            Ledger::new(movements),
            PathBuf::from("unused.json"),
            TallyConfig::default(),
        );
        draw(&mut app, TERM_W, TERM_H);
        app
    }

    fn col_of(app: &App, field: &str) -> usize {
        app.engine
            .columns()
            .iter()
            .position(|c| c.cell.field() == Some(field))
            .unwrap()
    }

    /// Screen position inside a cell
    fn point(app: &App, coord: CellCoord) -> (u16, u16) {
        let rect = app.layout.as_ref().unwrap().slot_rect(coord).unwrap();
        (rect.x, rect.y)
    }

    fn event(kind: MouseEventKind, (x, y): (u16, u16)) -> MouseEvent {
        MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Press and release without the file-system save of `handle_mouse`
    fn click_at(app: &mut App, at: (u16, u16), now: Instant) {
        mouse_down(app, at.0, at.1);
        app.sync_rows();
        mouse_up(app, at.0, at.1, now);
        app.sync_rows();
        draw(app, TERM_W, TERM_H);
    }

    #[test]
    fn click_focuses_cell() {
        let mut app = app();
        let desc = col_of(&app, fields::DESCRIPTION);
        let at = point(&app, cell(2, desc));
        click_at(&mut app, at, Instant::now());
        assert_eq!(app.engine.state().focused_cell, Some(cell(2, desc)));
        assert!(!app.engine.state().is_editing);
    }

    #[test]
    fn double_click_opens_editor_at_end() {
        let mut app = app();
        let desc = col_of(&app, fields::DESCRIPTION);
        let at = point(&app, cell(1, desc));
        let start = Instant::now();
        click_at(&mut app, at, start);
        click_at(&mut app, at, start + Duration::from_millis(100));
        assert!(app.engine.state().is_editing);
        let session = app.engine.editor().unwrap();
        assert_eq!(session.buffer(), "item 2");
        assert_eq!(session.cursor(), "item 2".len());
        assert!(!session.is_all_selected());
    }

    #[test]
    fn click_inside_open_editor_moves_caret() {
        let mut app = app();
        let desc = col_of(&app, fields::DESCRIPTION);
        app.engine.dispatch(
            crate::grid::Action::StartAppendEditing(Some(cell(0, desc))),
            &mut app.ledger,
        );
        draw(&mut app, TERM_W, TERM_H);
        let (x, y) = point(&app, cell(0, desc));
        click_at(&mut app, (x + 2, y), Instant::now());
        assert!(app.engine.state().is_editing);
        assert_eq!(app.engine.editor().unwrap().cursor(), 2);
    }

    #[test]
    fn toggle_flips_once_per_click_when_focused() {
        let mut app = app();
        let income = col_of(&app, fields::INCOME);
        let at = point(&app, cell(0, income));
        let start = Instant::now();

        // First click only focuses
        click_at(&mut app, at, start);
        assert_eq!(app.ledger.movements()[0].kind, MovementKind::Expense);

        // Second, slow click flips it exactly once
        click_at(&mut app, at, start + Duration::from_secs(2));
        assert_eq!(app.ledger.movements()[0].kind, MovementKind::Income);
    }

    #[test]
    fn dropdown_opens_on_second_click_and_mouse_picks_option() {
        let mut app = app();
        let status = col_of(&app, fields::STATUS);
        let at = point(&app, cell(0, status));
        let start = Instant::now();

        click_at(&mut app, at, start);
        assert_eq!(app.engine.state().active_dropdown, None);
        click_at(&mut app, at, start + Duration::from_secs(2));
        assert_eq!(app.engine.state().active_dropdown, Some(cell(0, status)));

        let overlay = app.overlay.expect("list drawn");
        // Second option is "paid"
        mouse_down(&mut app, overlay.rect.x + 2, overlay.rect.y + 2);
        app.sync_rows();
        assert_eq!(app.engine.state().active_dropdown, None);
        assert_eq!(app.ledger.movements()[0].status.as_str(), "paid");
    }

    #[test]
    fn mousedown_elsewhere_closes_dropdown() {
        let mut app = app();
        let status = col_of(&app, fields::STATUS);
        let desc = col_of(&app, fields::DESCRIPTION);
        let at = point(&app, cell(0, status));
        let start = Instant::now();
        click_at(&mut app, at, start);
        click_at(&mut app, at, start + Duration::from_secs(2));
        assert!(app.engine.state().active_dropdown.is_some());

        let other = point(&app, cell(2, desc));
        mouse_down(&mut app, other.0, other.1);
        assert_eq!(app.engine.state().active_dropdown, None);
    }

    #[test]
    fn hover_tracks_option_under_pointer() {
        let mut app = app();
        let status = col_of(&app, fields::STATUS);
        app.engine.dispatch(
            crate::grid::Action::ToggleDropdown(cell(0, status)),
            &mut app.ledger,
        );
        draw(&mut app, TERM_W, TERM_H);
        let overlay = app.overlay.unwrap();

        handle_mouse(
            &mut app,
            event(MouseEventKind::Moved, (overlay.rect.x + 2, overlay.rect.y + 1)),
            Instant::now(),
        );
        assert_eq!(app.hover, Some(0));
        handle_mouse(&mut app, event(MouseEventKind::Moved, (0, 0)), Instant::now());
        assert_eq!(app.hover, None);
    }

    #[test]
    fn wheel_moves_focus() {
        let mut app = app();
        handle_mouse(
            &mut app,
            event(MouseEventKind::ScrollDown, (5, 5)),
            Instant::now(),
        );
        assert_eq!(app.engine.state().focused_cell.unwrap().row, 1);
        handle_mouse(&mut app, event(MouseEventKind::ScrollUp, (5, 5)), Instant::now());
        handle_mouse(&mut app, event(MouseEventKind::ScrollUp, (5, 5)), Instant::now());
        assert_eq!(app.engine.state().focused_cell.unwrap().row, 0);
    }
}
