//! End-to-end behaviour of the grid engine through its public API: the
//! state transitions on their own, then the engine driving a real ledger.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;

use tally::grid::state::transition;
use tally::grid::{
    Action, CellCoord, Direction, EditMode, Gesture, GridEngine, GridRow, GridStore,
    InteractionState, KeyOutcome, RowId,
};
use tally::model::{Ledger, Movement, MovementKind, Status, TallyConfig, fields, ledger};

fn at(row: usize, col: usize) -> CellCoord {
    CellCoord::new(row, col)
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[test]
fn type_to_edit() {
    let state = InteractionState::focused_on(at(2, 5));
    let next = transition(&state, &Action::StartOverwriteEditing(None));
    assert_eq!(
        next,
        InteractionState {
            focused_cell: Some(at(2, 5)),
            is_editing: true,
            edit_mode: EditMode::Overwrite,
            active_dropdown: None,
            highlighted_option: None,
        }
    );
}

#[test]
fn dropdown_keyboard_selection() {
    let mut store = GridStore::new();
    store.dispatch(Action::ToggleDropdown(at(0, 2)));
    assert_eq!(store.state().active_dropdown, Some(at(0, 2)));
    assert_eq!(store.state().highlighted_option, Some(0));

    store.dispatch(Action::HighlightDropdownOption {
        direction: Direction::Down,
        options_count: 3,
    });
    assert_eq!(store.state().highlighted_option, Some(1));

    store.dispatch(Action::SelectDropdownOption);
    assert_eq!(store.state().active_dropdown, None);
    assert_eq!(store.state().highlighted_option, None);
    assert_eq!(store.state().focused_cell, Some(at(0, 2)));
}

#[test]
fn edge_clamp() {
    let state = InteractionState::focused_on(at(4, 3));
    let next = transition(
        &state,
        &Action::MoveFocus {
            direction: Direction::Down,
            max_rows: 5,
            max_cols: 10,
        },
    );
    assert_eq!(next.focused_cell, Some(at(4, 3)));

    let top = InteractionState::focused_on(at(0, 0));
    let up = transition(
        &top,
        &Action::MoveFocus {
            direction: Direction::Up,
            max_rows: 5,
            max_cols: 10,
        },
    );
    assert_eq!(up, top);
}

#[test]
fn refocus_elsewhere_resets_everything() {
    let states = [
        InteractionState::default(),
        transition(&InteractionState::default(), &Action::ToggleDropdown(at(1, 1))),
        transition(
            &InteractionState::focused_on(at(3, 0)),
            &Action::StartAppendEditing(None),
        ),
    ];
    for state in states {
        let next = transition(&state, &Action::SetFocus(at(7, 2)));
        assert_eq!(next, InteractionState::focused_on(at(7, 2)));
    }
}

#[test]
fn refocus_same_cell_is_a_no_op() {
    let mut store = GridStore::new();
    store.dispatch(Action::StartAppendEditing(Some(at(1, 1))));
    let revision = store.revision();
    assert!(!store.dispatch(Action::SetFocus(at(1, 1))));
    assert_eq!(store.revision(), revision);
    assert!(store.state().is_editing);
}

#[test]
fn mode_switch_keeps_edit_open() {
    let editing = transition(
        &InteractionState::focused_on(at(0, 1)),
        &Action::StartOverwriteEditing(None),
    );
    let next = transition(&editing, &Action::StartAppendEditing(Some(at(0, 1))));
    assert!(next.is_editing);
    assert_eq!(next.edit_mode, EditMode::Append);
    assert_eq!(next.focused_cell, Some(at(0, 1)));
}

#[test]
fn dropdown_toggle_round_trip() {
    let before = InteractionState::focused_on(at(0, 2));
    let open = transition(&before, &Action::ToggleDropdown(at(0, 2)));
    let closed = transition(&open, &Action::ToggleDropdown(at(0, 2)));
    assert_eq!(closed, before);
}

#[test]
fn at_most_one_dropdown_open() {
    let mut store = GridStore::new();
    store.dispatch(Action::ToggleDropdown(at(0, 2)));
    store.dispatch(Action::ToggleDropdown(at(3, 4)));
    assert_eq!(store.state().active_dropdown, Some(at(3, 4)));
    assert_eq!(store.state().focused_cell, Some(at(3, 4)));
    assert!(store.state().is_consistent());
}

#[test]
fn dropdown_actions_without_open_dropdown_are_no_ops() {
    let state = InteractionState::focused_on(at(1, 1));
    for action in [
        Action::HighlightDropdownOption {
            direction: Direction::Down,
            options_count: 4,
        },
        Action::SelectDropdownOption,
        Action::CloseActiveDropdown,
        Action::StopEditing,
    ] {
        assert_eq!(transition(&state, &action), state);
    }
    let nothing = InteractionState::default();
    assert_eq!(transition(&nothing, &Action::StartOverwriteEditing(None)), nothing);
}

// ---------------------------------------------------------------------------
// Engine over a ledger
// ---------------------------------------------------------------------------

fn ledger_of(n: u64) -> Ledger {
    let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    Ledger::new(
        (1..=n)
            .map(|i| {
                let mut m = Movement::new(RowId(i), date);
                m.description = format!("movement {i}");
                m.amount = 10.0 * i as f64;
                m
            })
            .collect(),
    )
}

fn setup(n: u64) -> (GridEngine, Ledger) {
    let book = ledger_of(n);
    let mut engine = GridEngine::new(ledger::columns(&TallyConfig::default()));
    engine.set_rows(book.movements());
    (engine, book)
}

fn col(engine: &GridEngine, field: &str) -> usize {
    engine
        .columns()
        .iter()
        .position(|c| c.cell.field() == Some(field))
        .unwrap()
}

fn key(engine: &mut GridEngine, book: &mut Ledger, code: KeyCode) -> KeyOutcome {
    let dims = engine.dims();
    let outcome = engine.handle_key(KeyEvent::new(code, KeyModifiers::NONE), dims, book);
    engine.set_rows(book.movements());
    outcome
}

fn type_str(engine: &mut GridEngine, book: &mut Ledger, text: &str) {
    for c in text.chars() {
        key(engine, book, KeyCode::Char(c));
    }
}

#[test]
fn typing_over_an_amount_commits_on_enter() {
    let (mut engine, mut book) = setup(3);
    let amount = col(&engine, fields::AMOUNT);
    engine.dispatch(Action::SetFocus(at(1, amount)), &mut book);

    type_str(&mut engine, &mut book, "12,5");
    assert_eq!(engine.editor().unwrap().buffer(), "12,5");
    assert_eq!(key(&mut engine, &mut book, KeyCode::Enter), KeyOutcome::Handled);

    assert_eq!(book.movements()[1].amount, 12.5);
    assert!(!engine.state().is_editing);
    assert_eq!(engine.state().focused_cell, Some(at(1, amount)));
}

#[test]
fn escape_discards_edit() {
    let (mut engine, mut book) = setup(1);
    let desc = col(&engine, fields::DESCRIPTION);
    engine.dispatch(Action::SetFocus(at(0, desc)), &mut book);
    key(&mut engine, &mut book, KeyCode::F(2));
    type_str(&mut engine, &mut book, " extra");
    key(&mut engine, &mut book, KeyCode::Esc);
    assert_eq!(book.movements()[0].description, "movement 1");
    assert!(engine.editor().is_none());
}

#[test]
fn moving_away_commits_pending_edit() {
    let (mut engine, mut book) = setup(2);
    let desc = col(&engine, fields::DESCRIPTION);
    engine.dispatch(Action::SetFocus(at(0, desc)), &mut book);
    key(&mut engine, &mut book, KeyCode::F(2));
    type_str(&mut engine, &mut book, "!");
    engine.dispatch(Action::SetFocus(at(1, desc)), &mut book);
    assert_eq!(book.movements()[0].description, "movement 1!");
}

#[test]
fn status_dropdown_by_keyboard() {
    let (mut engine, mut book) = setup(1);
    let status = col(&engine, fields::STATUS);
    engine.dispatch(Action::SetFocus(at(0, status)), &mut book);

    key(&mut engine, &mut book, KeyCode::Enter);
    assert_eq!(engine.state().active_dropdown, Some(at(0, status)));
    key(&mut engine, &mut book, KeyCode::Down);
    key(&mut engine, &mut book, KeyCode::Enter);

    assert_eq!(book.movements()[0].status, Status::Paid);
    assert_eq!(engine.state().active_dropdown, None);
    assert_eq!(engine.state().focused_cell, Some(at(0, status)));
}

#[test]
fn toggle_needs_focus_before_click_flips() {
    let (mut engine, mut book) = setup(1);
    let income = col(&engine, fields::INCOME);
    let cell = at(0, income);

    engine.handle_gesture(cell, Gesture::MouseDown, &mut book);
    engine.handle_gesture(cell, Gesture::Click, &mut book);
    engine.set_rows(book.movements());
    assert_eq!(engine.state().focused_cell, Some(cell));
    assert_eq!(book.movements()[0].kind, MovementKind::Expense);

    // Focused now: mousedown flips, the click of the same press does not
    engine.handle_gesture(cell, Gesture::MouseDown, &mut book);
    engine.set_rows(book.movements());
    engine.handle_gesture(cell, Gesture::Click, &mut book);
    engine.set_rows(book.movements());
    assert_eq!(book.movements()[0].kind, MovementKind::Income);
}

#[test]
fn delete_button_removes_row_and_clamps_focus() {
    let (mut engine, mut book) = setup(2);
    let delete = engine.columns().len() - 1;
    engine.handle_gesture(at(1, delete), Gesture::Click, &mut book);
    engine.set_rows(book.movements());

    assert_eq!(book.len(), 1);
    assert_eq!(engine.rows()[0].row_id(), book.movements()[0].row_id());
    assert_eq!(engine.state().focused_cell, Some(at(0, delete)));
}

#[test]
fn stale_registry_lookups_are_harmless() {
    let (mut engine, mut book) = setup(1);
    assert!(engine.registry().lookup(5, 0).is_none());
    assert!(!engine.handle_gesture(at(5, 0), Gesture::Click, &mut book));
    engine.set_rows::<Movement>(&[]);
    assert_eq!(engine.state(), &InteractionState::default());
    let dims = engine.dims();
    let outcome = engine.handle_key(
        KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
        dims,
        &mut book,
    );
    assert_eq!(outcome, KeyOutcome::Ignored);
}
