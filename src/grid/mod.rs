//! Spreadsheet-style interaction engine: focus, inline editing and dropdowns
//! over a table of rows, driven by a single state store.

pub mod column;
pub mod controls;
pub mod coord;
pub mod dropdown;
pub mod editor;
pub mod layout;
pub mod registry;
pub mod router;
pub mod row;
pub mod state;
pub mod value;

use std::rc::Rc;

use tracing::{debug, trace};

pub use column::{CellSpec, ColumnSpec};
pub use coord::{CellCoord, Direction, GridDims};
pub use dropdown::{DropdownOption, OptionSource};
pub use editor::{EditSession, Editor};
pub use registry::{CellControl, CellKind, CellRegistry};
pub use router::KeyOutcome;
pub use row::{CellPaint, CellView, Gesture, RowWiring};
pub use state::{Action, EditMode, GridStore, InteractionState};
pub use value::{CellValue, FieldChange, GridRow, RowId, RowSink};

/// Error types for grid input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("not a number: {0:?}")]
    InvalidNumber(String),
}

/// Owns the store, the registry, the inline editor and the mounted rows.
///
/// Everything that changes interaction state goes through here so the editor
/// can be reconciled right after each transition.
#[derive(Debug)]
pub struct GridEngine {
    columns: Vec<ColumnSpec>,
    store: GridStore,
    registry: CellRegistry,
    editor: Editor,
    rows: Vec<RowWiring>,
}

impl GridEngine {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        GridEngine {
            columns,
            store: GridStore::new(),
            registry: CellRegistry::new(),
            editor: Editor::default(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn state(&self) -> &InteractionState {
        self.store.state()
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    pub fn editor(&self) -> Option<&EditSession> {
        self.editor.session()
    }

    pub fn rows(&self) -> &[RowWiring] {
        &self.rows
    }

    pub fn dims(&self) -> GridDims {
        GridDims {
            rows: self.rows.len(),
            cols: self.columns.len(),
        }
    }

    /// Rebuild every row's controls from fresh data. When the focused index
    /// no longer holds the same record, the open editor is dropped and focus
    /// lands plainly on the record now there (or the last row when the grid
    /// shrank past it).
    pub fn set_rows<R: GridRow>(&mut self, rows: &[R]) {
        let focused_id = self
            .store
            .state()
            .focused_cell
            .and_then(|focus| self.rows.get(focus.row))
            .map(RowWiring::row_id);
        for wiring in &self.rows {
            wiring.unmount(&mut self.registry);
        }
        let pending: Vec<_> = self
            .rows
            .iter()
            .map(|w| (w.row_id(), w.pending_toggle()))
            .collect();
        self.rows = rows
            .iter()
            .enumerate()
            .map(|(i, row)| RowWiring::mount(i, row, &self.columns, &mut self.registry))
            .collect();
        self.registry.prune();
        trace!(rows = self.rows.len(), "rows mounted");

        // A toggle flipped on mousedown keeps its pending flag across the
        // rebuild its own commit caused
        for (wiring, (row_id, flag)) in self.rows.iter_mut().zip(pending) {
            if let Some(cell) = flag
                && wiring.row_id() == row_id
            {
                wiring.restore_pending(cell);
            }
        }

        let Some(focus) = self.store.state().focused_cell else {
            return;
        };
        let current = self.rows.get(focus.row).map(RowWiring::row_id);
        if focused_id.is_some() && current == focused_id {
            return;
        }
        // Edit and dropdown state belonged to the old record; SetFocus on an
        // unchanged coordinate is a no-op, so start over from a clean state
        if let Some(session) = self.editor.take() {
            debug!(cell = %session.coord(), "edit dropped, record moved");
        }
        self.store.reset();
        match self.rows.len() {
            0 => {}
            n => {
                let target = CellCoord::new(focus.row.min(n - 1), focus.col);
                debug!(from = %focus, to = %target, "focus moved to a different record");
                self.store.dispatch(Action::SetFocus(target));
            }
        }
        let focus = self.store.state().focused_cell;
        for wiring in &mut self.rows {
            wiring.clear_pending_unless(focus);
        }
    }

    /// Dispatch an action and bring the editor in line with the result
    pub fn dispatch(&mut self, action: Action, sink: &mut dyn RowSink) -> bool {
        let changed = self.store.dispatch(action);
        if changed {
            self.after_transition(sink);
        }
        changed
    }

    /// Post-transition hook: reconcile the editor, commit a session that lost
    /// focus, and drop pending toggle flags that no longer apply
    fn after_transition(&mut self, sink: &mut dyn RowSink) {
        let seed = self.store.take_editor_seed();
        let state = *self.store.state();
        if let Some(displaced) = self.editor.reconcile(&state, &self.registry, seed) {
            self.commit_session(displaced, sink);
        }
        for wiring in &mut self.rows {
            wiring.clear_pending_unless(state.focused_cell);
        }
    }

    /// Write a detached session's value through the control it was editing.
    /// Unchanged or unparsable values are dropped.
    fn commit_session(&mut self, session: EditSession, sink: &mut dyn RowSink) -> bool {
        if !session.is_dirty() {
            return false;
        }
        let value = match session.value() {
            Ok(v) => v,
            Err(e) => {
                debug!(cell = %session.coord(), error = %e, "discarding edit");
                return false;
            }
        };
        match self.registry.resolve(session.coord()) {
            Some(control) => control.commit(value, sink),
            None => {
                trace!(cell = %session.coord(), "edited control is gone");
                false
            }
        }
    }

    /// Pointer gesture on a cell. A mousedown anywhere other than the open
    /// dropdown's own cell closes that dropdown first.
    pub fn handle_gesture(
        &mut self,
        coord: CellCoord,
        gesture: Gesture,
        sink: &mut dyn RowSink,
    ) -> bool {
        let before = self.store.revision();
        let mut acted = false;
        if gesture == Gesture::MouseDown
            && let Some(active) = self.store.state().active_dropdown
            && !active.same_cell(coord)
        {
            acted |= self.store.dispatch(Action::CloseActiveDropdown);
        }
        if let Some(wiring) = self.rows.get_mut(coord.row) {
            acted |= wiring.gesture(coord, gesture, &mut self.store, sink);
        }
        if self.store.revision() != before {
            self.after_transition(sink);
        }
        acted
    }

    /// Mousedown that hit neither a cell nor the option list
    pub fn outside_mouse_down(&mut self, sink: &mut dyn RowSink) -> bool {
        if self.store.state().active_dropdown.is_none() {
            return false;
        }
        self.dispatch(Action::CloseActiveDropdown, sink)
    }

    /// Control that owns the open dropdown, if any
    pub fn active_dropdown(&self) -> Option<Rc<dyn CellControl>> {
        let active = self.store.state().active_dropdown?;
        self.registry.resolve(active)
    }

    /// Mouse activation of an option in the open list. Disabled options leave
    /// the list open.
    pub fn select_option(&mut self, index: usize, sink: &mut dyn RowSink) -> bool {
        let Some(control) = self.active_dropdown() else {
            return false;
        };
        if !control.select_option(index, sink) {
            return false;
        }
        self.dispatch(Action::SelectDropdownOption, sink);
        true
    }

    /// Pasted text goes into the open editor, or starts an overwrite edit on
    /// a focused text cell
    pub fn paste(&mut self, text: &str, sink: &mut dyn RowSink) -> bool {
        let state = *self.store.state();
        if state.active_dropdown.is_some() {
            return false;
        }
        if !state.is_editing {
            let Some(focus) = state.focused_cell else {
                return false;
            };
            let editable = self
                .registry
                .resolve(focus)
                .is_some_and(|c| c.kind().is_editable());
            if !editable {
                return false;
            }
            self.dispatch(Action::StartOverwriteEditing(Some(focus)), sink);
        }
        match self.editor.session_mut() {
            Some(session) => {
                session.insert_str(text);
                true
            }
            None => false,
        }
    }

    /// Put the caret at a display column of the open editor
    pub fn place_caret(&mut self, coord: CellCoord, col: usize) -> bool {
        match self.editor.session_mut() {
            Some(session) if session.coord() == coord => {
                session.set_cursor_col(col);
                true
            }
            _ => false,
        }
    }

    /// Focus the first cell if nothing is focused yet
    pub fn focus_first(&mut self, sink: &mut dyn RowSink) -> bool {
        if self.store.state().focused_cell.is_some() || self.rows.is_empty() {
            return false;
        }
        self.dispatch(Action::SetFocus(CellCoord::new(0, 0)), sink)
    }

    /// Render decisions for one row
    pub fn paint_row(&self, row: usize) -> Vec<CellPaint> {
        match self.rows.get(row) {
            Some(wiring) => wiring.paint(self.store.state(), self.editor.session()),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::value::RecordingSink;

    struct Row {
        id: u64,
        text: &'static str,
        amount: f64,
    }

    impl GridRow for Row {
        fn row_id(&self) -> RowId {
            RowId(self.id)
        }

        fn cell_value(&self, field: &str) -> CellValue {
            match field {
                "amount" => CellValue::Number(self.amount),
                _ => CellValue::Text(self.text.into()),
            }
        }
    }

    fn engine(rows: usize) -> GridEngine {
        let mut engine = GridEngine::new(vec![
            ColumnSpec::new("Description", 0, CellSpec::text("description")),
            ColumnSpec::new("Amount", 10, CellSpec::number("amount")),
        ]);
        let data: Vec<Row> = (0..rows)
            .map(|i| Row {
                id: i as u64 + 1,
                text: "lunch",
                amount: 12.0,
            })
            .collect();
        engine.set_rows(&data);
        engine
    }

    #[test]
    fn editor_mounts_after_start_editing() {
        let mut e = engine(2);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::StartAppendEditing(Some(CellCoord::new(1, 0))), &mut sink);
        let session = e.editor().unwrap();
        assert_eq!(session.coord(), CellCoord::new(1, 0));
        assert_eq!(session.buffer(), "lunch");
        assert_eq!(session.cursor(), 5);
    }

    #[test]
    fn seed_replaces_editor_text() {
        let mut e = engine(1);
        let mut sink = RecordingSink::default();
        e.dispatch(
            Action::StartEditing {
                cell: Some(CellCoord::new(0, 0)),
                initial_value: Some("dinner".into()),
                mode: Some(EditMode::Append),
            },
            &mut sink,
        );
        assert_eq!(e.editor().unwrap().buffer(), "dinner");
    }

    #[test]
    fn blur_commits_dirty_session() {
        let mut e = engine(2);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::StartAppendEditing(Some(CellCoord::new(0, 0))), &mut sink);
        assert!(e.paste(" out", &mut sink));
        e.dispatch(Action::SetFocus(CellCoord::new(1, 0)), &mut sink);

        assert!(e.editor().is_none());
        assert_eq!(sink.changes.len(), 1);
        assert_eq!(sink.changes[0].row_id, RowId(1));
        assert_eq!(sink.changes[0].value, CellValue::Text("lunch out".into()));
    }

    #[test]
    fn blur_drops_clean_session() {
        let mut e = engine(2);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::StartAppendEditing(Some(CellCoord::new(0, 0))), &mut sink);
        e.dispatch(Action::SetFocus(CellCoord::new(1, 0)), &mut sink);
        assert!(sink.changes.is_empty());
    }

    #[test]
    fn paste_starts_overwrite_edit() {
        let mut e = engine(1);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::SetFocus(CellCoord::new(0, 1)), &mut sink);
        assert!(e.paste("4,5", &mut sink));
        let session = e.editor().unwrap();
        assert_eq!(session.buffer(), "4,5");
        assert_eq!(session.mode(), EditMode::Overwrite);
    }

    #[test]
    fn shrinking_rows_clamps_focus() {
        let mut e = engine(5);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::SetFocus(CellCoord::new(4, 1)), &mut sink);
        let fewer = vec![Row {
            id: 1,
            text: "a",
            amount: 1.0,
        }];
        e.set_rows(&fewer);
        assert_eq!(e.state().focused_cell, Some(CellCoord::new(0, 1)));
        assert_eq!(e.registry().len(), 2);
    }

    fn rows_with_ids(ids: &[u64]) -> Vec<Row> {
        ids.iter()
            .map(|&id| Row {
                id,
                text: "lunch",
                amount: 12.0,
            })
            .collect()
    }

    fn enter(e: &mut GridEngine, sink: &mut RecordingSink) -> KeyOutcome {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
        let dims = e.dims();
        e.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), dims, sink)
    }

    #[test]
    fn remount_keeps_edit_on_same_record() {
        let mut e = engine(3);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::StartAppendEditing(Some(CellCoord::new(1, 0))), &mut sink);
        assert!(e.paste(" out", &mut sink));
        e.set_rows(&rows_with_ids(&[1, 2, 3]));

        assert!(e.state().is_editing);
        assert_eq!(enter(&mut e, &mut sink), KeyOutcome::Handled);
        assert_eq!(sink.changes.len(), 1);
        assert_eq!(sink.changes[0].row_id, RowId(2));
        assert_eq!(sink.changes[0].value, CellValue::Text("lunch out".into()));
    }

    #[test]
    fn remount_drops_edit_when_record_moves() {
        let mut e = engine(3);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::StartAppendEditing(Some(CellCoord::new(1, 0))), &mut sink);
        assert!(e.paste(" out", &mut sink));
        // Record #2 deleted: #3 slides into index 1
        e.set_rows(&rows_with_ids(&[1, 3]));

        assert!(e.editor().is_none());
        assert_eq!(e.state(), &InteractionState::focused_on(CellCoord::new(1, 0)));
        enter(&mut e, &mut sink);
        enter(&mut e, &mut sink);
        // The reopened editor starts from #3's own value, so nothing commits
        assert!(sink.changes.is_empty());
    }

    #[test]
    fn remount_closes_dropdown_of_moved_record() {
        let mut e = engine(3);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::ToggleDropdown(CellCoord::new(0, 1)), &mut sink);
        e.set_rows(&rows_with_ids(&[2, 3]));
        assert_eq!(e.state(), &InteractionState::focused_on(CellCoord::new(0, 1)));
    }

    #[test]
    fn remount_past_last_row_drops_edit() {
        let mut e = engine(2);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::StartOverwriteEditing(Some(CellCoord::new(1, 1))), &mut sink);
        e.set_rows(&rows_with_ids(&[1]));
        assert!(e.editor().is_none());
        assert_eq!(e.state(), &InteractionState::focused_on(CellCoord::new(0, 1)));
    }

    #[test]
    fn emptied_grid_drops_focus() {
        let mut e = engine(2);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::SetFocus(CellCoord::new(1, 0)), &mut sink);
        e.set_rows::<Row>(&[]);
        assert_eq!(e.state().focused_cell, None);
        assert!(e.registry().is_empty());
    }

    #[test]
    fn focus_first_only_once() {
        let mut e = engine(2);
        let mut sink = RecordingSink::default();
        assert!(e.focus_first(&mut sink));
        assert!(!e.focus_first(&mut sink));
        assert_eq!(e.state().focused_cell, Some(CellCoord::new(0, 0)));
    }

    #[test]
    fn place_caret_inside_editor() {
        let mut e = engine(1);
        let mut sink = RecordingSink::default();
        e.dispatch(Action::StartOverwriteEditing(Some(CellCoord::new(0, 0))), &mut sink);
        assert!(e.place_caret(CellCoord::new(0, 0), 2));
        let session = e.editor().unwrap();
        assert_eq!(session.cursor(), 2);
        assert!(!session.is_all_selected());
        assert!(!e.place_caret(CellCoord::new(0, 1), 0));
    }
}
