use std::rc::Rc;

use tracing::trace;

use super::column::ColumnSpec;
use super::coord::CellCoord;
use super::editor::EditSession;
use super::registry::{CellControl, CellKind, CellRegistry};
use super::state::{Action, EditMode, GridStore, InteractionState};
use super::value::{GridRow, RowId, RowSink};

/// Pointer gestures the host recognises on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    MouseDown,
    Click,
    DoubleClick,
}

/// What a cell shows this frame
#[derive(Debug, Clone, PartialEq)]
pub enum CellView {
    Display {
        text: String,
    },
    /// Inline editor; `cursor_col` is the caret's display column
    Editor {
        text: String,
        cursor_col: usize,
        all_selected: bool,
    },
    Dropdown {
        label: String,
        open: bool,
        color_hint: Option<String>,
    },
    Toggle {
        on: bool,
        label: String,
    },
    Button {
        label: String,
    },
    Composite(Vec<CellPaint>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellPaint {
    pub coord: CellCoord,
    pub focused: bool,
    pub view: CellView,
}

/// Controls mounted for one data row, plus the row's pending-toggle flag
#[derive(Debug)]
pub struct RowWiring {
    index: usize,
    row_id: RowId,
    controls: Vec<Rc<dyn CellControl>>,
    /// Toggle already flipped by a mousedown whose click is still to come
    pending_toggle: Option<CellCoord>,
}

impl RowWiring {
    /// Build a control per column and register each one
    pub fn mount(
        index: usize,
        row: &dyn GridRow,
        columns: &[ColumnSpec],
        registry: &mut CellRegistry,
    ) -> Self {
        let controls: Vec<Rc<dyn CellControl>> = columns
            .iter()
            .enumerate()
            .map(|(col, spec)| spec.cell.build(CellCoord::new(index, col), row))
            .collect();
        for (col, control) in controls.iter().enumerate() {
            registry.register(index, col, Some(control));
        }
        RowWiring {
            index,
            row_id: row.row_id(),
            controls,
            pending_toggle: None,
        }
    }

    pub fn unmount(&self, registry: &mut CellRegistry) {
        for col in 0..self.controls.len() {
            registry.register(self.index, col, None);
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn row_id(&self) -> RowId {
        self.row_id
    }

    pub fn control(&self, col: usize) -> Option<&Rc<dyn CellControl>> {
        self.controls.get(col)
    }

    pub fn pending_toggle(&self) -> Option<CellCoord> {
        self.pending_toggle
    }

    pub(crate) fn restore_pending(&mut self, cell: CellCoord) {
        if cell.row == self.index {
            self.pending_toggle = Some(cell);
        }
    }

    /// Forget the pending flip unless focus is still on that toggle
    pub fn clear_pending_unless(&mut self, focus: Option<CellCoord>) {
        if self.pending_toggle.is_some() && self.pending_toggle != focus {
            trace!(row = self.index, "pending toggle cleared");
            self.pending_toggle = None;
        }
    }

    fn resolve(&self, coord: CellCoord) -> Option<Rc<dyn CellControl>> {
        let primary = self.controls.get(coord.col)?;
        match primary.slot(coord.slot) {
            Some(sub) => Some(sub),
            None => Some(Rc::clone(primary)),
        }
    }

    /// Apply a pointer gesture on one of this row's cells. Returns true when
    /// anything happened (store transition or sink call).
    pub fn gesture(
        &mut self,
        coord: CellCoord,
        gesture: Gesture,
        store: &mut GridStore,
        sink: &mut dyn RowSink,
    ) -> bool {
        let Some(control) = self.resolve(coord) else {
            trace!(cell = %coord, "gesture on unmounted cell");
            return false;
        };
        let coord = control.coord();
        let focused = store.state().is_focused(coord);

        match (control.kind(), gesture) {
            (CellKind::Toggle, Gesture::MouseDown) if focused => {
                self.pending_toggle = Some(coord);
                control.activate(sink)
            }
            (CellKind::Toggle, Gesture::Click) => {
                if self.pending_toggle.take() == Some(coord) {
                    return false;
                }
                if focused {
                    control.activate(sink)
                } else {
                    store.dispatch(Action::SetFocus(coord))
                }
            }
            (CellKind::Action, Gesture::Click) => {
                store.dispatch(Action::SetFocus(coord));
                control.activate(sink)
            }
            (kind, Gesture::DoubleClick) if kind.is_editable() => {
                store.dispatch(Action::StartAppendEditing(Some(coord)))
            }
            (kind, Gesture::Click) => {
                // A click inside the open editor only moves the caret
                if kind.is_editable() && store.state().is_editing_cell(coord) {
                    return false;
                }
                control.on_click(store)
            }
            _ => false,
        }
    }

    /// Per-cell render decisions for this frame
    pub fn paint(&self, state: &InteractionState, editor: Option<&EditSession>) -> Vec<CellPaint> {
        self.controls
            .iter()
            .map(|control| paint_control(control.as_ref(), state, editor))
            .collect()
    }
}

fn paint_control(
    control: &dyn CellControl,
    state: &InteractionState,
    editor: Option<&EditSession>,
) -> CellPaint {
    let coord = control.coord();
    if control.kind() == CellKind::Composite {
        let slots = (0..control.slot_count())
            .filter_map(|i| control.slot(i))
            .map(|slot| paint_control(slot.as_ref(), state, editor))
            .collect();
        return CellPaint {
            coord,
            focused: state.focused_cell.is_some_and(|f| f.same_cell(coord)),
            view: CellView::Composite(slots),
        };
    }

    let view = match editor {
        Some(session) if state.is_editing_cell(coord) && session.coord() == coord => {
            CellView::Editor {
                text: session.buffer().to_string(),
                cursor_col: session.cursor_width(),
                all_selected: session.is_all_selected() && session.mode() == EditMode::Overwrite,
            }
        }
        _ => control.view(state),
    };
    CellPaint {
        coord,
        focused: state.is_focused(coord),
        view,
    }
}
