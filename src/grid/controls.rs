use std::rc::Rc;

use crossterm::event::KeyEvent;
use tracing::debug;

use super::coord::CellCoord;
use super::registry::{CellControl, CellKind};
use super::row::CellView;
use super::state::{GridStore, InteractionState};
use super::value::{CellValue, FieldChange, RowId, RowSink};

/// A plain text or number cell. Editing itself happens in the inline editor;
/// this handle only exposes the current value.
#[derive(Debug)]
pub struct TextControl {
    coord: CellCoord,
    row_id: RowId,
    field: String,
    kind: CellKind,
    value: CellValue,
}

impl TextControl {
    pub fn new(
        coord: CellCoord,
        row_id: RowId,
        field: impl Into<String>,
        kind: CellKind,
        value: CellValue,
    ) -> Self {
        TextControl {
            coord,
            row_id,
            field: field.into(),
            kind,
            value,
        }
    }

    pub fn row_id(&self) -> RowId {
        self.row_id
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl CellControl for TextControl {
    fn coord(&self) -> CellCoord {
        self.coord
    }

    fn kind(&self) -> CellKind {
        self.kind
    }

    fn text(&self) -> String {
        self.value.as_text()
    }

    fn commit(&self, value: CellValue, sink: &mut dyn RowSink) -> bool {
        debug!(row = %self.row_id, field = %self.field, ?value, "edit committed");
        sink.field_changed(FieldChange {
            row_id: self.row_id,
            field: self.field.clone(),
            value,
        });
        true
    }
}

/// Two-valued field shown as an icon switch
#[derive(Debug)]
pub struct ToggleControl {
    coord: CellCoord,
    row_id: RowId,
    field: String,
    value: bool,
    on_label: String,
    off_label: String,
}

impl ToggleControl {
    pub fn new(
        coord: CellCoord,
        row_id: RowId,
        field: impl Into<String>,
        value: bool,
        on_label: impl Into<String>,
        off_label: impl Into<String>,
    ) -> Self {
        ToggleControl {
            coord,
            row_id,
            field: field.into(),
            value,
            on_label: on_label.into(),
            off_label: off_label.into(),
        }
    }

    pub fn value(&self) -> bool {
        self.value
    }
}

impl CellControl for ToggleControl {
    fn coord(&self) -> CellCoord {
        self.coord
    }

    fn kind(&self) -> CellKind {
        CellKind::Toggle
    }

    fn text(&self) -> String {
        if self.value {
            self.on_label.clone()
        } else {
            self.off_label.clone()
        }
    }

    fn view(&self, _state: &InteractionState) -> CellView {
        CellView::Toggle {
            on: self.value,
            label: self.text(),
        }
    }

    fn activate(&self, sink: &mut dyn RowSink) -> bool {
        debug!(row = %self.row_id, field = %self.field, to = !self.value, "toggle flipped");
        sink.field_changed(FieldChange {
            row_id: self.row_id,
            field: self.field.clone(),
            value: CellValue::Flag(!self.value),
        });
        true
    }
}

/// Row-scoped intent signalled upward by identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Delete,
}

#[derive(Debug)]
pub struct ActionControl {
    coord: CellCoord,
    row_id: RowId,
    label: String,
    action: RowAction,
}

impl ActionControl {
    pub fn new(coord: CellCoord, row_id: RowId, label: impl Into<String>, action: RowAction) -> Self {
        ActionControl {
            coord,
            row_id,
            label: label.into(),
            action,
        }
    }
}

impl CellControl for ActionControl {
    fn coord(&self) -> CellCoord {
        self.coord
    }

    fn kind(&self) -> CellKind {
        CellKind::Action
    }

    fn text(&self) -> String {
        self.label.clone()
    }

    fn view(&self, _state: &InteractionState) -> CellView {
        CellView::Button {
            label: self.label.clone(),
        }
    }

    fn activate(&self, sink: &mut dyn RowSink) -> bool {
        match self.action {
            RowAction::Delete => {
                debug!(row = %self.row_id, "delete requested");
                sink.delete_requested(self.row_id);
            }
        }
        true
    }
}

/// One visual cell hosting several independently addressable controls.
///
/// Callers always go through this merged handle; it forwards to whichever
/// sub-slot owns the open dropdown (there can only be one).
#[derive(Debug)]
pub struct CompositeControl {
    coord: CellCoord,
    slots: Vec<Rc<dyn CellControl>>,
}

impl CompositeControl {
    pub fn new(coord: CellCoord, slots: Vec<Rc<dyn CellControl>>) -> Self {
        CompositeControl {
            coord: coord.primary(),
            slots,
        }
    }

    fn open_slot(&self, state: &InteractionState) -> Option<&Rc<dyn CellControl>> {
        let active = state.active_dropdown?;
        self.slots.iter().find(|s| s.coord() == active)
    }

    fn focused_slot(&self, state: &InteractionState) -> Option<&Rc<dyn CellControl>> {
        let focus = state.focused_cell?;
        if !focus.same_cell(self.coord) {
            return None;
        }
        self.slots.get(focus.slot)
    }
}

impl CellControl for CompositeControl {
    fn coord(&self) -> CellCoord {
        self.coord
    }

    fn kind(&self) -> CellKind {
        CellKind::Composite
    }

    fn text(&self) -> String {
        self.slots
            .iter()
            .map(|s| s.text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    fn open_dropdown(&self, store: &mut GridStore) -> bool {
        let target = self
            .focused_slot(store.state())
            .or_else(|| self.slots.first())
            .cloned();
        target.is_some_and(|s| s.open_dropdown(store))
    }

    fn close_dropdown(&self, store: &mut GridStore) -> bool {
        let target = self.open_slot(store.state()).cloned();
        target.is_some_and(|s| s.close_dropdown(store))
    }

    fn select_highlighted(&self, state: &InteractionState, sink: &mut dyn RowSink) -> bool {
        self.open_slot(state)
            .is_some_and(|s| s.select_highlighted(state, sink))
    }

    fn handle_key(&self, key: KeyEvent, store: &mut GridStore, sink: &mut dyn RowSink) -> bool {
        let target = self.open_slot(store.state()).cloned();
        target.is_some_and(|s| s.handle_key(key, store, sink))
    }

    fn slot(&self, slot: usize) -> Option<Rc<dyn CellControl>> {
        self.slots.get(slot).cloned()
    }

    fn slot_count(&self) -> usize {
        self.slots.len()
    }
}
