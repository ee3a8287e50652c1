use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crossterm::event::KeyEvent;
use tracing::trace;

use super::coord::CellCoord;
use super::dropdown::DropdownOption;
use super::row::CellView;
use super::state::{Action, GridStore, InteractionState};
use super::value::{CellValue, RowSink};

/// What sort of control occupies a cell. Drives the key router's choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Number,
    Toggle,
    Dropdown,
    Composite,
    /// A row-scoped button (delete)
    Action,
}

impl CellKind {
    /// Cells that accept inline text editing
    pub fn is_editable(self) -> bool {
        matches!(self, CellKind::Text | CellKind::Number)
    }
}

/// Capability handle for whatever control lives at a coordinate.
///
/// Handles never own row data. They hold a snapshot of the value they show and
/// report commits to a [`RowSink`].
pub trait CellControl: fmt::Debug {
    fn coord(&self) -> CellCoord;

    fn kind(&self) -> CellKind;

    /// Current value as plain text
    fn text(&self) -> String;

    /// How the cell looks when it is not being edited
    fn view(&self, _state: &InteractionState) -> CellView {
        CellView::Display { text: self.text() }
    }

    /// Mouse click on the cell. Plain cells just take focus.
    fn on_click(&self, store: &mut GridStore) -> bool {
        store.dispatch(Action::SetFocus(self.coord()))
    }

    /// Write an edited value back through the sink
    fn commit(&self, _value: CellValue, _sink: &mut dyn RowSink) -> bool {
        false
    }

    /// Open this control's dropdown if it has one. Returns true if the store changed.
    fn open_dropdown(&self, _store: &mut GridStore) -> bool {
        false
    }

    /// Close this control's dropdown if it is the open one
    fn close_dropdown(&self, _store: &mut GridStore) -> bool {
        false
    }

    /// Commit the keyboard-highlighted option. Returns false when nothing can
    /// be selected (no dropdown open here, disabled option), in which case the
    /// dropdown must stay open.
    fn select_highlighted(&self, _state: &InteractionState, _sink: &mut dyn RowSink) -> bool {
        false
    }

    /// Keys the router hands over while this control owns the open dropdown
    fn handle_key(&self, _key: KeyEvent, _store: &mut GridStore, _sink: &mut dyn RowSink) -> bool {
        false
    }

    /// Single-gesture activation: flip a toggle, fire a row action
    fn activate(&self, _sink: &mut dyn RowSink) -> bool {
        false
    }

    fn option_count(&self) -> usize {
        0
    }

    /// Options of this control's dropdown; empty for everything else
    fn options(&self) -> &[DropdownOption] {
        &[]
    }

    /// Commit the option at `index` (mouse activation in the open list)
    fn select_option(&self, _index: usize, _sink: &mut dyn RowSink) -> bool {
        false
    }

    /// Sub-control for a composite slot
    fn slot(&self, _slot: usize) -> Option<Rc<dyn CellControl>> {
        None
    }

    fn slot_count(&self) -> usize {
        1
    }
}

/// Weak side table from `(row, col)` to the control mounted there.
///
/// Entries go stale whenever a row is rebuilt; every lookup tolerates that.
#[derive(Debug, Default)]
pub struct CellRegistry {
    entries: HashMap<(usize, usize), Weak<dyn CellControl>>,
}

impl CellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control on mount, or clear the slot with `None` on unmount
    pub fn register(&mut self, row: usize, col: usize, handle: Option<&Rc<dyn CellControl>>) {
        match handle {
            Some(h) => {
                self.entries.insert((row, col), Rc::downgrade(h));
            }
            None => {
                self.entries.remove(&(row, col));
            }
        }
    }

    /// Primary handle of a visual cell
    pub fn lookup(&self, row: usize, col: usize) -> Option<Rc<dyn CellControl>> {
        let found = self.entries.get(&(row, col)).and_then(Weak::upgrade);
        if found.is_none() {
            trace!(row, col, "registry miss");
        }
        found
    }

    /// The exact control a coordinate addresses, going through composite
    /// handles for sub-slots
    pub fn resolve(&self, coord: CellCoord) -> Option<Rc<dyn CellControl>> {
        let primary = self.lookup(coord.row, coord.col)?;
        if let Some(sub) = primary.slot(coord.slot) {
            return Some(sub);
        }
        if coord.slot == 0 { Some(primary) } else { None }
    }

    /// Drop entries whose controls are gone
    pub fn prune(&mut self) {
        self.entries.retain(|_, w| w.strong_count() > 0);
    }

    /// Number of entries, live or stale
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
