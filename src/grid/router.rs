use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, trace};

use super::coord::{CellCoord, Direction, GridDims};
use super::registry::CellKind;
use super::state::Action;
use super::value::RowSink;
use super::{GridEngine, GridError};

/// What the router did with a key
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Handled,
    /// The grid had no use for the key; the host may act on it
    Ignored,
    /// The key needed a control that is not mounted
    Swallowed,
    /// Commit refused; the editor stays open
    Rejected(GridError),
}

fn arrow(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

/// Copy/cut/paste chords belong to the terminal
fn is_clipboard_chord(key: &KeyEvent) -> bool {
    key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER)
        && matches!(
            key.code,
            KeyCode::Char('c' | 'v' | 'x' | 'C' | 'V' | 'X')
        )
}

fn is_printable(key: &KeyEvent) -> Option<char> {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) if !c.is_control() => Some(c),
        _ => None,
    }
}

impl GridEngine {
    /// Route a key press. Priority: open dropdown, then inline editor, then
    /// cell navigation.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        dims: GridDims,
        sink: &mut dyn RowSink,
    ) -> KeyOutcome {
        if matches!(key.code, KeyCode::Modifier(_)) || is_clipboard_chord(&key) {
            return KeyOutcome::Ignored;
        }
        let before = self.store.revision();
        let state = *self.store.state();
        let outcome = if state.active_dropdown.is_some() {
            self.route_dropdown(key, sink)
        } else if state.is_editing {
            self.route_editing(key, sink)
        } else {
            self.route_navigation(key, dims, sink)
        };
        // Controls dispatch straight into the store; catch up on their changes
        if self.store.revision() != before {
            self.after_transition(sink);
        }
        trace!(?key, ?outcome, "key routed");
        outcome
    }

    fn route_dropdown(&mut self, key: KeyEvent, sink: &mut dyn RowSink) -> KeyOutcome {
        let Some(active) = self.store.state().active_dropdown else {
            return KeyOutcome::Ignored;
        };
        match key.code {
            KeyCode::Up | KeyCode::Down => {
                let Some(control) = self.registry.resolve(active) else {
                    return KeyOutcome::Swallowed;
                };
                let direction = if key.code == KeyCode::Up {
                    Direction::Up
                } else {
                    Direction::Down
                };
                self.dispatch(
                    Action::HighlightDropdownOption {
                        direction,
                        options_count: control.option_count(),
                    },
                    sink,
                );
                KeyOutcome::Handled
            }
            KeyCode::Enter => {
                let Some(primary) = self.registry.lookup(active.row, active.col) else {
                    return KeyOutcome::Swallowed;
                };
                let state = *self.store.state();
                if primary.select_highlighted(&state, sink) {
                    self.dispatch(Action::SelectDropdownOption, sink);
                }
                KeyOutcome::Handled
            }
            KeyCode::Esc => {
                self.dispatch(Action::CloseActiveDropdown, sink);
                KeyOutcome::Handled
            }
            _ => {
                let Some(primary) = self.registry.lookup(active.row, active.col) else {
                    return KeyOutcome::Swallowed;
                };
                if primary.handle_key(key, &mut self.store, sink) {
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
        }
    }

    fn route_editing(&mut self, key: KeyEvent, sink: &mut dyn RowSink) -> KeyOutcome {
        match key.code {
            KeyCode::Enter => {
                let Some(session) = self.editor.take() else {
                    self.dispatch(Action::StopEditing, sink);
                    return KeyOutcome::Handled;
                };
                if let Err(e) = session.value() {
                    debug!(cell = %session.coord(), error = %e, "commit refused");
                    self.editor.restore(session);
                    return KeyOutcome::Rejected(e);
                }
                self.commit_session(session, sink);
                self.dispatch(Action::StopEditing, sink);
                KeyOutcome::Handled
            }
            KeyCode::Esc => {
                if let Some(session) = self.editor.take() {
                    trace!(cell = %session.coord(), "edit discarded");
                }
                self.dispatch(Action::StopEditing, sink);
                KeyOutcome::Handled
            }
            _ => match self.editor.session_mut() {
                Some(session) => {
                    if session.handle_key(key) {
                        KeyOutcome::Handled
                    } else {
                        KeyOutcome::Ignored
                    }
                }
                None => KeyOutcome::Swallowed,
            },
        }
    }

    fn route_navigation(
        &mut self,
        key: KeyEvent,
        dims: GridDims,
        sink: &mut dyn RowSink,
    ) -> KeyOutcome {
        let Some(focus) = self.store.state().focused_cell else {
            return KeyOutcome::Ignored;
        };

        if let Some(direction) = arrow(key.code) {
            self.dispatch(
                Action::MoveFocus {
                    direction,
                    max_rows: dims.rows,
                    max_cols: dims.cols,
                },
                sink,
            );
            return KeyOutcome::Handled;
        }

        match key.code {
            KeyCode::Tab => return self.tab(focus, dims, true, sink),
            KeyCode::BackTab => return self.tab(focus, dims, false, sink),
            _ => {}
        }

        let Some(control) = self.registry.resolve(focus) else {
            return KeyOutcome::Swallowed;
        };
        let coord = control.coord();
        let kind = control.kind();

        match key.code {
            KeyCode::Enter => {
                match kind {
                    CellKind::Toggle | CellKind::Action => {
                        control.activate(sink);
                    }
                    CellKind::Dropdown => {
                        self.dispatch(Action::ToggleDropdown(coord), sink);
                    }
                    CellKind::Composite => {
                        control.open_dropdown(&mut self.store);
                    }
                    CellKind::Text | CellKind::Number => {
                        self.dispatch(Action::StartOverwriteEditing(Some(coord)), sink);
                    }
                }
                KeyOutcome::Handled
            }
            KeyCode::F(2) if kind.is_editable() => {
                self.dispatch(Action::StartAppendEditing(Some(coord)), sink);
                KeyOutcome::Handled
            }
            KeyCode::Backspace | KeyCode::Delete if kind.is_editable() => {
                self.dispatch(Action::StartOverwriteEditing(Some(coord)), sink);
                if let Some(session) = self.editor.session_mut() {
                    session.backspace();
                }
                KeyOutcome::Handled
            }
            KeyCode::Char(' ') if kind == CellKind::Toggle && is_printable(&key).is_some() => {
                control.activate(sink);
                KeyOutcome::Handled
            }
            _ => match is_printable(&key) {
                Some(c) if kind.is_editable() => {
                    // Type-to-edit: open the editor, then let the key land in it
                    self.dispatch(Action::StartOverwriteEditing(Some(coord)), sink);
                    match self.editor.session_mut() {
                        Some(session) => {
                            session.insert_char(c);
                            KeyOutcome::Handled
                        }
                        None => KeyOutcome::Swallowed,
                    }
                }
                _ => KeyOutcome::Ignored,
            },
        }
    }

    /// Tab walks the slots of a composite cell before leaving it
    fn tab(
        &mut self,
        focus: CellCoord,
        dims: GridDims,
        forward: bool,
        sink: &mut dyn RowSink,
    ) -> KeyOutcome {
        let slots = self
            .registry
            .lookup(focus.row, focus.col)
            .map_or(1, |c| c.slot_count());
        let action = if forward && focus.slot + 1 < slots {
            Action::SetFocus(CellCoord::with_slot(focus.row, focus.col, focus.slot + 1))
        } else if !forward && focus.slot > 0 {
            Action::SetFocus(CellCoord::with_slot(focus.row, focus.col, focus.slot - 1))
        } else {
            Action::MoveFocus {
                direction: if forward {
                    Direction::Right
                } else {
                    Direction::Left
                },
                max_rows: dims.rows,
                max_cols: dims.cols,
            }
        };
        self.dispatch(action, sink);
        KeyOutcome::Handled
    }
}
