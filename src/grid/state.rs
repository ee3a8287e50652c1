use tracing::trace;

use super::coord::{CellCoord, Direction};

/// How an inline edit was entered; decides the initial caret placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Entered by typing: the existing value is selected and replaced
    #[default]
    Overwrite,
    /// Entered by an explicit edit gesture: caret at the end, value kept
    Append,
}

/// The single source of truth for focus, editing and dropdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub focused_cell: Option<CellCoord>,
    pub is_editing: bool,
    pub edit_mode: EditMode,
    /// At most one dropdown in the whole grid can be open
    pub active_dropdown: Option<CellCoord>,
    /// Keyboard-highlighted option of the open dropdown (`None` = nothing)
    pub highlighted_option: Option<usize>,
}

impl InteractionState {
    /// The initial state with focus placed on `cell`
    pub fn focused_on(cell: CellCoord) -> Self {
        InteractionState {
            focused_cell: Some(cell),
            ..Default::default()
        }
    }

    pub fn is_focused(&self, cell: CellCoord) -> bool {
        self.focused_cell == Some(cell)
    }

    pub fn is_editing_cell(&self, cell: CellCoord) -> bool {
        self.is_editing && self.focused_cell == Some(cell)
    }

    pub fn is_dropdown_open(&self, cell: CellCoord) -> bool {
        self.active_dropdown == Some(cell)
    }

    /// Check the structural invariants. Used by tests and debug assertions.
    pub fn is_consistent(&self) -> bool {
        if self.is_editing && self.focused_cell.is_none() {
            return false;
        }
        if let Some(dd) = self.active_dropdown {
            if self.focused_cell != Some(dd) || self.is_editing {
                return false;
            }
        } else if self.highlighted_option.is_some() {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetFocus(CellCoord),
    MoveFocus {
        direction: Direction,
        max_rows: usize,
        max_cols: usize,
    },
    StartEditing {
        cell: Option<CellCoord>,
        initial_value: Option<String>,
        mode: Option<EditMode>,
    },
    StartOverwriteEditing(Option<CellCoord>),
    StartAppendEditing(Option<CellCoord>),
    StopEditing,
    ToggleDropdown(CellCoord),
    CloseActiveDropdown,
    HighlightDropdownOption {
        direction: Direction,
        options_count: usize,
    },
    SelectDropdownOption,
}

/// Pure transition function. Total over every state/action pair: anything
/// that does not apply returns the state unchanged.
pub fn transition(state: &InteractionState, action: &Action) -> InteractionState {
    match action {
        Action::SetFocus(cell) => {
            if state.focused_cell == Some(*cell) {
                *state
            } else {
                InteractionState::focused_on(*cell)
            }
        }
        Action::MoveFocus {
            direction,
            max_rows,
            max_cols,
        } => move_focus(state, *direction, *max_rows, *max_cols),
        Action::StartEditing { cell, mode, .. } => {
            let Some(target) = cell.or(state.focused_cell) else {
                return *state;
            };
            if state.is_editing_cell(target) {
                return *state;
            }
            editing_state(target, mode.unwrap_or_default())
        }
        Action::StartOverwriteEditing(cell) => {
            force_editing(state, *cell, EditMode::Overwrite)
        }
        Action::StartAppendEditing(cell) => force_editing(state, *cell, EditMode::Append),
        Action::StopEditing => {
            if !state.is_editing {
                return *state;
            }
            InteractionState {
                is_editing: false,
                ..*state
            }
        }
        Action::ToggleDropdown(cell) => {
            if state.active_dropdown == Some(*cell) {
                InteractionState::focused_on(*cell)
            } else {
                InteractionState {
                    focused_cell: Some(*cell),
                    active_dropdown: Some(*cell),
                    highlighted_option: Some(0),
                    ..Default::default()
                }
            }
        }
        Action::CloseActiveDropdown | Action::SelectDropdownOption => {
            if state.active_dropdown.is_none() {
                return *state;
            }
            InteractionState {
                active_dropdown: None,
                highlighted_option: None,
                ..*state
            }
        }
        Action::HighlightDropdownOption {
            direction,
            options_count,
        } => {
            if state.active_dropdown.is_none() || *options_count == 0 {
                return *state;
            }
            let last = options_count - 1;
            let next = match (state.highlighted_option, direction) {
                (None, Direction::Up | Direction::Down) => 0,
                (Some(i), Direction::Up) => i.saturating_sub(1).min(last),
                (Some(i), Direction::Down) => (i + 1).min(last),
                (_, Direction::Left | Direction::Right) => return *state,
            };
            InteractionState {
                highlighted_option: Some(next),
                ..*state
            }
        }
    }
}

fn editing_state(target: CellCoord, mode: EditMode) -> InteractionState {
    InteractionState {
        focused_cell: Some(target),
        is_editing: true,
        edit_mode: mode,
        active_dropdown: None,
        highlighted_option: None,
    }
}

/// Overwrite/Append variants may switch the mode of an edit already running
/// on the same cell; only the exact same combination is a no-op.
fn force_editing(
    state: &InteractionState,
    cell: Option<CellCoord>,
    mode: EditMode,
) -> InteractionState {
    let Some(target) = cell.or(state.focused_cell) else {
        return *state;
    };
    if state.is_editing_cell(target) && state.edit_mode == mode {
        return *state;
    }
    editing_state(target, mode)
}

fn move_focus(
    state: &InteractionState,
    direction: Direction,
    max_rows: usize,
    max_cols: usize,
) -> InteractionState {
    let Some(current) = state.focused_cell else {
        return *state;
    };
    if max_rows == 0 || max_cols == 0 {
        return *state;
    }
    // A stale focus (rows removed under it) is pulled back inside first
    let row = current.row.min(max_rows - 1);
    let col = current.col.min(max_cols - 1);
    let (row, col) = match direction {
        Direction::Up => (row.saturating_sub(1), col),
        Direction::Down => ((row + 1).min(max_rows - 1), col),
        Direction::Left => (row, col.saturating_sub(1)),
        Direction::Right => (row, (col + 1).min(max_cols - 1)),
    };
    if row == current.row && col == current.col {
        return *state;
    }
    InteractionState::focused_on(CellCoord::new(row, col))
}

/// Owns the interaction state and is the only path that mutates it
#[derive(Debug, Default)]
pub struct GridStore {
    state: InteractionState,
    /// Initial editor text handed over by `StartEditing`
    editor_seed: Option<String>,
    revision: u64,
}

impl GridStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Bumped on every effective transition; lets the host skip redraws
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply an action. Returns false when the action was a no-op, in which
    /// case the stored state is left untouched.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let next = transition(&self.state, &action);
        debug_assert!(next.is_consistent(), "inconsistent state after {action:?}");
        if next == self.state {
            trace!(?action, "no-op transition");
            return false;
        }
        trace!(?action, from = ?self.state, to = ?next, "transition");
        if let Action::StartEditing {
            initial_value: Some(seed),
            ..
        } = action
        {
            self.editor_seed = Some(seed);
        }
        self.state = next;
        self.revision += 1;
        true
    }

    /// Drop focus entirely (the grid lost all its rows)
    pub fn reset(&mut self) {
        if self.state != InteractionState::default() {
            self.state = InteractionState::default();
            self.revision += 1;
        }
        self.editor_seed = None;
    }

    /// Take the seed left by the last `StartEditing`, if any
    pub fn take_editor_seed(&mut self) -> Option<String> {
        self.editor_seed.take()
    }
}
