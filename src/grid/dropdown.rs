use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, trace};

use super::coord::{CellCoord, Direction};
use super::registry::{CellControl, CellKind};
use super::row::CellView;
use super::state::{Action, GridStore, InteractionState};
use super::value::{CellValue, FieldChange, GridRow, RowId, RowSink};

/// Maximum number of options shown at once in the floating list
pub const MAX_VISIBLE_OPTIONS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub value: String,
    pub label: String,
    /// Color name or `#RRGGBB`, resolved by the theme
    pub color_hint: Option<String>,
    pub disabled: bool,
}

impl DropdownOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        DropdownOption {
            value: value.into(),
            label: label.into(),
            color_hint: None,
            disabled: false,
        }
    }

    /// Option whose label is its value
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        DropdownOption::new(value.clone(), value)
    }

    pub fn with_color(mut self, hint: impl Into<String>) -> Self {
        self.color_hint = Some(hint.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Where a dropdown column gets its options from
#[derive(Clone)]
pub enum OptionSource {
    Static(Vec<DropdownOption>),
    /// Computed from the row (e.g. subcategories of the row's category)
    Derived(Rc<dyn Fn(&dyn GridRow) -> Vec<DropdownOption>>),
}

impl OptionSource {
    pub fn options_for(&self, row: &dyn GridRow) -> Vec<DropdownOption> {
        match self {
            OptionSource::Static(opts) => opts.clone(),
            OptionSource::Derived(f) => f(row),
        }
    }
}

impl fmt::Debug for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionSource::Static(opts) => f.debug_tuple("Static").field(opts).finish(),
            OptionSource::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// What a click on a dropdown trigger did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickEffect {
    Focused,
    Opened,
    Closed,
}

/// Selection widget whose open/highlight state lives entirely in the store
#[derive(Debug)]
pub struct DropdownControl {
    coord: CellCoord,
    row_id: RowId,
    field: String,
    value: Option<String>,
    options: Vec<DropdownOption>,
}

impl DropdownControl {
    pub fn new(
        coord: CellCoord,
        row_id: RowId,
        field: impl Into<String>,
        value: Option<String>,
        options: Vec<DropdownOption>,
    ) -> Self {
        DropdownControl {
            coord,
            row_id,
            field: field.into(),
            value,
            options,
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn selected_option(&self) -> Option<&DropdownOption> {
        let value = self.value.as_deref()?;
        self.options.iter().find(|o| o.value == value)
    }

    pub fn is_open(&self, state: &InteractionState) -> bool {
        state.is_dropdown_open(self.coord)
    }

    pub fn highlighted(&self, state: &InteractionState) -> Option<usize> {
        if self.is_open(state) {
            state.highlighted_option
        } else {
            None
        }
    }

    /// Spreadsheet click policy: the first click only selects the cell, a
    /// click on the already-focused cell opens or closes the list.
    pub fn click(&self, store: &mut GridStore) -> ClickEffect {
        if !store.state().is_focused(self.coord) {
            store.dispatch(Action::SetFocus(self.coord));
            return ClickEffect::Focused;
        }
        let was_open = self.is_open(store.state());
        store.dispatch(Action::ToggleDropdown(self.coord));
        if was_open {
            ClickEffect::Closed
        } else {
            ClickEffect::Opened
        }
    }

    /// Commit the option at `index`. Disabled or missing options are refused.
    /// Re-picking the current value is accepted without emitting a change.
    pub fn select_index(&self, index: usize, sink: &mut dyn RowSink) -> bool {
        let Some(option) = self.options.get(index) else {
            trace!(index, coord = %self.coord, "no such option");
            return false;
        };
        if option.disabled {
            trace!(index, coord = %self.coord, "disabled option ignored");
            return false;
        }
        if self.value.as_deref() == Some(option.value.as_str()) {
            return true;
        }
        debug!(row = %self.row_id, field = %self.field, value = %option.value, "option selected");
        sink.field_changed(FieldChange {
            row_id: self.row_id,
            field: self.field.clone(),
            value: CellValue::Choice(Some(option.value.clone())),
        });
        true
    }

    /// Move the highlight to `target` one step at a time through the store
    fn highlight_to(&self, target: usize, store: &mut GridStore) {
        let count = self.options.len();
        if count == 0 {
            return;
        }
        let target = target.min(count - 1);
        for _ in 0..count {
            let current = store.state().highlighted_option.unwrap_or(0);
            let direction = match current.cmp(&target) {
                std::cmp::Ordering::Less => Direction::Down,
                std::cmp::Ordering::Greater => Direction::Up,
                std::cmp::Ordering::Equal => return,
            };
            store.dispatch(Action::HighlightDropdownOption {
                direction,
                options_count: count,
            });
        }
    }

    /// Next option after the highlight whose label starts with `c`, wrapping
    fn type_ahead(&self, c: char, from: usize) -> Option<usize> {
        let count = self.options.len();
        let needle = c.to_lowercase().to_string();
        (1..=count).map(|i| (from + i) % count).find(|&i| {
            self.options[i].label.to_lowercase().starts_with(&needle)
        })
    }
}

impl CellControl for DropdownControl {
    fn coord(&self) -> CellCoord {
        self.coord
    }

    fn kind(&self) -> CellKind {
        CellKind::Dropdown
    }

    fn text(&self) -> String {
        self.selected_option()
            .map(|o| o.label.clone())
            .or_else(|| self.value.clone())
            .unwrap_or_default()
    }

    fn view(&self, state: &InteractionState) -> CellView {
        CellView::Dropdown {
            label: self.text(),
            open: self.is_open(state),
            color_hint: self.selected_option().and_then(|o| o.color_hint.clone()),
        }
    }

    fn on_click(&self, store: &mut GridStore) -> bool {
        self.click(store);
        true
    }

    fn open_dropdown(&self, store: &mut GridStore) -> bool {
        if self.is_open(store.state()) {
            return false;
        }
        store.dispatch(Action::ToggleDropdown(self.coord))
    }

    fn close_dropdown(&self, store: &mut GridStore) -> bool {
        if !self.is_open(store.state()) {
            return false;
        }
        store.dispatch(Action::CloseActiveDropdown)
    }

    fn select_highlighted(&self, state: &InteractionState, sink: &mut dyn RowSink) -> bool {
        match self.highlighted(state) {
            Some(index) => self.select_index(index, sink),
            None => false,
        }
    }

    fn handle_key(&self, key: KeyEvent, store: &mut GridStore, _sink: &mut dyn RowSink) -> bool {
        if !self.is_open(store.state()) || self.options.is_empty() {
            return false;
        }
        let current = store.state().highlighted_option.unwrap_or(0);
        let last = self.options.len() - 1;
        let target = match (key.modifiers, key.code) {
            (_, KeyCode::PageDown) => current + MAX_VISIBLE_OPTIONS,
            (_, KeyCode::PageUp) => current.saturating_sub(MAX_VISIBLE_OPTIONS),
            (_, KeyCode::Home) => 0,
            (_, KeyCode::End) => last,
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                match self.type_ahead(c, current) {
                    Some(i) => i,
                    None => return true,
                }
            }
            _ => return false,
        };
        self.highlight_to(target, store);
        true
    }

    fn option_count(&self) -> usize {
        self.options.len()
    }

    fn options(&self) -> &[DropdownOption] {
        &self.options
    }

    fn select_option(&self, index: usize, sink: &mut dyn RowSink) -> bool {
        self.select_index(index, sink)
    }
}

/// Index range of the options visible in a list of `max_visible` rows,
/// scrolled so the highlighted option stays in view
pub fn visible_window(highlight: Option<usize>, count: usize, max_visible: usize) -> Range<usize> {
    let selected = highlight.unwrap_or(0);
    let start = if selected >= max_visible {
        selected + 1 - max_visible
    } else {
        0
    };
    let end = (start + max_visible).min(count);
    start.min(end)..end
}
