use std::rc::Rc;

use super::controls::{ActionControl, CompositeControl, RowAction, TextControl, ToggleControl};
use super::coord::CellCoord;
use super::dropdown::{DropdownControl, OptionSource};
use super::registry::{CellControl, CellKind};
use super::value::GridRow;

/// What kind of control a column (or composite slot) mounts
#[derive(Debug, Clone)]
pub enum CellSpec {
    Text {
        field: String,
    },
    Number {
        field: String,
    },
    Toggle {
        field: String,
        on: String,
        off: String,
    },
    Dropdown {
        field: String,
        options: OptionSource,
    },
    /// Several controls packed into one visual column, one per slot
    Composite {
        slots: Vec<CellSpec>,
    },
    Action {
        label: String,
        action: RowAction,
    },
}

impl CellSpec {
    pub fn text(field: &str) -> Self {
        CellSpec::Text {
            field: field.into(),
        }
    }

    pub fn number(field: &str) -> Self {
        CellSpec::Number {
            field: field.into(),
        }
    }

    pub fn toggle(field: &str, on: &str, off: &str) -> Self {
        CellSpec::Toggle {
            field: field.into(),
            on: on.into(),
            off: off.into(),
        }
    }

    pub fn dropdown(field: &str, options: OptionSource) -> Self {
        CellSpec::Dropdown {
            field: field.into(),
            options,
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            CellSpec::Text { .. } => CellKind::Text,
            CellSpec::Number { .. } => CellKind::Number,
            CellSpec::Toggle { .. } => CellKind::Toggle,
            CellSpec::Dropdown { .. } => CellKind::Dropdown,
            CellSpec::Composite { .. } => CellKind::Composite,
            CellSpec::Action { .. } => CellKind::Action,
        }
    }

    /// Record field this cell edits; none for composites and row actions
    pub fn field(&self) -> Option<&str> {
        match self {
            CellSpec::Text { field }
            | CellSpec::Number { field }
            | CellSpec::Toggle { field, .. }
            | CellSpec::Dropdown { field, .. } => Some(field),
            CellSpec::Composite { .. } | CellSpec::Action { .. } => None,
        }
    }

    pub fn slot_count(&self) -> usize {
        match self {
            CellSpec::Composite { slots } => slots.len(),
            _ => 1,
        }
    }

    /// Build the control for this cell of `row`
    pub fn build(&self, coord: CellCoord, row: &dyn GridRow) -> Rc<dyn CellControl> {
        let row_id = row.row_id();
        match self {
            CellSpec::Text { field } | CellSpec::Number { field } => Rc::new(TextControl::new(
                coord,
                row_id,
                field.as_str(),
                self.kind(),
                row.cell_value(field),
            )),
            CellSpec::Toggle { field, on, off } => Rc::new(ToggleControl::new(
                coord,
                row_id,
                field.as_str(),
                row.cell_value(field).as_flag(),
                on.as_str(),
                off.as_str(),
            )),
            CellSpec::Dropdown { field, options } => {
                let value = row.cell_value(field).as_choice().map(String::from);
                Rc::new(DropdownControl::new(
                    coord,
                    row_id,
                    field.as_str(),
                    value,
                    options.options_for(row),
                ))
            }
            CellSpec::Composite { slots } => {
                let children = slots
                    .iter()
                    .enumerate()
                    .map(|(i, spec)| {
                        spec.build(CellCoord::with_slot(coord.row, coord.col, i), row)
                    })
                    .collect();
                Rc::new(CompositeControl::new(coord, children))
            }
            CellSpec::Action { label, action } => {
                Rc::new(ActionControl::new(coord, row_id, label.as_str(), *action))
            }
        }
    }
}

/// A visual column of the grid
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub title: String,
    /// Width in cells; 0 takes whatever space is left
    pub width: u16,
    pub cell: CellSpec,
}

impl ColumnSpec {
    pub fn new(title: &str, width: u16, cell: CellSpec) -> Self {
        ColumnSpec {
            title: title.into(),
            width,
            cell,
        }
    }

    pub fn is_flexible(&self) -> bool {
        self.width == 0
    }

    pub fn right_aligned(&self) -> bool {
        matches!(self.cell, CellSpec::Number { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::dropdown::DropdownOption;
    use crate::grid::value::{CellValue, RowId};

    struct Row;

    impl GridRow for Row {
        fn row_id(&self) -> RowId {
            RowId(4)
        }

        fn cell_value(&self, field: &str) -> CellValue {
            match field {
                "category" => CellValue::Choice(Some("food".into())),
                "income" => CellValue::Flag(true),
                _ => CellValue::Text(format!("<{field}>")),
            }
        }
    }

    #[test]
    fn builds_composite_with_slot_coordinates() {
        let spec = CellSpec::Composite {
            slots: vec![
                CellSpec::dropdown(
                    "category",
                    OptionSource::Static(vec![DropdownOption::new("food", "Food")]),
                ),
                CellSpec::dropdown(
                    "subcategory",
                    OptionSource::Derived(Rc::new(|row: &dyn GridRow| {
                        let parent = row.cell_value("category").as_text();
                        vec![DropdownOption::plain(format!("{parent}/a"))]
                    })),
                ),
            ],
        };
        let control = spec.build(CellCoord::new(2, 5), &Row);
        assert_eq!(control.kind(), CellKind::Composite);
        assert_eq!(control.slot_count(), 2);
        let sub = control.slot(1).unwrap();
        assert_eq!(sub.coord(), CellCoord::with_slot(2, 5, 1));
        assert_eq!(sub.options()[0].value, "food/a");
        assert_eq!(control.slot(0).unwrap().text(), "Food");
    }

    #[test]
    fn builds_toggle_from_flag() {
        let control = CellSpec::toggle("income", "+", "-").build(CellCoord::new(0, 3), &Row);
        assert_eq!(control.kind(), CellKind::Toggle);
        assert_eq!(control.text(), "+");
    }
}
