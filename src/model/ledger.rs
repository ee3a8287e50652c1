use std::rc::Rc;

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::grid::controls::RowAction;
use crate::grid::{
    CellSpec, ColumnSpec, DropdownOption, FieldChange, GridRow, OptionSource, RowId, RowSink,
};

use super::config::TallyConfig;
use super::movement::{FieldError, Movement, MovementKind, Status, fields};

/// The movements being edited, in display order
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    movements: Vec<Movement>,
    next_id: u64,
    dirty: bool,
    /// Messages for the status row (rejected edits)
    notices: Vec<String>,
}

impl Ledger {
    pub fn new(movements: Vec<Movement>) -> Self {
        let next_id = movements.iter().map(|m| m.id.0).max().unwrap_or(0) + 1;
        Ledger {
            movements,
            next_id,
            dirty: false,
            notices: Vec::new(),
        }
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    pub fn get(&self, id: RowId) -> Option<&Movement> {
        self.movements.iter().find(|m| m.id == id)
    }

    pub fn position(&self, id: RowId) -> Option<usize> {
        self.movements.iter().position(|m| m.id == id)
    }

    /// Apply a committed field value. Returns whether the movement changed.
    pub fn apply(&mut self, change: &FieldChange) -> Result<bool, FieldError> {
        let movement = self
            .movements
            .iter_mut()
            .find(|m| m.id == change.row_id)
            .ok_or(FieldError::UnknownRow(change.row_id))?;
        let changed = movement.apply(&change.field, &change.value)?;
        if changed {
            debug!(row = %change.row_id, field = %change.field, "movement updated");
            self.dirty = true;
        }
        Ok(changed)
    }

    /// Append an empty movement dated `date`
    pub fn create(&mut self, date: NaiveDate) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.movements.push(Movement::new(id, date));
        self.dirty = true;
        debug!(row = %id, "movement created");
        id
    }

    pub fn delete(&mut self, id: RowId) -> bool {
        let before = self.movements.len();
        self.movements.retain(|m| m.id != id);
        let removed = self.movements.len() != before;
        if removed {
            self.dirty = true;
            debug!(row = %id, "movement deleted");
        }
        removed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn push_notice(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// (income, expenses) over movements that are not cancelled
    pub fn totals(&self) -> (f64, f64) {
        self.movements
            .iter()
            .filter(|m| m.status != Status::Cancelled)
            .fold((0.0, 0.0), |(inc, exp), m| match m.kind {
                MovementKind::Income => (inc + m.amount, exp),
                MovementKind::Expense => (inc, exp + m.amount),
            })
    }
}

impl RowSink for Ledger {
    fn field_changed(&mut self, change: FieldChange) {
        if let Err(e) = self.apply(&change) {
            warn!(row = %change.row_id, field = %change.field, error = %e, "edit rejected");
            self.notices.push(e.to_string());
        }
    }

    fn delete_requested(&mut self, row_id: RowId) {
        self.delete(row_id);
    }

    fn create_requested(&mut self) {
        self.create(Local::now().date_naive());
    }
}

/// Column layout of the movements table
pub fn columns(config: &TallyConfig) -> Vec<ColumnSpec> {
    let categories: Vec<DropdownOption> = config
        .categories
        .iter()
        .map(|(name, cat)| {
            let mut option = DropdownOption::plain(name.as_str());
            if let Some(color) = &cat.color {
                option = option.with_color(color.as_str());
            }
            if cat.archived {
                option = option.disabled();
            }
            option
        })
        .collect();

    let config_for_subs = config.clone();
    let subcategories = OptionSource::Derived(Rc::new(move |row: &dyn GridRow| {
        let category = row.cell_value(fields::CATEGORY);
        match category.as_choice() {
            Some(name) => config_for_subs
                .subcategories(name)
                .iter()
                .map(|s| DropdownOption::plain(s.as_str()))
                .collect(),
            None => Vec::new(),
        }
    }));

    let accounts = config
        .accounts
        .iter()
        .map(|a| DropdownOption::plain(a.as_str()))
        .collect();

    let statuses = Status::ALL
        .into_iter()
        .map(|s| {
            let option = DropdownOption::new(s.as_str(), s.label());
            match s {
                Status::Pending => option.with_color("yellow"),
                Status::Paid => option.with_color("green"),
                Status::Cancelled => option.with_color("dim"),
            }
        })
        .collect();

    vec![
        ColumnSpec::new("Date", 10, CellSpec::text(fields::DATE)),
        ColumnSpec::new("Description", 0, CellSpec::text(fields::DESCRIPTION)),
        ColumnSpec::new("Amount", 10, CellSpec::number(fields::AMOUNT)),
        ColumnSpec::new("+/-", 3, CellSpec::toggle(fields::INCOME, "+", "-")),
        ColumnSpec::new("Rec", 3, CellSpec::toggle(fields::FIXED, "fix", "var")),
        ColumnSpec::new(
            "Category",
            25,
            CellSpec::Composite {
                slots: vec![
                    CellSpec::dropdown(fields::CATEGORY, OptionSource::Static(categories)),
                    CellSpec::dropdown(fields::SUBCATEGORY, subcategories),
                ],
            },
        ),
        ColumnSpec::new(
            "Account",
            10,
            CellSpec::dropdown(fields::ACCOUNT, OptionSource::Static(accounts)),
        ),
        ColumnSpec::new(
            "Status",
            9,
            CellSpec::dropdown(fields::STATUS, OptionSource::Static(statuses)),
        ),
        ColumnSpec::new(
            "",
            1,
            CellSpec::Action {
                label: "✕".into(),
                action: RowAction::Delete,
            },
        ),
    ]
}
