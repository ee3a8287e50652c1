use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a row record, owned by the data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A field value as the grid sees it
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Flag(bool),
    /// Dropdown value (`None` = nothing picked)
    Choice(Option<String>),
}

impl CellValue {
    /// Plain text form, used to seed the inline editor
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Flag(b) => b.to_string(),
            CellValue::Choice(c) => c.clone().unwrap_or_default(),
        }
    }

    pub fn as_flag(&self) -> bool {
        matches!(self, CellValue::Flag(true))
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            CellValue::Choice(c) => c.as_deref(),
            CellValue::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// Two decimals, trailing zeros kept (amounts are the common case)
pub fn format_number(n: f64) -> String {
    format!("{:.2}", n)
}

/// "field X of row Y changed to V"
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub row_id: RowId,
    pub field: String,
    pub value: CellValue,
}

/// Receives commits from the grid. The grid never waits on it and never reads
/// its result; it reflects local edits optimistically.
pub trait RowSink {
    fn field_changed(&mut self, change: FieldChange);

    /// A row action (delete button) was activated
    fn delete_requested(&mut self, _row_id: RowId) {}

    /// The host asked for a new row
    fn create_requested(&mut self) {}
}

/// Read access to one row record
pub trait GridRow {
    fn row_id(&self) -> RowId;
    fn cell_value(&self, field: &str) -> CellValue;
}

/// A sink that records everything it is told. Handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub changes: Vec<FieldChange>,
    pub deleted: Vec<RowId>,
    pub created: usize,
}

impl RowSink for RecordingSink {
    fn field_changed(&mut self, change: FieldChange) {
        self.changes.push(change);
    }

    fn delete_requested(&mut self, row_id: RowId) {
        self.deleted.push(row_id);
    }

    fn create_requested(&mut self) {
        self.created += 1;
    }
}
