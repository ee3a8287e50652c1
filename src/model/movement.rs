use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::grid::{CellValue, FieldChange, GridRow, RowId};

/// Field names shared by the columns and [`Movement::apply`]
pub mod fields {
    pub const DATE: &str = "date";
    pub const DESCRIPTION: &str = "description";
    pub const AMOUNT: &str = "amount";
    pub const INCOME: &str = "income";
    pub const FIXED: &str = "fixed";
    pub const CATEGORY: &str = "category";
    pub const SUBCATEGORY: &str = "subcategory";
    pub const ACCOUNT: &str = "account";
    pub const STATUS: &str = "status";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    #[default]
    Expense,
    Income,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    Variable,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::Paid, Status::Cancelled];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Paid => "paid",
            Status::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Paid => "Paid",
            Status::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        Status::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

/// A field update the ledger refused
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("no movement {0}")]
    UnknownRow(RowId),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("unknown status: {0}")]
    UnknownStatus(String),
    #[error("{field} cannot hold {value:?}")]
    WrongType { field: String, value: CellValue },
}

/// One financial movement (a row of the table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: RowId,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub kind: MovementKind,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default)]
    pub status: Status,
}

impl Movement {
    pub fn new(id: RowId, date: NaiveDate) -> Self {
        Movement {
            id,
            date,
            description: String::new(),
            amount: 0.0,
            kind: MovementKind::default(),
            recurrence: Recurrence::default(),
            category: None,
            subcategory: None,
            account: None,
            status: Status::default(),
        }
    }

    /// Amount with the sign implied by the kind
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            MovementKind::Income => self.amount,
            MovementKind::Expense => -self.amount,
        }
    }

    /// A change addressed to this movement
    pub fn change(&self, field: &str, value: CellValue) -> FieldChange {
        FieldChange {
            row_id: self.id,
            field: field.to_string(),
            value,
        }
    }

    /// Apply a committed cell value. Returns whether anything changed.
    /// Picking a different category clears the subcategory.
    pub fn apply(&mut self, field: &str, value: &CellValue) -> Result<bool, FieldError> {
        let wrong_type = || FieldError::WrongType {
            field: field.to_string(),
            value: value.clone(),
        };
        let before = self.clone();
        match (field, value) {
            (fields::DATE, CellValue::Text(s)) => self.date = parse_date(s)?,
            (fields::DESCRIPTION, CellValue::Text(s)) => self.description = s.trim().to_string(),
            (fields::AMOUNT, CellValue::Number(n)) => self.amount = *n,
            (fields::INCOME, CellValue::Flag(on)) => {
                self.kind = if *on {
                    MovementKind::Income
                } else {
                    MovementKind::Expense
                }
            }
            (fields::FIXED, CellValue::Flag(on)) => {
                self.recurrence = if *on {
                    Recurrence::Fixed
                } else {
                    Recurrence::Variable
                }
            }
            (fields::CATEGORY, CellValue::Choice(c)) => {
                if self.category != *c {
                    self.subcategory = None;
                }
                self.category = c.clone();
            }
            (fields::SUBCATEGORY, CellValue::Choice(c)) => self.subcategory = c.clone(),
            (fields::ACCOUNT, CellValue::Choice(c)) => self.account = c.clone(),
            (fields::STATUS, CellValue::Choice(Some(s))) => {
                self.status = Status::parse(s).ok_or_else(|| FieldError::UnknownStatus(s.clone()))?
            }
            (
                fields::DATE
                | fields::DESCRIPTION
                | fields::AMOUNT
                | fields::INCOME
                | fields::FIXED
                | fields::CATEGORY
                | fields::SUBCATEGORY
                | fields::ACCOUNT
                | fields::STATUS,
                _,
            ) => return Err(wrong_type()),
            _ => return Err(FieldError::UnknownField(field.to_string())),
        }
        Ok(*self != before)
    }
}

/// Accepts ISO dates and day-first `DD/MM/YYYY`
pub fn parse_date(s: &str) -> Result<NaiveDate, FieldError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .map_err(|_| FieldError::InvalidDate(s.to_string()))
}

impl GridRow for Movement {
    fn row_id(&self) -> RowId {
        self.id
    }

    fn cell_value(&self, field: &str) -> CellValue {
        match field {
            fields::DATE => CellValue::Text(self.date.format("%Y-%m-%d").to_string()),
            fields::DESCRIPTION => CellValue::Text(self.description.clone()),
            fields::AMOUNT => CellValue::Number(self.amount),
            fields::INCOME => CellValue::Flag(self.kind == MovementKind::Income),
            fields::FIXED => CellValue::Flag(self.recurrence == Recurrence::Fixed),
            fields::CATEGORY => CellValue::Choice(self.category.clone()),
            fields::SUBCATEGORY => CellValue::Choice(self.subcategory.clone()),
            fields::ACCOUNT => CellValue::Choice(self.account.clone()),
            fields::STATUS => CellValue::Choice(Some(self.status.as_str().to_string())),
            _ => CellValue::Text(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement() -> Movement {
        let mut m = Movement::new(RowId(1), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        m.category = Some("Food".into());
        m.subcategory = Some("Groceries".into());
        m.amount = 20.0;
        m
    }

    #[test]
    fn changing_category_clears_subcategory() {
        let mut m = movement();
        let changed = m
            .apply(fields::CATEGORY, &CellValue::Choice(Some("Home".into())))
            .unwrap();
        assert!(changed);
        assert_eq!(m.category.as_deref(), Some("Home"));
        assert_eq!(m.subcategory, None);
    }

    #[test]
    fn same_category_keeps_subcategory() {
        let mut m = movement();
        let changed = m
            .apply(fields::CATEGORY, &CellValue::Choice(Some("Food".into())))
            .unwrap();
        assert!(!changed);
        assert_eq!(m.subcategory.as_deref(), Some("Groceries"));
    }

    #[test]
    fn toggles_map_to_enums() {
        let mut m = movement();
        m.apply(fields::INCOME, &CellValue::Flag(true)).unwrap();
        m.apply(fields::FIXED, &CellValue::Flag(true)).unwrap();
        assert_eq!(m.kind, MovementKind::Income);
        assert_eq!(m.recurrence, Recurrence::Fixed);
        assert_eq!(m.signed_amount(), 20.0);
        assert_eq!(m.cell_value(fields::INCOME), CellValue::Flag(true));
    }

    #[test]
    fn dates_in_two_formats() {
        let mut m = movement();
        m.apply(fields::DATE, &CellValue::Text("15/04/2024".into())).unwrap();
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
        let err = m
            .apply(fields::DATE, &CellValue::Text("tomorrow".into()))
            .unwrap_err();
        assert_eq!(err, FieldError::InvalidDate("tomorrow".into()));
    }

    #[test]
    fn rejects_wrong_types_and_fields() {
        let mut m = movement();
        assert!(matches!(
            m.apply(fields::AMOUNT, &CellValue::Text("x".into())),
            Err(FieldError::WrongType { .. })
        ));
        assert_eq!(
            m.apply("colour", &CellValue::Flag(true)),
            Err(FieldError::UnknownField("colour".into()))
        );
        assert_eq!(
            m.apply(fields::STATUS, &CellValue::Choice(Some("lost".into()))),
            Err(FieldError::UnknownStatus("lost".into()))
        );
    }

    #[test]
    fn status_round_trips_through_cells() {
        let mut m = movement();
        m.apply(fields::STATUS, &CellValue::Choice(Some("paid".into())))
            .unwrap();
        assert_eq!(m.status, Status::Paid);
        assert_eq!(
            m.cell_value(fields::STATUS),
            CellValue::Choice(Some("paid".into()))
        );
    }

    #[test]
    fn serde_defaults_on_minimal_object() {
        let m: Movement = serde_json::from_str(r#"{"id":3,"date":"2024-01-02"}"#).unwrap();
        assert_eq!(m.id, RowId(3));
        assert_eq!(m.kind, MovementKind::Expense);
        assert_eq!(m.status, Status::Pending);
        assert!(m.category.is_none());
    }
}
