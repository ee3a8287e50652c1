use serde::Serialize;

use crate::grid::value::format_number;
use crate::model::{Movement, MovementKind, Recurrence};
use crate::util::unicode::fit_to_width;

#[derive(Serialize)]
pub struct MovementJson<'a> {
    pub id: u64,
    pub date: String,
    pub description: &'a str,
    /// Signed: positive for income
    pub amount: f64,
    pub fixed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<&'a str>,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct TotalsJson {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
}

#[derive(Serialize)]
pub struct ListJson<'a> {
    pub movements: Vec<MovementJson<'a>>,
    pub totals: TotalsJson,
}

pub fn movement_to_json(m: &Movement) -> MovementJson<'_> {
    MovementJson {
        id: m.id.0,
        date: m.date.format("%Y-%m-%d").to_string(),
        description: &m.description,
        amount: m.signed_amount(),
        fixed: m.recurrence == Recurrence::Fixed,
        category: m.category.as_deref(),
        subcategory: m.subcategory.as_deref(),
        account: m.account.as_deref(),
        status: m.status.as_str(),
    }
}

pub fn totals_to_json(income: f64, expenses: f64) -> TotalsJson {
    TotalsJson {
        income,
        expenses,
        balance: income - expenses,
    }
}

/// One movement as a fixed-width line
pub fn format_movement_line(m: &Movement) -> String {
    let sign = match m.kind {
        MovementKind::Income => '+',
        MovementKind::Expense => '-',
    };
    let category = match (&m.category, &m.subcategory) {
        (Some(c), Some(s)) => format!("{c} / {s}"),
        (Some(c), None) => c.clone(),
        _ => String::new(),
    };
    format!(
        "{}  {}  {}{}  {}  {}",
        m.date.format("%Y-%m-%d"),
        fit_to_width(&m.description, 28, false),
        sign,
        fit_to_width(&format_number(m.amount), 11, true),
        fit_to_width(&category, 24, false),
        m.status.as_str(),
    )
    .trim_end()
    .to_string()
}

pub fn format_totals(income: f64, expenses: f64) -> String {
    format!(
        "income {}  expenses {}  balance {}",
        format_number(income),
        format_number(expenses),
        format_number(income - expenses)
    )
}
