use std::path::Path;

use chrono::{Datelike, Local, NaiveDate};

use crate::cli::commands::InitArgs;
use crate::grid::CellValue;
use crate::io::{config_io, ledger_io};
use crate::model::{Ledger, fields};

/// Example movements for `init --sample`, one per (day, description, amount,
/// income, category, subcategory)
const SAMPLE: &[(u32, &str, f64, bool, &str, &str)] = &[
    (1, "Salary", 2400.0, true, "Salary", ""),
    (2, "Rent", 950.0, false, "Home", "Rent"),
    (5, "Weekly shop", 86.4, false, "Food", "Groceries"),
];

fn sample_ledger(today: NaiveDate) -> Result<Ledger, Box<dyn std::error::Error>> {
    let mut ledger = Ledger::default();
    for &(day, description, amount, income, category, subcategory) in SAMPLE {
        let date = today.with_day(day).unwrap_or(today);
        let id = ledger.create(date);
        let Some(m) = ledger.get(id).cloned() else {
            continue;
        };
        let mut changes = vec![
            m.change(fields::DESCRIPTION, CellValue::Text(description.into())),
            m.change(fields::AMOUNT, CellValue::Number(amount)),
            m.change(fields::INCOME, CellValue::Flag(income)),
            m.change(fields::CATEGORY, CellValue::Choice(Some(category.into()))),
            m.change(fields::ACCOUNT, CellValue::Choice(Some("Checking".into()))),
        ];
        if !subcategory.is_empty() {
            changes.push(m.change(fields::SUBCATEGORY, CellValue::Choice(Some(subcategory.into()))));
        }
        for change in &changes {
            ledger.apply(change)?;
        }
    }
    Ok(ledger)
}

pub fn cmd_init(
    args: InitArgs,
    config_path: &Path,
    ledger_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if ledger_path.exists() {
        return Err(format!("{} already exists", ledger_path.display()).into());
    }
    config_io::write_template(config_path)?;

    let ledger = if args.sample {
        sample_ledger(Local::now().date_naive())?
    } else {
        Ledger::default()
    };
    ledger_io::write_ledger(ledger_path, &ledger)?;

    println!("Created {}", config_path.display());
    println!("Created {} ({} movements)", ledger_path.display(), ledger.len());
    Ok(())
}
