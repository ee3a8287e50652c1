mod init;
pub use init::cmd_init;

use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::ledger_io;
use crate::model::{Movement, Status};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        None => crate::tui::run(&cli.ledger, &cli.config),
        Some(Commands::Init(args)) => cmd_init(args, &cli.config, &cli.ledger),
        Some(Commands::List(args)) => cmd_list(args, &cli.ledger),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, ledger_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = ledger_io::read_ledger(ledger_path)?;
    let status = args
        .status
        .as_deref()
        .map(|s| Status::parse(s).ok_or_else(|| format!("unknown status: {s}")))
        .transpose()?;
    let movements: Vec<&Movement> = ledger
        .movements()
        .iter()
        .filter(|m| status.is_none_or(|s| m.status == s))
        .collect();
    let (income, expenses) = ledger.totals();

    if args.json {
        let out = ListJson {
            movements: movements.iter().map(|m| movement_to_json(m)).collect(),
            totals: totals_to_json(income, expenses),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for m in &movements {
            println!("{}", format_movement_line(m));
        }
        if !movements.is_empty() {
            println!();
        }
        println!("{}", format_totals(income, expenses));
    }
    Ok(())
}
