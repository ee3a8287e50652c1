use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::io::config_io::CONFIG_FILE;
use crate::io::ledger_io::LEDGER_FILE;

#[derive(Parser)]
#[command(name = "tally", about = concat!("tally v", env!("CARGO_PKG_VERSION"), " - money movements in a terminal spreadsheet"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Ledger file to edit
    #[arg(short = 'l', long, global = true, default_value = LEDGER_FILE)]
    pub ledger: PathBuf,

    /// Config file with categories, accounts and colors
    #[arg(short = 'c', long, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Append diagnostic logs to this file (filter with TALLY_LOG)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter config and an empty ledger
    Init(InitArgs),
    /// Print the movements
    List(ListArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Also add a couple of example movements
    #[arg(long)]
    pub sample: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Only movements with this status (pending, paid, cancelled)
    #[arg(long)]
    pub status: Option<String>,
}
