pub mod config_io;
pub mod ledger_io;
pub mod logging;
