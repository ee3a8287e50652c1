pub mod config;
pub mod ledger;
pub mod movement;

pub use config::*;
pub use ledger::Ledger;
pub use movement::*;
