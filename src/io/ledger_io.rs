use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::model::{Ledger, Movement};

/// Error type for ledger file operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not serialize ledger: {0}")]
    SerializeError(#[from] serde_json::Error),
}

pub const LEDGER_FILE: &str = "tally.json";

const FORMAT_VERSION: u32 = 1;

/// On-disk shape of the ledger
#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    movements: Vec<Movement>,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

/// Load the ledger at `path`. A missing file is an empty ledger.
pub fn read_ledger(path: &Path) -> Result<Ledger, LedgerError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no ledger file, starting empty");
            return Ok(Ledger::default());
        }
        Err(e) => {
            return Err(LedgerError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let file: LedgerFile = serde_json::from_str(&text).map_err(|e| LedgerError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), movements = file.movements.len(), "ledger loaded");
    Ok(Ledger::new(file.movements))
}

/// Save the ledger atomically (temp file in the same directory, then rename)
pub fn write_ledger(path: &Path, ledger: &Ledger) -> Result<(), LedgerError> {
    let file = LedgerFile {
        version: FORMAT_VERSION,
        movements: ledger.movements().to_vec(),
    };
    let mut content = serde_json::to_string_pretty(&file)?;
    content.push('\n');
    atomic_write(path, content.as_bytes()).map_err(|e| LedgerError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), "ledger saved");
    Ok(())
}

fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
