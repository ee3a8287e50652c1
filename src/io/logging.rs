use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Filter directives are read from this variable
pub const FILTER_ENV: &str = "TALLY_LOG";
/// Log file used when `--log-file` is not given
pub const FILE_ENV: &str = "TALLY_LOG_FILE";

/// Install a `tracing` subscriber appending to `path`. The terminal belongs
/// to the TUI, so logs only ever go to a file; without one nothing is
/// installed and the macros stay no-ops.
pub fn init(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let from_env = std::env::var_os(FILE_ENV).map(std::path::PathBuf::from);
    let Some(path) = path.map(Path::to_path_buf).or(from_env) else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| e.to_string())?;
    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}
