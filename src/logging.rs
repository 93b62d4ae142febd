use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Initialize tracing to a log file under the config directory. The TUI
/// owns the terminal, so nothing may be written to stdout/stderr while
/// it runs. Filter comes from `FLOWCHAT_LOG` (default: info for this
/// crate). Returns the log file path for the startup message.
pub fn init() -> Result<PathBuf> {
    let log_dir = Config::config_dir()?;
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("flowchat.log");

    let file = File::options().create(true).append(true).open(&log_path)?;

    let filter = EnvFilter::try_from_env("FLOWCHAT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("flowchat=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .compact()
        .init();

    Ok(log_path)
}
