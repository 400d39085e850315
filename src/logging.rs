// Logging setup
//
// The dashboard owns the terminal, so it logs to a file. The plain CLI
// subcommands and the fixture server log to stderr. `RUST_LOG` wins over the
// configured level when set.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("tenant_ledger={level},ledger_server={level},warn"))
    })
}

/// Log to stderr
pub fn init_stderr(config: &LoggingConfig) {
    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Log to the configured file, creating parent directories as needed.
///
/// Returns the path actually used.
pub fn init_file(config: &LoggingConfig) -> Result<PathBuf> {
    let path = config.file_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();

    Ok(path)
}
