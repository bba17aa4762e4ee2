// File: ./src/logging.rs
// File logger for the command-line front end. Stdout carries command output only.
use crate::context::AppContext;
use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::OpenOptions;
use std::path::PathBuf;

/// Appends log records to `eventdesk.log` in the cache directory.
/// Returns the log path.
pub fn init(ctx: &dyn AppContext, level: LevelFilter) -> Result<PathBuf> {
    let path = ctx.get_log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_time_format_rfc3339()
        .add_filter_allow_str("eventdesk")
        .build();

    WriteLogger::init(level, config, file).context("Logger already initialised")?;
    log::debug!("logging to {:?} at {}", path, level);
    Ok(path)
}
