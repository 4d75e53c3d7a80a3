//! Setup/initialization module - handles application startup tasks
//!
//! Includes:
//! - Logger initialization
//! - Folder structure initialization

use std::io::Write;

use anyhow::{Context, Result};
use env_logger::Builder;
use log::kv::Key;

use crate::config::BuildConfig;

/// Initialize the logger: timestamped lines, the kv `duration` field
/// rendered at the end of the message, rocket kept at WARN.
pub fn initialize_logger() {
    Builder::new()
        .format(|buf, record| {
            let ts = buf.timestamp();
            let level_style = buf.default_level_style(record.level());
            let duration = record
                .key_values()
                .get(Key::from("duration"))
                .map(|v| format!(" [{}]", v))
                .unwrap_or_default();
            writeln!(
                buf,
                "{} {}{:<5}{} {}{}",
                ts,
                level_style.render(),
                record.level(),
                level_style.render_reset(),
                record.args(),
                duration
            )
        })
        .filter(None, log::LevelFilter::Info)
        .filter(Some("rocket"), log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}

/// Create the cache and output directories up front; rocket's file server
/// refuses to mount a missing directory.
pub fn initialize_folder(config: &BuildConfig) -> Result<()> {
    std::fs::create_dir_all(&config.tmp_dir)
        .context(format!("failed to create {:?}", config.tmp_dir))?;
    std::fs::create_dir_all(&config.dist_dir)
        .context(format!("failed to create {:?}", config.dist_dir))?;
    Ok(())
}
