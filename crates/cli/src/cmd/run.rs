//! Watch a tree and mirror modified files

use crate::indicator::ConsoleIndicator;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::info;
use twinsync_watcher::Monitor;

/// Runs until monitoring stops
///
/// Losing the tree or the notification channel ends the run without an
/// error exit; startup problems are reported as errors.
pub fn run(config_path: &Path) -> Result<()> {
    let monitor = Monitor::start(config_path, ConsoleIndicator::new())
        .with_context(|| format!("Failed to start monitoring {}", config_path.display()))?;

    info!("Press Ctrl-C to stop");
    let reason = monitor.run();
    println!("{} Monitoring stopped: {}", "✗".red(), reason);

    Ok(())
}
