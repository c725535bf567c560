//! Side-effecting collaborators invoked by the scheduler

use crate::config::Config;
use crate::error::{ConfigError, MirrorError};
use std::path::Path;

/// Copies a changed source entry onto its mirrored destination
pub trait Mirror {
    /// Copy `source` (file or directory) to `destination`
    ///
    /// Fails with [`MirrorError::SourceMissing`] when the source vanished
    /// between the modification event and the copy.
    fn copy(&mut self, source: &Path, destination: &Path) -> Result<(), MirrorError>;
}

/// Produces a refreshed [`Config`] when the config file changes
pub trait ConfigSource {
    /// Reload configuration on top of `current`
    ///
    /// Values missing or invalid in the source keep their current value. An
    /// error means nothing was applied.
    fn reload(&self, current: &Config) -> Result<Config, ConfigError>;
}
