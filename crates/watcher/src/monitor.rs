//! Monitor startup
//!
//! Resolves the config path into a monitor root, starts watching it and loads
//! the config file once before handing over to the event loop. Any failure
//! here happens before the loop exists, so nothing needs tearing down.

use crate::error::WatchError;
use crate::event_loop::EventLoop;
use crate::mirror::FsMirror;
use crate::source::NotifySource;
use crate::visibility::VisibilityNotifier;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use twinsync_core::{Config, DebounceScheduler, ReloadOutcome, TomlConfigSource};

/// Event loop wired to the real filesystem
pub type FsEventLoop<V> = EventLoop<NotifySource, FsMirror, TomlConfigSource, V>;

/// A monitor ready to run
pub struct Monitor<V> {
    event_loop: FsEventLoop<V>,
}

impl<V: VisibilityNotifier> Monitor<V> {
    /// Prepare monitoring of the tree containing `config_path`
    pub fn start(config_path: &Path, notifier: V) -> Result<Self, WatchError> {
        let config = Config::from_config_path(config_path)?;
        let root = PathBuf::from(config.monitor_root());
        if !root.is_dir() {
            return Err(WatchError::NotADirectory(root));
        }

        info!(
            "Monitor path: \"{}\", config file: \"{}\"",
            config.monitor_root(),
            config.config_file()
        );

        let source = NotifySource::new(&root)?;
        let config_source = TomlConfigSource::new(config.config_path());
        let mut event_loop = EventLoop::new(
            DebounceScheduler::new(config),
            source,
            FsMirror::new(),
            config_source,
            notifier,
        );

        // A missing or broken file is tolerated; it is retried on every write
        if event_loop.reload_config() == ReloadOutcome::Failed {
            warn!("Starting with default settings until the config file loads");
        }

        Ok(Self { event_loop })
    }

    pub fn event_loop(&self) -> &FsEventLoop<V> {
        &self.event_loop
    }

    /// Run until monitoring fails, returning the reason
    pub fn run(mut self) -> WatchError {
        self.event_loop.run()
    }
}
