//! Error types for the watcher

use std::path::PathBuf;
use thiserror::Error;
use twinsync_core::ConfigError;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("monitor root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to create watcher: {0}")]
    WatcherCreation(#[from] notify::Error),

    #[error("failed to watch {}: {source}", path.display())]
    WatchPath {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("notification channel disconnected")]
    Disconnected,

    #[error("monitor root vanished: {}", .0.display())]
    RootVanished(PathBuf),
}
