//! Notification sources
//!
//! The event loop blocks on a [`NotificationSource`] with an optional timeout.
//! [`NotifySource`] bridges the `notify` backend thread into the loop through
//! a crossbeam channel.

use crate::error::WatchError;
use crate::{EventKind, WatchEvent};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use notify::event::ModifyKind;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Source of raw change events for the monitored tree
pub trait NotificationSource {
    /// Block until events arrive or `timeout` elapses
    ///
    /// `None` waits indefinitely. A timeout yields an empty list.
    fn wait(&mut self, timeout: Option<Duration>) -> Result<Vec<WatchEvent>, WatchError>;

    /// Prepare for the next wait; failure is fatal for the loop
    fn rearm(&mut self) -> Result<(), WatchError>;
}

/// Recursive `notify` watcher over the monitor root
pub struct NotifySource {
    /// Keeps the backend alive; dropping it closes the channel
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
    root: PathBuf,
    /// Prefixes stripped from reported paths (as given, and canonical)
    prefixes: Vec<PathBuf>,
    disconnected: bool,
}

impl NotifySource {
    /// Start watching `root` recursively
    pub fn new(root: &Path) -> Result<Self, WatchError> {
        let (tx, rx) = crossbeam_channel::unbounded();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::WatchPath {
                path: root.to_path_buf(),
                source,
            })?;

        let mut prefixes = vec![root.to_path_buf()];
        if let Ok(canonical) = root.canonicalize() {
            if canonical != root {
                prefixes.push(canonical);
            }
        }

        debug!("Watching {}", root.display());

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            root: root.to_path_buf(),
            prefixes,
            disconnected: false,
        })
    }

    /// Watched directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collect(&self, result: notify::Result<Event>, events: &mut Vec<WatchEvent>) {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                warn!("Watch error: {}", e);
                return;
            }
        };

        let Some(kind) = event_kind(&event.kind) else {
            return;
        };

        for path in &event.paths {
            if let Some(relative) = self.relative(path) {
                events.push(WatchEvent::new(kind, relative));
            }
        }
    }

    /// Path relative to the root, None for the root itself or outside paths
    fn relative(&self, path: &Path) -> Option<String> {
        self.prefixes
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix).ok())
            .filter(|relative| !relative.as_os_str().is_empty())
            .map(|relative| relative.to_string_lossy().into_owned())
    }
}

impl NotificationSource for NotifySource {
    fn wait(&mut self, timeout: Option<Duration>) -> Result<Vec<WatchEvent>, WatchError> {
        let first = match timeout {
            Some(timeout) => match self.receiver.recv_timeout(timeout) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => return Ok(Vec::new()),
                Err(RecvTimeoutError::Disconnected) => {
                    self.disconnected = true;
                    return Err(WatchError::Disconnected);
                }
            },
            None => match self.receiver.recv() {
                Ok(result) => result,
                Err(_) => {
                    self.disconnected = true;
                    return Err(WatchError::Disconnected);
                }
            },
        };

        let mut events = Vec::new();
        self.collect(first, &mut events);
        // Take whatever else is already buffered
        while let Ok(result) = self.receiver.try_recv() {
            self.collect(result, &mut events);
        }
        Ok(events)
    }

    fn rearm(&mut self) -> Result<(), WatchError> {
        if self.disconnected {
            return Err(WatchError::Disconnected);
        }
        if !self.root.is_dir() {
            return Err(WatchError::RootVanished(self.root.clone()));
        }
        Ok(())
    }
}

/// Map a backend event kind onto ours; metadata and access changes are dropped
fn event_kind(kind: &notify::EventKind) -> Option<EventKind> {
    match kind {
        notify::EventKind::Create(_) => Some(EventKind::Create),
        notify::EventKind::Remove(_) => Some(EventKind::Delete),
        notify::EventKind::Modify(ModifyKind::Name(_)) => Some(EventKind::Rename),
        notify::EventKind::Modify(ModifyKind::Metadata(_)) => None,
        notify::EventKind::Modify(_) => Some(EventKind::Modify),
        notify::EventKind::Any => Some(EventKind::Modify),
        notify::EventKind::Access(_) | notify::EventKind::Other => None,
    }
}
