//! File system side of twinsync
//!
//! This crate connects the scheduling core to the machine:
//! - `notify`-backed notification source
//! - Filesystem mirror (files and whole directories)
//! - Status indicator visibility
//! - The event loop and monitor startup

pub mod error;
pub mod event_loop;
pub mod mirror;
pub mod monitor;
pub mod source;
pub mod visibility;

pub use error::WatchError;
pub use event_loop::{Clock, EventLoop, SystemClock};
pub use mirror::FsMirror;
pub use monitor::Monitor;
pub use source::{NotificationSource, NotifySource};
pub use visibility::{Visibility, VisibilityNotifier, VisibilityState};

/// File system event, relative to the monitor root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Path that changed, relative to the monitor root
    pub path: String,
    /// Type of change
    pub kind: EventKind,
}

impl WatchEvent {
    pub fn new(kind: EventKind, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Type of file system event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// File created
    Create,
    /// File content modified
    Modify,
    /// File deleted
    Delete,
    /// File renamed
    Rename,
}
