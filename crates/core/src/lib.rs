//! Twinsync Core - debounce and trigger scheduling for mirrored trees
//!
//! This crate provides the scheduling layer:
//! - Configuration model and TOML loader
//! - Indexed timer queue
//! - Path matching against replace pairs
//! - Trigger registry and debounce state machine

pub mod action;
pub mod config;
pub mod error;
pub mod matcher;
pub mod registry;
pub mod scheduler;
pub mod timer_queue;

// Re-export main types for convenience
pub use action::{ConfigSource, Mirror};
pub use config::{Config, ReplacePair, TomlConfigSource};
pub use error::{ConfigError, MirrorError};
pub use matcher::{PathMatch, PathMatcher};
pub use registry::{Expired, Phase, Registration, Target, TriggerRegistry};
pub use scheduler::{DebounceScheduler, DrainReport, ReloadOutcome};
pub use timer_queue::{TimerHandle, TimerQueue};
