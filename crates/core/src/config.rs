//! Configuration model and TOML loader
//!
//! The config file lives at the root of the monitored tree and is itself
//! watched, so it can be edited while the monitor runs. A reload is applied
//! on top of the previous configuration: bad values and malformed pairs are
//! dropped one by one, while an unreadable or unparseable file changes nothing.

use crate::action::ConfigSource;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Smallest accepted `delay_after_triggered`
pub const MIN_TRIGGER_DELAY: Duration = Duration::from_millis(100);

/// Smallest accepted `delay_after_operation`
pub const MIN_OPERATION_DELAY: Duration = Duration::from_millis(100);

/// Positive auto-hide delays are raised to at least this value
pub const MIN_AUTO_HIDE_DELAY: Duration = Duration::from_millis(3);

/// Names (config file, replace pair halves) must be shorter than this, in bytes
pub const MAX_NAME_LEN: usize = 32;

/// Maximum number of replace pairs kept from one reload
pub const MAX_REPLACE_PAIRS: usize = 512;

/// Two directory or file names that are kept in sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacePair {
    /// Name on one side of the mirror
    pub original: String,
    /// Name on the other side
    pub replacement: String,
}

/// Reason a configured replace pair was dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairRejected {
    #[error("entry is not a two-name array")]
    NotAPair,

    #[error("names must not be empty")]
    Empty,

    #[error("names must differ")]
    Identical,

    #[error("name too long (max {} bytes)", MAX_NAME_LEN)]
    TooLong,
}

impl ReplacePair {
    /// Validate and build a pair
    pub fn new(
        original: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<Self, PairRejected> {
        let original = original.into();
        let replacement = replacement.into();

        if original.is_empty() || replacement.is_empty() {
            return Err(PairRejected::Empty);
        }
        if original == replacement {
            return Err(PairRejected::Identical);
        }
        if original.len() >= MAX_NAME_LEN || replacement.len() >= MAX_NAME_LEN {
            return Err(PairRejected::TooLong);
        }

        Ok(Self {
            original,
            replacement,
        })
    }
}

/// Effective monitor configuration
///
/// The monitor root and config file name are fixed at startup; everything
/// else is replaced wholesale on each reload.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Monitored directory, always ending with a path separator
    monitor_root: String,
    /// Config file name, relative to the monitor root
    config_file: String,
    /// Quiet period after the last write before the mirror runs
    pub trigger_delay: Duration,
    /// Cool-down after the mirror ran, during which writes restart the episode
    pub operation_delay: Duration,
    /// Time before the status indicator hides itself (zero: always shown)
    pub auto_hide_delay: Duration,
    /// Ordered pairs, first match wins
    pub replace_pairs: Vec<ReplacePair>,
}

impl Config {
    /// Create a configuration with default delays and no pairs
    pub fn new(monitor_root: impl AsRef<Path>, config_file: impl Into<String>) -> Self {
        let mut root = monitor_root.as_ref().to_string_lossy().into_owned();
        if !root.ends_with(std::path::is_separator) {
            root.push(MAIN_SEPARATOR);
        }

        Self {
            monitor_root: root,
            config_file: config_file.into(),
            trigger_delay: MIN_TRIGGER_DELAY,
            operation_delay: MIN_OPERATION_DELAY,
            auto_hide_delay: Duration::ZERO,
            replace_pairs: Vec::new(),
        }
    }

    /// Split a config file path into monitor root and config file name
    pub fn from_config_path(path: &Path) -> Result<Self, ConfigError> {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath);
        }

        let absolute = std::path::absolute(path).map_err(|_| ConfigError::InvalidPath {
            path: path.to_path_buf(),
        })?;

        let (Some(root), Some(name)) = (absolute.parent(), absolute.file_name()) else {
            return Err(ConfigError::InvalidPath { path: absolute });
        };

        let name = name.to_string_lossy().into_owned();
        if name.len() >= MAX_NAME_LEN {
            return Err(ConfigError::NameTooLong {
                name,
                max: MAX_NAME_LEN,
            });
        }

        Ok(Self::new(root, name))
    }

    /// Builder-style helper appending a validated pair
    pub fn with_replace_pair(
        mut self,
        original: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<Self, PairRejected> {
        self.replace_pairs
            .push(ReplacePair::new(original, replacement)?);
        Ok(self)
    }

    /// Monitored directory with a trailing separator
    pub fn monitor_root(&self) -> &str {
        &self.monitor_root
    }

    /// Config file name relative to the monitor root
    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Absolute path of the config file
    pub fn config_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.monitor_root, self.config_file))
    }

    /// Apply TOML `text` on top of this configuration
    pub fn apply_toml(&self, text: &str) -> Result<Config, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        let mut next = self.clone();

        let trigger_delay = delay_value("delay_after_triggered", &raw.delay_after_triggered);
        if let Some(delay) = trigger_delay.and_then(millis) {
            if delay >= MIN_TRIGGER_DELAY {
                next.trigger_delay = delay;
            }
        }

        let operation_delay = delay_value("delay_after_operation", &raw.delay_after_operation);
        if let Some(delay) = operation_delay.and_then(millis) {
            if delay >= MIN_OPERATION_DELAY {
                next.operation_delay = delay;
            }
        }

        if let Some(delay) = delay_value("delay_before_auto_hide", &raw.delay_before_auto_hide) {
            next.auto_hide_delay = match millis(delay) {
                Some(delay) if delay > Duration::ZERO => delay.max(MIN_AUTO_HIDE_DELAY),
                _ => Duration::ZERO,
            };
        }

        match raw.replace_pair {
            None => {}
            Some(toml::Value::Array(entries)) => next.replace_pairs = parse_pairs(entries),
            Some(_) => {
                warn!("`replace_pair` should be an array of name pairs, keeping previous pairs");
            }
        }

        Ok(next)
    }

    /// Log the effective values after a load
    pub fn log_summary(&self) {
        info!("`delay_after_triggered` is now {} ms", self.trigger_delay.as_millis());
        info!("`delay_after_operation` is now {} ms", self.operation_delay.as_millis());
        info!("`delay_before_auto_hide` is now {} ms", self.auto_hide_delay.as_millis());
        info!("Total `replace_pair` count is {}", self.replace_pairs.len());
    }
}

/// On-disk shape of the config file
///
/// Values stay untyped so one bad entry cannot fail the whole file.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    delay_after_triggered: Option<toml::Value>,
    delay_after_operation: Option<toml::Value>,
    delay_before_auto_hide: Option<toml::Value>,
    replace_pair: Option<toml::Value>,
}

/// Whole milliseconds from an integer or integral float
fn delay_value(key: &str, value: &Option<toml::Value>) -> Option<i64> {
    match value.as_ref()? {
        toml::Value::Integer(number) => Some(*number),
        toml::Value::Float(number) if number.is_finite() && number.fract() == 0.0 => {
            Some(*number as i64)
        }
        other => {
            warn!(
                "`{}` should be a whole number of milliseconds, got {}, keeping previous value",
                key,
                other.type_str()
            );
            None
        }
    }
}

fn millis(value: i64) -> Option<Duration> {
    u64::try_from(value).ok().map(Duration::from_millis)
}

fn parse_pairs(mut entries: Vec<toml::Value>) -> Vec<ReplacePair> {
    if entries.len() > MAX_REPLACE_PAIRS {
        warn!(
            "`replace_pair` has {} entries, only the first {} are used",
            entries.len(),
            MAX_REPLACE_PAIRS
        );
        entries.truncate(MAX_REPLACE_PAIRS);
    }

    let mut pairs = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match parse_pair(entry) {
            Ok(pair) => pairs.push(pair),
            Err(reason) => warn!("Dropping `replace_pair` entry {}: {}", index + 1, reason),
        }
    }
    pairs
}

fn parse_pair(entry: &toml::Value) -> Result<ReplacePair, PairRejected> {
    let toml::Value::Array(names) = entry else {
        return Err(PairRejected::NotAPair);
    };

    let first = names.first().and_then(name_of).ok_or(PairRejected::Empty)?;
    let second = names.get(1).and_then(name_of).ok_or(PairRejected::Empty)?;
    ReplacePair::new(first, second)
}

/// Scalar values are accepted as names, numbers included
fn name_of(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(name) => Some(name.clone()),
        toml::Value::Integer(number) => Some(number.to_string()),
        toml::Value::Float(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Loads the config file from disk
#[derive(Debug, Clone)]
pub struct TomlConfigSource {
    path: PathBuf,
}

impl TomlConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the config file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for TomlConfigSource {
    fn reload(&self, current: &Config) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;

        let config = current.apply_toml(&text)?;
        config.log_summary();
        Ok(config)
    }
}

/// Example config file, printed by `twinsync example`
pub const EXAMPLE_CONFIG: &str = r#"# twinsync configuration
# Place this file at the root of the tree to monitor.

# Quiet period (ms) after the last write before mirroring. Minimum 100.
delay_after_triggered = 300

# Cool-down (ms) after mirroring. Writes in this window restart the episode.
# Minimum 100.
delay_after_operation = 1000

# Hide the status indicator after this many ms. 0 keeps it shown.
delay_before_auto_hide = 0

# Name pairs kept in sync. A path segment named like one side is mirrored
# to the same path with the other side's name. First matching pair wins.
# Avoid names containing each other: only the first occurrence is considered.
replace_pair = [
    ["stable", "nightly"],
]
"#;
