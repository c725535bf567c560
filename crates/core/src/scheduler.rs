//! Debounce state machine
//!
//! Drives each record through Pending -> Settling -> removed:
//! - A write creates a Pending record, or pushes an existing one back to
//!   Pending, due `trigger_delay` from now.
//! - When a Pending record falls due, its action runs once. Success moves it
//!   to Settling for `operation_delay`; failure drops it.
//! - When a Settling record falls due it is dropped without acting.
//!
//! Everything runs on the caller's thread; actions block until done.

use crate::action::{ConfigSource, Mirror};
use crate::config::Config;
use crate::matcher::{PathMatch, PathMatcher};
use crate::registry::{Phase, Registration, Target, TriggerRegistry};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of a config reload triggered by a config file write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Applied,
    Failed,
}

/// What one draining pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Successful mirror copies
    pub mirrored: usize,
    /// Records dropped because their action failed
    pub failed: usize,
    /// Records that finished settling
    pub completed: usize,
    /// Outcome of the last config reload in this pass, if any
    pub reload: Option<ReloadOutcome>,
    /// Time until the next record falls due
    pub next_wake: Option<Duration>,
}

/// Owns the registry and the active configuration
#[derive(Debug)]
pub struct DebounceScheduler {
    config: Config,
    registry: TriggerRegistry,
}

impl DebounceScheduler {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: TriggerRegistry::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Swap in a new configuration
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    /// Feed one modified path, relative to the monitor root
    ///
    /// Returns None when the path matches nothing.
    pub fn on_modified(&mut self, now: Instant, relative: &str) -> Option<Registration> {
        let (source, target) = match PathMatcher::new(&self.config).classify(relative) {
            PathMatch::Config { source } => (source, Target::Config),
            PathMatch::Mirror {
                source,
                destination,
            } => (source, Target::Mirror(destination)),
            PathMatch::NoMatch => return None,
        };

        let due = now + self.config.trigger_delay;
        let registration = self.registry.register(source, target, due);
        debug!("{relative}: {registration:?}");
        Some(registration)
    }

    /// Process every record due at or before `now`
    pub fn drain_due<M, C>(
        &mut self,
        now: Instant,
        mirror: &mut M,
        config_source: &C,
    ) -> DrainReport
    where
        M: Mirror + ?Sized,
        C: ConfigSource + ?Sized,
    {
        let mut report = DrainReport::default();

        while let Some(expired) = self.registry.next_expired(now) {
            if expired.phase == Phase::Settling {
                self.registry.remove(&expired.source);
                report.completed += 1;
                debug!("{}: settled", expired.source);
                continue;
            }

            let succeeded = match &expired.target {
                Target::Config => {
                    let outcome = self.reload(config_source);
                    report.reload = Some(outcome);
                    outcome == ReloadOutcome::Applied
                }
                Target::Mirror(destination) => {
                    let copied = mirror_one(mirror, &expired.source, destination);
                    if copied {
                        report.mirrored += 1;
                    }
                    copied
                }
            };

            if succeeded {
                let due = now + self.config.operation_delay;
                self.registry.settle(&expired.source, due);
            } else {
                self.registry.remove(&expired.source);
                report.failed += 1;
            }
        }

        report.next_wake = self.next_wake(now);
        report
    }

    /// Time from `now` until the next record falls due
    pub fn next_wake(&self, now: Instant) -> Option<Duration> {
        self.registry
            .next_due()
            .map(|due| due.saturating_duration_since(now))
    }

    /// Drop every record, returning how many were live
    pub fn shutdown(&mut self) -> usize {
        self.registry.clear()
    }

    /// Reload the configuration, keeping the current one on failure
    pub fn reload<C: ConfigSource + ?Sized>(&mut self, source: &C) -> ReloadOutcome {
        match source.reload(&self.config) {
            Ok(config) => {
                self.config = config;
                ReloadOutcome::Applied
            }
            Err(e) => {
                warn!("Loading config file failed, nothing has been changed: {}", e);
                ReloadOutcome::Failed
            }
        }
    }
}

fn mirror_one<M: Mirror + ?Sized>(mirror: &mut M, source: &str, destination: &str) -> bool {
    match mirror.copy(Path::new(source), Path::new(destination)) {
        Ok(()) => {
            info!("Mirrored {} -> {}", source, destination);
            true
        }
        Err(e) => {
            warn!("Mirror failed: {}", e);
            false
        }
    }
}
