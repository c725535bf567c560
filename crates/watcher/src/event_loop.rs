//! The monitor's single control loop
//!
//! Each iteration blocks on the notification source until events arrive, the
//! next record falls due, or the indicator countdown runs out. Content
//! modifications are fed to the scheduler, due records are drained, and the
//! source is re-armed. A failed wait or re-arm ends the loop.

use crate::error::WatchError;
use crate::source::NotificationSource;
use crate::visibility::{Visibility, VisibilityNotifier};
use crate::EventKind;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use twinsync_core::{ConfigSource, DebounceScheduler, Mirror, ReloadOutcome};

/// Monotonic time source
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Owns the scheduler and every collaborator it drives
pub struct EventLoop<S, M, C, V, K = SystemClock> {
    scheduler: DebounceScheduler,
    source: S,
    mirror: M,
    config_source: C,
    notifier: V,
    visibility: Visibility,
    clock: K,
}

impl<S, M, C, V> EventLoop<S, M, C, V, SystemClock> {
    pub fn new(
        scheduler: DebounceScheduler,
        source: S,
        mirror: M,
        config_source: C,
        notifier: V,
    ) -> Self {
        Self {
            scheduler,
            source,
            mirror,
            config_source,
            notifier,
            visibility: Visibility::new(),
            clock: SystemClock,
        }
    }
}

impl<S, M, C, V, K> EventLoop<S, M, C, V, K>
where
    S: NotificationSource,
    M: Mirror,
    C: ConfigSource,
    V: VisibilityNotifier,
    K: Clock,
{
    /// Replace the clock
    pub fn with_clock<K2: Clock>(self, clock: K2) -> EventLoop<S, M, C, V, K2> {
        EventLoop {
            scheduler: self.scheduler,
            source: self.source,
            mirror: self.mirror,
            config_source: self.config_source,
            notifier: self.notifier,
            visibility: self.visibility,
            clock,
        }
    }

    pub fn scheduler(&self) -> &DebounceScheduler {
        &self.scheduler
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    pub fn notifier(&self) -> &V {
        &self.notifier
    }

    /// Load the config file outside of any trigger, as done at startup
    pub fn reload_config(&mut self) -> ReloadOutcome {
        let outcome = self.scheduler.reload(&self.config_source);
        self.update_visibility(outcome);
        outcome
    }

    /// How long the next wait may block
    pub fn wait_timeout(&self) -> Option<Duration> {
        let next_due = self.scheduler.next_wake(self.clock.now());
        match (next_due, self.visibility.timeout()) {
            (Some(due), Some(hide)) => Some(due.min(hide)),
            (due, hide) => due.or(hide),
        }
    }

    /// Run one iteration
    pub fn step(&mut self) -> Result<(), WatchError> {
        let timeout = self.wait_timeout();
        let started = self.clock.now();
        let events = self.source.wait(timeout)?;
        let now = self.clock.now();

        self.visibility
            .elapse(now.saturating_duration_since(started), &mut self.notifier);

        for event in events.iter().filter(|e| e.kind == EventKind::Modify) {
            self.scheduler.on_modified(now, &event.path);
        }

        let report = self
            .scheduler
            .drain_due(now, &mut self.mirror, &self.config_source);
        if let Some(outcome) = report.reload {
            self.update_visibility(outcome);
        }
        if report.mirrored + report.failed + report.completed > 0 {
            debug!(
                "Drained: {} mirrored, {} failed, {} settled, next wake {:?}",
                report.mirrored, report.failed, report.completed, report.next_wake
            );
        }

        self.source.rearm()
    }

    /// Run until the notification source fails, returning the reason
    ///
    /// Every remaining record is dropped and the indicator is shown again
    /// before returning.
    pub fn run(&mut self) -> WatchError {
        info!("Monitoring {}", self.scheduler.config().monitor_root());

        let reason = loop {
            if let Err(e) = self.step() {
                break e;
            }
        };

        error!("Monitoring stopped: {}", reason);
        let dropped = self.scheduler.shutdown();
        if dropped > 0 {
            info!("Dropped {} pending records", dropped);
        }
        self.visibility.restore(&mut self.notifier);
        reason
    }

    fn update_visibility(&mut self, outcome: ReloadOutcome) {
        let auto_hide = self.scheduler.config().auto_hide_delay;
        self.visibility
            .on_reload(outcome, auto_hide, &mut self.notifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::tests::RecordingNotifier;
    use crate::visibility::VisibilityState;
    use crate::WatchEvent;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::rc::Rc;
    use twinsync_core::{Config, ConfigError, MirrorError, Phase};

    /// Clock shared with the scripted source, which advances it
    #[derive(Clone)]
    struct ManualClock(Rc<Cell<Instant>>);

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }

    /// One scripted wait: time that passes, then the events it returns
    struct Step {
        advance: Duration,
        events: Vec<WatchEvent>,
    }

    /// Plays back scripted waits, then reports a disconnect
    struct ScriptedSource {
        clock: Rc<Cell<Instant>>,
        steps: VecDeque<Step>,
        timeouts: Vec<Option<Duration>>,
        rearm_failures_after: Option<usize>,
        rearms: usize,
    }

    impl ScriptedSource {
        fn new(clock: Rc<Cell<Instant>>) -> Self {
            Self {
                clock,
                steps: VecDeque::new(),
                timeouts: Vec::new(),
                rearm_failures_after: None,
                rearms: 0,
            }
        }

        fn then(mut self, advance_ms: u64, events: &[(EventKind, &str)]) -> Self {
            self.steps.push_back(Step {
                advance: Duration::from_millis(advance_ms),
                events: events
                    .iter()
                    .map(|(kind, path)| WatchEvent::new(*kind, *path))
                    .collect(),
            });
            self
        }
    }

    impl NotificationSource for ScriptedSource {
        fn wait(&mut self, timeout: Option<Duration>) -> Result<Vec<WatchEvent>, WatchError> {
            self.timeouts.push(timeout);
            let step = self.steps.pop_front().ok_or(WatchError::Disconnected)?;
            self.clock.set(self.clock.get() + step.advance);
            Ok(step.events)
        }

        fn rearm(&mut self) -> Result<(), WatchError> {
            self.rearms += 1;
            match self.rearm_failures_after {
                Some(limit) if self.rearms > limit => {
                    Err(WatchError::RootVanished("/repo".into()))
                }
                _ => Ok(()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingMirror {
        calls: Vec<(String, String)>,
    }

    impl Mirror for RecordingMirror {
        fn copy(&mut self, source: &Path, destination: &Path) -> Result<(), MirrorError> {
            self.calls.push((
                source.to_string_lossy().into_owned(),
                destination.to_string_lossy().into_owned(),
            ));
            Ok(())
        }
    }

    struct TextSource(&'static str);

    impl ConfigSource for TextSource {
        fn reload(&self, current: &Config) -> Result<Config, ConfigError> {
            current.apply_toml(self.0)
        }
    }

    type TestLoop =
        EventLoop<ScriptedSource, RecordingMirror, TextSource, RecordingNotifier, ManualClock>;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn modify(path: &str) -> (EventKind, &str) {
        (EventKind::Modify, path)
    }

    fn build(
        script: impl FnOnce(ScriptedSource) -> ScriptedSource,
        config_text: &'static str,
    ) -> TestLoop {
        let clock = Rc::new(Cell::new(Instant::now()));
        let config = Config::new("/repo/", "twinsync.toml")
            .with_replace_pair("A", "B")
            .unwrap();

        EventLoop::new(
            DebounceScheduler::new(config),
            script(ScriptedSource::new(clock.clone())),
            RecordingMirror::default(),
            TextSource(config_text),
            RecordingNotifier::default(),
        )
        .with_clock(ManualClock(clock))
    }

    #[test]
    fn test_reference_scenario_through_loop() {
        let mut event_loop = build(
            |s| {
                s.then(0, &[modify("A/x.txt")])
                    .then(50, &[modify("A/x.txt")])
                    .then(100, &[])
                    .then(100, &[])
            },
            "",
        );

        let reason = event_loop.run();
        assert!(matches!(reason, WatchError::Disconnected));

        assert_eq!(
            event_loop.source.timeouts,
            vec![None, Some(ms(100)), Some(ms(100)), Some(ms(100)), None]
        );
        assert_eq!(
            event_loop.mirror().calls,
            vec![("/repo/A/x.txt".to_string(), "/repo/B/x.txt".to_string())]
        );
        assert!(event_loop.scheduler().registry().is_empty());
    }

    #[test]
    fn test_only_content_modifications_are_scheduled() {
        let mut event_loop = build(
            |s| {
                s.then(
                    0,
                    &[
                        (EventKind::Create, "A/new.txt"),
                        (EventKind::Delete, "A/old.txt"),
                        (EventKind::Rename, "A/moved.txt"),
                    ],
                )
            },
            "",
        );

        event_loop.step().unwrap();
        assert!(event_loop.scheduler().registry().is_empty());
    }

    #[test]
    fn test_rearm_failure_tears_down() {
        let mut event_loop = build(
            |mut s| {
                s.rearm_failures_after = Some(0);
                s.then(0, &[modify("A/x.txt"), modify("A/y.txt")])
            },
            "",
        );

        let reason = event_loop.run();
        assert!(matches!(reason, WatchError::RootVanished(_)));
        assert!(event_loop.scheduler().registry().is_empty());
        assert!(event_loop.mirror().calls.is_empty());
        assert_eq!(event_loop.visibility().state(), VisibilityState::Shown);
        assert_eq!(event_loop.notifier().calls, vec!["show"]);
    }

    #[test]
    fn test_config_write_reloads_and_starts_countdown() {
        let mut event_loop = build(
            |s| {
                s.then(0, &[modify("twinsync.toml")])
                    .then(100, &[])
                    .then(150, &[])
                    .then(100, &[])
            },
            "delay_before_auto_hide = 250\nreplace_pair = [[\"C\", \"D\"]]",
        );

        event_loop.step().unwrap();
        event_loop.step().unwrap();
        assert_eq!(event_loop.scheduler().config().auto_hide_delay, ms(250));
        assert_eq!(
            event_loop.scheduler().registry().phase("/repo/twinsync.toml"),
            Some(Phase::Settling)
        );
        assert_eq!(event_loop.visibility().state(), VisibilityState::Countdown(ms(250)));

        // Settles at 200; the countdown keeps going
        assert_eq!(event_loop.wait_timeout(), Some(ms(100)));
        event_loop.step().unwrap();
        assert!(event_loop.scheduler().registry().is_empty());
        assert_eq!(event_loop.visibility().timeout(), Some(ms(100)));

        event_loop.step().unwrap();
        assert_eq!(event_loop.visibility().state(), VisibilityState::Hidden);
        assert_eq!(event_loop.notifier().calls, vec!["transient 250", "hide"]);
    }

    #[test]
    fn test_startup_reload_failure_alerts() {
        let mut event_loop = build(|s| s, "delay_after_triggered = [");

        assert_eq!(event_loop.reload_config(), ReloadOutcome::Failed);
        assert_eq!(event_loop.visibility().state(), VisibilityState::Alert);
        assert_eq!(event_loop.scheduler().config().replace_pairs.len(), 1);
        assert_eq!(event_loop.wait_timeout(), None);
    }
}
