//! Status indicator visibility
//!
//! The indicator is shown while a config problem is unresolved and, if
//! `delay_before_auto_hide` is set, hides itself once that delay has run out
//! after a good load. A zero delay keeps it shown.

use std::time::Duration;
use twinsync_core::config::MIN_AUTO_HIDE_DELAY;
use twinsync_core::ReloadOutcome;

/// Receives indicator changes
pub trait VisibilityNotifier {
    fn show(&mut self);

    fn hide(&mut self);

    /// Shown now, expected to hide after `hint`
    fn show_transient(&mut self, hint: Duration);
}

/// Where the indicator currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Hidden,
    /// Shown until a config load succeeds
    Alert,
    Shown,
    /// Shown, hiding once the remaining time runs out
    Countdown(Duration),
}

/// Indicator state machine driven by the event loop
#[derive(Debug, Clone)]
pub struct Visibility {
    state: VisibilityState,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            state: VisibilityState::Shown,
        }
    }
}

impl Visibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    /// Time left before the indicator hides, if counting down
    pub fn timeout(&self) -> Option<Duration> {
        match self.state {
            VisibilityState::Countdown(remaining) => Some(remaining),
            _ => None,
        }
    }

    /// React to a config load
    pub fn on_reload<N>(&mut self, outcome: ReloadOutcome, auto_hide: Duration, notifier: &mut N)
    where
        N: VisibilityNotifier + ?Sized,
    {
        match outcome {
            ReloadOutcome::Failed => {
                notifier.show();
                self.state = VisibilityState::Alert;
            }
            ReloadOutcome::Applied if auto_hide.is_zero() => {
                notifier.show();
                self.state = VisibilityState::Shown;
            }
            ReloadOutcome::Applied => {
                // A hidden indicator stays hidden and a running countdown keeps going
                if matches!(self.state, VisibilityState::Alert | VisibilityState::Shown) {
                    notifier.show_transient(auto_hide);
                    self.state = VisibilityState::Countdown(auto_hide);
                }
            }
        }
    }

    /// Count down by `elapsed`, hiding when the remainder is spent
    pub fn elapse<N>(&mut self, elapsed: Duration, notifier: &mut N)
    where
        N: VisibilityNotifier + ?Sized,
    {
        let VisibilityState::Countdown(remaining) = self.state else {
            return;
        };

        let remaining = remaining.saturating_sub(elapsed);
        if remaining <= MIN_AUTO_HIDE_DELAY {
            notifier.hide();
            self.state = VisibilityState::Hidden;
        } else {
            self.state = VisibilityState::Countdown(remaining);
        }
    }

    /// Show the indicator unconditionally, used on shutdown
    pub fn restore<N>(&mut self, notifier: &mut N)
    where
        N: VisibilityNotifier + ?Sized,
    {
        notifier.show();
        self.state = VisibilityState::Shown;
    }
}
