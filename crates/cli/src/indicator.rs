//! Console status indicator

use owo_colors::OwoColorize;
use std::time::Duration;
use twinsync_watcher::VisibilityNotifier;

/// Prints a status line whenever the indicator changes
#[derive(Debug, Default)]
pub struct ConsoleIndicator {
    visible: Option<bool>,
}

impl ConsoleIndicator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisibilityNotifier for ConsoleIndicator {
    fn show(&mut self) {
        if self.visible != Some(true) {
            println!("{} {}", "●".green(), "twinsync is watching".bold());
        }
        self.visible = Some(true);
    }

    fn hide(&mut self) {
        if self.visible != Some(false) {
            println!("{} {}", "○".dimmed(), "indicator hidden".dimmed());
        }
        self.visible = Some(false);
    }

    fn show_transient(&mut self, hint: Duration) {
        println!(
            "{} {} {}",
            "●".green(),
            "twinsync is watching".bold(),
            format!("(hiding in {} ms)", hint.as_millis()).dimmed()
        );
        self.visible = Some(true);
    }
}
