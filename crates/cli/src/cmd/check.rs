//! Load a config file and show the effective settings

use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;

pub fn run(config_path: &Path) -> Result<()> {
    let config = super::load_config(config_path)?;

    println!("{} Loaded {}", "✓".green(), config.config_path().display());
    println!();
    println!("  {} = {}", "monitor_root".cyan(), config.monitor_root());
    println!(
        "  {} = {}",
        "delay_after_triggered".cyan(),
        millis(config.trigger_delay)
    );
    println!(
        "  {} = {}",
        "delay_after_operation".cyan(),
        millis(config.operation_delay)
    );
    println!(
        "  {} = {} {}",
        "delay_before_auto_hide".cyan(),
        millis(config.auto_hide_delay),
        if config.auto_hide_delay.is_zero() {
            "(always shown)".dimmed().to_string()
        } else {
            "(hides after a good load)".dimmed().to_string()
        }
    );

    println!("\n{} ({})", "[replace_pair]".yellow(), config.replace_pairs.len());
    if config.replace_pairs.is_empty() {
        println!("  {}", "no pairs, nothing will be mirrored".dimmed());
    }
    for (index, pair) in config.replace_pairs.iter().enumerate() {
        println!("  {:>3}. {} <-> {}", index + 1, pair.original, pair.replacement);
    }

    Ok(())
}

fn millis(duration: Duration) -> String {
    format!("{} ms", duration.as_millis())
}
