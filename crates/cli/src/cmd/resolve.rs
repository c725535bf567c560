//! Show how changed paths would be handled

use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;
use twinsync_core::{PathMatch, PathMatcher};

pub fn run(config_path: &Path, paths: &[String]) -> Result<()> {
    let config = super::load_config(config_path)?;
    let matcher = PathMatcher::new(&config);

    for path in paths {
        match matcher.classify(path) {
            PathMatch::Config { source } => {
                println!("{}: {} {}", path, "config".yellow(), source);
            }
            PathMatch::Mirror {
                source,
                destination,
            } => {
                println!("{}: {} {} -> {}", path, "mirror".green(), source, destination);
            }
            PathMatch::NoMatch => {
                println!("{}: {}", path, "no match".dimmed());
            }
        }
    }

    Ok(())
}
