//! Print an example config file

use anyhow::Result;
use twinsync_core::config::EXAMPLE_CONFIG;

pub fn run() -> Result<()> {
    print!("{}", EXAMPLE_CONFIG);
    Ok(())
}
