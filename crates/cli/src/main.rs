//! Twinsync CLI - twinsync command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod indicator;

/// Twinsync - Keep two differently-named copies of a tree in sync
#[derive(Parser)]
#[command(name = "twinsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every scheduling decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the tree containing CONFIG and mirror modified files
    Run {
        /// Config file at the root of the tree to monitor
        config: PathBuf,
    },
    /// Load CONFIG and print the effective settings
    Check {
        /// Config file to load
        config: PathBuf,
    },
    /// Show where changed paths would be mirrored
    Resolve {
        /// Config file to load
        config: PathBuf,
        /// Paths relative to the monitor root
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Print an example config file
    Example,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { config } => cmd::run::run(&config),
        Commands::Check { config } => cmd::check::run(&config),
        Commands::Resolve { config, paths } => cmd::resolve::run(&config, &paths),
        Commands::Example => cmd::example::run(),
    }
}

/// Logs go to stderr; `--verbose` wins over `RUST_LOG`
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
