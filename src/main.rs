// src/main.rs

//! confwatch: investor-conference disclosure tracker CLI
//!
//! Periodically checks a watchlist of TWSE company codes against the
//! MOPS disclosure portal, detects changes in the investor-conference
//! date, and maintains a persisted state file plus a Markdown report.

mod error;
mod models;
mod pipeline;
mod services;
mod storage;
mod utils;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{run_report, run_tracker, run_validate};
use crate::utils::log;

#[derive(Parser, Debug)]
#[command(
    name = "confwatch",
    version,
    about = "Investor conference disclosure tracker"
)]

/// CLI Arguments
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

/// CLI Commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch disclosures, detect changes, persist state, write report
    Run {
        /// Override the watchlist file
        #[arg(long)]
        companies: Option<String>,
        /// Override the report destination
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Re-render the report from the persisted state (no network)
    Report,
    /// Validate configuration and watchlist
    Validate,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config);

    // Initialize console output
    if cli.quiet {
        log::init("error");
    } else {
        log::init(&config.logging.level);
    }

    match cli.command {
        Command::Run { companies, output } => {
            if let Some(path) = companies {
                config.paths.companies_file = path;
            }
            if let Some(path) = output {
                config.paths.report_file = path;
            }
            run_tracker(&config).await?;
        }
        Command::Report => run_report(&config).await?,
        Command::Validate => run_validate(&config)?,
    }

    Ok(())
}
