//! Console front-end for the Upkeep update engine.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use log::error;

use upkeep_core::{UpdateOutcome, UpdateReporter, run_update};

mod config;
mod logging;
mod relaunch;
mod reporter;

#[derive(Debug, Parser)]
#[command(
    name = "upkeep",
    version,
    about = "Checks a release manifest and installs application updates"
)]
struct Cli {
    /// Path to the updater configuration file.
    #[arg(short, long, default_value = "upkeep.json")]
    config: PathBuf,

    /// Apply an available update without prompting for confirmation.
    #[arg(short = 'y', long)]
    yes: bool,

    /// Relaunch the updated main executable after a successful update.
    #[arg(long)]
    relaunch: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = config::load(&cli.config)?;
    let client = reqwest::Client::new();

    let reporter: Box<dyn UpdateReporter> = if cli.yes {
        Box::new(reporter::AssumeYes)
    } else {
        Box::new(reporter::ConsoleReporter)
    };

    let outcome = run_update(&client, &config, reporter.as_ref())
        .await
        .context("update failed")?;

    match outcome {
        UpdateOutcome::Updated { version } => {
            println!("Update applied successfully ({version}).");
            if cli.relaunch {
                relaunch::relaunch_main_executable(&client, &config).await?;
            }
        }
        UpdateOutcome::UpToDate | UpdateOutcome::Cancelled => {
            println!("No update applied.");
        }
    }
    Ok(())
}
