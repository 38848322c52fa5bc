mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("posefilter CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let mut config = PartialConfig::load(cli.config.as_deref())?;
    config.apply_set_values(&cli.set_values)?;

    let command_result = match cli.command {
        Commands::Select(args) => {
            info!("Dispatching to 'select' command.");
            commands::select::run(args, &config).await
        }
        Commands::Interactions(args) => {
            info!("Dispatching to 'interactions' command.");
            commands::interactions::run(args).await
        }
        Commands::Headers(args) => {
            info!("Dispatching to 'headers' command.");
            commands::headers::run(args, &config).await
        }
        Commands::Reorder(args) => {
            info!("Dispatching to 'reorder' command.");
            commands::reorder::run(args, &config).await
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
