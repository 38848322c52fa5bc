use crate::cli::HeadersArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use posefilter::engine::progress::ProgressReporter;
use posefilter::workflows::interaction;
use std::fs::File;
use std::io::BufReader;
use tracing::{info, warn};

pub async fn run(args: HeadersArgs, config: &PartialConfig) -> Result<()> {
    let requested = interaction::read_names(BufReader::new(File::open(&args.names)?))?;
    if requested.is_empty() {
        return Err(CliError::Argument(format!(
            "No compound names found in {}",
            args.names.display()
        )));
    }
    info!(requested = requested.len(), "Loaded compound names.");

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    // Buffer the headers so a malformed container leaves no partial output behind.
    let mut headers = Vec::new();
    let retrieval = tokio::task::block_in_place(|| {
        interaction::retrieve_headers(
            &args.input,
            &requested,
            config.container_format(),
            &mut headers,
            &reporter,
        )
    })?;
    std::fs::write(&args.output, &headers)?;

    if !retrieval.missing.is_empty() {
        warn!(
            "{} requested compound(s) were not found in the container.",
            retrieval.missing.len()
        );
    }
    println!(
        "✓ {} header block(s) written to: {}",
        retrieval.scan.index.len(),
        args.output.display()
    );
    Ok(())
}
