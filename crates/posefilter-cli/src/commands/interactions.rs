use crate::cli::InteractionsArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use posefilter::core::constraints::parser::ConstraintSet;
use posefilter::core::io::tables;
use posefilter::engine::error::EngineError;
use posefilter::engine::progress::ProgressReporter;
use posefilter::workflows;
use std::io::Write;
use tracing::info;

pub async fn run(args: InteractionsArgs) -> Result<()> {
    // Reject a bad constraint before touching any file.
    let constraints = ConstraintSet::parse(&args.constraint).map_err(EngineError::from)?;
    info!(
        mandatory = constraints.mandatory().len(),
        or_groups = constraints.or_groups().len(),
        "Parsed constraint '{}'.",
        constraints
    );

    let poses = tables::read_interaction_table_from_path(&args.input).map_err(|e| {
        CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        }
    })?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let accepted =
        tokio::task::block_in_place(|| workflows::interaction::filter(&poses, &constraints, &reporter));

    let mut writer = std::io::BufWriter::new(std::fs::File::create(&args.output)?);
    for name in &accepted {
        writeln!(writer, "{}", name)?;
    }
    writer.flush()?;

    println!(
        "✓ {} of {} pose(s) satisfy '{}', names written to: {}",
        accepted.len(),
        poses.len(),
        constraints,
        args.output.display()
    );
    Ok(())
}
