use crate::cli::SelectArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use posefilter::core::io::tables::RmsdTable;
use posefilter::engine::progress::ProgressReporter;
use posefilter::workflows;
use std::io::Write;
use tracing::{info, warn};

pub async fn run(args: SelectArgs, config: &PartialConfig) -> Result<()> {
    let selection_config = config.selection_config(args.threshold)?;

    info!("Loading RMSD table from {:?}", &args.rmsd_table);
    let mut table =
        RmsdTable::from_path(&args.rmsd_table).map_err(|e| CliError::FileParsing {
            path: args.rmsd_table.clone(),
            source: e.into(),
        })?;
    info!(rows = table.len(), "RMSD table loaded.");

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Selecting best poses within {:.2} Å of the reference...",
        selection_config.rmsd_threshold
    );
    let result = tokio::task::block_in_place(|| {
        workflows::best_pose::select_to_file(
            &args.container,
            &args.output,
            &mut table,
            &selection_config,
            &reporter,
        )
    })?;

    if let Some(names_path) = &args.names {
        let mut writer = std::io::BufWriter::new(std::fs::File::create(names_path)?);
        for name in result.names() {
            writeln!(writer, "{}", name)?;
        }
        writer.flush()?;
        info!("Selected names written to {:?}", names_path);
    }

    if result.selected.is_empty() {
        warn!("No pose satisfied the RMSD threshold.");
        println!("Warning: no pose satisfied the RMSD threshold.");
    } else {
        println!(
            "✓ {} pose(s) selected from {} record(s), written to: {}",
            result.selected.len(),
            result.summary.scanned,
            args.output.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn pose(name: &str, energy: f64) -> String {
        format!(
            "##########                 Name:     {name}\n\
             ##########         Total Energy:     {energy}\n\
             @<TRIPOS>MOLECULE\n\
             {name}\n"
        )
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn select_writes_records_and_names() {
        let dir = tempdir().unwrap();
        let container = dir.path().join("poses.mol2");
        let rmsd_table = dir.path().join("rmsd.csv");
        let output = dir.path().join("best.mol2");
        let names = dir.path().join("names.txt");
        fs::write(
            &container,
            [pose("LIG1", 5.0), pose("LIG1", 2.0), pose("LIG2", 9.0)].concat(),
        )
        .unwrap();
        fs::write(&rmsd_table, "index,rmsd\n0,1.0\n1,1.5\n2,\n").unwrap();

        let args = SelectArgs {
            container,
            rmsd_table,
            output: output.clone(),
            threshold: Some(3.0),
            names: Some(names.clone()),
        };
        run(args, &PartialConfig::default()).await.unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), pose("LIG1", 2.0));
        assert_eq!(fs::read_to_string(&names).unwrap(), "LIG1\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreadable_rmsd_table_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let rmsd_table = dir.path().join("rmsd.csv");
        fs::write(&rmsd_table, "index,rmsd\nzero,1.0\n").unwrap();

        let args = SelectArgs {
            container: dir.path().join("poses.mol2"),
            rmsd_table,
            output: dir.path().join("out.mol2"),
            threshold: None,
            names: None,
        };
        let result = run(args, &PartialConfig::default()).await;
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}
