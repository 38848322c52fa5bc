use crate::core::io::compress;
use crate::core::io::container::RecordReader;
use crate::core::toolkit::RmsdSource;
use crate::engine::config::SelectionConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::records::{PoseRecords, extract_records};
use crate::engine::selector::{BestPoseSelector, SelectionResult};
use std::io::BufRead;
use std::path::Path;
use tracing::{info, instrument};

/// Runs the Best-Pose Selector over one container stream.
///
/// Toolkit failures abort the run; pattern mismatches are skipped.
#[instrument(skip_all, name = "best_pose_workflow")]
pub fn run<R: BufRead, S: RmsdSource>(
    mut records: PoseRecords<R>,
    source: &mut S,
    config: &SelectionConfig,
    reporter: &ProgressReporter,
) -> Result<SelectionResult, EngineError> {
    reporter.report(Progress::PhaseStart { name: "Selection" });
    reporter.report(Progress::TaskStart { total_steps: None });
    info!(
        threshold = config.rmsd_threshold,
        "Selecting lowest-energy pose within RMSD threshold."
    );

    let mut selector = BestPoseSelector::new(config.rmsd_threshold);
    while let Some(record) = records.next_record()? {
        let rmsd = source.rmsd(&record)?;
        selector.offer(&record, rmsd);
        reporter.increment();
    }
    let result = selector.finish();

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let summary = &result.summary;
    info!(
        scanned = summary.scanned,
        candidates = summary.candidates,
        mismatched = summary.mismatched,
        degenerate = summary.degenerate,
        invalid = summary.invalid,
        above_threshold = summary.above_threshold,
        selected = result.selected.len(),
        "Selection finished."
    );
    Ok(result)
}

/// Selects the best pose per compound from `container` and writes those records to
/// `output`, gzip-compressed when `output` ends in `.gz`.
///
/// The container is read twice: once to select and once to extract.
#[instrument(skip_all, name = "best_pose_to_file")]
pub fn select_to_file<S: RmsdSource>(
    container: &Path,
    output: &Path,
    source: &mut S,
    config: &SelectionConfig,
    reporter: &ProgressReporter,
) -> Result<SelectionResult, EngineError> {
    let reader = RecordReader::open(container, config.format.clone())?;
    let result = run(PoseRecords::new(reader), source, config, reporter)?;

    reporter.report(Progress::PhaseStart { name: "Extraction" });
    let reader = RecordReader::open(container, config.format.clone())?;
    let mut writer = compress::create_output(output)?;
    let written = extract_records(reader, &result.indices(), &mut writer)?;
    writer.finish()?;
    reporter.report(Progress::PhaseFinish);

    info!(written, output = %output.display(), "Selected records written.");
    Ok(result)
}
