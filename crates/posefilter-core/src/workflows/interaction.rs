use crate::core::constraints::evaluator::{Evaluation, InteractionObservation};
use crate::core::constraints::parser::ConstraintSet;
use crate::core::io::container::{ContainerFormat, RecordReader};
use crate::core::toolkit::PerceivedPose;
use crate::engine::config::IndexConfigBuilder;
use crate::engine::error::EngineError;
use crate::engine::index::{IndexScan, PoseIndex, build_index};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::records::PoseRecords;
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Titles of the poses whose perceived interactions satisfy `constraints`, in input
/// order, one per accepted pose.
///
/// Each pose is judged on its own hints only.
#[instrument(skip_all, name = "interaction_filter")]
pub fn filter<'p, I>(poses: I, constraints: &ConstraintSet, reporter: &ProgressReporter) -> Vec<String>
where
    I: IntoIterator<Item = &'p PerceivedPose>,
{
    reporter.report(Progress::TaskStart { total_steps: None });
    let mut evaluated = 0usize;
    let mut accepted = Vec::new();

    for pose in poses {
        evaluated += 1;
        let observation = InteractionObservation::perceive(constraints, &pose.hints);
        match constraints.evaluate(&observation) {
            Evaluation::Accepted => accepted.push(pose.title.clone()),
            rejected => debug!(
                index = pose.sequence_index,
                title = %pose.title,
                ?rejected,
                "Pose rejected."
            ),
        }
        reporter.increment();
    }

    reporter.report(Progress::TaskFinish);
    info!(
        evaluated,
        accepted = accepted.len(),
        constraint = %constraints,
        "Interaction filter finished."
    );
    accepted
}

/// Reads one compound name per line, skipping blank lines and repeats.
pub fn read_names<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let name = line.trim();
        if !name.is_empty() && seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Writes the best header block of each requested name found in `index`, in request
/// order. Returns the names that were not found.
pub fn write_best_headers<W: Write>(
    index: &PoseIndex,
    requested: &[String],
    writer: &mut W,
) -> io::Result<Vec<String>> {
    let mut missing = Vec::new();
    for name in requested {
        match index.best(name) {
            Some(record) => writer.write_all(record.header_text.as_bytes())?,
            None => missing.push(name.clone()),
        }
    }
    writer.flush()?;
    Ok(missing)
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRetrieval {
    pub scan: IndexScan,
    pub missing: Vec<String>,
}

/// Finds the minimum-energy header block of each requested compound in `container`
/// and writes them to `writer` in request order.
///
/// A malformed record aborts the run before anything is written.
#[instrument(skip_all, name = "header_retrieval_workflow")]
pub fn retrieve_headers<W: Write>(
    container: &Path,
    requested: &[String],
    format: ContainerFormat,
    writer: &mut W,
    reporter: &ProgressReporter,
) -> Result<HeaderRetrieval, EngineError> {
    let config = IndexConfigBuilder::new()
        .names(requested.iter().cloned())
        .format(format)
        .build()?;

    reporter.report(Progress::PhaseStart { name: "Index" });
    let reader = RecordReader::open(container, config.format.clone())?;
    let scan = build_index(PoseRecords::new(reader), &config.names_of_interest, reporter)?;
    reporter.report(Progress::PhaseFinish);

    let missing = write_best_headers(&scan.index, requested, writer)?;
    for name in &missing {
        warn!(name = %name, "Compound not found in container.");
        reporter.report(Progress::Message(format!("'{}' not found in container", name)));
    }
    info!(
        written = requested.len() - missing.len(),
        missing = missing.len(),
        "Header retrieval finished."
    );
    Ok(HeaderRetrieval { scan, missing })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::tables::read_interaction_table;
    use crate::engine::config::ConfigError;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn header(name: &str, energy: f64) -> String {
        format!(
            "##########                 Name:     {name}\n\
             ##########         Total Energy:     {energy}\n"
        )
    }

    fn pose(name: &str, energy: f64) -> String {
        format!("{}@<TRIPOS>MOLECULE\n{name}\n", header(name, energy))
    }

    #[test]
    fn filter_keeps_poses_satisfying_the_constraint() {
        let table = "\
index,pose,residue,interaction
0,LIG1,45,salt-bridge
0,LIG1,67,hbond-acceptor
1,LIG2,45,salt-bridge
1,LIG2,67,pi-stacking
2,LIG3,68,pi-stacking
2,LIG3,45,salt-bridge
";
        let poses = read_interaction_table(table.as_bytes()).unwrap();
        let constraints = ConstraintSet::parse("45B-67H:68S").unwrap();
        let accepted = filter(&poses, &constraints, &ProgressReporter::new());
        assert_eq!(accepted, vec!["LIG1", "LIG3"]);
    }

    #[test]
    fn same_titled_poses_are_judged_independently() {
        let table = "\
index,pose,residue,interaction
0,LIG1,5,hbond-donor
1,LIG1,6,salt-bridge
";
        let poses = read_interaction_table(table.as_bytes()).unwrap();
        let constraints = ConstraintSet::parse("5H-6B").unwrap();
        assert!(filter(&poses, &constraints, &ProgressReporter::new()).is_empty());
    }

    #[test]
    fn every_accepted_pose_is_reported() {
        let table = "\
index,pose,residue,interaction
0,LIG1,5,hbond-donor
0,LIG1,6,salt-bridge
1,LIG1,6,salt-bridge
2,LIG1,5,hbond-acceptor
2,LIG1,6,salt-bridge
";
        let poses = read_interaction_table(table.as_bytes()).unwrap();
        let constraints = ConstraintSet::parse("5H-6B").unwrap();
        let accepted = filter(&poses, &constraints, &ProgressReporter::new());
        assert_eq!(accepted, vec!["LIG1", "LIG1"]);
    }

    #[test]
    fn read_names_skips_blanks_and_duplicates() {
        let names = read_names("A\n\n  B \nA\nC".as_bytes()).unwrap();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn retrieve_headers_writes_best_headers_in_request_order() {
        let dir = tempdir().unwrap();
        let container = dir.path().join("poses.mol2");
        let text = [
            pose("A", 5.0),
            pose("B", 3.0),
            pose("A", 1.0),
            pose("C", 0.0),
        ]
        .concat();
        std::fs::write(&container, text).unwrap();

        let requested = vec!["B".to_string(), "A".to_string(), "Z".to_string()];
        let mut out = Vec::new();
        let retrieval = retrieve_headers(
            &container,
            &requested,
            ContainerFormat::default(),
            &mut out,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), header("B", 3.0) + &header("A", 1.0));
        assert_eq!(retrieval.missing, vec!["Z"]);
        assert!(!retrieval.scan.stopped_early);
    }

    #[test]
    fn retrieve_headers_reports_missing_names_as_messages() {
        let dir = tempdir().unwrap();
        let container = dir.path().join("poses.mol2");
        std::fs::write(&container, pose("A", 1.0)).unwrap();

        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            if let Progress::Message(msg) = event {
                sink.lock().unwrap().push(msg);
            }
        }));
        let requested = vec!["A".to_string(), "Q".to_string()];
        retrieve_headers(
            &container,
            &requested,
            ContainerFormat::default(),
            &mut Vec::new(),
            &reporter,
        )
        .unwrap();

        assert_eq!(*messages.lock().unwrap(), vec!["'Q' not found in container"]);
    }

    #[test]
    fn retrieve_headers_requires_names() {
        let dir = tempdir().unwrap();
        let result = retrieve_headers(
            &dir.path().join("poses.mol2"),
            &[],
            ContainerFormat::default(),
            &mut Vec::new(),
            &ProgressReporter::new(),
        );
        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::MissingParameter(_)))
        ));
    }
}
