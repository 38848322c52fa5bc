use super::progress::{Progress, ProgressReporter};
use super::records::PoseRecords;
use crate::core::io::container::ContainerError;
use crate::core::models::pose::PoseRecord;
use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use tracing::{debug, info, warn};

/// The best record seen so far for one compound.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub best: PoseRecord,
    /// Which occurrence of the compound (1-based) produced `best`. Diagnostic only.
    pub best_occurrence: usize,
    /// How many records of the compound have been folded in.
    pub observations: usize,
}

/// Minimum-energy record per compound name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseIndex {
    entries: HashMap<String, IndexEntry>,
}

impl PoseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one record in; it replaces the stored best only on strictly lower energy.
    ///
    /// Returns `true` when the record became the compound's best.
    pub fn fold(&mut self, record: PoseRecord) -> bool {
        match self.entries.get_mut(&record.compound_name) {
            Some(entry) => {
                entry.observations += 1;
                if record.improves_on(&entry.best) {
                    entry.best = record;
                    entry.best_occurrence = entry.observations;
                    true
                } else {
                    false
                }
            }
            None => {
                self.entries.insert(
                    record.compound_name.clone(),
                    IndexEntry {
                        best: record,
                        best_occurrence: 1,
                        observations: 1,
                    },
                );
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.get(name)
    }

    pub fn best(&self, name: &str) -> Option<&PoseRecord> {
        self.entries.get(name).map(|e| &e.best)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexEntry)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> HashMap<String, IndexEntry> {
        self.entries
    }
}

/// State of the early-termination rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Coverage is incomplete, or the name did not change.
    Scanning,
    /// Coverage is complete and the name just changed to another name of interest.
    NameJustChanged,
    /// Coverage is complete and the name changed to one outside the request.
    Done,
}

/// Decides, one completed record at a time, when a scan may stop.
///
/// The stop condition is only evaluated on a full name transition between records,
/// never inside one, and a transition onto a requested name keeps the scan going so a
/// later, better pose of that compound is still folded in.
#[derive(Debug, Clone)]
pub struct EarlyStop {
    state: ScanState,
    previous: Option<String>,
}

impl Default for EarlyStop {
    fn default() -> Self {
        Self {
            state: ScanState::Scanning,
            previous: None,
        }
    }
}

impl EarlyStop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Advances on the record named `name`.
    ///
    /// `covered` tells whether every name of interest had been observed before this
    /// record; `of_interest` whether `name` itself is requested.
    pub fn advance(&mut self, name: &str, of_interest: bool, covered: bool) -> ScanState {
        if self.state == ScanState::Done {
            return ScanState::Done;
        }

        let changed = self.previous.as_deref() != Some(name);
        if changed {
            self.previous = Some(name.to_string());
        }

        self.state = match (covered && changed, of_interest) {
            (false, _) => ScanState::Scanning,
            (true, true) => ScanState::NameJustChanged,
            (true, false) => ScanState::Done,
        };
        self.state
    }
}

/// Result of an index scan.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexScan {
    pub index: PoseIndex,
    /// Records folded or skipped before the scan ended.
    pub records_scanned: usize,
    pub stopped_early: bool,
}

/// Builds the minimum-energy index for `names_of_interest`.
///
/// Names never observed are simply absent from the index. An energy field before the
/// name field aborts the scan, as does an incomplete record of a requested compound; no
/// partial index is returned then. Other incomplete records are skipped.
pub fn build_index<R: BufRead>(
    mut records: PoseRecords<R>,
    names_of_interest: &HashSet<String>,
    reporter: &ProgressReporter,
) -> Result<IndexScan, ContainerError> {
    reporter.report(Progress::TaskStart { total_steps: None });

    let mut index = PoseIndex::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut stop = EarlyStop::new();
    let mut records_scanned = 0usize;
    let mut stopped_early = false;

    while let Some(entry) = records.next_entry()? {
        let name = match &entry {
            Ok(record) => Some(record.compound_name.as_str()),
            Err(incomplete) => incomplete.compound_name.as_deref(),
        };
        let of_interest = name.is_some_and(|n| names_of_interest.contains(n));
        let covered = seen.len() == names_of_interest.len();

        if let Some(name) = name {
            if stop.advance(name, of_interest, covered) == ScanState::Done {
                debug!(name, "All requested compounds covered; stopping scan.");
                stopped_early = true;
                break;
            }
        }

        records_scanned += 1;
        reporter.increment();

        let record = match entry {
            Ok(record) => record,
            Err(incomplete) if of_interest => return Err(incomplete.into_error()),
            Err(incomplete) => {
                warn!(
                    index = incomplete.sequence_index,
                    line = incomplete.line,
                    "Skipping incomplete record: {}.",
                    incomplete.kind
                );
                continue;
            }
        };

        if of_interest {
            if !seen.contains(&record.compound_name) {
                seen.insert(record.compound_name.clone());
            }
            let name = record.compound_name.clone();
            let energy = record.energy;
            if index.fold(record) {
                debug!(name = %name, energy, "New best pose.");
            }
        }
    }

    reporter.report(Progress::TaskFinish);
    info!(
        found = index.len(),
        requested = names_of_interest.len(),
        records_scanned,
        stopped_early,
        "Index scan finished."
    );

    Ok(IndexScan {
        index,
        records_scanned,
        stopped_early,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::container::{ContainerFormat, MalformedRecordKind, RecordReader};
    use std::io::Cursor;

    fn header(name: &str, energy: f64) -> String {
        format!(
            "##########                 Name:     {name}\n\
             ##########         Total Energy:     {energy}\n\
             @<TRIPOS>MOLECULE\n\
             {name}\n"
        )
    }

    fn container(poses: &[(&str, f64)]) -> String {
        poses.iter().map(|(n, e)| header(n, *e)).collect()
    }

    fn scan(text: &str, names: &[&str]) -> Result<IndexScan, ContainerError> {
        let records = PoseRecords::new(RecordReader::new(
            Cursor::new(text.as_bytes().to_vec()),
            ContainerFormat::default(),
        ));
        let names: HashSet<String> = names.iter().map(|s| s.to_string()).collect();
        build_index(records, &names, &ProgressReporter::new())
    }

    #[test]
    fn fold_replaces_only_on_strict_improvement() {
        let mut index = PoseIndex::new();
        assert!(index.fold(PoseRecord::new("A", 0, -5.0, String::new())));
        assert!(!index.fold(PoseRecord::new("A", 1, -5.0, String::new())));
        assert!(index.fold(PoseRecord::new("A", 2, -6.0, String::new())));
        assert!(!index.fold(PoseRecord::new("A", 3, -1.0, String::new())));

        let entry = index.get("A").unwrap();
        assert_eq!(entry.best.sequence_index, 2);
        assert_eq!(entry.best_occurrence, 3);
        assert_eq!(entry.observations, 4);
    }

    #[test]
    fn index_energy_is_running_minimum() {
        let energies = [3.0, 4.0, 1.5, 1.5, 2.0, -0.5, 7.0];
        let mut index = PoseIndex::new();
        let mut previous = f64::INFINITY;
        for (i, &e) in energies.iter().enumerate() {
            index.fold(PoseRecord::new("X", i, e, String::new()));
            let best = index.best("X").unwrap().energy;
            let minimum = energies[..=i].iter().copied().fold(f64::INFINITY, f64::min);
            assert!(best <= previous);
            assert_eq!(best, minimum);
            previous = best;
        }
    }

    #[test]
    fn early_stop_waits_for_transition_away_from_requested_names() {
        let mut stop = EarlyStop::new();
        assert_eq!(stop.advance("A", true, false), ScanState::Scanning);
        assert_eq!(stop.advance("B", true, false), ScanState::Scanning);
        assert_eq!(stop.advance("A", true, true), ScanState::NameJustChanged);
        assert_eq!(stop.advance("A", true, true), ScanState::Scanning);
        assert_eq!(stop.advance("C", false, true), ScanState::Done);
        assert_eq!(stop.advance("A", true, true), ScanState::Done);
    }

    #[test]
    fn early_stop_never_fires_before_full_coverage() {
        let mut stop = EarlyStop::new();
        for name in ["X", "Y", "A", "Z"] {
            assert_eq!(stop.advance(name, name == "A", false), ScanState::Scanning);
        }
    }

    #[test]
    fn early_stop_ignores_repeats_of_the_same_name() {
        let mut stop = EarlyStop::new();
        stop.advance("C", false, false);
        assert_eq!(stop.advance("C", false, true), ScanState::Scanning);
    }

    #[test]
    fn reappearing_compound_is_still_folded_before_stopping() {
        let text = container(&[("A", 5.0), ("B", 3.0), ("A", 1.0), ("C", 0.0), ("A", -9.0)]);
        let result = scan(&text, &["A", "B"]).unwrap();

        assert!(result.stopped_early);
        assert_eq!(result.records_scanned, 3);
        assert_eq!(result.index.best("A").unwrap().energy, 1.0);
        assert_eq!(result.index.best("B").unwrap().energy, 3.0);
        assert_eq!(result.index.get("A").unwrap().observations, 2);
    }

    #[test]
    fn contiguous_poses_of_last_compound_are_all_considered() {
        let text = container(&[("A", 2.0), ("B", 4.0), ("B", 3.5), ("B", 3.9), ("D", 0.0)]);
        let result = scan(&text, &["A", "B"]).unwrap();
        let best_b = result.index.best("B").unwrap();
        assert_eq!(best_b.energy, 3.5);
        assert_eq!(best_b.sequence_index, 2);
        assert_eq!(result.index.get("B").unwrap().best_occurrence, 2);
    }

    #[test]
    fn missing_names_are_absent_and_scan_reaches_end() {
        let text = container(&[("A", 2.0), ("C", 1.0)]);
        let result = scan(&text, &["A", "MISSING"]).unwrap();
        assert!(!result.stopped_early);
        assert_eq!(result.records_scanned, 2);
        assert!(result.index.contains("A"));
        assert!(!result.index.contains("MISSING"));
        assert!(!result.index.contains("C"));
    }

    #[test]
    fn best_header_text_is_kept_verbatim() {
        let text = container(&[("A", 2.0), ("A", -1.0)]);
        let result = scan(&text, &["A"]).unwrap();
        assert_eq!(
            result.index.best("A").unwrap().header_text,
            "##########                 Name:     A\n##########         Total Energy:     -1\n"
        );
    }

    #[test]
    fn incomplete_records_outside_the_request_are_skipped() {
        let text = format!(
            "{}##########  Name: X\npayload\n##########  Score: 3.0\npayload\n{}",
            header("A", 2.0),
            header("A", 1.0)
        );
        let result = scan(&text, &["A", "Z"]).unwrap();
        assert_eq!(result.index.best("A").unwrap().sequence_index, 3);
        assert_eq!(result.records_scanned, 4);
    }

    #[test]
    fn incomplete_record_of_a_requested_compound_is_fatal() {
        let text = format!("{}##########  Name: A\npayload\n", header("A", 2.0));
        assert!(matches!(
            scan(&text, &["A"]),
            Err(ContainerError::MalformedRecord {
                kind: MalformedRecordKind::MissingEnergy,
                ..
            })
        ));
    }

    #[test]
    fn malformed_record_discards_partial_index() {
        let text = format!(
            "{}##########  Total Energy: 1.0\n##########  Name: B\npayload\n",
            header("A", 2.0)
        );
        assert!(matches!(
            scan(&text, &["A", "B"]),
            Err(ContainerError::MalformedRecord {
                kind: MalformedRecordKind::EnergyBeforeName,
                ..
            })
        ));
    }
}
