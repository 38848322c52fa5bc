use crate::core::models::pose::PoseRecord;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace, warn};

/// How one record fared against the acceptance policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Candidate(f64),
    /// The query pattern did not match the pose.
    PatternMismatch,
    /// Zero distance to the reference; treated as a self-comparison.
    Degenerate,
    /// Negative or NaN; no real distance.
    Invalid(f64),
    AboveThreshold(f64),
}

impl Verdict {
    /// Only `0 < rmsd <= threshold` is a candidate.
    pub fn judge(rmsd: Option<f64>, threshold: f64) -> Self {
        match rmsd {
            None => Verdict::PatternMismatch,
            Some(r) if r == 0.0 => Verdict::Degenerate,
            Some(r) if r.is_nan() || r < 0.0 => Verdict::Invalid(r),
            Some(r) if r > threshold => Verdict::AboveThreshold(r),
            Some(r) => Verdict::Candidate(r),
        }
    }

    pub fn is_candidate(&self) -> bool {
        matches!(self, Verdict::Candidate(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    pub scanned: usize,
    pub candidates: usize,
    pub mismatched: usize,
    pub degenerate: usize,
    pub invalid: usize,
    pub above_threshold: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionResult {
    /// One record per compound with at least one candidate, in order of finalization.
    /// Each carries the RMSD it was accepted with.
    pub selected: Vec<PoseRecord>,
    pub summary: SelectionSummary,
}

impl SelectionResult {
    pub fn indices(&self) -> BTreeSet<usize> {
        self.selected.iter().map(|p| p.sequence_index).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(|p| p.compound_name.as_str())
    }
}

/// Streaming fold of records into the minimum-energy candidate per compound.
///
/// Records must be offered in `sequence_index` order. The running best of a compound is
/// finalized when the compound name changes and once more in [`finish`](Self::finish).
#[derive(Debug)]
pub struct BestPoseSelector {
    threshold: f64,
    current_name: Option<String>,
    current_best: Option<PoseRecord>,
    selected: Vec<PoseRecord>,
    positions: HashMap<String, usize>,
    summary: SelectionSummary,
}

impl BestPoseSelector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            current_name: None,
            current_best: None,
            selected: Vec::new(),
            positions: HashMap::new(),
            summary: SelectionSummary::default(),
        }
    }

    pub fn offer(&mut self, record: &PoseRecord, rmsd: Option<f64>) -> Verdict {
        self.summary.scanned += 1;

        if self.current_name.as_deref() != Some(record.compound_name.as_str()) {
            self.finalize_current();
            self.current_name = Some(record.compound_name.clone());
        }

        let verdict = Verdict::judge(rmsd, self.threshold);
        match verdict {
            Verdict::PatternMismatch => {
                self.summary.mismatched += 1;
                debug!(
                    index = record.sequence_index,
                    name = %record.compound_name,
                    "Pattern did not match pose; skipping."
                );
            }
            Verdict::Degenerate => {
                self.summary.degenerate += 1;
                debug!(index = record.sequence_index, "Zero RMSD; skipping.");
            }
            Verdict::Invalid(r) => {
                self.summary.invalid += 1;
                warn!(index = record.sequence_index, rmsd = r, "Invalid RMSD; skipping.");
            }
            Verdict::AboveThreshold(r) => {
                self.summary.above_threshold += 1;
                trace!(index = record.sequence_index, rmsd = r, "Above threshold.");
            }
            Verdict::Candidate(r) => {
                self.summary.candidates += 1;
                let improves = self
                    .current_best
                    .as_ref()
                    .is_none_or(|best| record.improves_on(best));
                if improves {
                    self.current_best = Some(record.clone().with_rmsd(r));
                }
            }
        }
        verdict
    }

    fn finalize_current(&mut self) {
        let Some(best) = self.current_best.take() else {
            return;
        };
        match self.positions.get(&best.compound_name) {
            Some(&position) => {
                // Compound reappeared after another one; keep the better of its runs.
                if best.improves_on(&self.selected[position]) {
                    self.selected[position] = best;
                }
            }
            None => {
                self.positions
                    .insert(best.compound_name.clone(), self.selected.len());
                self.selected.push(best);
            }
        }
    }

    pub fn finish(mut self) -> SelectionResult {
        self.finalize_current();
        SelectionResult {
            selected: self.selected,
            summary: self.summary,
        }
    }
}
