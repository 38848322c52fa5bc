use crate::core::toolkit::SubstructureQuery;
use crate::engine::config::ScreenConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenSummary {
    pub examined: usize,
    pub too_heavy: usize,
    pub kept: usize,
}

#[derive(Debug)]
pub struct ScreenResult<M> {
    /// Kept molecules; order is unspecified when running in parallel.
    pub kept: Vec<M>,
    pub summary: ScreenSummary,
}

/// Keeps the molecules that match `query` (or, with `reverse`, those that do not).
///
/// Each molecule is prepared, then dropped if heavier than the configured maximum, and
/// only then matched. One progress increment is reported per kept molecule.
#[instrument(skip_all, name = "screen_workflow")]
pub fn run<Q: SubstructureQuery>(
    query: &Q,
    molecules: Vec<Q::Molecule>,
    config: &ScreenConfig,
    reporter: &ProgressReporter,
) -> Result<ScreenResult<Q::Molecule>, EngineError> {
    let examined = molecules.len();
    info!(
        molecules = examined,
        max_weight = ?config.max_weight,
        reverse = config.reverse,
        "Starting substructure screen."
    );
    reporter.report(Progress::TaskStart { total_steps: None });

    let too_heavy = AtomicUsize::new(0);
    let keep = |mut molecule: Q::Molecule| -> Option<Q::Molecule> {
        query.prepare(&mut molecule);
        if let Some(max) = config.max_weight {
            if query.molecular_weight(&molecule) > max {
                too_heavy.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        }
        if query.matches(&molecule) != config.reverse {
            reporter.increment();
            Some(molecule)
        } else {
            None
        }
    };

    #[cfg(not(feature = "parallel"))]
    let kept: Vec<Q::Molecule> = molecules.into_iter().filter_map(keep).collect();

    #[cfg(feature = "parallel")]
    let kept: Vec<Q::Molecule> = match config.threads.filter(|&n| n > 0) {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| EngineError::Initialization(e.to_string()))?
            .install(|| molecules.into_par_iter().filter_map(keep).collect::<Vec<_>>()),
        None => molecules.into_par_iter().filter_map(keep).collect(),
    };

    reporter.report(Progress::TaskFinish);

    let summary = ScreenSummary {
        examined,
        too_heavy: too_heavy.into_inner(),
        kept: kept.len(),
    };
    info!(
        kept = summary.kept,
        too_heavy = summary.too_heavy,
        "Substructure screen finished."
    );
    Ok(ScreenResult { kept, summary })
}
