/// Progress events emitted by long-running scans.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// `None` when the amount of work is unknown up front, as for streamed containers.
    TaskStart { total_steps: Option<u64> },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards progress events to an optional callback.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    #[inline]
    pub fn increment(&self) {
        self.report(Progress::TaskIncrement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::PhaseStart { name: "Scan" });
        reporter.increment();
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p| {
            sink.lock().unwrap().push(p);
        }));

        reporter.report(Progress::TaskStart { total_steps: None });
        reporter.increment();
        reporter.report(Progress::TaskFinish);

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Progress::TaskStart { total_steps: None },
                Progress::TaskIncrement,
                Progress::TaskFinish,
            ]
        );
    }
}
