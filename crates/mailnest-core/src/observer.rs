//! Run progress reporting.
//!
//! A caller passes a [`RunObserver`] into each entry point. The engine
//! talks to it through a [`Reporter`], which maps each phase's local
//! progress onto its slice of the whole run and keeps the reported
//! fraction from ever moving backwards.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::outcome::RunOutcome;

/// Receives the events of one run.
///
/// Called from the task executing the run; implementations must not block.
/// Exactly one of [`complete`](Self::complete) or [`error`](Self::error) is
/// called per run.
pub trait RunObserver: Send + Sync {
    /// A log line.
    fn log(&self, message: &str);

    /// Overall progress in `[0, 1]`, never decreasing within a run.
    fn progress(&self, fraction: f64, message: &str);

    /// The run finished.
    fn complete(&self, outcome: &RunOutcome);

    /// The run was aborted.
    fn error(&self, message: &str);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn log(&self, _message: &str) {}
    fn progress(&self, _fraction: f64, _message: &str) {}
    fn complete(&self, _outcome: &RunOutcome) {}
    fn error(&self, _message: &str) {}
}

/// A view of the run's progress range.
#[derive(Clone)]
pub struct Reporter<'a> {
    observer: &'a dyn RunObserver,
    /// Highest fraction reported so far, as `f64` bits. Non-negative
    /// floats order the same as their bit patterns.
    high_water: Arc<AtomicU64>,
    start: f64,
    span: f64,
}

impl std::fmt::Debug for Reporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("start", &self.start)
            .field("span", &self.span)
            .finish_non_exhaustive()
    }
}

impl<'a> Reporter<'a> {
    /// Reporter covering the whole run, `0.0` to `1.0`.
    #[must_use]
    pub fn new(observer: &'a dyn RunObserver) -> Self {
        Self {
            observer,
            high_water: Arc::new(AtomicU64::new(0.0_f64.to_bits())),
            start: 0.0,
            span: 1.0,
        }
    }

    /// Reporter for the sub-range `[from, to]` of this one.
    #[must_use]
    pub fn scope(&self, from: f64, to: f64) -> Self {
        let from = from.clamp(0.0, 1.0);
        let to = to.clamp(from, 1.0);
        Self {
            observer: self.observer,
            high_water: Arc::clone(&self.high_water),
            start: self.start + self.span * from,
            span: self.span * (to - from),
        }
    }

    /// Emits a log line.
    pub fn log(&self, message: &str) {
        self.observer.log(message);
    }

    /// Reports phase-local progress `local` in `[0, 1]`.
    ///
    /// A value below an earlier report is raised to it.
    pub fn progress(&self, local: f64, message: &str) {
        let local = if local.is_nan() { 0.0 } else { local.clamp(0.0, 1.0) };
        let global = (self.start + self.span * local).clamp(0.0, 1.0);
        let previous = self
            .high_water
            .fetch_max(global.to_bits(), Ordering::Relaxed);
        let fraction = global.max(f64::from_bits(previous));
        self.observer.progress(fraction, message);
    }

    /// Reports `done` of `total` steps.
    pub fn step(&self, done: usize, total: usize, message: &str) {
        #[allow(clippy::cast_precision_loss)]
        let local = if total == 0 { 1.0 } else { done as f64 / total as f64 };
        self.progress(local, message);
    }

    /// Terminal success event.
    pub fn complete(&self, outcome: &RunOutcome) {
        self.observer.complete(outcome);
    }

    /// Terminal failure event.
    pub fn error(&self, message: &str) {
        self.observer.error(message);
    }
}


#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::recording::RecordingObserver;
    use super::*;

    #[test]
    fn test_scope_maps_range() {
        let observer = RecordingObserver::default();
        let root = Reporter::new(&observer);
        let listing = root.scope(0.1, 0.3);
        listing.progress(0.5, "half");
        assert!((observer.fractions()[0] - 0.2).abs() < 1e-12);

        let nested = root.scope(0.5, 1.0).scope(0.5, 1.0);
        nested.progress(0.0, "start");
        assert!((observer.fractions()[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_progress_never_goes_backwards() {
        let observer = RecordingObserver::default();
        let root = Reporter::new(&observer);
        root.progress(0.6, "ahead");
        root.scope(0.0, 0.5).progress(1.0, "behind");
        root.progress(0.7, "forward");
        assert_eq!(observer.fractions(), vec![0.6, 0.6, 0.7]);
    }

    #[test]
    fn test_progress_clamped() {
        let observer = RecordingObserver::default();
        let root = Reporter::new(&observer);
        root.progress(-1.0, "low");
        root.progress(f64::NAN, "nan");
        root.progress(4.0, "high");
        assert_eq!(observer.fractions(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_step() {
        let observer = RecordingObserver::default();
        let root = Reporter::new(&observer);
        root.scope(0.2, 0.4).step(1, 4, "a");
        root.scope(0.4, 0.6).step(0, 0, "empty");
        let fractions = observer.fractions();
        assert!((fractions[0] - 0.25).abs() < 1e-12);
        assert!((fractions[1] - 0.6).abs() < 1e-12);
    }
}
