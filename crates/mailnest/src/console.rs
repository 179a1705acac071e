//! Terminal rendering of run events.

use std::sync::atomic::{AtomicU64, Ordering};

use mailnest_core::{RunObserver, RunOutcome};

/// Progress percent between printed progress lines.
const PROGRESS_STEP: u64 = 10;

/// Prints log lines with a local timestamp, and progress every 10%.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    json: bool,
    /// Last printed progress percent, plus one; zero means none yet.
    last_percent: AtomicU64,
}

impl ConsoleObserver {
    /// With `json`, the outcome is printed as JSON on completion.
    #[must_use]
    pub const fn new(json: bool) -> Self {
        Self {
            json,
            last_percent: AtomicU64::new(0),
        }
    }

    fn stamp() -> String {
        chrono::Local::now().format("%H:%M:%S").to_string()
    }
}

/// Whole percent for a fraction in `[0, 1]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(fraction: f64) -> u64 {
    (fraction.clamp(0.0, 1.0) * 100.0).floor() as u64
}

impl RunObserver for ConsoleObserver {
    fn log(&self, message: &str) {
        println!("[{}] {message}", Self::stamp());
    }

    fn progress(&self, fraction: f64, message: &str) {
        let percent = percent(fraction);
        tracing::debug!(percent, message, "progress");
        let bucket = percent / PROGRESS_STEP + 1;
        if self.last_percent.fetch_max(bucket, Ordering::Relaxed) < bucket {
            eprintln!("[{}] {percent:>3}% {message}", Self::stamp());
        }
    }

    fn complete(&self, outcome: &RunOutcome) {
        self.last_percent.store(0, Ordering::Relaxed);
        if self.json {
            match serde_json::to_string_pretty(outcome) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!(?e, "could not serialize outcome"),
            }
        }
    }

    fn error(&self, message: &str) {
        self.last_percent.store(0, Ordering::Relaxed);
        eprintln!("[{}] ❌ {message}", Self::stamp());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(0.305), 30);
        assert_eq!(percent(1.0), 100);
        assert_eq!(percent(7.0), 100);
    }

    #[test]
    fn test_progress_buckets() {
        let observer = ConsoleObserver::new(false);
        observer.progress(0.05, "a");
        assert_eq!(observer.last_percent.load(Ordering::Relaxed), 1);
        observer.progress(0.31, "b");
        assert_eq!(observer.last_percent.load(Ordering::Relaxed), 4);
        observer.complete(&RunOutcome::default());
        assert_eq!(observer.last_percent.load(Ordering::Relaxed), 0);
    }
}
