//! Run results.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::classify::Category;

/// Summary of one organize or dedupe run, delivered once as the terminal
/// event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    /// Messages classified.
    pub processed: usize,
    /// Messages copied and flagged.
    pub moved: usize,
    /// Messages that could not be moved.
    pub errors: usize,
    /// Messages per category, counted at classification.
    pub categories: BTreeMap<Category, usize>,
    /// Inbox duplicates removed.
    pub duplicates: usize,
}

impl RunOutcome {
    /// Outcome of a dedupe-only run.
    #[must_use]
    pub fn duplicates_only(duplicates: usize) -> Self {
        Self {
            duplicates,
            ..Self::default()
        }
    }

    /// Messages successfully organized.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.moved
    }

    /// Counts one classification.
    pub fn record(&mut self, category: Category) {
        self.processed += 1;
        *self.categories.entry(category).or_default() += 1;
    }

    /// Category breakdown, largest first, e.g. `💰 Faturas: 12 (40.0%)`.
    ///
    /// Percentages are of processed messages. Ties keep category order.
    #[must_use]
    pub fn report_lines(&self) -> Vec<String> {
        let mut counts: Vec<_> = self.categories.iter().filter(|(_, n)| **n > 0).collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));
        counts
            .into_iter()
            .map(|(category, &count)| {
                #[allow(clippy::cast_precision_loss)]
                let percent = if self.processed == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / self.processed as f64
                };
                format!(
                    "{} {}: {count} ({percent:.1}%)",
                    category.icon(),
                    category.label()
                )
            })
            .collect()
    }
}

/// How a duplicate scan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupStatus {
    /// Nothing to remove.
    Clean,
    /// Duplicates were flagged and purged.
    Removed,
    /// Gave up before finishing; nothing was removed.
    Aborted(String),
}

/// Result of a duplicate scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupReport {
    /// Inbox copies flagged for deletion.
    pub removed: usize,
    /// How the scan ended.
    pub status: DedupStatus,
}

impl DedupReport {
    /// No duplicates found.
    #[must_use]
    pub const fn clean() -> Self {
        Self {
            removed: 0,
            status: DedupStatus::Clean,
        }
    }

    /// Scan abandoned.
    #[must_use]
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            removed: 0,
            status: DedupStatus::Aborted(reason.into()),
        }
    }

    /// True if the scan was abandoned.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self.status, DedupStatus::Aborted(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_total() {
        let mut outcome = RunOutcome::default();
        outcome.record(Category::Faturas);
        outcome.record(Category::Faturas);
        outcome.record(Category::Neutros);
        outcome.moved = 2;
        outcome.errors = 1;
        assert_eq!(outcome.processed, 3);
        assert_eq!(outcome.total(), 2);
        assert_eq!(outcome.categories[&Category::Faturas], 2);
    }

    #[test]
    fn test_report_lines_sorted_by_count() {
        let mut outcome = RunOutcome::default();
        outcome.record(Category::Neutros);
        for _ in 0..3 {
            outcome.record(Category::Marketing);
        }
        assert_eq!(
            outcome.report_lines(),
            vec![
                "📢 Marketing: 3 (75.0%)".to_string(),
                "📄 Neutros: 1 (25.0%)".to_string(),
            ]
        );
    }

    #[test]
    fn test_serializes_labels() {
        let mut outcome = RunOutcome::duplicates_only(0);
        outcome.record(Category::Faturas);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["categories"]["Faturas"], 1);
        assert_eq!(json["duplicates"], 0);
    }

    #[test]
    fn test_duplicates_only() {
        let outcome = RunOutcome::duplicates_only(4);
        assert_eq!(outcome.duplicates, 4);
        assert_eq!(outcome.processed, 0);
        assert!(outcome.report_lines().is_empty());
    }

    #[test]
    fn test_dedup_report_status() {
        assert!(DedupReport::aborted("too many errors").is_aborted());
        assert_eq!(DedupReport::clean().removed, 0);
        assert!(!DedupReport::clean().is_aborted());
    }
}
