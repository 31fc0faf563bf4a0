use super::Tier;
use crate::record::{FieldPath, FieldPaths};
use std::collections::HashMap;

/// Coverage statistics of one field path.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageEntry {
    pub path: FieldPath,
    pub present_count: usize,
    pub absent_count: usize,
    pub coverage_pct: f64,
    pub tier: Tier,
}

impl CoverageEntry {
    fn new(path: FieldPath, present_count: usize, processed: usize) -> Self {
        let coverage_pct = coverage_pct(present_count, processed);
        Self {
            path,
            present_count,
            absent_count: processed.saturating_sub(present_count),
            coverage_pct,
            tier: Tier::classify(coverage_pct),
        }
    }
}

/// Percentage of `processed` records that carry a field, rounded to one decimal.
#[expect(clippy::cast_precision_loss, reason = "record counts are far below the f64 precision limit")]
#[must_use]
pub fn coverage_pct(present: usize, processed: usize) -> f64 {
    if processed == 0 {
        return 0.0;
    }

    let pct = present as f64 / processed as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

#[derive(Debug)]
struct PathTally {
    path: FieldPath,

    /// Indices into `CoverageAggregator::processed` of the records carrying this path.
    present_in: Vec<usize>,
}

/// Accumulates field presence across a batch of records.
///
/// The denominator of every percentage is the number of records processed so far. A path
/// first seen in a late record therefore counts as absent from every earlier one. Records
/// that could not be retrieved are tracked separately and never enter the denominator.
#[derive(Debug, Default)]
pub struct CoverageAggregator {
    tallies: Vec<PathTally>,
    index: HashMap<FieldPath, usize>,
    processed: Vec<String>,
    failed: Vec<String>,
}

impl CoverageAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for one country: its field paths, or `None` if it could not be retrieved.
    ///
    /// A record without a single field path carries no data and counts as a failure.
    pub fn observe(&mut self, country_code: &str, paths: Option<&FieldPaths>) {
        match paths {
            Some(paths) if !paths.is_empty() => self.record_success(country_code, paths),
            _ => self.record_failure(country_code),
        }
    }

    pub fn record_success(&mut self, country_code: &str, paths: &FieldPaths) {
        let record_index = self.processed.len();
        self.processed.push(country_code.to_string());

        for path in paths {
            let slot = *self.index.entry(path.clone()).or_insert_with(|| {
                self.tallies.push(PathTally {
                    path: path.clone(),
                    present_in: Vec::new(),
                });
                self.tallies.len() - 1
            });

            if let Some(tally) = self.tallies.get_mut(slot) {
                tally.present_in.push(record_index);
            }
        }
    }

    pub fn record_failure(&mut self, country_code: &str) {
        self.failed.push(country_code.to_string());
    }

    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Every country observed, successful or not.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.processed.len() + self.failed.len()
    }

    #[must_use]
    pub fn unique_field_count(&self) -> usize {
        self.tallies.len()
    }

    /// Codes of the countries that could not be retrieved, in observation order.
    #[must_use]
    pub fn failed_countries(&self) -> &[String] {
        &self.failed
    }

    /// Coverage of every field seen, highest first; ties keep discovery order.
    #[must_use]
    pub fn entries(&self) -> Vec<CoverageEntry> {
        let processed = self.processed.len();
        let mut entries: Vec<_> = self
            .tallies
            .iter()
            .map(|tally| CoverageEntry::new(tally.path.clone(), tally.present_in.len(), processed))
            .collect();

        entries.sort_by(|a, b| b.coverage_pct.total_cmp(&a.coverage_pct));
        entries
    }

    /// Countries processed successfully that lack `path`, in processing order.
    #[must_use]
    pub fn missing_countries(&self, path: &FieldPath) -> Vec<&str> {
        let Some(tally) = self.index.get(path).and_then(|&slot| self.tallies.get(slot)) else {
            return self.processed.iter().map(String::as_str).collect();
        };

        // present_in is ascending, so a single merge pass suffices
        let mut present = tally.present_in.iter().copied().peekable();
        self.processed
            .iter()
            .enumerate()
            .filter(|&(i, _)| {
                if present.peek() == Some(&i) {
                    let _ = present.next();
                    false
                } else {
                    true
                }
            })
            .map(|(_, code)| code.as_str())
            .collect()
    }
}
