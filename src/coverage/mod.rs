//! Field coverage analysis across many country records.

mod aggregator;
mod report;
mod tier;

pub use aggregator::{CoverageAggregator, CoverageEntry, coverage_pct};
pub use report::{
    DetailedMetadata, DetailedReport, FailedCountries, FieldStats, FieldStatsTable, SimpleField, SimpleMetadata, SimpleReport, Summary,
};
pub use tier::Tier;
