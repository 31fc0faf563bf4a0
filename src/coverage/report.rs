//! Serialized forms of a coverage analysis.
//!
//! Two shapes are produced. The detailed report keeps per-field counts, the countries lacking
//! each field and a tier summary. The simplified report keeps only a display name, the path and
//! the percentage, and is the input of the catalog step.

use super::{CoverageAggregator, Tier};
use crate::record::name_for;
use chrono::{DateTime, Utc};
use core::fmt::Formatter;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedMetadata {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub total_countries_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub present: usize,
    pub missing: usize,
    pub missing_countries: Vec<String>,
    pub coverage_pct: f64,
    pub tier: Tier,
}

/// Field statistics keyed by path, kept in report order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStatsTable(pub Vec<(String, FieldStats)>);

impl FieldStatsTable {
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FieldStats> {
        self.0.iter().find(|(p, _)| p == path).map(|(_, stats)| stats)
    }
}

impl Serialize for FieldStatsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (path, stats) in &self.0 {
            map.serialize_entry(path, stats)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldStatsTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = FieldStatsTable;

            fn expecting(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
                f.write_str("a mapping of field paths to coverage statistics")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((path, stats)) = access.next_entry::<String, FieldStats>()? {
                    entries.push((path, stats));
                }
                Ok(FieldStatsTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_countries: usize,
    pub processed_countries: usize,
    pub failed_countries: usize,
    pub total_unique_fields: usize,
    pub universal_fields: usize,
    pub common_fields: usize,
    pub partial_fields: usize,
}

impl Summary {
    #[must_use]
    pub const fn count_for(&self, tier: Tier) -> usize {
        match tier {
            Tier::Universal => self.universal_fields,
            Tier::Common => self.common_fields,
            Tier::Partial => self.partial_fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCountries {
    pub count: usize,
    pub codes: Vec<String>,
}

/// Full coverage report with per-field missing-country lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedReport {
    pub metadata: DetailedMetadata,
    pub fields: FieldStatsTable,
    pub summary: Summary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_countries: Option<FailedCountries>,
}

impl DetailedReport {
    #[must_use]
    pub fn build(aggregator: &CoverageAggregator, generated_at: DateTime<Utc>) -> Self {
        let entries = aggregator.entries();

        let count_tier = |tier: Tier| entries.iter().filter(|e| e.tier == tier).count();
        let summary = Summary {
            total_countries: aggregator.total_count(),
            processed_countries: aggregator.processed_count(),
            failed_countries: aggregator.failed_count(),
            total_unique_fields: entries.len(),
            universal_fields: count_tier(Tier::Universal),
            common_fields: count_tier(Tier::Common),
            partial_fields: count_tier(Tier::Partial),
        };

        let fields = entries
            .iter()
            .map(|entry| {
                let stats = FieldStats {
                    present: entry.present_count,
                    missing: entry.absent_count,
                    missing_countries: aggregator.missing_countries(&entry.path).into_iter().map(str::to_string).collect(),
                    coverage_pct: entry.coverage_pct,
                    tier: entry.tier,
                };
                (entry.path.to_string(), stats)
            })
            .collect();

        let failed_countries = (aggregator.failed_count() > 0).then(|| {
            let mut codes = aggregator.failed_countries().to_vec();
            codes.sort();
            FailedCountries { count: codes.len(), codes }
        });

        Self {
            metadata: DetailedMetadata {
                generated_at,
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
                total_countries_analyzed: aggregator.total_count(),
            },
            fields: FieldStatsTable(fields),
            summary,
            failed_countries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleMetadata {
    pub total_countries: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleField {
    pub field_name: String,
    pub json_path: String,
    pub coverage_pct: f64,
}

/// Compact coverage report: one entry per field with a display name and percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleReport {
    pub metadata: SimpleMetadata,
    pub fields: Vec<SimpleField>,
}

impl SimpleReport {
    #[must_use]
    pub fn build(aggregator: &CoverageAggregator, generated_at: DateTime<Utc>) -> Self {
        let fields = aggregator
            .entries()
            .into_iter()
            .map(|entry| SimpleField {
                field_name: name_for(entry.path.as_str()),
                json_path: entry.path.to_string(),
                coverage_pct: entry.coverage_pct,
            })
            .collect();

        Self {
            metadata: SimpleMetadata {
                total_countries: aggregator.total_count(),
                generated_at,
            },
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::extract;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    fn sample_aggregator() -> CoverageAggregator {
        let mut aggregator = CoverageAggregator::new();
        aggregator.observe("fr", Some(&extract(&json!({ "Geography": { "Area": { "text": "1" } }, "Name": "France" }))));
        aggregator.observe("de", Some(&extract(&json!({ "Name": "Germany" }))));
        aggregator.observe("zz", None);
        aggregator.observe("it", Some(&extract(&json!({ "Geography": { "Area": { "text": "3" } }, "Name": "Italy" }))));
        aggregator
    }

    #[test]
    fn test_simple_report_shape() {
        let report = SimpleReport::build(&sample_aggregator(), fixed_time());

        assert_eq!(report.metadata.total_countries, 4);
        assert_eq!(report.fields.len(), 2);

        let area = report.fields.iter().find(|f| f.json_path == "Geography.Area.text").unwrap();
        assert_eq!(area.field_name, "Area");
        assert!((area.coverage_pct - 66.7).abs() < f64::EPSILON);
        assert_eq!(report.fields.first().map(|f| f.json_path.as_str()), Some("Name"));
    }

    #[test]
    fn test_detailed_report_contents() {
        let report = DetailedReport::build(&sample_aggregator(), fixed_time());

        assert_eq!(report.summary.total_countries, 4);
        assert_eq!(report.summary.processed_countries, 3);
        assert_eq!(report.summary.failed_countries, 1);
        assert_eq!(report.summary.total_unique_fields, 2);
        assert_eq!(report.summary.universal_fields, 1);
        assert_eq!(report.summary.partial_fields, 1);

        let area = report.fields.get("Geography.Area.text").unwrap();
        assert_eq!(area.present, 2);
        assert_eq!(area.missing, 1);
        assert_eq!(area.missing_countries, ["de"]);

        let failed = report.failed_countries.as_ref().unwrap();
        assert_eq!(failed.codes, ["zz"]);
    }

    #[test]
    fn test_detailed_report_yaml_keeps_field_order() {
        let report = DetailedReport::build(&sample_aggregator(), fixed_time());
        let yaml = serde_yaml::to_string(&report).unwrap();

        let name_pos = yaml.find("Name:").unwrap();
        let area_pos = yaml.find("Geography.Area.text:").unwrap();
        assert!(name_pos < area_pos);

        let parsed: DetailedReport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_failed_section_omitted_when_empty() {
        let mut aggregator = CoverageAggregator::new();
        aggregator.observe("fr", Some(&extract(&json!({ "Name": "France" }))));

        let report = DetailedReport::build(&aggregator, fixed_time());
        assert!(report.failed_countries.is_none());
        assert!(!serde_yaml::to_string(&report).unwrap().contains("failed_countries:\n"));
    }

    #[test]
    fn test_simple_report_yaml_round_trip() {
        let report = SimpleReport::build(&sample_aggregator(), fixed_time());
        let yaml = serde_yaml::to_string(&report).unwrap();
        let parsed: SimpleReport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, report);
    }
}
