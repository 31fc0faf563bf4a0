use crate::Result;
use crate::coverage::{SimpleReport, Tier};
use crate::record::FieldPath;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};

/// A known field with its label, category and last measured coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    pub json_path: String,
    pub display_name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_pct: Option<f64>,
}

/// Every field path discovered by a coverage analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldCatalog {
    pub fields: Vec<CatalogEntry>,
}

impl FieldCatalog {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).into_app_err("parsing field catalog")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).into_app_err("serializing field catalog")
    }

    /// Derive a catalog from a simplified coverage report.
    ///
    /// The category of a field is its top-level section. Categories are sorted alphabetically
    /// and fields within a category by display name.
    #[must_use]
    pub fn from_simple_report(report: &SimpleReport) -> Self {
        let mut fields: Vec<CatalogEntry> = report
            .fields
            .iter()
            .map(|field| CatalogEntry {
                json_path: field.json_path.clone(),
                display_name: field.field_name.clone(),
                category: field.json_path.split(FieldPath::SEPARATOR).next().unwrap_or_default().to_string(),
                coverage_pct: Some(field.coverage_pct),
            })
            .collect();

        fields.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.display_name.cmp(&b.display_name)));
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, json_path: &str) -> Option<&CatalogEntry> {
        self.fields.iter().find(|f| f.json_path == json_path)
    }

    #[must_use]
    pub fn contains(&self, json_path: &str) -> bool {
        self.get(json_path).is_some()
    }

    /// Paths whose recorded coverage makes them universal, in catalog order.
    #[must_use]
    pub fn universal_paths(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.coverage_pct.is_some_and(|pct| Tier::classify(pct) == Tier::Universal))
            .map(|f| f.json_path.as_str())
            .collect()
    }

    /// Number of fields per category, in catalog order.
    #[must_use]
    pub fn category_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for field in &self.fields {
            match counts.iter_mut().find(|(category, _)| *category == field.category) {
                Some((_, count)) => *count += 1,
                None => counts.push((field.category.as_str(), 1)),
            }
        }
        counts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::{SimpleField, SimpleMetadata};
    use chrono::Utc;

    fn report() -> SimpleReport {
        let field = |name: &str, path: &str, pct: f64| SimpleField {
            field_name: name.to_string(),
            json_path: path.to_string(),
            coverage_pct: pct,
        };

        SimpleReport {
            metadata: SimpleMetadata {
                total_countries: 3,
                generated_at: Utc::now(),
            },
            fields: vec![
                field("Location", "Geography.Location.text", 100.0),
                field("Industries", "Economy.Industries.text", 96.0),
                field("Area", "Geography.Area.total.text", 95.0),
                field("Airports", "Transportation.Airports.text", 66.7),
                field("Agricultural Products", "Economy.Agricultural products.text", 94.9),
            ],
        }
    }

    #[test]
    fn test_grouped_and_sorted() {
        let catalog = FieldCatalog::from_simple_report(&report());
        let order: Vec<_> = catalog.fields.iter().map(|f| f.json_path.as_str()).collect();
        assert_eq!(
            order,
            [
                "Economy.Agricultural products.text",
                "Economy.Industries.text",
                "Geography.Area.total.text",
                "Geography.Location.text",
                "Transportation.Airports.text",
            ]
        );
        assert_eq!(catalog.category_counts(), [("Economy", 2), ("Geography", 2), ("Transportation", 1)]);
    }

    #[test]
    fn test_universal_paths() {
        let catalog = FieldCatalog::from_simple_report(&report());
        assert_eq!(
            catalog.universal_paths(),
            ["Economy.Industries.text", "Geography.Area.total.text", "Geography.Location.text"]
        );
    }

    #[test]
    fn test_yaml_round_trip_keeps_coverage() {
        let catalog = FieldCatalog::from_simple_report(&report());
        let parsed = FieldCatalog::from_yaml(&catalog.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, catalog);
        assert_eq!(parsed.get("Geography.Location.text").and_then(|f| f.coverage_pct), Some(100.0));
    }

    #[test]
    fn test_entries_without_coverage_are_never_universal() {
        let catalog = FieldCatalog::from_yaml(
            "fields:\n  - json_path: A.b\n    display_name: B\n    category: A\n",
        )
        .unwrap();
        assert!(catalog.contains("A.b"));
        assert!(catalog.universal_paths().is_empty());
    }
}
