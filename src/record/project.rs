use super::{Resolution, resolve};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

const LOG_TARGET: &str = "   project";

pub const COUNTRY_CODE_COLUMN: &str = "Country Code";
pub const COUNTRY_NAME_COLUMN: &str = "Country Name";

/// Binds a field path to the spreadsheet column that shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMapping {
    pub json_path: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl FieldMapping {
    #[must_use]
    pub fn new(json_path: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            json_path: json_path.into(),
            display_name: display_name.into(),
            category: None,
        }
    }
}

/// Make every column label unique so that no cell is lost when rows are keyed by label.
///
/// A label shared by several mappings, or by an identity column, is qualified with the parent
/// segment of its path (`Total (Area)`, `Total (Median age)`). Labels that still collide get a
/// numeric suffix.
pub fn disambiguate_columns(mappings: &mut [FieldMapping]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for mapping in mappings.iter() {
        *counts.entry(mapping.display_name.clone()).or_default() += 1;
    }

    let mut used: HashSet<String> = [COUNTRY_CODE_COLUMN, COUNTRY_NAME_COLUMN].into_iter().map(str::to_string).collect();
    for mapping in mappings.iter_mut() {
        let shared = counts.get(&mapping.display_name).is_some_and(|&n| n > 1) || used.contains(&mapping.display_name);
        let mut label = match parent_segment(&mapping.json_path) {
            Some(parent) if shared => format!("{} ({parent})", mapping.display_name),
            _ => mapping.display_name.clone(),
        };

        let base = label.clone();
        let mut n = 2;
        while used.contains(&label) {
            label = format!("{base} {n}");
            n += 1;
        }

        if label != mapping.display_name {
            log::debug!(target: LOG_TARGET, "Column for '{}' renamed to '{label}'", mapping.json_path);
            mapping.display_name.clone_from(&label);
        }
        let _ = used.insert(label);
    }
}

/// The segment above the field name, ignoring a trailing `text` segment.
fn parent_segment(json_path: &str) -> Option<&str> {
    let trimmed = json_path.strip_suffix(".text").unwrap_or(json_path);
    trimmed.rsplit('.').nth(1)
}

/// One flattened country: identity columns followed by one cell per mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub country_code: String,
    pub country_name: String,
    pub cells: Vec<(String, Option<String>)>,
}

impl OutputRow {
    /// Column headers in output order, including the identity columns.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        [COUNTRY_CODE_COLUMN, COUNTRY_NAME_COLUMN]
            .into_iter()
            .chain(self.cells.iter().map(|(column, _)| column.as_str()))
    }

    /// Cell values in output order; empty cells are `None`.
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        [Some(self.country_code.as_str()), Some(self.country_name.as_str())]
            .into_iter()
            .chain(self.cells.iter().map(|(_, value)| value.as_deref()))
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.cells.len() + 2
    }

    /// The value shown under `column`, if the column exists and is not empty.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.iter().find(|(c, _)| c == column).and_then(|(_, v)| v.as_deref())
    }
}

/// Flatten one record into a row with a cell for every mapping.
///
/// A mapping that cannot be resolved degrades to an empty cell; the row is always complete.
#[must_use]
pub fn project(country_code: &str, country_name: &str, record: &Value, mappings: &[FieldMapping]) -> OutputRow {
    let cells = mappings
        .iter()
        .map(|mapping| {
            let value = match resolve(record, &mapping.json_path) {
                Resolution::Value(v) => Some(v),
                Resolution::Absent => None,
                Resolution::Error(e) => {
                    log::warn!(
                        target: LOG_TARGET,
                        "Could not resolve '{}' for country '{country_code}': {e}",
                        mapping.json_path
                    );
                    None
                }
            };

            (mapping.display_name.clone(), value)
        })
        .collect();

    OutputRow {
        country_code: country_code.to_uppercase(),
        country_name: country_name.to_string(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_mappings() -> Vec<FieldMapping> {
        vec![
            FieldMapping::new("Geography.Area.total", "Total Area"),
            FieldMapping::new("Government.Capital.name.text", "Capital"),
            FieldMapping::new("People.Languages.text", "Languages"),
        ]
    }

    #[test]
    fn test_identity_columns_first() {
        let record = json!({ "Geography": { "Area": { "total": { "text": "643,801 sq km" } } } });
        let row = project("fr", "France", &record, &sample_mappings());

        assert_eq!(row.country_code, "FR");
        assert_eq!(
            row.columns().collect::<Vec<_>>(),
            ["Country Code", "Country Name", "Total Area", "Capital", "Languages"]
        );
        assert_eq!(row.values().next(), Some(Some("FR")));
    }

    #[test]
    fn test_every_mapping_has_a_cell() {
        let mappings = sample_mappings();
        let row = project("xx", "Nowhere", &json!({}), &mappings);

        assert_eq!(row.column_count(), mappings.len() + 2);
        assert!(row.cells.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_values_resolved() {
        let record = json!({
            "Government": { "Capital": { "name": { "text": "<strong>Paris</strong>" } } },
            "People": { "Languages": { "text": "French <em>(official)</em>" } }
        });
        let row = project("FR", "France", &record, &sample_mappings());

        assert_eq!(row.get("Capital"), Some("Paris"));
        assert_eq!(row.get("Languages"), Some("French (official)"));
        assert_eq!(row.get("Total Area"), None);
    }

    #[test]
    fn test_malformed_mapping_degrades_to_empty_cell() {
        let mut mappings = sample_mappings();
        mappings.insert(0, FieldMapping::new("Geography..Area", "Broken"));

        let record = json!({ "Government": { "Capital": { "name": { "text": "Paris" } } } });
        let row = project("fr", "France", &record, &mappings);

        assert_eq!(row.column_count(), 6);
        assert_eq!(row.get("Broken"), None);
        assert_eq!(row.get("Capital"), Some("Paris"));
    }

    #[test]
    fn test_colliding_labels_qualified_by_parent() {
        let mut mappings = vec![
            FieldMapping::new("Geography.Area.total.text", "Total"),
            FieldMapping::new("People and Society.Median age.total.text", "Total"),
            FieldMapping::new("Government.Capital.name.text", "Capital"),
        ];
        disambiguate_columns(&mut mappings);

        let labels: Vec<_> = mappings.iter().map(|m| m.display_name.as_str()).collect();
        assert_eq!(labels, ["Total (Area)", "Total (Median age)", "Capital"]);
    }

    #[test]
    fn test_labels_unique_after_qualifying() {
        let mut mappings = vec![
            FieldMapping::new("A.Area.total", "Total"),
            FieldMapping::new("B.Area.total", "Total"),
            FieldMapping::new("Government.Country name.conventional short form.text", "Country Name"),
            FieldMapping::new("Name", "Name"),
        ];
        disambiguate_columns(&mut mappings);

        let labels: Vec<_> = mappings.iter().map(|m| m.display_name.as_str()).collect();
        assert_eq!(labels, ["Total (Area)", "Total (Area) 2", "Country Name (Country name)", "Name"]);

        let record = json!({ "A": { "Area": { "total": "1" } }, "B": { "Area": { "total": "2" } } });
        let row = project("xx", "X", &record, &mappings);
        assert_eq!(row.get("Total (Area)"), Some("1"));
        assert_eq!(row.get("Total (Area) 2"), Some("2"));
    }
}
