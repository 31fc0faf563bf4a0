//! Output of exported rows and coverage reports.
//!
//! Exported rows are first laid out as a [`Table`]: a header row followed by one row per country,
//! identity columns first. The table is then rendered as Excel, CSV or JSON. Coverage reports are
//! written as YAML, and both workflows print a console summary.

pub mod console;
mod csv;
mod excel;
mod json;
mod yaml;

pub use csv::generate as generate_csv;
pub use excel::generate as generate_xlsx;
pub use json::generate as generate_json;
pub use yaml::save as save_yaml;

use crate::record::{COUNTRY_CODE_COLUMN, COUNTRY_NAME_COLUMN, FieldMapping, OutputRow};

/// Exported rows in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Lay out rows under the headers implied by `mappings`.
    ///
    /// The headers come from the mappings so that a table without rows still has its columns.
    #[must_use]
    pub fn new(mappings: &[FieldMapping], rows: &[OutputRow]) -> Self {
        let headers = [COUNTRY_CODE_COLUMN, COUNTRY_NAME_COLUMN]
            .into_iter()
            .map(str::to_string)
            .chain(mappings.iter().map(|m| m.display_name.clone()))
            .collect();

        let rows = rows
            .iter()
            .map(|row| row.values().map(|value| value.map(str::to_string)).collect())
            .collect();

        Self { headers, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::project;
    use serde_json::json;

    #[test]
    fn test_table_from_rows() {
        let mappings = vec![
            FieldMapping::new("Government.Capital.name.text", "Capital"),
            FieldMapping::new("Geography.Climate.text", "Climate"),
        ];
        let record = json!({"Government": {"Capital": {"name": {"text": "Paris"}}}});
        let row = project("fr", "France", &record, &mappings);

        let table = Table::new(&mappings, &[row]);
        assert_eq!(table.headers, ["Country Code", "Country Name", "Capital", "Climate"]);
        assert_eq!(
            table.rows,
            [vec![Some("FR".to_string()), Some("France".to_string()), Some("Paris".to_string()), None]]
        );
    }

    #[test]
    fn test_empty_table_keeps_headers() {
        let table = Table::new(&[FieldMapping::new("A.text", "A")], &[]);
        assert_eq!(table.headers.len(), 3);
        assert!(table.rows.is_empty());
    }
}
