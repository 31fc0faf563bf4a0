use super::Table;
use crate::Result;
use core::fmt::Write;
use serde_json::{Map, Value};

/// Write the table as a JSON array with one object per row, keys in column order.
///
/// Empty cells are `null`.
///
/// # Errors
///
/// Returns an error if the output cannot be written
pub fn generate<W: Write>(table: &Table, writer: &mut W) -> Result<()> {
    let rows: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = table
                .headers
                .iter()
                .zip(row)
                .map(|(header, value)| (header.clone(), value.clone().map_or(Value::Null, Value::String)))
                .collect();
            Value::Object(object)
        })
        .collect();

    write!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_become_ordered_objects() {
        let table = Table {
            headers: vec!["Country Code".to_string(), "Country Name".to_string(), "Capital".to_string()],
            rows: vec![vec![Some("FR".to_string()), Some("France".to_string()), None]],
        };

        let mut output = String::new();
        generate(&table, &mut output).unwrap();
        insta::assert_snapshot!(output, @r#"
        [
          {
            "Country Code": "FR",
            "Country Name": "France",
            "Capital": null
          }
        ]
        "#);
    }

    #[test]
    fn test_empty_table() {
        let table = Table {
            headers: vec!["Country Code".to_string()],
            rows: Vec::new(),
        };
        let mut output = String::new();
        generate(&table, &mut output).unwrap();
        assert_eq!(output, "[]");
    }
}
