use super::Table;
use crate::Result;
use core::fmt::Write;
use ohno::{IntoAppError, app_err};

/// Write the table as RFC 4180 CSV with a header row. Empty cells are written as empty fields.
///
/// # Errors
///
/// Returns an error if the output cannot be written
pub fn generate<W: Write>(table: &Table, writer: &mut W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(Vec::new());

    csv_writer.write_record(&table.headers).into_app_err("writing CSV header")?;
    for row in &table.rows {
        csv_writer
            .write_record(row.iter().map(|value| value.as_deref().unwrap_or_default()))
            .into_app_err("writing CSV row")?;
    }

    let bytes = csv_writer
        .into_inner()
        .map_err(|e| app_err!("flushing CSV output: {}", e.error()))?;
    let text = String::from_utf8(bytes).into_app_err("CSV output is not valid UTF-8")?;

    writer.write_str(&text)?;
    Ok(())
}
