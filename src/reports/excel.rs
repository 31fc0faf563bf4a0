//! Excel output of exported rows.

use super::Table;
use crate::Result;
use ohno::app_err;
use rust_xlsxwriter::{Color, DocProperties, Format, FormatAlign, Workbook};
use std::io::Write;

/// Widest a column is allowed to grow, in characters.
const MAX_COLUMN_WIDTH: usize = 50;

/// Most columns a worksheet can hold.
const MAX_COLUMNS: usize = 16_384;

/// Longest text Excel accepts in a single cell.
const MAX_CELL_CHARS: usize = 32_767;

const HEADER_BACKGROUND: Color = Color::RGB(0x0036_6092);

/// Write the table as a single-sheet workbook.
///
/// The header row is bold white on blue, centered, wrapped and frozen. Each column is sized to its
/// longest entry, capped at [`MAX_COLUMN_WIDTH`].
///
/// # Errors
///
/// Returns an error if the table has more than [`MAX_COLUMNS`] columns, the sheet name is rejected,
/// or the workbook cannot be written
#[expect(unused_results, reason = "rust_xlsxwriter methods return &mut Worksheet for chaining")]
pub fn generate<W: Write>(table: &Table, sheet_name: &str, writer: &mut W) -> Result<()> {
    if table.headers.len() > MAX_COLUMNS {
        return Err(app_err!(
            "{} columns exceed the Excel limit of {MAX_COLUMNS}; select fewer fields",
            table.headers.len()
        ));
    }

    let mut workbook = Workbook::new();

    let properties = DocProperties::new().set_author("factbook-export").set_title("CIA World Factbook export");
    workbook.set_properties(&properties);

    let worksheet = workbook.add_worksheet().set_name(sheet_name)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(HEADER_BACKGROUND)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column_index(col), header, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        #[expect(clippy::cast_possible_truncation, reason = "row count is limited to the number of countries")]
        let row_num = (row_idx + 1) as u32;

        for (col, value) in row.iter().enumerate() {
            if let Some(value) = value {
                worksheet.write_string(row_num, column_index(col), clamp_cell(value))?;
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;

    for (col, width) in column_widths(table).into_iter().enumerate() {
        #[expect(clippy::cast_precision_loss, reason = "column widths are at most MAX_COLUMN_WIDTH")]
        worksheet.set_column_width(column_index(col), width as f64)?;
    }

    let data = workbook.save_to_buffer()?;
    writer.write_all(&data)?;

    Ok(())
}

#[expect(clippy::cast_possible_truncation, reason = "column count is checked against MAX_COLUMNS before writing")]
const fn column_index(col: usize) -> u16 {
    col as u16
}

fn clamp_cell(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Width of every column: the longest header or value plus padding, capped.
fn column_widths(table: &Table) -> Vec<usize> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest = table
                .rows
                .iter()
                .filter_map(|row| row.get(col).and_then(Option::as_deref))
                .map(|value| value.chars().count())
                .chain(core::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);

            (longest + 2).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}
