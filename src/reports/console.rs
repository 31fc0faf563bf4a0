//! Human-readable summaries printed after an export or an analysis.

use super::Table;
use crate::Result;
use crate::coverage::{DetailedReport, FieldStats, Tier, coverage_pct};
use camino::Utf8Path;
use core::fmt::Write;
use owo_colors::OwoColorize;
use strum::IntoEnumIterator;

const TOP_FIELDS: usize = 15;
const BOTTOM_FIELDS: usize = 10;

/// What an export produced.
#[derive(Debug)]
pub struct ExportSummary<'a> {
    pub countries: usize,
    pub fields: usize,
    pub files: Vec<(&'a Utf8Path, u64)>,
    pub failed: &'a [String],
}

pub fn export_summary<W: Write>(summary: &ExportSummary<'_>, use_colors: bool, writer: &mut W) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{} Export complete", success_mark(use_colors))?;
    writeln!(writer, "  Countries exported: {}", summary.countries)?;
    writeln!(writer, "  Fields per country: {}", summary.fields)?;
    for (path, size) in &summary.files {
        writeln!(writer, "  Output file:        {path} ({})", format_size(*size))?;
    }

    if !summary.failed.is_empty() {
        let noun = if summary.failed.len() == 1 { "country" } else { "countries" };
        writeln!(
            writer,
            "{} Could not fetch {} {noun}: {}",
            warning_mark(use_colors),
            summary.failed.len(),
            summary.failed.join(", ")
        )?;
    }

    Ok(())
}

/// How many exported rows have a value for each field column.
pub fn field_availability<W: Write>(table: &Table, use_colors: bool, writer: &mut W) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{} Field availability", info_mark(use_colors))?;

    let total = table.rows.len();
    let width = table.headers.iter().map(|h| h.chars().count()).max().unwrap_or(0);

    // the identity columns are always filled
    for (col, header) in table.headers.iter().enumerate().skip(2) {
        let present = table
            .rows
            .iter()
            .filter(|row| row.get(col).is_some_and(Option::is_some))
            .count();
        writeln!(
            writer,
            "  {header:<width$}  {present}/{total} ({:.1}%)",
            coverage_pct(present, total)
        )?;
    }

    Ok(())
}

pub fn coverage_summary<W: Write>(report: &DetailedReport, use_colors: bool, writer: &mut W) -> Result<()> {
    let summary = &report.summary;

    writeln!(writer)?;
    if use_colors {
        writeln!(writer, "{}", "Coverage Analysis Summary".green().bold())?;
    } else {
        writeln!(writer, "Coverage Analysis Summary")?;
    }
    writeln!(writer, "  Countries analyzed: {}", summary.processed_countries)?;
    writeln!(writer, "  Countries failed:   {}", summary.failed_countries)?;
    writeln!(writer, "  Unique fields:      {}", summary.total_unique_fields)?;

    writeln!(writer)?;
    writeln!(writer, "Tier distribution")?;
    for tier in Tier::iter() {
        let count = summary.count_for(tier);
        let label = format!("{tier} ({})", tier.range_label());
        writeln!(
            writer,
            "  {label:<18} {count:>6} ({:.1}%)",
            coverage_pct(count, summary.total_unique_fields)
        )?;
    }

    let fields = &report.fields.0;
    if !fields.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Top {} fields", TOP_FIELDS.min(fields.len()))?;
        for (path, stats) in fields.iter().take(TOP_FIELDS) {
            write_field_line(writer, path, stats, use_colors)?;
        }

        if fields.len() > TOP_FIELDS {
            let bottom: Vec<_> = fields.iter().rev().take(BOTTOM_FIELDS).collect();
            writeln!(writer)?;
            writeln!(writer, "Bottom {} fields", bottom.len())?;
            for (path, stats) in bottom.into_iter().rev() {
                write_field_line(writer, path, stats, use_colors)?;
            }
        }
    }

    if let Some(failed) = &report.failed_countries {
        writeln!(writer)?;
        writeln!(
            writer,
            "{} Could not fetch {} countries: {}",
            warning_mark(use_colors),
            failed.count,
            failed.codes.join(", ")
        )?;
    }

    Ok(())
}

fn write_field_line<W: Write>(writer: &mut W, path: &str, stats: &FieldStats, use_colors: bool) -> Result<()> {
    let pct = format!("{:>5.1}%", stats.coverage_pct);
    let pct = if use_colors {
        match stats.tier {
            Tier::Universal => pct.green().to_string(),
            Tier::Common => pct.yellow().to_string(),
            Tier::Partial => pct.red().to_string(),
        }
    } else {
        pct
    };

    writeln!(writer, "  {pct}  {path}")?;
    Ok(())
}

pub fn success_mark(use_colors: bool) -> String {
    if use_colors { "✓".green().bold().to_string() } else { "✓".to_string() }
}

pub fn failure_mark(use_colors: bool) -> String {
    if use_colors { "✗".red().bold().to_string() } else { "✗".to_string() }
}

pub fn warning_mark(use_colors: bool) -> String {
    if use_colors { "⚠".yellow().bold().to_string() } else { "⚠".to_string() }
}

pub fn info_mark(use_colors: bool) -> String {
    if use_colors { "ℹ".cyan().bold().to_string() } else { "ℹ".to_string() }
}

/// Format a byte count with a binary unit, e.g. `12.3 KB`.
#[expect(clippy::cast_precision_loss, reason = "file sizes only need one decimal of precision")]
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let size = bytes as f64;
    if size < KB {
        format!("{bytes} B")
    } else if size < MB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{:.1} MB", size / MB)
    }
}
