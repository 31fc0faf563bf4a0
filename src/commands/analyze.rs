use super::Host;
use super::common::{BatchTracker, CommonArgs, fail};
use crate::Result;
use crate::config::parse_country_codes;
use crate::coverage::{CoverageAggregator, DetailedReport, SimpleReport};
use crate::fetch::{Progress, Provider};
use crate::record::extract;
use crate::reports::console::{coverage_summary, success_mark, warning_mark};
use crate::reports::save_yaml;
use camino::Utf8PathBuf;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use ohno::app_err;
use std::io::Write;

const LOG_TARGET: &str = "   analyze";

pub const DETAILED_REPORT_FILE: &str = "coverage_report.yaml";
pub const SIMPLE_REPORT_FILE: &str = "coverage_simple.yaml";

/// Which coverage reports to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Per-field counts, missing countries and a tier summary
    Detailed,

    /// Display name, path and percentage per field
    Simple,

    /// Both reports
    Both,
}

impl ReportFormat {
    const fn detailed(self) -> bool {
        matches!(self, Self::Detailed | Self::Both)
    }

    const fn simple(self) -> bool {
        matches!(self, Self::Simple | Self::Both)
    }
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Comma-separated country codes to analyze (default is every configured country)
    #[arg(long, short = 'c', value_name = "CODES")]
    pub countries: Option<String>,

    /// Directory receiving the coverage reports
    #[arg(long, value_name = "PATH", default_value = "reports")]
    pub output_dir: Utf8PathBuf,

    /// Reports to write
    #[arg(long, value_name = "FORMAT", default_value = "both")]
    pub format: ReportFormat,
}

/// Retrieve every selected country, measure how often each field is present and write coverage reports.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, no countries are selected, or a report cannot be written
pub async fn analyze_coverage<H: Host>(host: &mut H, args: &AnalyzeArgs) -> Result<()> {
    let config = args.common.setup(host)?;
    let use_colors = args.common.color.for_stdout();

    let requested = args
        .countries
        .as_deref()
        .map_or_else(|| config.countries.codes(), parse_country_codes);

    let (codes, unknown) = config.countries.validate_codes(requested.iter().map(String::as_str));
    if !unknown.is_empty() {
        let _ = writeln!(
            host.error(),
            "{} Unknown country codes ignored: {}",
            warning_mark(args.common.color.for_stderr()),
            unknown.join(", ")
        );
    }

    if codes.is_empty() {
        return fail(host, use_colors, app_err!("no configured countries to analyze"));
    }

    let provider = Provider::new(&config.settings, args.common.base_url.as_deref())?;
    let progress = args.common.progress_reporter();
    let tracker = BatchTracker::new(&progress, "Analyzing", codes.len());

    let mut aggregator = CoverageAggregator::new();
    for code in &codes {
        tracker.start(config.countries.name(code).unwrap_or(code));

        let paths = provider.fetch(&config.countries, code).await.into_record().map(|record| extract(&record));
        aggregator.observe(code, paths.as_ref());

        tracker.complete_one();
    }

    progress.done();
    log::info!(
        target: LOG_TARGET,
        "Analyzed {} countries, {} failed, {} unique fields",
        aggregator.processed_count(),
        aggregator.failed_count(),
        aggregator.unique_field_count()
    );

    let generated_at = Utc::now();
    let detailed = DetailedReport::build(&aggregator, generated_at);

    let mut written = Vec::new();
    if args.format.detailed() {
        let path = args.output_dir.join(DETAILED_REPORT_FILE);
        if let Err(e) = save_yaml(&detailed, &path) {
            return fail(host, use_colors, e);
        }
        written.push(path);
    }

    if args.format.simple() {
        let path = args.output_dir.join(SIMPLE_REPORT_FILE);
        if let Err(e) = save_yaml(&SimpleReport::build(&aggregator, generated_at), &path) {
            return fail(host, use_colors, e);
        }
        written.push(path);
    }

    let mut text = String::new();
    coverage_summary(&detailed, use_colors, &mut text)?;
    let _ = write!(host.output(), "{text}");

    let _ = writeln!(host.output());
    for path in &written {
        let _ = writeln!(host.output(), "{} Wrote {path}", success_mark(use_colors));
    }

    Ok(())
}
