use super::Host;
use super::analyze::SIMPLE_REPORT_FILE;
use super::common::{CommonArgs, fail};
use crate::Result;
use crate::config::FieldCatalog;
use crate::coverage::SimpleReport;
use crate::reports::console::success_mark;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ohno::IntoAppError;
use std::fs;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Simplified coverage report produced by `analyze`
    #[arg(long, value_name = "PATH", default_value_t = Utf8PathBuf::from("reports").join(SIMPLE_REPORT_FILE))]
    pub input: Utf8PathBuf,

    /// Catalog file to write (default is `fields_complete.yaml` in the configuration directory)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,
}

/// Convert a simplified coverage report into the field catalog.
///
/// # Errors
///
/// Returns an error if the report cannot be read or the catalog cannot be written
pub fn build_catalog<H: Host>(host: &mut H, args: &CatalogArgs) -> Result<()> {
    let config = args.common.setup(host)?;
    let use_colors = args.common.color.for_stdout();

    let output = args.output.clone().unwrap_or_else(|| config.catalog_path());

    let catalog = match convert(&args.input, &output) {
        Ok(catalog) => catalog,
        Err(e) => return fail(host, use_colors, e),
    };

    let counts = catalog.category_counts();
    let _ = writeln!(
        host.output(),
        "{} Wrote {} fields in {} categories to {output}",
        success_mark(use_colors),
        catalog.len(),
        counts.len()
    );

    for (category, count) in counts {
        let _ = writeln!(host.output(), "  {category}: {count}");
    }

    Ok(())
}

fn convert(input: &Utf8Path, output: &Utf8Path) -> Result<FieldCatalog> {
    let text = fs::read_to_string(input).into_app_err_with(|| format!("reading coverage report {input}"))?;
    let report: SimpleReport = serde_yaml::from_str(&text).into_app_err_with(|| format!("parsing coverage report {input}"))?;

    let catalog = FieldCatalog::from_simple_report(&report);

    if let Some(parent) = output.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory {parent}"))?;
    }

    fs::write(output, catalog.to_yaml()?).into_app_err_with(|| format!("writing field catalog to {output}"))?;
    Ok(catalog)
}
