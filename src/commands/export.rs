use super::common::{BatchTracker, CommonArgs, fail};
use super::Host;
use crate::Result;
use crate::config::{Config, parse_country_codes, region_title};
use crate::fetch::{Progress, Provider};
use crate::record::{FieldMapping, OutputRow, disambiguate_columns, project};
use crate::reports::console::{ExportSummary, export_summary, field_availability, info_mark, warning_mark};
use crate::reports::{Table, generate_csv, generate_json, generate_xlsx};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ohno::{IntoAppError, app_err};
use std::fs;
use std::io::{BufRead, Write};

const LOG_TARGET: &str = "    export";

/// File name used when no output path is given.
pub const DEFAULT_OUTPUT_FILE: &str = "countries_data.xlsx";

#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Comma-separated country codes to export (e.g. `fr,gm,us`)
    #[arg(long, short = 'c', value_name = "CODES", conflicts_with_all = ["all", "interactive"])]
    pub countries: Option<String>,

    /// Export every configured country
    #[arg(long, conflicts_with = "interactive")]
    pub all: bool,

    /// Field profile selecting the exported columns (default comes from the profile configuration)
    #[arg(long, short = 'p', value_name = "NAME", conflicts_with = "all_fields")]
    pub profile: Option<String>,

    /// Export every known field instead of a profile
    #[arg(long)]
    pub all_fields: bool,

    /// Excel file to write (default is `countries_data.xlsx` in the configured output directory)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Also write a CSV file next to the Excel file
    #[arg(long)]
    pub csv: bool,

    /// Also write a JSON file next to the Excel file
    #[arg(long)]
    pub json: bool,

    /// Choose countries and the output file interactively
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Report every step and summarize field availability
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// Retrieve the selected countries and write them as a spreadsheet.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, no countries or fields are selected, no
/// country could be retrieved, or an output file cannot be written
pub async fn export_countries<H: Host>(host: &mut H, args: &ExportArgs) -> Result<()> {
    let config = args.common.setup(host)?;
    let use_colors = args.common.color.for_stdout();

    let (requested, output) = if args.interactive {
        match prompt_selection(host, &config) {
            Ok(selection) => selection,
            Err(e) => return fail(host, use_colors, e),
        }
    } else if args.all {
        (config.countries.codes(), None)
    } else if let Some(countries) = &args.countries {
        (parse_country_codes(countries), None)
    } else {
        return fail(host, use_colors, app_err!("no countries selected; use --countries, --all or --interactive"));
    };

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
        return fail(host, use_colors, app_err!("none of the requested country codes are configured"));
    }

    let mappings = match select_mappings(&config, args) {
        Ok(mappings) => mappings,
        Err(e) => return fail(host, use_colors, e),
    };

    let output = args
        .output
        .clone()
        .or(output)
        .unwrap_or_else(|| config.settings.output_dir.join(DEFAULT_OUTPUT_FILE));

    if args.verbose {
        let _ = writeln!(
            host.output(),
            "{} Exporting {} countries with {} fields to {output}",
            info_mark(use_colors),
            codes.len(),
            mappings.len()
        );
    }

    let provider = Provider::new(&config.settings, args.common.base_url.as_deref())?;
    let progress = args.common.progress_reporter();
    let tracker = BatchTracker::new(&progress, "Fetching", codes.len());

    let mut rows: Vec<OutputRow> = Vec::with_capacity(codes.len());
    let mut failed = Vec::new();

    for code in &codes {
        let name = config.countries.name(code).unwrap_or(code).to_string();
        tracker.start(&name);

        if args.verbose {
            let _ = writeln!(host.output(), "{} Fetching {name} ({code})", info_mark(use_colors));
        }

        match provider.fetch(&config.countries, code).await.into_record() {
            Some(record) => rows.push(project(code, &name, &record, &mappings)),
            None => failed.push(code.clone()),
        }

        tracker.complete_one();
    }

    progress.done();
    log::info!(target: LOG_TARGET, "Fetched {} of {} countries", rows.len(), codes.len());

    if rows.is_empty() {
        return fail(host, use_colors, app_err!("no country data could be retrieved; nothing was written"));
    }

    let table = Table::new(&mappings, &rows);
    let files = match write_outputs(&table, &config.settings.sheet_name, &output, args.csv, args.json) {
        Ok(files) => files,
        Err(e) => return fail(host, use_colors, e),
    };

    let mut text = String::new();
    if args.verbose {
        field_availability(&table, use_colors, &mut text)?;
    }

    export_summary(
        &ExportSummary {
            countries: rows.len(),
            fields: mappings.len(),
            files: files.iter().map(|(path, size)| (path.as_path(), *size)).collect(),
            failed: &failed,
        },
        use_colors,
        &mut text,
    )?;

    let _ = write!(host.output(), "{text}");
    Ok(())
}

/// Column mappings for the export: every known field, or the chosen (or default) profile.
fn select_mappings(config: &Config, args: &ExportArgs) -> Result<Vec<FieldMapping>> {
    let mut mappings = if args.all_fields {
        config.all_field_mappings()
    } else {
        let profile = args.profile.as_deref().unwrap_or_else(|| config.default_profile());
        config.mappings_for_profile(profile)?
    };

    if mappings.is_empty() {
        return Err(app_err!("the selected fields are empty; run `analyze` and `catalog` to build the field catalog"));
    }

    disambiguate_columns(&mut mappings);
    Ok(mappings)
}

/// Write the Excel file and any requested CSV and JSON siblings, returning each path with its size.
fn write_outputs(table: &Table, sheet_name: &str, output: &Utf8Path, csv: bool, json: bool) -> Result<Vec<(Utf8PathBuf, u64)>> {
    if let Some(parent) = output.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent).into_app_err_with(|| format!("creating output directory {parent}"))?;
    }

    let mut written = Vec::new();

    let mut file = fs::File::create(output).into_app_err_with(|| format!("creating {output}"))?;
    generate_xlsx(table, sheet_name, &mut file)?;
    written.push(output.to_path_buf());

    if csv {
        let path = output.with_extension("csv");
        let mut text = String::new();
        generate_csv(table, &mut text)?;
        fs::write(&path, text).into_app_err_with(|| format!("writing {path}"))?;
        written.push(path);
    }

    if json {
        let path = output.with_extension("json");
        let mut text = String::new();
        generate_json(table, &mut text)?;
        fs::write(&path, text).into_app_err_with(|| format!("writing {path}"))?;
        written.push(path);
    }

    written
        .into_iter()
        .map(|path| {
            let size = fs::metadata(&path).into_app_err_with(|| format!("reading size of {path}"))?.len();
            Ok((path, size))
        })
        .collect()
}

/// List the configured countries and ask for a selection and an output file.
fn prompt_selection<H: Host>(host: &mut H, config: &Config) -> Result<(Vec<String>, Option<Utf8PathBuf>)> {
    let mut listing = String::from("Available countries:\n");
    for (region, countries) in config.countries.by_region() {
        listing.push_str(&format!("\n{}\n", region_title(region)));
        for country in countries {
            listing.push_str(&format!("  {:<4} {}\n", country.code, country.name));
        }
    }

    let _ = writeln!(host.output(), "{listing}");
    let _ = write!(host.output(), "Enter country codes separated by commas (or 'all'): ");
    let _ = host.output().flush();
    let answer = read_answer(host)?;

    let codes = if answer.eq_ignore_ascii_case("all") {
        config.countries.codes()
    } else {
        parse_country_codes(&answer)
    };

    if codes.is_empty() {
        return Err(app_err!("no countries selected"));
    }

    let default_output = config.settings.output_dir.join(DEFAULT_OUTPUT_FILE);
    let _ = write!(host.output(), "Output file [{default_output}]: ");
    let _ = host.output().flush();
    let answer = read_answer(host)?;

    let output = if answer.is_empty() { None } else { Some(Utf8PathBuf::from(answer)) };
    Ok((codes, output))
}

fn read_answer<H: Host>(host: &mut H) -> Result<String> {
    let mut line = String::new();
    let _ = host.input().read_line(&mut line).into_app_err("reading answer")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::{ColorMode, LogLevel};
    use crate::commands::host::TestHost;
    use crate::config::{CatalogEntry, FieldCatalog};

    fn args() -> ExportArgs {
        ExportArgs {
            common: CommonArgs {
                config_dir: None,
                color: ColorMode::Never,
                log_level: LogLevel::None,
                base_url: None,
            },
            countries: None,
            all: false,
            profile: None,
            all_fields: false,
            output: None,
            csv: false,
            json: false,
            interactive: false,
            verbose: false,
        }
    }

    #[test]
    fn test_select_mappings_uses_default_profile() {
        let (config, _) = Config::embedded().unwrap();
        let mappings = select_mappings(&config, &args()).unwrap();
        assert_eq!(mappings.len(), config.profile_fields("standard").unwrap().len());
    }

    #[test]
    fn test_select_mappings_rejects_empty_selection() {
        let (config, _) = Config::embedded().unwrap();
        let mut args = args();
        args.profile = Some("universal".to_string());
        assert!(select_mappings(&config, &args).is_err());

        args.profile = Some("nope".to_string());
        assert!(select_mappings(&config, &args).is_err());
    }

    #[test]
    fn test_prompt_selection() {
        let (config, _) = Config::embedded().unwrap();
        let mut host = TestHost::with_input("fr, GM\nout/custom.xlsx\n");

        let (codes, output) = prompt_selection(&mut host, &config).unwrap();
        assert_eq!(codes, ["fr", "gm"]);
        assert_eq!(output, Some(Utf8PathBuf::from("out/custom.xlsx")));

        let listing = host.output_str();
        assert!(listing.contains("Europe\n"));
        assert!(listing.contains("  fr   France\n"));
    }

    #[test]
    fn test_prompt_selection_defaults() {
        let (config, _) = Config::embedded().unwrap();
        let mut host = TestHost::with_input("all\n\n");

        let (codes, output) = prompt_selection(&mut host, &config).unwrap();
        assert_eq!(codes.len(), config.countries.len());
        assert!(output.is_none());

        let mut host = TestHost::with_input("");
        assert!(prompt_selection(&mut host, &config).is_err());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetSystemTimePreciseAsFileTime (rust_xlsxwriter)")]
    fn test_write_outputs_with_siblings() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let output = root.join("nested").join("data.xlsx");

        let table = Table {
            headers: vec!["Country Code".to_string(), "Country Name".to_string()],
            rows: vec![vec![Some("FR".to_string()), Some("France".to_string())]],
        };

        let files = write_outputs(&table, "Countries Data", &output, true, true).unwrap();
        let paths: Vec<_> = files.iter().map(|(p, _)| p.file_name().unwrap_or_default()).collect();
        assert_eq!(paths, ["data.xlsx", "data.csv", "data.json"]);
        assert!(files.iter().all(|(_, size)| *size > 0));
        assert_eq!(
            fs::read_to_string(root.join("nested").join("data.csv")).unwrap(),
            "Country Code,Country Name\nFR,France\n"
        );
    }

    #[test]
    fn test_colliding_labels_keep_every_column() {
        let (mut config, _) = Config::embedded().unwrap();
        config.fields.clear();
        let entry = |json_path: &str, category: &str| CatalogEntry {
            json_path: json_path.to_string(),
            display_name: "Total".to_string(),
            category: category.to_string(),
            coverage_pct: Some(100.0),
        };
        config.catalog = Some(FieldCatalog {
            fields: vec![
                entry("Geography.Area.total.text", "Geography"),
                entry("People and Society.Median age.total.text", "People and Society"),
            ],
        });

        let mut args = args();
        args.all_fields = true;
        let mappings = select_mappings(&config, &args).unwrap();

        let record = serde_json::json!({
            "Geography": { "Area": { "total": { "text": "643,801 sq km" } } },
            "People and Society": { "Median age": { "total": { "text": "42 years" } } }
        });
        let table = Table::new(&mappings, &[project("fr", "France", &record, &mappings)]);

        let mut text = String::new();
        generate_json(&table, &mut text).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&text).unwrap();
        let row = rows[0].as_object().unwrap();

        assert_eq!(row.len(), table.headers.len());
        assert_eq!(row["Total (Area)"], "643,801 sq km");
        assert_eq!(row["Total (Median age)"], "42 years");
    }
}
