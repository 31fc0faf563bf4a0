//! Command dispatch logic for factbook-export

use super::{
    AnalyzeArgs, CatalogArgs, CountriesArgs, ExportArgs, InitArgs, ProfilesArgs, ValidateArgs, analyze_coverage, build_catalog,
    export_countries, init_config, list_countries, list_profiles, validate_config,
};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "factbook-export", version, author, long_about = None)]
#[command(about = "Export CIA World Factbook country data to spreadsheets")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Retrieve countries and write them to an Excel file
    Export(Box<ExportArgs>),
    /// Measure how often each field is present across countries
    Analyze(AnalyzeArgs),
    /// Build the field catalog from a coverage report
    Catalog(CatalogArgs),
    /// Validate the configuration files
    Validate(ValidateArgs),
    /// List the field profiles
    Profiles(ProfilesArgs),
    /// List the configured countries
    Countries(CountriesArgs),
    /// Write the default configuration files
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        Command::Export(export_args) => export_countries(host, export_args).await,
        Command::Analyze(analyze_args) => analyze_coverage(host, analyze_args).await,
        Command::Catalog(catalog_args) => build_catalog(host, catalog_args),
        Command::Validate(validate_args) => validate_config(host, validate_args),
        Command::Profiles(profiles_args) => list_profiles(host, profiles_args),
        Command::Countries(countries_args) => list_countries(host, countries_args),
        Command::Init(init_args) => init_config(host, init_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_flags() {
        let cli = Cli::parse_from(["factbook-export", "export", "-c", "fr,gm", "--csv", "--profile", "minimal"]);
        let Command::Export(args) = cli.command else {
            panic!("expected the export command");
        };

        assert_eq!(args.countries.as_deref(), Some("fr,gm"));
        assert_eq!(args.profile.as_deref(), Some("minimal"));
        assert!(args.csv);
        assert!(!args.json);
    }

    #[test]
    fn test_conflicting_selection_is_rejected() {
        assert!(Cli::try_parse_from(["factbook-export", "export", "--all", "--countries", "fr"]).is_err());
        assert!(Cli::try_parse_from(["factbook-export", "export", "--all-fields", "--profile", "minimal"]).is_err());
    }
}
