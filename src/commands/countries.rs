use super::Host;
use super::common::{CommonArgs, fail};
use crate::Result;
use crate::config::region_title;
use clap::Parser;
use ohno::app_err;
use owo_colors::OwoColorize;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct CountriesArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Only list countries of this region (e.g. `europe`)
    #[arg(long, short = 'r', value_name = "REGION")]
    pub region: Option<String>,
}

/// List the configured countries grouped by region.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the region is unknown
pub fn list_countries<H: Host>(host: &mut H, args: &CountriesArgs) -> Result<()> {
    let config = args.common.setup(host)?;
    let use_colors = args.common.color.for_stdout();

    let regions = config.countries.by_region();
    let wanted = args.region.as_deref().map(str::to_lowercase);

    if let Some(region) = &wanted
        && !regions.contains_key(region.as_str())
    {
        let known = config.countries.regions().join(", ");
        return fail(host, use_colors, app_err!("unknown region '{region}'; known regions: {known}"));
    }

    let mut listed = 0;
    for (region, countries) in &regions {
        if wanted.as_deref().is_some_and(|w| w != *region) {
            continue;
        }

        let title = region_title(region);
        let title = if use_colors { title.bold().to_string() } else { title };
        let _ = writeln!(host.output(), "{title}");

        for country in countries {
            let _ = writeln!(host.output(), "  {:<4} {}", country.code, country.name);
        }
        let _ = writeln!(host.output());

        listed += countries.len();
    }

    let _ = writeln!(host.output(), "{listed} countries");
    Ok(())
}
