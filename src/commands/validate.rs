use super::Host;
use super::common::{CommonArgs, fail};
use crate::Result;
use crate::config::{Config, ConfigOrigin};
use crate::reports::console::{failure_mark, info_mark, success_mark};
use clap::Parser;
use ohno::app_err;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Load the configuration and check every profile field against the field catalog.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or a profile names a field missing from the catalog
pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let config = match args.common.setup(host) {
        Ok(config) => config,
        Err(e) => {
            host.exit(1);
            return Err(e);
        }
    };

    let use_colors = args.common.color.for_stdout();
    describe_origin(host, &config, use_colors);

    match config.fields_missing_from_catalog() {
        None => {
            let _ = writeln!(
                host.output(),
                "{} No field catalog at {}; skipping field path checks",
                info_mark(use_colors),
                config.catalog_path()
            );
        }

        Some(missing) if missing.is_empty() => {
            let _ = writeln!(host.output(), "{} Every profile field is present in the field catalog", success_mark(use_colors));
        }

        Some(missing) => {
            for (profile, field) in &missing {
                let _ = writeln!(host.output(), "{} {profile}: '{field}' is not in the field catalog", failure_mark(use_colors));
            }

            let count = missing.len();
            host.exit(1);
            return fail(host, use_colors, app_err!("{count} profile fields are missing from the field catalog"));
        }
    }

    let _ = writeln!(
        host.output(),
        "{} Configuration is valid: {} countries, {} curated fields, {} profiles",
        success_mark(use_colors),
        config.countries.len(),
        config.fields.len(),
        config.profiles.profiles.len()
    );

    let by_category = config.fields_by_category();
    let _ = writeln!(
        host.output(),
        "  Known fields: {} in {} categories",
        by_category.values().map(Vec::len).sum::<usize>(),
        config.categories().len()
    );
    for (category, fields) in &by_category {
        let _ = writeln!(host.output(), "    {category}: {}", fields.len());
    }

    Ok(())
}

fn describe_origin<H: Host>(host: &mut H, config: &Config, use_colors: bool) {
    let _ = match &config.origin {
        ConfigOrigin::Embedded => writeln!(host.output(), "{} Using built-in configuration", info_mark(use_colors)),
        ConfigOrigin::Directory(dir) => writeln!(host.output(), "{} Configuration directory: {dir}", info_mark(use_colors)),
    };
}
