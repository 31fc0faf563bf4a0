use super::Host;
use super::common::CommonArgs;
use crate::Result;
use crate::reports::console::warning_mark;
use clap::Parser;
use owo_colors::OwoColorize;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ProfilesArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// List the field profiles with their descriptions and field counts.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded
pub fn list_profiles<H: Host>(host: &mut H, args: &ProfilesArgs) -> Result<()> {
    let config = args.common.setup(host)?;
    let use_colors = args.common.color.for_stdout();

    let _ = writeln!(host.output(), "Available profiles:");
    let _ = writeln!(host.output());

    let default = config.default_profile();
    for (name, description) in config.list_profiles() {
        let marker = if name == default { " (default)" } else { "" };
        let title = format!("{name}{marker}");
        let title = if use_colors { title.bold().to_string() } else { title };

        let fields = match config.profile_fields(name) {
            Ok(fields) => format!("{} fields", fields.len()),
            Err(e) => format!("{} {e}", warning_mark(use_colors)),
        };

        let _ = writeln!(host.output(), "  {title}");
        let _ = writeln!(host.output(), "    {description}");
        let _ = writeln!(host.output(), "    {fields}");
    }

    Ok(())
}
