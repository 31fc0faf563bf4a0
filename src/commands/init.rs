use super::Host;
use super::common::{ColorMode, fail};
use crate::Result;
use crate::config::{DEFAULT_CONFIG_DIR, save_defaults};
use crate::reports::console::success_mark;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory receiving the configuration files
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_DIR)]
    pub output_dir: Utf8PathBuf,

    /// Overwrite existing configuration files
    #[arg(long)]
    pub force: bool,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,
}

/// Write the built-in configuration files so they can be edited.
///
/// # Errors
///
/// Returns an error if a configuration file already exists without `--force`, or a file cannot be written
pub fn init_config<H: Host>(host: &mut H, args: &InitArgs) -> Result<()> {
    let use_colors = args.color.for_stdout();

    let written = match save_defaults(&args.output_dir, args.force) {
        Ok(written) => written,
        Err(e) => return fail(host, use_colors, e),
    };

    for path in &written {
        let _ = writeln!(host.output(), "{} Wrote {path}", success_mark(use_colors));
    }

    Ok(())
}
