//! Options and setup shared by every command.

use super::{Host, ProgressReporter};
use crate::Result;
use crate::config::Config;
use crate::fetch::Progress;
use crate::reports::console::{failure_mark, warning_mark};
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use std::io::{IsTerminal, Write, stderr, stdout};
use std::sync::{Arc, Mutex};

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    /// Whether to color text written to stdout.
    #[must_use]
    pub fn for_stdout(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => stdout().is_terminal(),
        }
    }

    /// Whether to color text written to stderr.
    #[must_use]
    pub fn for_stderr(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => stderr().is_terminal(),
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by every command that reads the configuration
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory holding the YAML configuration (default is `config`, falling back to built-in defaults)
    #[arg(long, value_name = "PATH")]
    pub config_dir: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,

    /// Fetch country documents from this URL instead of the configured repository
    #[arg(long, value_name = "URL", hide = true)]
    pub base_url: Option<String>,
}

impl CommonArgs {
    /// Initialize logging and load the configuration, reporting warnings on the host's error stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded
    pub fn setup<H: Host>(&self, host: &mut H) -> Result<Config> {
        init_logging(self.log_level);
        load_config(host, self)
    }

    /// Progress bar for long retrievals; shown only when no diagnostic logging competes for stderr.
    #[must_use]
    pub fn progress_reporter(&self) -> ProgressReporter {
        let delay = if self.log_level == LogLevel::None {
            Duration::from_millis(300)
        } else {
            Duration::from_hours(365 * 24)
        };

        ProgressReporter::new(delay, self.color.for_stderr())
    }
}

/// Initialize logger based on log level
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // a logger may already be installed when commands run more than once in a process
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

fn load_config<H: Host>(host: &mut H, args: &CommonArgs) -> Result<Config> {
    let use_colors = args.color.for_stderr();

    match Config::load(args.config_dir.as_deref()) {
        Ok((config, warnings)) => {
            for warning in &warnings {
                let _ = writeln!(host.error(), "{} {warning}", warning_mark(use_colors));
            }
            Ok(config)
        }
        Err(e) => {
            let _ = writeln!(host.error(), "{} Could not load configuration: {e}", failure_mark(use_colors));
            Err(e)
        }
    }
}

/// Counts retrieved countries and feeds a [`Progress`] sink.
#[derive(Debug, Clone)]
pub struct BatchTracker {
    completed: Arc<AtomicU64>,
    current: Arc<Mutex<String>>,
}

impl BatchTracker {
    pub fn new(progress: &dyn Progress, phase: &str, total: usize) -> Self {
        let tracker = Self {
            completed: Arc::new(AtomicU64::new(0)),
            current: Arc::new(Mutex::new(String::new())),
        };

        let total = u64::try_from(total).unwrap_or(u64::MAX);
        let completed = Arc::clone(&tracker.completed);
        let current = Arc::clone(&tracker.current);

        progress.set_phase(phase);
        progress.set_determinate(Box::new(move || {
            let done = completed.load(Ordering::Relaxed);
            let name = current.lock().map(|name| name.clone()).unwrap_or_default();
            (total, done, format!("{done}/{total}: {name}"))
        }));

        tracker
    }

    /// Note the country being retrieved.
    pub fn start(&self, name: &str) {
        if let Ok(mut current) = self.current.lock() {
            name.clone_into(&mut current);
        }
    }

    pub fn complete_one(&self) {
        let _ = self.completed.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

/// Report a command failure on the host's error stream and pass the error on.
pub fn fail<H: Host, T>(host: &mut H, use_colors: bool, error: ohno::AppError) -> Result<T> {
    let _ = writeln!(host.error(), "{} {error}", failure_mark(use_colors));
    Err(error)
}
