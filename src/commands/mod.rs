//! Command-line interface and orchestration for factbook-export
//!
//! Each command loads the YAML configuration, drives the other modules and reports to the
//! [`Host`] it is given.
//!
//! ## Commands
//!
//! - **export**: Retrieve the selected countries, project them onto the columns of a field
//!   profile and write an Excel file, optionally with CSV and JSON siblings
//! - **analyze**: Retrieve countries and measure how often every field path is present
//! - **catalog**: Turn a simplified coverage report into `fields_complete.yaml`
//! - **validate**: Load the configuration and check profile fields against the catalog
//! - **profiles** and **countries**: List what the configuration offers
//! - **init**: Write the built-in configuration files for editing
//!
//! The `common` module provides the options shared by every command, logging setup and the
//! progress bookkeeping used while countries are retrieved.

mod analyze;
mod catalog;
mod common;
mod countries;
mod export;
mod host;
mod init;
mod profiles;
mod progress_reporter;
mod run;
mod validate;

pub use analyze::{AnalyzeArgs, DETAILED_REPORT_FILE, ReportFormat, SIMPLE_REPORT_FILE, analyze_coverage};
pub use catalog::{CatalogArgs, build_catalog};
pub use common::{ColorMode, CommonArgs, LogLevel};
pub use countries::{CountriesArgs, list_countries};
pub use export::{DEFAULT_OUTPUT_FILE, ExportArgs, export_countries};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use profiles::{ProfilesArgs, list_profiles};
pub use progress_reporter::ProgressReporter;
pub use run::run;
pub use validate::{ValidateArgs, validate_config};
