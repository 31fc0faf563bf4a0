//! Field-level access to country records.
//!
//! A record is one country's raw JSON document. This module discovers which field paths a
//! record carries ([`extract`]), resolves individual paths to display text ([`resolve`]),
//! flattens a record into a spreadsheet row ([`project`]) and derives readable column labels
//! from paths ([`name_for`]).

mod extract;
mod field_path;
mod markup;
mod namer;
mod project;
mod resolve;

pub use extract::{FieldPaths, extract};
pub use field_path::FieldPath;
pub use markup::clean_markup;
pub use namer::name_for;
pub use project::{COUNTRY_CODE_COLUMN, COUNTRY_NAME_COLUMN, FieldMapping, OutputRow, disambiguate_columns, project};
pub use resolve::{Resolution, SEQUENCE_SEPARATOR, ValueShape, resolve};
