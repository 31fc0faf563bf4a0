#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for factbook-export
//!
//! This library holds all functionality of the factbook-export tool, which retrieves CIA World
//! Factbook country documents, flattens them into spreadsheet rows and measures how often each
//! field is present across countries.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`config`]: YAML configuration of countries, fields, profiles and settings
//! - [`fetch`]: Retrieval of country documents over HTTP
//! - [`record`]: Field paths, value resolution and row projection
//! - [`coverage`]: Field coverage aggregation and reports
//! - [`reports`]: Excel, CSV, JSON, YAML and console output

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod config;
#[cfg(not(any(debug_assertions, test)))]
mod config;

#[cfg(any(debug_assertions, test))]
pub mod coverage;
#[cfg(not(any(debug_assertions, test)))]
mod coverage;

#[cfg(any(debug_assertions, test))]
pub mod fetch;
#[cfg(not(any(debug_assertions, test)))]
mod fetch;

#[cfg(any(debug_assertions, test))]
pub mod record;
#[cfg(not(any(debug_assertions, test)))]
mod record;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

pub use crate::commands::{Host, run};
