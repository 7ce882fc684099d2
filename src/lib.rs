//! pt-geo-cli library
//!
//! This crate provides the core functionality for the `pt-geo-cli` binary.
//! Keep the crate root minimal; implementation and tests live in their modules.
//!
//! ## Overview
//!
//! The library is organized into modules that follow the extraction pipeline:
//!
//! - [`fetcher`] - Resolves dados.gov.pt dataset slugs and downloads their spreadsheet/CSV rows
//! - [`normalizer`] - Pads DICOFRE codes to their canonical width and derives parent codes
//! - [`hierarchy`] - Builds the district, municipality and parish collections
//! - [`exporter`] - Writes the CSV files and the aggregated JSON document
//! - [`reporter`] - Renders the completeness report
//! - [`cli`] - Command-line interface orchestrating the run
//! - [`config`] - Run configuration and TOML loading
//! - [`models`] - Record types and dataset provenance
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! ```no_run
//! use pt_geo_cli::{cli, config::ResolvedConfig, errors::AppResult};
//!
//! # async fn example() -> AppResult<()> {
//! let config = ResolvedConfig::default();
//! let hierarchy = cli::run_workflow(&config).await?;
//! println!("{} parishes", hierarchy.parishes.len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod exporter;
pub mod fetcher;
pub mod hierarchy;
pub mod models;
pub mod normalizer;
pub mod reporter;
