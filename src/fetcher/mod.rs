//! Retrieval of tabular datasets from the dados.gov.pt portal.
//!
//! A dataset slug is resolved through the portal's metadata endpoint, the first
//! spreadsheet or CSV resource is downloaded, and its rows are returned as a
//! [`Table`]. The main entry point is [`PortalClient::fetch`].

mod portal;
mod tabular;

// Re-export public API
pub use portal::{DatasetFetch, DatasetMetadata, Organization, PortalClient, Resource};
pub use tabular::{
    parse_csv_bytes, parse_csv_text, parse_resource, parse_spreadsheet, ResourceFormat, Row,
    Table, TextEncoding, CSV_ENCODINGS,
};
