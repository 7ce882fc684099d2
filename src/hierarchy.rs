//! Builds the district, municipality and parish collections from fetched tables.
//!
//! The three stages are independent: a missing table empties only its own
//! collection. Districts additionally fall back to [`OFFICIAL_DISTRICTS`] when
//! the portal yields none.

use crate::constants::OFFICIAL_DISTRICTS;
use crate::fetcher::Table;
use crate::models::{District, EntityKind, Municipality, Parish};
use crate::normalizer::{normalize, parent_code};
use tracing::{error, info};

// Source column names, in order of preference
const DISTRICT_NAME_COLUMNS: &[&str] = &["designacao", "nome"];
const DISTRICT_CODE_COLUMNS: &[&str] = &["dicofre", "codigo"];
const MUNICIPALITY_NAME_COLUMNS: &[&str] = &["designacao"];
const PARISH_NAME_COLUMNS: &[&str] = &["freguesia"];
const DICOFRE_COLUMNS: &[&str] = &["dicofre"];

/// The three administrative levels produced by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    pub districts: Vec<District>,
    pub municipalities: Vec<Municipality>,
    pub parishes: Vec<Parish>,
}

/// Runs the district, municipality and parish stages in that order.
pub fn build(
    districts: Option<&Table>,
    municipalities: Option<&Table>,
    parishes: Option<&Table>,
) -> Hierarchy {
    Hierarchy {
        districts: build_districts(districts),
        municipalities: build_municipalities(municipalities),
        parishes: build_parishes(parishes),
    }
}

/// Builds districts from the portal table, or returns the official table when
/// the portal produced no usable district at all.
pub fn build_districts(table: Option<&Table>) -> Vec<District> {
    let width = EntityKind::District.code_width();
    let dynamic: Vec<District> = table
        .into_iter()
        .flat_map(|t| t.rows())
        .filter_map(|row| {
            let name = row.first_of(DISTRICT_NAME_COLUMNS);
            let code = normalize(row.first_of(DISTRICT_CODE_COLUMNS), width)?;
            (!name.is_empty()).then(|| District {
                name: name.to_string(),
                code,
            })
        })
        .collect();

    let districts = if dynamic.is_empty() {
        info!("No districts from the portal, using the official list");
        official_districts()
    } else {
        info!("Using districts from the portal");
        dynamic
    };

    info!(count = districts.len(), "Districts processed");
    districts
}

/// The 18 continental districts and 2 autonomous regions, in code order.
pub fn official_districts() -> Vec<District> {
    OFFICIAL_DISTRICTS
        .iter()
        .map(|(code, name)| District {
            name: name.to_string(),
            code: code.to_string(),
        })
        .collect()
}

pub fn build_municipalities(table: Option<&Table>) -> Vec<Municipality> {
    let Some(table) = table else {
        error!("No municipality data available");
        return Vec::new();
    };

    let municipalities: Vec<Municipality> =
        linked_rows(table, EntityKind::Municipality, MUNICIPALITY_NAME_COLUMNS)
            .map(|(name, code, district_code)| Municipality {
                name,
                code,
                district_code,
            })
            .collect();

    info!(count = municipalities.len(), "Municipalities processed");
    municipalities
}

pub fn build_parishes(table: Option<&Table>) -> Vec<Parish> {
    let Some(table) = table else {
        error!("No parish data available");
        return Vec::new();
    };

    let parishes: Vec<Parish> = linked_rows(table, EntityKind::Parish, PARISH_NAME_COLUMNS)
        .map(|(name, code, municipality_code)| Parish {
            name,
            code,
            municipality_code,
        })
        .collect();

    info!(count = parishes.len(), "Parishes processed");
    parishes
}

/// Yields `(name, code, parent_code)` for every row with a name and a DICOFRE code.
fn linked_rows<'a>(
    table: &'a Table,
    kind: EntityKind,
    name_columns: &'a [&'a str],
) -> impl Iterator<Item = (String, String, String)> + 'a {
    let width = kind.code_width();
    let parent_width = kind.parent().map_or(0, |p| p.code_width());

    table.rows().filter_map(move |row| {
        let name = row.first_of(name_columns);
        if name.is_empty() {
            return None;
        }
        let code = normalize(row.first_of(DICOFRE_COLUMNS), width)?;
        let parent = parent_code(&code, parent_width);
        Some((name.to_string(), code, parent))
    })
}
