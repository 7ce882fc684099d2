use crate::constants::*;
use serde::Serialize;
use indexmap::IndexMap;

/// Level of Portugal's administrative hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    District,
    Municipality,
    Parish,
}

impl EntityKind {
    /// Returns a human-readable name for the entity kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::District => "Districts",
            Self::Municipality => "Municipalities",
            Self::Parish => "Parishes",
        }
    }

    /// Canonical width of a normalized DICOFRE code for this kind.
    pub fn code_width(&self) -> usize {
        match self {
            Self::District => 2,
            Self::Municipality => 4,
            Self::Parish => 6,
        }
    }

    /// The enclosing level, if any.
    pub fn parent(&self) -> Option<EntityKind> {
        match self {
            Self::District => None,
            Self::Municipality => Some(Self::District),
            Self::Parish => Some(Self::Municipality),
        }
    }

    /// Returns the CSV file name written for this kind.
    pub fn csv_file_name(&self) -> &'static str {
        match self {
            Self::District => DISTRICTS_CSV,
            Self::Municipality => MUNICIPALITIES_CSV,
            Self::Parish => PARISHES_CSV,
        }
    }

    /// Header row of the CSV file, matching the serialized field names.
    pub fn csv_headers(&self) -> &'static [&'static str] {
        match self {
            Self::District => &["name", "codigo"],
            Self::Municipality => &["name", "codigo", "distrito_id"],
            Self::Parish => &["name", "codigo", "concelho_id"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct District {
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Municipality {
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
    /// First two characters of `code`
    #[serde(rename = "distrito_id")]
    pub district_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parish {
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
    /// First four characters of `code`
    #[serde(rename = "concelho_id")]
    pub municipality_code: String,
}

/// Descriptive metadata recorded for a dataset whose portal lookup succeeded.
///
/// Fields missing from the portal response hold [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetInfo {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "organizacao")]
    pub organization: String,
    #[serde(rename = "ultima_modificacao")]
    pub last_modified: String,
    #[serde(rename = "criado_em")]
    pub created_at: String,
    #[serde(rename = "frequencia")]
    pub frequency: String,
    #[serde(rename = "versao")]
    pub version: String,
}

impl DatasetInfo {
    /// Returns the last modification timestamp when the portal reported one.
    pub fn known_last_modified(&self) -> Option<&str> {
        (self.last_modified != NOT_AVAILABLE && !self.last_modified.is_empty())
            .then_some(self.last_modified.as_str())
    }
}

/// Dataset slug -> metadata for every dataset looked up during a run, in fetch order.
pub type Provenance = IndexMap<String, DatasetInfo>;
