use crate::constants::{AGGREGATE_JSON, NOT_AVAILABLE, SOURCE_LABEL};
use crate::errors::{AppError, AppResult};
use crate::hierarchy::Hierarchy;
use crate::models::{District, EntityKind, Municipality, Parish, Provenance};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Summary block of `portugal_completo.json`.
#[derive(Debug, Serialize)]
pub struct ExportMetadata<'a> {
    #[serde(rename = "fonte")]
    pub source: &'static str,
    #[serde(rename = "data_extracao")]
    pub extracted_at: String,
    #[serde(rename = "versao_dados")]
    pub data_version: String,
    #[serde(rename = "datasets_info")]
    pub datasets: &'a Provenance,
    pub total_distritos: usize,
    pub total_concelhos: usize,
    pub total_freguesias: usize,
}

/// The aggregated JSON document: metadata plus the three collections verbatim.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub metadata: ExportMetadata<'a>,
    pub distritos: &'a [District],
    pub concelhos: &'a [Municipality],
    pub freguesias: &'a [Parish],
}

impl<'a> ExportDocument<'a> {
    /// Assembles the document; totals are taken from the collections themselves.
    pub fn new(hierarchy: &'a Hierarchy, provenance: &'a Provenance, extracted_at: String) -> Self {
        Self {
            metadata: ExportMetadata {
                source: SOURCE_LABEL,
                extracted_at,
                data_version: data_version(provenance),
                datasets: provenance,
                total_distritos: hierarchy.districts.len(),
                total_concelhos: hierarchy.municipalities.len(),
                total_freguesias: hierarchy.parishes.len(),
            },
            distritos: &hierarchy.districts,
            concelhos: &hierarchy.municipalities,
            freguesias: &hierarchy.parishes,
        }
    }
}

/// Files written by [`export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
}

/// Derives the data version tag from the most recent dataset modification date.
///
/// `2024-03-15T10:00:00` becomes `2024.03`; without any known date the tag is `N/A`.
pub fn data_version(provenance: &Provenance) -> String {
    provenance
        .values()
        .filter_map(|info| info.known_last_modified())
        .max()
        .map(|latest| latest.chars().take(7).collect::<String>().replace('-', "."))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Writes the three CSV files and the aggregated JSON document into `output_dir`.
///
/// The directory is created if needed. Files are written one after another; a
/// failure stops the export and leaves files already written in place.
///
/// # Errors
///
/// Returns `IoError` if the directory or a file cannot be created, and
/// `ParseError` if serialization fails.
pub fn export(
    hierarchy: &Hierarchy,
    provenance: &Provenance,
    output_dir: &Path,
) -> AppResult<ExportSummary> {
    fs::create_dir_all(output_dir).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create output directory {}: {e}",
            output_dir.display()
        ))
    })?;

    let files = vec![
        write_csv(output_dir, EntityKind::District, &hierarchy.districts)?,
        write_csv(output_dir, EntityKind::Municipality, &hierarchy.municipalities)?,
        write_csv(output_dir, EntityKind::Parish, &hierarchy.parishes)?,
        write_json(output_dir, hierarchy, provenance)?,
    ];

    info!(
        output_dir = %output_dir.display(),
        files = files.len(),
        "Export completed"
    );
    Ok(ExportSummary { files })
}

/// Writes one CSV file for `kind`; the header row is written even when `records` is empty.
fn write_csv<T: Serialize>(output_dir: &Path, kind: EntityKind, records: &[T]) -> AppResult<PathBuf> {
    let path = output_dir.join(kind.csv_file_name());
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(|e| AppError::IoError(format!("Failed to create {}: {e}", path.display())))?;

    writer.write_record(kind.csv_headers())?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(
        kind = kind.display_name(),
        file = %path.display(),
        rows = records.len(),
        "CSV written"
    );
    Ok(path)
}

fn write_json(output_dir: &Path, hierarchy: &Hierarchy, provenance: &Provenance) -> AppResult<PathBuf> {
    let path = output_dir.join(AGGREGATE_JSON);
    let extracted_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let document = ExportDocument::new(hierarchy, provenance, extracted_at);

    let file = File::create(&path)
        .map_err(|e| AppError::IoError(format!("Failed to create {}: {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.flush()?;

    info!(file = %path.display(), "JSON written");
    Ok(path)
}
