use crate::constants::*;
use crate::exporter::data_version;
use crate::hierarchy::Hierarchy;
use crate::models::Provenance;
use std::fmt;
use std::path::Path;

const RULE_WIDTH: usize = 60;

/// Completeness verdict for a collection count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    Complete,
    Incomplete,
    /// Below the expected count, but the reference total itself is approximate
    NeedsVerification,
}

impl Completeness {
    /// Municipalities are complete only at exactly [`EXPECTED_MUNICIPALITIES`].
    pub fn of_municipalities(count: usize) -> Self {
        if count == EXPECTED_MUNICIPALITIES {
            Self::Complete
        } else {
            Self::Incomplete
        }
    }

    /// Parishes are complete from [`PARISH_COMPLETE_THRESHOLD`] upward.
    pub fn of_parishes(count: usize) -> Self {
        if count >= PARISH_COMPLETE_THRESHOLD {
            Self::Complete
        } else {
            Self::NeedsVerification
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Complete => "COMPLETE",
            Self::Incomplete => "INCOMPLETE",
            Self::NeedsVerification => "VERIFICAR",
        }
    }
}

/// Final human-readable summary of a run. Rendered through `Display`.
pub struct Report<'a> {
    hierarchy: &'a Hierarchy,
    provenance: &'a Provenance,
    output_dir: &'a Path,
}

impl<'a> Report<'a> {
    pub fn new(hierarchy: &'a Hierarchy, provenance: &'a Provenance, output_dir: &'a Path) -> Self {
        Self {
            hierarchy,
            provenance,
            output_dir,
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let municipalities = self.hierarchy.municipalities.len();
        let parishes = self.hierarchy.parishes.len();

        writeln!(f, "{heavy}")?;
        writeln!(f, "FINAL REPORT")?;
        writeln!(f, "{heavy}")?;

        writeln!(f, "\nDISTRICTS: {}", self.hierarchy.districts.len())?;
        writeln!(f, "  - Continental: {CONTINENTAL_DISTRICTS}")?;
        writeln!(f, "  - Autonomous regions: {AUTONOMOUS_REGIONS}")?;

        writeln!(f, "\nMUNICIPALITIES: {municipalities}")?;
        writeln!(f, "  - Expected: {EXPECTED_MUNICIPALITIES}")?;
        writeln!(
            f,
            "  - Status: {}",
            Completeness::of_municipalities(municipalities).label()
        )?;

        writeln!(f, "\nPARISHES: {parishes}")?;
        writeln!(f, "  - Expected: ~{EXPECTED_PARISHES}")?;
        writeln!(f, "  - Status: {}", Completeness::of_parishes(parishes).label())?;

        writeln!(f, "\n{light}")?;
        writeln!(f, "DATASETS:")?;
        writeln!(f, "{light}")?;
        for (slug, info) in self.provenance {
            if let Some(last_modified) = info.known_last_modified() {
                let date: String = last_modified.chars().take(10).collect();
                writeln!(f, "\n{slug}:")?;
                writeln!(f, "  - Last updated: {date}")?;
                writeln!(f, "  - Organization: {}", info.organization)?;
            }
        }

        let version = data_version(self.provenance);
        if version != NOT_AVAILABLE {
            writeln!(f, "\nData version: {version}")?;
        }

        let output_dir = self
            .output_dir
            .canonicalize()
            .unwrap_or_else(|_| self.output_dir.to_path_buf());
        writeln!(f, "\n{heavy}")?;
        writeln!(f, "Files saved in: {}/", output_dir.display())?;
        write!(f, "{heavy}")
    }
}
