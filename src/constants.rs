// Data source
pub const DATASETS_API_URL: &str = "https://dados.gov.pt/api/1/datasets/";
pub const SOURCE_LABEL: &str = "dados.gov.pt";

// Dataset slugs, in the order they are tried
pub const DISTRICT_DATASETS: &[&str] = &["distritos-de-portugal", "distritos"];
pub const MUNICIPALITY_DATASET: &str = "concelhos-de-portugal";
pub const PARISH_DATASET: &str = "freguesias-de-portugal";

// Output
pub const DEFAULT_OUTPUT_DIR: &str = "portugal_dados";
pub const DISTRICTS_CSV: &str = "distritos.csv";
pub const MUNICIPALITIES_CSV: &str = "concelhos.csv";
pub const PARISHES_CSV: &str = "freguesias.csv";
pub const AGGREGATE_JSON: &str = "portugal_completo.json";

/// Placeholder for metadata fields the portal does not provide.
pub const NOT_AVAILABLE: &str = "N/A";

// Expected totals used by the final report
pub const CONTINENTAL_DISTRICTS: usize = 18;
pub const AUTONOMOUS_REGIONS: usize = 2;
pub const EXPECTED_MUNICIPALITIES: usize = 308;
pub const EXPECTED_PARISHES: usize = 3091;
pub const PARISH_COMPLETE_THRESHOLD: usize = 3090;

/// Authoritative district table as `(code, name)`, used when the portal yields no districts.
pub const OFFICIAL_DISTRICTS: [(&str, &str); 20] = [
    ("01", "Aveiro"),
    ("02", "Beja"),
    ("03", "Braga"),
    ("04", "Bragança"),
    ("05", "Castelo Branco"),
    ("06", "Coimbra"),
    ("07", "Évora"),
    ("08", "Faro"),
    ("09", "Guarda"),
    ("10", "Leiria"),
    ("11", "Lisboa"),
    ("12", "Portalegre"),
    ("13", "Porto"),
    ("14", "Santarém"),
    ("15", "Setúbal"),
    ("16", "Viana do Castelo"),
    ("17", "Vila Real"),
    ("18", "Viseu"),
    ("20", "Açores"),
    ("30", "Madeira"),
];
