use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use crate::exporter::export;
use crate::fetcher::{PortalClient, Table};
use crate::hierarchy::{self, Hierarchy};
use crate::models::Provenance;
use crate::reporter::Report;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// Parses command-line arguments and runs the extraction.
///
/// The workflow is a single linear pass:
/// 1. Fetches the district, municipality and parish datasets from the portal
/// 2. Normalizes DICOFRE codes and links each record to its parent
/// 3. Writes the CSV files and the aggregated JSON document
/// 4. Prints the completeness report
///
/// # Returns
///
/// Partial or missing portal data still yields `Ok(())`. Returns an error if:
/// - The configuration file cannot be read or is invalid
/// - Logging cannot be initialized
/// - The output files cannot be written
///
pub async fn cli() -> AppResult<()> {
    let matches = command().get_matches();
    let config = resolve_config(&matches)?;
    init_tracing(&config.log_level)?;

    if let Err(e) = run_workflow(&config).await {
        error!(error = %e, "Extraction failed");
        return Err(e);
    }
    Ok(())
}

fn command() -> Command<'static> {
    Command::new("pt-geo-cli")
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .after_help("Writes distritos.csv, concelhos.csv, freguesias.csv and portugal_completo.json.\nExample:\n  pt-geo-cli --output portugal_dados")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Folder receiving the CSV and JSON files [default: portugal_dados]")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a TOML config file; --output takes precedence over its output_dir")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
}

fn resolve_config(matches: &ArgMatches) -> AppResult<ResolvedConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ResolvedConfig::from_toml_file(path)?,
        None => ResolvedConfig::default(),
    };
    if let Some(output) = matches.get_one::<PathBuf>("output") {
        config.output_dir = output.clone();
    }
    Ok(config)
}

fn init_tracing(directive: &str) -> AppResult<()> {
    let filter = EnvFilter::try_new(directive)
        .map_err(|e| AppError::InvalidInput(format!("Invalid log level '{directive}': {e}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::IoError(format!("Failed to initialize logging: {e}")))
}

/// Fetches, builds, exports and reports; returns the exported hierarchy.
///
/// Datasets are fetched one after another. A dataset that cannot be retrieved
/// leaves its collection empty (districts fall back to the official list) and
/// the run carries on.
///
/// # Errors
///
/// Returns an error if the portal client cannot be created or the export fails.
pub async fn run_workflow(config: &ResolvedConfig) -> AppResult<Hierarchy> {
    info!(
        output_dir = %config.output_dir.display(),
        "Starting extraction of Portugal's administrative divisions"
    );

    let client = PortalClient::new(config)?;
    let mut provenance = Provenance::new();

    let districts = fetch_first(&client, &config.district_datasets, &mut provenance).await;
    let municipalities = fetch_recorded(&client, &config.municipality_dataset, &mut provenance).await;
    let parishes = fetch_recorded(&client, &config.parish_dataset, &mut provenance).await;

    let hierarchy = hierarchy::build(
        districts.as_ref(),
        municipalities.as_ref(),
        parishes.as_ref(),
    );

    export(&hierarchy, &provenance, &config.output_dir)?;

    println!("{}", Report::new(&hierarchy, &provenance, &config.output_dir));

    info!(
        districts = hierarchy.districts.len(),
        municipalities = hierarchy.municipalities.len(),
        parishes = hierarchy.parishes.len(),
        "Extraction completed"
    );
    Ok(hierarchy)
}

/// Fetches `slug`, recording its metadata whenever the lookup succeeded.
async fn fetch_recorded(
    client: &PortalClient,
    slug: &str,
    provenance: &mut Provenance,
) -> Option<Table> {
    let fetched = client.fetch(slug).await;
    if let Some(info) = fetched.info {
        provenance.insert(slug.to_string(), info);
    }
    fetched.table
}

/// Tries each slug in order and returns the first table retrieved.
async fn fetch_first(
    client: &PortalClient,
    slugs: &[String],
    provenance: &mut Provenance,
) -> Option<Table> {
    for slug in slugs {
        if let Some(table) = fetch_recorded(client, slug, provenance).await {
            return Some(table);
        }
    }
    None
}
