use super::tabular::{parse_resource, ResourceFormat, Table};
use crate::config::ResolvedConfig;
use crate::constants::NOT_AVAILABLE;
use crate::errors::{AppError, AppResult};
use crate::models::DatasetInfo;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Dataset document returned by the portal's metadata endpoint.
///
/// Only the fields the fetcher reads are modeled; everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatasetMetadata {
    pub title: Option<String>,
    pub organization: Option<Organization>,
    pub resources: Vec<Resource>,
    pub last_modified: Option<String>,
    pub created_at: Option<String>,
    pub frequency: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Resource {
    pub format: Option<String>,
    pub url: Option<String>,
}

impl DatasetMetadata {
    /// Summarizes the metadata for provenance, filling gaps with `N/A`.
    ///
    /// A missing title falls back to the dataset slug.
    pub fn info(&self, slug: &str) -> DatasetInfo {
        let or_na = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(NOT_AVAILABLE)
                .to_string()
        };
        DatasetInfo {
            title: self.title.clone().unwrap_or_else(|| slug.to_string()),
            organization: or_na(&self.organization.as_ref().and_then(|o| o.name.clone())),
            last_modified: or_na(&self.last_modified),
            created_at: or_na(&self.created_at),
            frequency: or_na(&self.frequency),
            version: or_na(&self.version),
        }
    }

    /// Returns the first resource declared in a supported tabular format.
    pub fn tabular_resource(&self) -> Option<(ResourceFormat, &Resource)> {
        self.resources.iter().find_map(|resource| {
            resource
                .format
                .as_deref()
                .and_then(ResourceFormat::from_declared)
                .map(|format| (format, resource))
        })
    }
}

/// Outcome of looking up one dataset.
///
/// `info` is present whenever the metadata lookup succeeded; `table` is `None`
/// (absent) on any failure or when the dataset has no tabular resource.
#[derive(Debug, Default)]
pub struct DatasetFetch {
    pub info: Option<DatasetInfo>,
    pub table: Option<Table>,
}

/// HTTP client for the open-data portal's dataset API.
pub struct PortalClient {
    client: reqwest::Client,
    base_url: Url,
    metadata_timeout: Duration,
    resource_timeout: Duration,
}

impl PortalClient {
    /// Creates a client for the configured portal.
    ///
    /// Proxy environment variables are ignored; the run reads no environment.
    ///
    /// # Errors
    ///
    /// Returns `UrlError` if `api_base_url` is not a valid URL and `NetworkError`
    /// if the HTTP client cannot be built.
    pub fn new(config: &ResolvedConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self {
            client,
            base_url: parse_base_url(&config.api_base_url)?,
            metadata_timeout: config.metadata_timeout(),
            resource_timeout: config.resource_timeout(),
        })
    }

    /// Metadata endpoint for `slug`: `{base}{slug}/`.
    pub fn dataset_url(&self, slug: &str) -> AppResult<Url> {
        Ok(self.base_url.join(&format!("{}/", slug.trim()))?)
    }

    /// Looks up a dataset and downloads its first tabular resource.
    ///
    /// Never fails: network errors, timeouts, non-success statuses, malformed
    /// metadata and undecodable bodies are logged and reported as an absent table.
    pub async fn fetch(&self, slug: &str) -> DatasetFetch {
        info!(dataset = slug, "Fetching dataset metadata");

        let metadata = match self.fetch_metadata(slug).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(dataset = slug, error = %e, "Dataset metadata unavailable");
                return DatasetFetch::default();
            }
        };

        let info = metadata.info(slug);
        info!(
            dataset = slug,
            organization = %info.organization,
            last_modified = %info.last_modified,
            "Dataset metadata fetched"
        );

        let table = match self.fetch_table(slug, &metadata).await {
            Ok(table) => table,
            Err(e) => {
                warn!(dataset = slug, error = %e, "Dataset resource unavailable");
                None
            }
        };

        DatasetFetch {
            info: Some(info),
            table,
        }
    }

    async fn fetch_metadata(&self, slug: &str) -> AppResult<DatasetMetadata> {
        let url = self.dataset_url(slug)?;
        let body = self.get_bytes(&url, self.metadata_timeout).await?;
        serde_json::from_slice(&body)
            .map_err(|e| AppError::ParseError(format!("Invalid metadata for {slug}: {e}")))
    }

    async fn fetch_table(&self, slug: &str, metadata: &DatasetMetadata) -> AppResult<Option<Table>> {
        let Some((format, resource)) = metadata.tabular_resource() else {
            warn!(
                dataset = slug,
                resources = metadata.resources.len(),
                "No xlsx/xls/csv resource declared"
            );
            return Ok(None);
        };

        let raw_url = resource.url.as_deref().ok_or_else(|| {
            AppError::InvalidInput(format!("Resource of {slug} has no download URL"))
        })?;
        let url = self.base_url.join(raw_url)?;

        info!(dataset = slug, format = format.as_str(), url = %url, "Downloading resource");
        let body = self.get_bytes(&url, self.resource_timeout).await?;
        let table = parse_resource(format, &body)?;

        info!(dataset = slug, rows = table.len(), "Resource parsed");
        Ok(Some(table))
    }

    async fn get_bytes(&self, url: &Url, timeout: Duration) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::NetworkError(format!("Failed to fetch {url}: {e}")))?;

        let status = response.status();
        let response = response.error_for_status().map_err(|e| {
            let status_code = status.as_u16();
            AppError::NetworkError(format!("HTTP {status_code}: Failed to fetch {url}: {e}"))
        })?;

        Ok(response.bytes().await?.to_vec())
    }
}

/// Parses the API base, adding the trailing slash `Url::join` needs to keep the last segment.
fn parse_base_url(raw: &str) -> AppResult<Url> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> PortalClient {
        let config = ResolvedConfig {
            api_base_url: base.to_string(),
            ..ResolvedConfig::default()
        };
        PortalClient::new(&config).unwrap()
    }

    #[test]
    fn dataset_url_appends_slug_with_trailing_slash() {
        let client = client_for("https://dados.gov.pt/api/1/datasets/");
        assert_eq!(
            client.dataset_url("concelhos-de-portugal").unwrap().as_str(),
            "https://dados.gov.pt/api/1/datasets/concelhos-de-portugal/"
        );
    }

    #[test]
    fn base_without_trailing_slash_keeps_last_segment() {
        let client = client_for("https://dados.gov.pt/api/1/datasets");
        assert_eq!(
            client.dataset_url("distritos").unwrap().as_str(),
            "https://dados.gov.pt/api/1/datasets/distritos/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = ResolvedConfig {
            api_base_url: "not a url".to_string(),
            ..ResolvedConfig::default()
        };
        assert!(matches!(
            PortalClient::new(&config),
            Err(AppError::UrlError(_))
        ));
    }

    #[test]
    fn metadata_info_fills_missing_fields() {
        let metadata: DatasetMetadata = serde_json::from_str(
            r#"{
                "title": "Concelhos de Portugal",
                "organization": {"name": "DGT"},
                "last_modified": "2024-03-15T10:00:00",
                "resources": []
            }"#,
        )
        .unwrap();

        let info = metadata.info("concelhos-de-portugal");
        assert_eq!(info.title, "Concelhos de Portugal");
        assert_eq!(info.organization, "DGT");
        assert_eq!(info.last_modified, "2024-03-15T10:00:00");
        assert_eq!(info.created_at, "N/A");
        assert_eq!(info.frequency, "N/A");
        assert_eq!(info.version, "N/A");
    }

    #[test]
    fn metadata_without_title_uses_slug() {
        let metadata: DatasetMetadata = serde_json::from_str(r#"{"organization": null}"#).unwrap();
        let info = metadata.info("distritos");
        assert_eq!(info.title, "distritos");
        assert_eq!(info.organization, "N/A");
    }

    #[test]
    fn first_tabular_resource_is_selected() {
        let metadata: DatasetMetadata = serde_json::from_str(
            r#"{"resources": [
                {"format": "pdf", "url": "https://example.com/doc.pdf"},
                {"format": "JSON", "url": "https://example.com/data.json"},
                {"format": "CSV", "url": "https://example.com/data.csv"},
                {"format": "xlsx", "url": "https://example.com/data.xlsx"}
            ]}"#,
        )
        .unwrap();

        let (format, resource) = metadata.tabular_resource().unwrap();
        assert_eq!(format, ResourceFormat::Csv);
        assert_eq!(resource.url.as_deref(), Some("https://example.com/data.csv"));
    }

    #[test]
    fn no_tabular_resource() {
        let metadata: DatasetMetadata = serde_json::from_str(
            r#"{"resources": [{"format": "geojson", "url": "https://example.com/x"}, {"url": "https://example.com/y"}]}"#,
        )
        .unwrap();
        assert!(metadata.tabular_resource().is_none());
    }
}
