//! Configuration constants, harvest parameters and OAI-PMH URL construction.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HarvesterError, Result};

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Base URL used to expand bare DOIs into resolvable links.
pub const DOI_RESOLVER_URL: &str = "https://doi.org/";

/// Provider name used when the repository cannot be identified.
pub const UNKNOWN_PROVIDER: &str = "Unknown";

/// OAI-PMH date pattern: day granularity or seconds granularity in UTC.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static OAI_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}:\d{2}Z)?$").expect("valid regex")
});

/// What to do with records whose header is flagged as deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPolicy {
    /// Deleted records produce no document.
    #[default]
    DropDeleted,

    /// Deleted records produce a minimal tombstone document.
    EmitTombstone,
}

/// Parameters of a harvest run.
///
/// All string parameters are free-form; empty strings are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub from: Option<String>,
    pub until: Option<String>,
    pub host_url: Option<String>,
    pub metadata_prefix: Option<String>,
    pub logo_url: Option<String>,
    pub view_url: Option<String>,
    pub set: Option<String>,

    /// Classify every record by its declared schema instead of binding one
    /// transformer to the metadata prefix.
    pub mixed_schemas: bool,

    pub deletion_policy: DeletionPolicy,
}

impl HarvestConfig {
    /// Create a configuration for a repository and metadata prefix.
    #[must_use]
    pub fn new(host_url: impl Into<String>, metadata_prefix: impl Into<String>) -> Self {
        Self {
            host_url: Some(host_url.into()),
            metadata_prefix: Some(metadata_prefix.into()),
            ..Self::default()
        }
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        Ok(config.normalized())
    }

    /// Replace empty strings with `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.from,
            &mut self.until,
            &mut self.host_url,
            &mut self.metadata_prefix,
            &mut self.logo_url,
            &mut self.view_url,
            &mut self.set,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    #[must_use]
    pub fn with_until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }

    #[must_use]
    pub fn with_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    #[must_use]
    pub fn with_logo_url(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }

    #[must_use]
    pub fn with_view_url(mut self, view_url: impl Into<String>) -> Self {
        self.view_url = Some(view_url.into());
        self
    }

    #[must_use]
    pub fn with_mixed_schemas(mut self, mixed: bool) -> Self {
        self.mixed_schemas = mixed;
        self
    }

    #[must_use]
    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = policy;
        self
    }

    /// The configured host URL, if non-empty.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host_url.as_deref().filter(|h| !h.trim().is_empty())
    }

    /// The configured metadata prefix, if non-empty.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.metadata_prefix
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }

    /// Validate the `from` and `until` date filters.
    pub fn validate_dates(&self) -> Result<()> {
        for date in [self.from.as_deref(), self.until.as_deref()].into_iter().flatten() {
            validate_date(date)?;
        }
        Ok(())
    }

    /// Whether changing from `self` to `other` requires the format registry
    /// and transformer to be rebuilt.
    #[must_use]
    pub fn requires_rebuild(&self, other: &Self) -> bool {
        self.host() != other.host()
            || self.prefix() != other.prefix()
            || self.mixed_schemas != other.mixed_schemas
    }
}

/// Validate an OAI-PMH date (`YYYY-MM-DD` or `YYYY-MM-DDThh:mm:ssZ`).
///
/// # Examples
/// ```
/// use oaipmh_harvester::config::validate_date;
///
/// assert!(validate_date("2025-01-01").is_ok());
/// assert!(validate_date("2025-01-01T12:00:00Z").is_ok());
/// assert!(validate_date("2025-13-01").is_err());
/// assert!(validate_date("yesterday").is_err());
/// ```
pub fn validate_date(date_str: &str) -> Result<()> {
    if !OAI_DATE_PATTERN.is_match(date_str) {
        return Err(HarvesterError::InvalidDate(date_str.to_string()));
    }

    let parsed = if date_str.len() == 10 {
        chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map(|_| ())
    } else {
        chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%SZ").map(|_| ())
    };

    parsed.map_err(|_| HarvesterError::InvalidDate(date_str.to_string()))
}

/// Percent-encode a query parameter value.
fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Append a query string to a host URL.
fn with_query(host_url: &str, query: &str) -> String {
    let separator = if host_url.contains('?') { '&' } else { '?' };
    format!("{host_url}{separator}{query}")
}

/// Build the initial `ListRecords` URL.
///
/// Parameter order is fixed (`verb`, `from`, `until`, `set`, `metadataPrefix`)
/// so the same request always produces the same URL.
///
/// # Examples
/// ```
/// use oaipmh_harvester::config::list_records_url;
///
/// assert_eq!(
///     list_records_url("https://example.org/oai", Some("2020-01-01"), None, None, "oai_dc"),
///     "https://example.org/oai?verb=ListRecords&from=2020-01-01&metadataPrefix=oai_dc"
/// );
/// ```
pub fn list_records_url(
    host_url: &str,
    from: Option<&str>,
    until: Option<&str>,
    set: Option<&str>,
    metadata_prefix: &str,
) -> String {
    let mut query = String::from("verb=ListRecords");

    for (name, value) in [("from", from), ("until", until), ("set", set)] {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            query.push('&');
            query.push_str(name);
            query.push('=');
            query.push_str(&encode(v));
        }
    }

    query.push_str("&metadataPrefix=");
    query.push_str(&encode(metadata_prefix));

    with_query(host_url, &query)
}

/// Build a `ListRecords` URL continuing from a resumption token.
pub fn resumption_url(host_url: &str, token: &str) -> String {
    with_query(
        host_url,
        &format!("verb=ListRecords&resumptionToken={}", encode(token)),
    )
}

/// Build the `ListMetadataFormats` URL.
pub fn metadata_formats_url(host_url: &str) -> String {
    with_query(host_url, "verb=ListMetadataFormats")
}

/// Build the `Identify` URL.
pub fn identify_url(host_url: &str) -> String {
    with_query(host_url, "verb=Identify")
}
