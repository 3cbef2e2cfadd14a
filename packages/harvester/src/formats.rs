//! Metadata format registry built from `ListMetadataFormats`.
//!
//! Maps repository-defined metadata prefixes to schema URLs and validates a
//! requested prefix against the schemas the harvester implements.

use std::collections::HashMap;

use roxmltree::Document;

use crate::config::metadata_formats_url;
use crate::error::{HarvesterError, Result};
use crate::http::Fetcher;
use crate::schema::MetadataSchema;
use crate::xml::{child_text, get_tag_name};

/// Metadata prefixes advertised by a repository and their schema URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFormatRegistry {
    formats: HashMap<String, String>,
}

impl MetadataFormatRegistry {
    /// Create a registry from `(prefix, schema URL)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            formats: pairs.into_iter().collect(),
        }
    }

    /// Query a repository for its metadata formats.
    ///
    /// An unreachable repository or a malformed response yields an empty
    /// registry; the failure surfaces when a prefix is validated.
    pub fn load(fetcher: &dyn Fetcher, host_url: &str) -> Self {
        let url = metadata_formats_url(host_url);

        let body = match fetcher.fetch(&url) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Could not retrieve metadata formats");
                return Self::default();
            }
        };

        match Self::parse(&body) {
            Ok(registry) => {
                if registry.is_empty() {
                    tracing::warn!(url = %url, "Repository advertises no metadata formats");
                }
                registry
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Could not parse metadata formats");
                Self::default()
            }
        }
    }

    /// Parse a `ListMetadataFormats` response.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;

        let formats = doc
            .descendants()
            .filter(|n| n.is_element() && get_tag_name(*n) == "metadataFormat")
            .filter_map(|format| {
                let prefix = child_text(format, "metadataPrefix")?;
                let schema = child_text(format, "schema")?;
                Some((prefix, schema))
            })
            .collect();

        Ok(Self { formats })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Schema URL advertised for a prefix.
    #[must_use]
    pub fn schema_url(&self, prefix: &str) -> Option<&str> {
        self.formats.get(prefix).map(String::as_str)
    }

    /// Resolve a prefix to a schema the harvester implements.
    #[must_use]
    pub fn resolve(&self, prefix: &str) -> Option<MetadataSchema> {
        self.schema_url(prefix).and_then(MetadataSchema::from_url)
    }

    /// All advertised prefixes, sorted.
    #[must_use]
    pub fn prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self.formats.keys().cloned().collect();
        prefixes.sort();
        prefixes
    }

    /// Advertised prefixes whose schema the harvester implements, sorted.
    #[must_use]
    pub fn supported_prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self
            .formats
            .iter()
            .filter(|(_, schema)| MetadataSchema::is_supported(schema))
            .map(|(prefix, _)| prefix.clone())
            .collect();
        prefixes.sort();
        prefixes
    }

    /// Validate a requested prefix for a host.
    ///
    /// The prefix must be non-empty, the host configured, the registry
    /// non-empty, and the prefix advertised. Unless `allow_unsupported` is
    /// set, its schema must also be one the harvester implements.
    pub fn validate(
        &self,
        host_url: Option<&str>,
        prefix: Option<&str>,
        allow_unsupported: bool,
    ) -> Result<Option<MetadataSchema>> {
        let error = |message: String| HarvesterError::config(message, self.supported_prefixes());

        let prefix = prefix
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| error("No metadata prefix configured".to_string()))?;

        if host_url.is_none_or(|h| h.trim().is_empty()) {
            return Err(error("No host URL configured".to_string()));
        }

        if self.is_empty() {
            return Err(error(
                "The repository did not advertise any metadata formats".to_string(),
            ));
        }

        let Some(schema_url) = self.schema_url(prefix) else {
            return Err(error(format!(
                "Metadata prefix '{prefix}' is not offered by the repository"
            )));
        };

        match MetadataSchema::from_url(schema_url) {
            Some(schema) => Ok(Some(schema)),
            None if allow_unsupported => Ok(None),
            None => Err(error(format!(
                "Metadata prefix '{prefix}' uses unsupported schema {schema_url}"
            ))),
        }
    }
}
