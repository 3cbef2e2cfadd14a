//! Metadata schemas the harvester can transform.

use serde::Serialize;

/// A metadata standard (and version) with a dedicated transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetadataSchema {
    /// DataCite metadata kernel 2.x and earlier.
    DataCite2,
    /// DataCite metadata kernel 3.x.
    DataCite3,
    /// DataCite metadata kernel 4.x.
    DataCite4,
    /// Unqualified Dublin Core (`oai_dc`).
    DublinCore,
    /// ISO 19139 geographic metadata.
    Iso19139,
}

impl MetadataSchema {
    /// All supported schemas.
    pub const ALL: [MetadataSchema; 5] = [
        Self::DataCite2,
        Self::DataCite3,
        Self::DataCite4,
        Self::DublinCore,
        Self::Iso19139,
    ];

    /// Canonical schema URL.
    #[must_use]
    pub fn url(&self) -> &'static str {
        match self {
            Self::DataCite2 => "http://schema.datacite.org/meta/kernel-2.2/metadata.xsd",
            Self::DataCite3 => "http://schema.datacite.org/meta/kernel-3/metadata.xsd",
            Self::DataCite4 => "http://schema.datacite.org/meta/kernel-4/metadata.xsd",
            Self::DublinCore => "http://www.openarchives.org/OAI/2.0/oai_dc.xsd",
            Self::Iso19139 => "http://www.isotc211.org/2005/gmd/gmd.xsd",
        }
    }

    /// Short display name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataCite2 => "DataCite 2",
            Self::DataCite3 => "DataCite 3",
            Self::DataCite4 => "DataCite 4",
            Self::DublinCore => "Dublin Core",
            Self::Iso19139 => "ISO 19139",
        }
    }

    /// Resolve a schema URL advertised by a repository or declared by a record.
    ///
    /// Accepts the URL variants found in the wild: `http` or `https`, with or
    /// without the `www.` host prefix, and explicit minor versions of a kernel
    /// (`kernel-4.1`, `kernel-3.1`, ...).
    ///
    /// # Examples
    /// ```
    /// use oaipmh_harvester::schema::MetadataSchema;
    ///
    /// assert_eq!(
    ///     MetadataSchema::from_url("https://schema.datacite.org/meta/kernel-4.3/metadata.xsd"),
    ///     Some(MetadataSchema::DataCite4)
    /// );
    /// assert_eq!(MetadataSchema::from_url("http://www.loc.gov/standards/marcxml/schema/MARC21slim.xsd"), None);
    /// ```
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let normalized = url.trim().to_lowercase();
        let normalized = normalized
            .strip_prefix("https://")
            .or_else(|| normalized.strip_prefix("http://"))
            .unwrap_or(normalized.as_str());
        let normalized = normalized.strip_prefix("www.").unwrap_or(normalized);

        if let Some(rest) = normalized.strip_prefix("schema.datacite.org/meta/kernel-") {
            let version = rest.split(['/', '.']).next()?;
            return match version {
                "2" => Some(Self::DataCite2),
                "3" => Some(Self::DataCite3),
                "4" => Some(Self::DataCite4),
                _ => None,
            };
        }

        match normalized {
            "openarchives.org/oai/2.0/oai_dc.xsd" => Some(Self::DublinCore),
            "isotc211.org/2005/gmd/gmd.xsd" | "isotc211.org/2005/gmd" => Some(Self::Iso19139),
            _ => None,
        }
    }

    /// Whether a schema URL is implemented by the harvester.
    #[must_use]
    pub fn is_supported(url: &str) -> bool {
        Self::from_url(url).is_some()
    }
}

impl std::fmt::Display for MetadataSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
