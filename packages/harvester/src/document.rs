//! Canonical document model produced by the schema transformers.
//!
//! Only the fields the transformers populate are modeled. Free-form
//! vocabulary values (title types, relation types, ...) are kept as strings;
//! values the harvester reasons about (date types, resource types, link
//! types) are enums.

use serde::Serialize;

/// A harvested record in normalized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalDocument {
    /// OAI-PMH header identifier.
    pub identifier: String,

    /// Identifier of the repository the record was harvested from.
    pub repository_identifier: String,

    /// The resource's own identifier (usually a DOI).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<Title>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<Person>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Contributor>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<DocumentDate>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<Description>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<Subject>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rights: Vec<Rights>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_identifiers: Vec<RelatedIdentifier>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternate_identifiers: Vec<Identifier>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geo_locations: Vec<GeoLocation>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub funding_references: Vec<FundingReference>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub web_links: Vec<WebLink>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
}

/// Version string carried by tombstone documents.
pub const DELETED_VERSION: &str = "deleted";

impl CanonicalDocument {
    /// Create an empty document for a record.
    #[must_use]
    pub fn new(identifier: impl Into<String>, repository_identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            repository_identifier: repository_identifier.into(),
            ..Self::default()
        }
    }

    /// Create the minimal document standing in for a deleted record.
    #[must_use]
    pub fn tombstone(
        identifier: impl Into<String>,
        repository_identifier: impl Into<String>,
        datestamp: Option<&str>,
    ) -> Self {
        let mut doc = Self::new(identifier, repository_identifier);
        doc.version = Some(DELETED_VERSION.to_string());
        if let Some(datestamp) = datestamp {
            doc.dates.push(DocumentDate::point(datestamp, DateType::Updated));
        }
        doc
    }

    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.version.as_deref() == Some(DELETED_VERSION)
    }

    /// The first title, if any.
    #[must_use]
    pub fn main_title(&self) -> Option<&str> {
        self.titles.first().map(|t| t.value.as_str())
    }
}

/// An identifier with its type (e.g. `DOI`, `URL`, `Handle`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_type: Option<String>,
}

impl Identifier {
    #[must_use]
    pub fn new(value: impl Into<String>, identifier_type: Option<String>) -> Self {
        Self {
            value: value.into(),
            identifier_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Title {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            title_type: None,
            lang: None,
        }
    }
}

/// Identifier of a person or organization in an identifier scheme (ORCID, ROR, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameIdentifier {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme_uri: Option<String>,
}

/// A creator, or the person/organization part of a contributor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name_identifiers: Vec<NameIdentifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affiliations: Vec<String>,
}

impl Person {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contributor {
    pub contributor_type: String,
    #[serde(flatten)]
    pub person: Person,
}

/// DataCite date types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateType {
    Accepted,
    Available,
    Copyrighted,
    Collected,
    Created,
    Issued,
    Submitted,
    Updated,
    Valid,
    Withdrawn,
    Other,
}

impl DateType {
    /// Parse a date type, case-insensitively. Unknown values map to `Other`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "accepted" => Self::Accepted,
            "available" => Self::Available,
            "copyrighted" => Self::Copyrighted,
            "collected" => Self::Collected,
            "created" => Self::Created,
            "issued" => Self::Issued,
            "submitted" => Self::Submitted,
            "updated" => Self::Updated,
            "valid" => Self::Valid,
            "withdrawn" => Self::Withdrawn,
            _ => Self::Other,
        }
    }
}

/// A point date or a date range, as written in the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateValue {
    Point {
        value: String,
    },
    Range {
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentDate {
    pub date: DateValue,
    pub date_type: DateType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<String>,
}

impl DocumentDate {
    #[must_use]
    pub fn point(value: impl Into<String>, date_type: DateType) -> Self {
        Self {
            date: DateValue::Point {
                value: value.into(),
            },
            date_type,
            information: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Description {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description_type: None,
            lang: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Subject {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedIdentifier {
    pub value: String,
    pub identifier_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type_general: Option<String>,
}

/// Geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub polygons: Vec<Vec<Point>>,
}

impl GeoLocation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.place.is_none()
            && self.point.is_none()
            && self.bounding_box.is_none()
            && self.polygons.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FundingReference {
    pub funder_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funder_identifier: Option<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebLinkType {
    ProviderLogo,
    ViewUrl,
    Related,
    ResearchData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebLink {
    pub name: String,
    pub url: String,
    pub link_type: WebLinkType,
}

impl WebLink {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>, link_type: WebLinkType) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            link_type,
        }
    }
}

/// DataCite `resourceTypeGeneral` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceTypeGeneral {
    Audiovisual,
    Collection,
    DataPaper,
    Dataset,
    Event,
    Image,
    InteractiveResource,
    Model,
    PhysicalObject,
    Service,
    Software,
    Sound,
    Text,
    Workflow,
    Other,
}

impl ResourceTypeGeneral {
    /// Parse a `resourceTypeGeneral` value, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let kind = match value.trim().to_lowercase().as_str() {
            "audiovisual" => Self::Audiovisual,
            "collection" => Self::Collection,
            "datapaper" => Self::DataPaper,
            "dataset" => Self::Dataset,
            "event" => Self::Event,
            "image" => Self::Image,
            "interactiveresource" => Self::InteractiveResource,
            "model" => Self::Model,
            "physicalobject" => Self::PhysicalObject,
            "service" => Self::Service,
            "software" => Self::Software,
            "sound" => Self::Sound,
            "text" => Self::Text,
            "workflow" => Self::Workflow,
            "other" => Self::Other,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    pub general: ResourceTypeGeneral,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
