//! Schema transformers: raw records to canonical documents.
//!
//! Every record goes through the same two stages. [`RecordTransformer`]
//! applies the shared header handling (deletion, identifier, set-spec
//! subjects, logo link), then a schema-specific [`FieldMapper`] maps the
//! metadata body.

pub mod common;
pub mod datacite;
pub mod dublin_core;
pub mod flexible;
pub mod iso19139;

use crate::config::{DeletionPolicy, HarvestConfig};
use crate::document::{CanonicalDocument, Subject, WebLink, WebLinkType};
use crate::error::{HarvesterError, Result};
use crate::record::RawRecord;
use crate::schema::MetadataSchema;
use crate::xml::Element;

pub use datacite::{DataCite2Mapper, DataCite3Mapper, DataCite4Mapper};
pub use dublin_core::DublinCoreMapper;
pub use flexible::FlexibleMapper;
pub use iso19139::Iso19139Mapper;

/// Settings shared by all mappers of a harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformContext {
    pub repository_identifier: String,
    pub logo_url: Option<String>,
    pub view_url: Option<String>,
    pub deletion_policy: DeletionPolicy,
}

impl TransformContext {
    #[must_use]
    pub fn new(repository_identifier: impl Into<String>) -> Self {
        Self {
            repository_identifier: repository_identifier.into(),
            ..Self::default()
        }
    }

    /// Take logo, view URL and deletion policy from a harvest configuration.
    #[must_use]
    pub fn from_config(repository_identifier: impl Into<String>, config: &HarvestConfig) -> Self {
        Self {
            repository_identifier: repository_identifier.into(),
            logo_url: config.logo_url.clone(),
            view_url: config.view_url.clone(),
            deletion_policy: config.deletion_policy,
        }
    }
}

/// Maps the metadata body of one schema onto a canonical document.
pub trait FieldMapper: Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &'static str;

    /// Map `metadata` (the root element inside `<metadata>`) into `doc`.
    ///
    /// `doc` arrives with identifier, repository identifier, set-spec
    /// subjects and the logo link already filled in.
    fn map_fields(
        &self,
        record: &RawRecord,
        metadata: &Element,
        context: &TransformContext,
        doc: &mut CanonicalDocument,
    ) -> Result<()>;
}

/// The mapper implementing a schema.
#[must_use]
pub fn mapper_for(schema: MetadataSchema) -> Box<dyn FieldMapper> {
    match schema {
        MetadataSchema::DataCite2 => Box::new(DataCite2Mapper),
        MetadataSchema::DataCite3 => Box::new(DataCite3Mapper::default()),
        MetadataSchema::DataCite4 => Box::new(DataCite4Mapper),
        MetadataSchema::DublinCore => Box::new(DublinCoreMapper),
        MetadataSchema::Iso19139 => Box::new(Iso19139Mapper),
    }
}

/// Transformer bound to one mapper for a harvest run.
pub struct RecordTransformer {
    mapper: Box<dyn FieldMapper>,
    context: TransformContext,
}

impl RecordTransformer {
    #[must_use]
    pub fn new(mapper: Box<dyn FieldMapper>, context: TransformContext) -> Self {
        Self { mapper, context }
    }

    /// Transformer for a single schema.
    #[must_use]
    pub fn for_schema(schema: MetadataSchema, context: TransformContext) -> Self {
        Self::new(mapper_for(schema), context)
    }

    /// Transformer that classifies every record by its declared schema.
    #[must_use]
    pub fn flexible(context: TransformContext) -> Self {
        Self::new(Box::new(FlexibleMapper::default()), context)
    }

    #[must_use]
    pub fn mapper_name(&self) -> &'static str {
        self.mapper.name()
    }

    #[must_use]
    pub fn context(&self) -> &TransformContext {
        &self.context
    }

    /// Transform a record.
    ///
    /// Returns `Ok(None)` for deleted records under
    /// [`DeletionPolicy::DropDeleted`]. Errors concern this record only.
    pub fn transform(&self, record: &RawRecord) -> Result<Option<CanonicalDocument>> {
        let identifier = record.identifier();
        if identifier.is_empty() {
            return Err(HarvesterError::MissingElement {
                element: "identifier".to_string(),
                context: "record header".to_string(),
            });
        }

        if record.is_deleted() {
            return Ok(match self.context.deletion_policy {
                DeletionPolicy::DropDeleted => None,
                DeletionPolicy::EmitTombstone => Some(CanonicalDocument::tombstone(
                    identifier,
                    &self.context.repository_identifier,
                    record.datestamp(),
                )),
            });
        }

        let metadata = record
            .metadata
            .as_ref()
            .ok_or_else(|| HarvesterError::MissingElement {
                element: "metadata".to_string(),
                context: format!("record {identifier}"),
            })?;

        let mut doc = CanonicalDocument::new(identifier, &self.context.repository_identifier);
        doc.subjects = record
            .header
            .set_specs
            .iter()
            .map(Subject::new)
            .collect();

        if let Some(logo_url) = &self.context.logo_url {
            doc.web_links.push(WebLink::new(
                common::LOGO_LINK_NAME,
                logo_url,
                WebLinkType::ProviderLogo,
            ));
        }

        self.mapper
            .map_fields(record, metadata, &self.context, &mut doc)?;
        Ok(Some(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DC_RECORD: &str = r#"<record>
  <header>
    <identifier>oai:example.org:7</identifier>
    <datestamp>2021-03-04</datestamp>
    <setSpec>geo</setSpec>
  </header>
  <metadata>
    <oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"
               xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:title>Rivers</dc:title>
      <dc:subject>hydrology</dc:subject>
    </oai_dc:dc>
  </metadata>
</record>"#;

    const DELETED_RECORD: &str = r#"<record>
  <header status="deleted">
    <identifier>oai:example.org:8</identifier>
    <datestamp>2021-03-05</datestamp>
  </header>
  <metadata><oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"><title>Ignored</title></oai_dc:dc></metadata>
</record>"#;

    fn context() -> TransformContext {
        TransformContext {
            repository_identifier: "Example".to_string(),
            logo_url: Some("https://example.org/logo.png".to_string()),
            ..TransformContext::default()
        }
    }

    #[test]
    fn test_header_defaults_precede_schema_fields() {
        let record = RawRecord::parse(DC_RECORD).unwrap();
        let transformer = RecordTransformer::for_schema(MetadataSchema::DublinCore, context());

        let doc = transformer.transform(&record).unwrap().unwrap();

        assert_eq!(doc.identifier, "oai:example.org:7");
        assert_eq!(doc.repository_identifier, "Example");
        let subjects: Vec<&str> = doc.subjects.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(subjects, vec!["geo", "hydrology"]);
        assert_eq!(
            doc.web_links.first(),
            Some(&WebLink::new(
                "Logo",
                "https://example.org/logo.png",
                WebLinkType::ProviderLogo
            ))
        );
    }

    #[test]
    fn test_deleted_record_dropped() {
        let record = RawRecord::parse(DELETED_RECORD).unwrap();
        let transformer = RecordTransformer::for_schema(MetadataSchema::DublinCore, context());

        assert_eq!(transformer.transform(&record).unwrap(), None);
    }

    #[test]
    fn test_deleted_record_tombstone() {
        let record = RawRecord::parse(DELETED_RECORD).unwrap();
        let context = TransformContext {
            deletion_policy: DeletionPolicy::EmitTombstone,
            ..context()
        };
        let transformer = RecordTransformer::for_schema(MetadataSchema::DataCite4, context);

        let doc = transformer.transform(&record).unwrap().unwrap();
        assert!(doc.is_tombstone());
        assert!(doc.titles.is_empty());
        assert!(doc.web_links.is_empty());
    }

    #[test]
    fn test_missing_metadata_is_record_error() {
        let record = RawRecord::parse(
            "<record><header><identifier>oai:x:1</identifier></header></record>",
        )
        .unwrap();
        let transformer = RecordTransformer::for_schema(MetadataSchema::DublinCore, context());

        assert!(matches!(
            transformer.transform(&record),
            Err(HarvesterError::MissingElement { .. })
        ));
    }

    #[test]
    fn test_missing_identifier_is_record_error() {
        let record = RawRecord::parse("<record><header/><metadata><dc/></metadata></record>")
            .unwrap();
        let transformer = RecordTransformer::for_schema(MetadataSchema::DublinCore, context());

        assert!(transformer.transform(&record).is_err());
    }

    #[test]
    fn test_mapper_for_every_schema() {
        for schema in MetadataSchema::ALL {
            let transformer = RecordTransformer::for_schema(schema, context());
            assert!(!transformer.mapper_name().is_empty());
        }
    }
}
