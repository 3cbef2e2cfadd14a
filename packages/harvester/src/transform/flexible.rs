//! Schema-agnostic dispatch for repositories that mix metadata standards.

use tracing::debug;

use crate::classifier::{classify, schema_location};
use crate::document::CanonicalDocument;
use crate::error::{HarvesterError, Result};
use crate::record::RawRecord;
use crate::schema::MetadataSchema;
use crate::transform::{
    DataCite2Mapper, DataCite3Mapper, DataCite4Mapper, DublinCoreMapper, FieldMapper,
    Iso19139Mapper, TransformContext,
};
use crate::xml::Element;

/// Routes every record to the mapper of the schema it declares.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlexibleMapper {
    datacite2: DataCite2Mapper,
    datacite3: DataCite3Mapper,
    datacite4: DataCite4Mapper,
    dublin_core: DublinCoreMapper,
    iso19139: Iso19139Mapper,
}

impl FlexibleMapper {
    fn mapper(&self, schema: MetadataSchema) -> &dyn FieldMapper {
        match schema {
            MetadataSchema::DataCite2 => &self.datacite2,
            MetadataSchema::DataCite3 => &self.datacite3,
            MetadataSchema::DataCite4 => &self.datacite4,
            MetadataSchema::DublinCore => &self.dublin_core,
            MetadataSchema::Iso19139 => &self.iso19139,
        }
    }
}

impl FieldMapper for FlexibleMapper {
    fn name(&self) -> &'static str {
        "flexible"
    }

    fn map_fields(
        &self,
        record: &RawRecord,
        metadata: &Element,
        context: &TransformContext,
        doc: &mut CanonicalDocument,
    ) -> Result<()> {
        let Some(schema) = classify(record) else {
            return Err(HarvesterError::UnknownSchema {
                identifier: record.identifier().to_string(),
                schema_location: schema_location(record).map(str::to_string),
            });
        };

        debug!(identifier = %record.identifier(), schema = %schema, "Classified record");
        self.mapper(schema).map_fields(record, metadata, context, doc)
    }
}
