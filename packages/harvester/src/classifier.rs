//! Record classification for repositories that mix metadata standards.

use crate::record::RawRecord;
use crate::schema::MetadataSchema;

/// Namespace of `xsi:` attributes.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The schema URL a record declares on its metadata root element.
///
/// Reads `xsi:schemaLocation`, falling back to an unnamespaced
/// `schemaLocation`. A schema location lists namespace/URL pairs separated by
/// whitespace; the last token is the schema URL.
#[must_use]
pub fn schema_location(record: &RawRecord) -> Option<&str> {
    let root = record.metadata.as_ref()?;
    let location = root
        .attribute_ns(XSI_NAMESPACE, "schemaLocation")
        .or_else(|| root.attribute("schemaLocation"))?;

    location.split_whitespace().last()
}

/// Determine which supported schema a record follows.
///
/// Returns `None` when the record declares no schema location or declares one
/// the harvester does not implement.
#[must_use]
pub fn classify(record: &RawRecord) -> Option<MetadataSchema> {
    schema_location(record).and_then(MetadataSchema::from_url)
}
