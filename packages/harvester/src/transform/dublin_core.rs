//! Unqualified Dublin Core (`oai_dc`).
//!
//! Dublin Core elements are flat and untyped, so every field is a plain
//! repeated text element. Types the canonical model needs are inferred from
//! the values themselves.

use crate::document::{
    CanonicalDocument, Contributor, DateType, Description, DocumentDate, GeoLocation, Identifier,
    Person, RelatedIdentifier, ResourceType, ResourceTypeGeneral, Rights, Subject, Title,
};
use crate::error::Result;
use crate::record::RawRecord;
use crate::transform::common::{
    add_web_links, derive_publication_year, infer_identifier_type, is_absolute_url,
    parse_date_value,
};
use crate::transform::{FieldMapper, TransformContext};
use crate::xml::Element;

/// Contributor type given to `dc:contributor` entries.
const DC_CONTRIBUTOR_TYPE: &str = "Other";

#[derive(Debug, Default, Clone, Copy)]
pub struct DublinCoreMapper;

impl DublinCoreMapper {
    /// Split `dc:identifier`s into the resource identifier and the rest.
    ///
    /// A DOI wins over a URL; the first of each kind is used.
    fn map_identifiers(values: Vec<String>, doc: &mut CanonicalDocument) {
        let primary = values
            .iter()
            .position(|v| infer_identifier_type(v) == Some("DOI"))
            .or_else(|| values.iter().position(|v| infer_identifier_type(v).is_some()));

        for (index, value) in values.into_iter().enumerate() {
            let kind = infer_identifier_type(&value).map(str::to_string);
            let identifier = Identifier::new(value, kind);
            if Some(index) == primary {
                doc.resource_identifier = Some(identifier);
            } else {
                doc.alternate_identifiers.push(identifier);
            }
        }
    }

    /// `dc:date`: the first is the issue date, further dates are untyped.
    fn map_dates(values: Vec<String>) -> Vec<DocumentDate> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| DocumentDate {
                date: parse_date_value(value),
                date_type: if index == 0 {
                    DateType::Issued
                } else {
                    DateType::Other
                },
                information: None,
            })
            .collect()
    }

    fn map_resource_type(value: Option<String>) -> Option<ResourceType> {
        let value = value?;
        Some(ResourceType {
            general: ResourceTypeGeneral::parse(&value).unwrap_or(ResourceTypeGeneral::Other),
            value: Some(value),
        })
    }

    fn map_rights(value: String) -> Rights {
        if is_absolute_url(&value) {
            Rights {
                uri: Some(value),
                ..Rights::default()
            }
        } else {
            Rights {
                value: Some(value),
                ..Rights::default()
            }
        }
    }
}

impl FieldMapper for DublinCoreMapper {
    fn name(&self) -> &'static str {
        "Dublin Core"
    }

    fn map_fields(
        &self,
        _record: &RawRecord,
        metadata: &Element,
        context: &TransformContext,
        doc: &mut CanonicalDocument,
    ) -> Result<()> {
        let texts = |tag: &str| metadata.children_texts(tag);

        doc.titles = texts("title").into_iter().map(Title::new).collect();
        doc.creators = texts("creator").into_iter().map(Person::new).collect();
        doc.contributors = texts("contributor")
            .into_iter()
            .map(|name| Contributor {
                contributor_type: DC_CONTRIBUTOR_TYPE.to_string(),
                person: Person::new(name),
            })
            .collect();
        doc.subjects
            .extend(texts("subject").into_iter().map(Subject::new));
        doc.descriptions = texts("description")
            .into_iter()
            .map(Description::new)
            .collect();
        doc.publisher = metadata.child_text("publisher");
        doc.language = metadata.child_text("language");
        doc.dates = Self::map_dates(texts("date"));
        doc.resource_type = Self::map_resource_type(metadata.child_text("type"));
        doc.formats = texts("format");
        doc.rights = texts("rights").into_iter().map(Self::map_rights).collect();
        doc.geo_locations = texts("coverage")
            .into_iter()
            .map(|place| GeoLocation {
                place: Some(place),
                ..GeoLocation::default()
            })
            .collect();
        doc.related_identifiers = texts("relation")
            .into_iter()
            .filter_map(|value| {
                let kind = infer_identifier_type(&value)?;
                Some(RelatedIdentifier {
                    value,
                    identifier_type: kind.to_string(),
                    relation_type: None,
                    resource_type_general: None,
                })
            })
            .collect();
        Self::map_identifiers(texts("identifier"), doc);

        derive_publication_year(doc);
        add_web_links(doc, context);
        Ok(())
    }
}
