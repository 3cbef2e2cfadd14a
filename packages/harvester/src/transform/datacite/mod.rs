//! DataCite metadata kernels 2, 3 and 4.
//!
//! The three versions share most of their structure. Field parsers that do
//! not differ live here as free functions; each version's mapper combines
//! them with its own rights, resource-type, funding and geolocation rules.

mod v2;
mod v3;
mod v4;

pub use v2::DataCite2Mapper;
pub use v3::DataCite3Mapper;
pub use v4::DataCite4Mapper;

use crate::document::{
    BoundingBox, CanonicalDocument, Contributor, DateType, Description, DocumentDate,
    FundingReference, GeoLocation, Identifier, NameIdentifier, Person, Point, RelatedIdentifier,
    ResourceType, ResourceTypeGeneral, Rights, Subject, Title,
};
use crate::transform::common::{add_web_links, derive_publication_year, parse_date_value, year_of};
use crate::transform::TransformContext;
use crate::xml::Element;

/// Contributor type whose entries are funders in kernels before 4.
const FUNDER_CONTRIBUTOR_TYPE: &str = "Funder";

/// Contributor type used when a contributor declares none.
const DEFAULT_CONTRIBUTOR_TYPE: &str = "Other";

/// The `resource` element of a record.
///
/// Records served as `oai_datacite` wrap the resource in a payload
/// envelope; plain `datacite` records have it as metadata root.
#[must_use]
pub fn locate_resource(metadata: &Element) -> &Element {
    if metadata.name() == "resource" {
        return metadata;
    }
    metadata.descendant("resource").unwrap_or(metadata)
}

/// Fields that all kernel versions map identically.
///
/// Contributors, rights, resource type, funding and geolocations are left to
/// the version mappers.
pub(crate) fn map_common(resource: &Element, doc: &mut CanonicalDocument) {
    doc.resource_identifier = parse_identifier(resource);
    doc.titles = parse_titles(resource);
    doc.creators = parse_creators(resource);
    doc.subjects.extend(parse_subjects(resource));
    doc.dates = parse_dates(resource);
    doc.descriptions = parse_descriptions(resource);
    doc.related_identifiers = parse_related_identifiers(resource);
    doc.alternate_identifiers = parse_alternate_identifiers(resource);
    doc.sizes = grouped_texts(resource, "sizes", "size");
    doc.formats = grouped_texts(resource, "formats", "format");
    doc.publisher = resource.child_text("publisher");
    doc.language = resource.child_text("language");
    doc.version = resource.child_text("version");
    doc.publication_year = resource
        .child_text("publicationYear")
        .as_deref()
        .and_then(year_of);
}

/// Steps every kernel ends with.
pub(crate) fn finish(doc: &mut CanonicalDocument, context: &TransformContext) {
    derive_publication_year(doc);
    add_web_links(doc, context);
}

fn grouped<'a>(resource: &'a Element, group: &str, item: &'a str) -> Vec<&'a Element> {
    resource
        .child(group)
        .map(|g| g.children_named(item).collect())
        .unwrap_or_default()
}

fn grouped_texts(resource: &Element, group: &str, item: &str) -> Vec<String> {
    resource
        .child(group)
        .map(|g| g.children_texts(item))
        .unwrap_or_default()
}

#[must_use]
pub fn parse_identifier(resource: &Element) -> Option<Identifier> {
    let element = resource.child("identifier")?;
    Some(Identifier::new(
        element.non_empty_text()?,
        element.attribute_value("identifierType"),
    ))
}

#[must_use]
pub fn parse_titles(resource: &Element) -> Vec<Title> {
    grouped(resource, "titles", "title")
        .into_iter()
        .filter_map(|t| {
            Some(Title {
                value: t.non_empty_text()?,
                title_type: t.attribute_value("titleType"),
                lang: t.lang(),
            })
        })
        .collect()
}

/// A creator or contributor; `name_tag` is `creatorName` or `contributorName`.
fn parse_person(element: &Element, name_tag: &str) -> Option<Person> {
    let name_element = element.child(name_tag)?;

    let name_identifiers = element
        .children_named("nameIdentifier")
        .filter_map(|n| {
            Some(NameIdentifier {
                value: n.non_empty_text()?,
                scheme: n.attribute_value("nameIdentifierScheme"),
                scheme_uri: n.attribute_value("schemeURI"),
            })
        })
        .collect();

    Some(Person {
        name: name_element.non_empty_text()?,
        name_type: name_element.attribute_value("nameType"),
        given_name: element.child_text("givenName"),
        family_name: element.child_text("familyName"),
        name_identifiers,
        affiliations: element.children_texts("affiliation"),
    })
}

#[must_use]
pub fn parse_creators(resource: &Element) -> Vec<Person> {
    grouped(resource, "creators", "creator")
        .into_iter()
        .filter_map(|c| parse_person(c, "creatorName"))
        .collect()
}

#[must_use]
pub fn parse_contributors(resource: &Element) -> Vec<Contributor> {
    grouped(resource, "contributors", "contributor")
        .into_iter()
        .filter_map(|c| {
            Some(Contributor {
                contributor_type: c
                    .attribute_value("contributorType")
                    .unwrap_or_else(|| DEFAULT_CONTRIBUTOR_TYPE.to_string()),
                person: parse_person(c, "contributorName")?,
            })
        })
        .collect()
}

/// Split funder contributors off into funding references.
///
/// Kernels 2 and 3 have no funding element; funders are contributors of
/// type `Funder`, which do not appear in the returned contributor list.
#[must_use]
pub fn funders_from_contributors(
    contributors: Vec<Contributor>,
) -> (Vec<Contributor>, Vec<FundingReference>) {
    let (funders, contributors): (Vec<_>, Vec<_>) = contributors
        .into_iter()
        .partition(|c| c.contributor_type.eq_ignore_ascii_case(FUNDER_CONTRIBUTOR_TYPE));

    let references = funders
        .into_iter()
        .map(|f| FundingReference {
            funder_identifier: f
                .person
                .name_identifiers
                .first()
                .map(|n| Identifier::new(n.value.clone(), n.scheme.clone())),
            funder_name: f.person.name,
            ..FundingReference::default()
        })
        .collect();

    (contributors, references)
}

#[must_use]
pub fn parse_subjects(resource: &Element) -> Vec<Subject> {
    grouped(resource, "subjects", "subject")
        .into_iter()
        .filter_map(|s| {
            Some(Subject {
                value: s.non_empty_text()?,
                scheme: s.attribute_value("subjectScheme"),
                scheme_uri: s.attribute_value("schemeURI"),
                value_uri: s.attribute_value("valueURI"),
                lang: s.lang(),
            })
        })
        .collect()
}

#[must_use]
pub fn parse_dates(resource: &Element) -> Vec<DocumentDate> {
    grouped(resource, "dates", "date")
        .into_iter()
        .filter_map(|d| {
            Some(DocumentDate {
                date: parse_date_value(&d.non_empty_text()?),
                date_type: DateType::parse(d.attribute("dateType").unwrap_or_default()),
                information: d.attribute_value("dateInformation"),
            })
        })
        .collect()
}

#[must_use]
pub fn parse_descriptions(resource: &Element) -> Vec<Description> {
    grouped(resource, "descriptions", "description")
        .into_iter()
        .filter_map(|d| {
            Some(Description {
                value: d.non_empty_text()?,
                description_type: d.attribute_value("descriptionType"),
                lang: d.lang(),
            })
        })
        .collect()
}

#[must_use]
pub fn parse_related_identifiers(resource: &Element) -> Vec<RelatedIdentifier> {
    grouped(resource, "relatedIdentifiers", "relatedIdentifier")
        .into_iter()
        .filter_map(|r| {
            Some(RelatedIdentifier {
                value: r.non_empty_text()?,
                identifier_type: r.attribute_value("relatedIdentifierType")?,
                relation_type: r.attribute_value("relationType"),
                resource_type_general: r.attribute_value("resourceTypeGeneral"),
            })
        })
        .collect()
}

#[must_use]
pub fn parse_alternate_identifiers(resource: &Element) -> Vec<Identifier> {
    grouped(resource, "alternateIdentifiers", "alternateIdentifier")
        .into_iter()
        .filter_map(|a| {
            Some(Identifier::new(
                a.non_empty_text()?,
                a.attribute_value("alternateIdentifierType"),
            ))
        })
        .collect()
}

fn parse_rights_element(element: &Element) -> Option<Rights> {
    let rights = Rights {
        value: element.non_empty_text(),
        uri: element.attribute_value("rightsURI"),
        lang: element.lang(),
    };
    (rights.value.is_some() || rights.uri.is_some()).then_some(rights)
}

/// The single `rights` element of kernel 2.
#[must_use]
pub fn parse_single_rights(resource: &Element) -> Vec<Rights> {
    resource
        .child("rights")
        .and_then(parse_rights_element)
        .into_iter()
        .collect()
}

/// The repeatable `rightsList` of kernels 3 and 4.
#[must_use]
pub fn parse_rights_list(resource: &Element) -> Vec<Rights> {
    grouped(resource, "rightsList", "rights")
        .into_iter()
        .filter_map(parse_rights_element)
        .collect()
}

/// Resource type; `film_is_audiovisual` enables the kernel 2 `Film` value.
///
/// Unknown general types map to `Other` so the free-text value survives.
#[must_use]
pub fn parse_resource_type(resource: &Element, film_is_audiovisual: bool) -> Option<ResourceType> {
    let element = resource.child("resourceType")?;
    let general_text = element.attribute_value("resourceTypeGeneral");
    let value = element.non_empty_text();

    if general_text.is_none() && value.is_none() {
        return None;
    }

    let general = match general_text.as_deref() {
        Some(g) if film_is_audiovisual && g.eq_ignore_ascii_case("film") => {
            ResourceTypeGeneral::Audiovisual
        }
        Some(g) => ResourceTypeGeneral::parse(g).unwrap_or(ResourceTypeGeneral::Other),
        None => ResourceTypeGeneral::Other,
    };

    Some(ResourceType { general, value })
}

/// Geolocations, with point and box parsing supplied by the kernel version.
pub(crate) fn parse_geo_locations(
    resource: &Element,
    point: impl Fn(&Element) -> Option<Point>,
    bounding_box: impl Fn(&Element) -> Option<BoundingBox>,
    polygons: impl Fn(&Element) -> Vec<Vec<Point>>,
) -> Vec<GeoLocation> {
    grouped(resource, "geoLocations", "geoLocation")
        .into_iter()
        .map(|g| GeoLocation {
            place: g.child_text("geoLocationPlace"),
            point: g.child("geoLocationPoint").and_then(&point),
            bounding_box: g.child("geoLocationBox").and_then(&bounding_box),
            polygons: polygons(g),
        })
        .filter(|g| !g.is_empty())
        .collect()
}
