//! DataCite kernel 4.

use crate::document::{BoundingBox, CanonicalDocument, FundingReference, Identifier, Point};
use crate::error::Result;
use crate::record::RawRecord;
use crate::transform::common::parse_coordinate;
use crate::transform::{FieldMapper, TransformContext};
use crate::xml::Element;

use super::{
    finish, locate_resource, map_common, parse_contributors, parse_geo_locations,
    parse_resource_type, parse_rights_list,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct DataCite4Mapper;

impl DataCite4Mapper {
    /// Point from `pointLongitude` and `pointLatitude` children.
    #[must_use]
    pub fn parse_point(element: &Element) -> Option<Point> {
        Some(Point {
            longitude: parse_coordinate(&element.child_text("pointLongitude")?)?,
            latitude: parse_coordinate(&element.child_text("pointLatitude")?)?,
        })
    }

    /// Box from its four named bound children.
    #[must_use]
    pub fn parse_box(element: &Element) -> Option<BoundingBox> {
        let bound = |tag: &str| element.child_text(tag).as_deref().and_then(parse_coordinate);
        Some(BoundingBox {
            west: bound("westBoundLongitude")?,
            east: bound("eastBoundLongitude")?,
            south: bound("southBoundLatitude")?,
            north: bound("northBoundLatitude")?,
        })
    }

    /// All `geoLocationPolygon`s of a geolocation, skipping empty ones.
    #[must_use]
    pub fn parse_polygons(geo_location: &Element) -> Vec<Vec<Point>> {
        geo_location
            .children_named("geoLocationPolygon")
            .map(|polygon| {
                polygon
                    .children_named("polygonPoint")
                    .filter_map(Self::parse_point)
                    .collect::<Vec<_>>()
            })
            .filter(|points| !points.is_empty())
            .collect()
    }

    #[must_use]
    pub fn parse_funding_references(resource: &Element) -> Vec<FundingReference> {
        let Some(group) = resource.child("fundingReferences") else {
            return Vec::new();
        };

        group
            .children_named("fundingReference")
            .filter_map(|f| {
                let award = f.child("awardNumber");
                Some(FundingReference {
                    funder_name: f.child_text("funderName")?,
                    funder_identifier: f.child("funderIdentifier").and_then(|i| {
                        Some(Identifier::new(
                            i.non_empty_text()?,
                            i.attribute_value("funderIdentifierType"),
                        ))
                    }),
                    award_number: award.and_then(Element::non_empty_text),
                    award_uri: award.and_then(|a| a.attribute_value("awardURI")),
                    award_title: f.child_text("awardTitle"),
                })
            })
            .collect()
    }
}

impl FieldMapper for DataCite4Mapper {
    fn name(&self) -> &'static str {
        "DataCite 4"
    }

    fn map_fields(
        &self,
        _record: &RawRecord,
        metadata: &Element,
        context: &TransformContext,
        doc: &mut CanonicalDocument,
    ) -> Result<()> {
        let resource = locate_resource(metadata);

        map_common(resource, doc);
        doc.contributors = parse_contributors(resource);
        doc.funding_references = Self::parse_funding_references(resource);
        doc.rights = parse_rights_list(resource);
        doc.resource_type = parse_resource_type(resource, false);
        doc.geo_locations = parse_geo_locations(
            resource,
            Self::parse_point,
            Self::parse_box,
            Self::parse_polygons,
        );

        finish(doc, context);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RECORD: &str = r#"<record>
  <header>
    <identifier>oai:example.org:ds-4</identifier>
    <datestamp>2020-02-02</datestamp>
  </header>
  <metadata>
    <resource xmlns="http://datacite.org/schema/kernel-4"
              xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
              xsi:schemaLocation="http://datacite.org/schema/kernel-4 http://schema.datacite.org/meta/kernel-4.3/metadata.xsd">
      <identifier identifierType="DOI">10.5880/ds.4</identifier>
      <creators>
        <creator>
          <creatorName nameType="Personal">Doe, Jane</creatorName>
          <givenName>Jane</givenName>
          <familyName>Doe</familyName>
        </creator>
      </creators>
      <titles><title>Glacier mass balance</title></titles>
      <publisher>GFZ</publisher>
      <publicationYear>2020</publicationYear>
      <contributors>
        <contributor contributorType="Funder"><contributorName>Legacy funder</contributorName></contributor>
      </contributors>
      <fundingReferences>
        <fundingReference>
          <funderName>European Commission</funderName>
          <funderIdentifier funderIdentifierType="Crossref Funder ID">10.13039/501100000780</funderIdentifier>
          <awardNumber awardURI="https://cordis.europa.eu/project/id/123">123</awardNumber>
          <awardTitle>Ice</awardTitle>
        </fundingReference>
        <fundingReference><awardNumber>no funder</awardNumber></fundingReference>
      </fundingReferences>
      <rightsList><rights>CC0</rights></rightsList>
      <geoLocations>
        <geoLocation>
          <geoLocationPoint>
            <pointLongitude>12.5</pointLongitude>
            <pointLatitude>45.0</pointLatitude>
          </geoLocationPoint>
          <geoLocationBox>
            <westBoundLongitude>10</westBoundLongitude>
            <eastBoundLongitude>15</eastBoundLongitude>
            <southBoundLatitude>44</southBoundLatitude>
            <northBoundLatitude>47</northBoundLatitude>
          </geoLocationBox>
          <geoLocationPolygon>
            <polygonPoint><pointLongitude>10</pointLongitude><pointLatitude>44</pointLatitude></polygonPoint>
            <polygonPoint><pointLongitude>15</pointLongitude><pointLatitude>44</pointLatitude></polygonPoint>
            <polygonPoint><pointLongitude>12</pointLongitude><pointLatitude>47</pointLatitude></polygonPoint>
          </geoLocationPolygon>
        </geoLocation>
        <geoLocation><geoLocationPoint>12.5 45.0</geoLocationPoint></geoLocation>
      </geoLocations>
    </resource>
  </metadata>
</record>"#;

    fn transform() -> CanonicalDocument {
        let record = RawRecord::parse(RECORD).unwrap();
        let mut doc = CanonicalDocument::new(record.identifier(), "Repo");
        DataCite4Mapper
            .map_fields(
                &record,
                record.metadata.as_ref().unwrap(),
                &TransformContext::new("Repo"),
                &mut doc,
            )
            .unwrap();
        doc
    }

    #[test]
    fn test_named_point_and_box() {
        let doc = transform();
        let geo = &doc.geo_locations[0];

        assert_eq!(
            geo.point,
            Some(Point {
                longitude: 12.5,
                latitude: 45.0
            })
        );
        assert_eq!(
            geo.bounding_box,
            Some(BoundingBox {
                west: 10.0,
                east: 15.0,
                south: 44.0,
                north: 47.0
            })
        );
        assert_eq!(geo.polygons.len(), 1);
        assert_eq!(geo.polygons[0].len(), 3);
    }

    #[test]
    fn test_positional_point_is_ignored() {
        // Kernel 4 only knows named coordinates; the second location is empty.
        let doc = transform();
        assert_eq!(doc.geo_locations.len(), 1);
    }

    #[test]
    fn test_funding_references_are_dedicated() {
        let doc = transform();

        assert_eq!(
            doc.funding_references,
            vec![FundingReference {
                funder_name: "European Commission".to_string(),
                funder_identifier: Some(Identifier::new(
                    "10.13039/501100000780",
                    Some("Crossref Funder ID".to_string())
                )),
                award_number: Some("123".to_string()),
                award_uri: Some("https://cordis.europa.eu/project/id/123".to_string()),
                award_title: Some("Ice".to_string()),
            }]
        );
        // Funder contributors stay contributors.
        assert_eq!(doc.contributors.len(), 1);
        assert_eq!(doc.contributors[0].contributor_type, "Funder");
    }

    #[test]
    fn test_person_names() {
        let doc = transform();
        let creator = &doc.creators[0];

        assert_eq!(creator.name_type.as_deref(), Some("Personal"));
        assert_eq!(creator.given_name.as_deref(), Some("Jane"));
        assert_eq!(creator.family_name.as_deref(), Some("Doe"));
    }
}
