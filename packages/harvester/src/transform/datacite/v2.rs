//! DataCite kernel 2 (and earlier).

use crate::document::{BoundingBox, CanonicalDocument, Point};
use crate::error::Result;
use crate::record::RawRecord;
use crate::transform::common::parse_coordinates;
use crate::transform::{FieldMapper, TransformContext};
use crate::xml::Element;

use super::{
    finish, funders_from_contributors, locate_resource, map_common, parse_contributors,
    parse_geo_locations, parse_resource_type, parse_single_rights,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct DataCite2Mapper;

impl DataCite2Mapper {
    /// Fields kernel 3 maps the same way as kernel 2.
    pub(crate) fn map_shared(self, resource: &Element, doc: &mut CanonicalDocument) {
        map_common(resource, doc);

        let (contributors, funders) = funders_from_contributors(parse_contributors(resource));
        doc.contributors = contributors;
        doc.funding_references = funders;
    }

    /// Point written as `longitude latitude`.
    #[must_use]
    pub fn parse_point(text: &str) -> Option<Point> {
        let [longitude, latitude] = parse_coordinates::<2>(text)?;
        Some(Point {
            longitude,
            latitude,
        })
    }

    /// Box written as `west east south north`.
    #[must_use]
    pub fn parse_box(text: &str) -> Option<BoundingBox> {
        let [west, east, south, north] = parse_coordinates::<4>(text)?;
        Some(BoundingBox {
            west,
            east,
            south,
            north,
        })
    }
}

impl FieldMapper for DataCite2Mapper {
    fn name(&self) -> &'static str {
        "DataCite 2"
    }

    fn map_fields(
        &self,
        _record: &RawRecord,
        metadata: &Element,
        context: &TransformContext,
        doc: &mut CanonicalDocument,
    ) -> Result<()> {
        let resource = locate_resource(metadata);

        self.map_shared(resource, doc);
        doc.rights = parse_single_rights(resource);
        doc.resource_type = parse_resource_type(resource, true);
        doc.geo_locations = parse_geo_locations(
            resource,
            |p| Self::parse_point(&p.text()),
            |b| Self::parse_box(&b.text()),
            |_| Vec::new(),
        );

        finish(doc, context);
        Ok(())
    }
}
