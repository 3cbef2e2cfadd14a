//! DataCite kernel 3.
//!
//! Same as kernel 2 except for the repeatable rights list, the dropped `Film`
//! resource type and the coordinate order of points and boxes.

use crate::document::{BoundingBox, CanonicalDocument, Point};
use crate::error::Result;
use crate::record::RawRecord;
use crate::transform::common::parse_coordinates;
use crate::transform::{FieldMapper, TransformContext};
use crate::xml::Element;

use super::{
    finish, locate_resource, parse_geo_locations, parse_resource_type, parse_rights_list,
    DataCite2Mapper,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct DataCite3Mapper {
    base: DataCite2Mapper,
}

impl DataCite3Mapper {
    /// Point written as `latitude longitude`.
    ///
    /// # Examples
    /// ```
    /// use oaipmh_harvester::document::Point;
    /// use oaipmh_harvester::transform::DataCite3Mapper;
    ///
    /// assert_eq!(
    ///     DataCite3Mapper::parse_point("12.5 45.0"),
    ///     Some(Point { latitude: 12.5, longitude: 45.0 })
    /// );
    /// ```
    #[must_use]
    pub fn parse_point(text: &str) -> Option<Point> {
        let [latitude, longitude] = parse_coordinates::<2>(text)?;
        Some(Point {
            longitude,
            latitude,
        })
    }

    /// Box written as `south west north east`.
    #[must_use]
    pub fn parse_box(text: &str) -> Option<BoundingBox> {
        let [south, west, north, east] = parse_coordinates::<4>(text)?;
        Some(BoundingBox {
            west,
            east,
            south,
            north,
        })
    }
}

impl FieldMapper for DataCite3Mapper {
    fn name(&self) -> &'static str {
        "DataCite 3"
    }

    fn map_fields(
        &self,
        _record: &RawRecord,
        metadata: &Element,
        context: &TransformContext,
        doc: &mut CanonicalDocument,
    ) -> Result<()> {
        let resource = locate_resource(metadata);

        self.base.map_shared(resource, doc);
        doc.rights = parse_rights_list(resource);
        doc.resource_type = parse_resource_type(resource, false);
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
