//! GeoJSON and legacy-coordinate shapes for the geospatial filter operators.

use std::fmt;

use bson::{Bson, Document, doc};

/// Custom coordinate reference system enforcing counter-clockwise winding, used for
/// polygons larger than a hemisphere.
pub const STRICT_WINDING_CRS: &str = "urn:x-mongodb:crs:strictwinding:EPSG:4326";

/// GeoJSON object types accepted by `$geometry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::GeometryCollection => "GeometryCollection",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shapes expressed with legacy coordinate pairs, for `$geoWithin` on a flat plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyShape {
    /// `$box`: bottom-left and upper-right corners.
    Box,
    /// `$polygon`: an array of points.
    Polygon,
    /// `$center`: a center point and a radius.
    Center,
    /// `$centerSphere`: a center point and a radius in radians.
    CenterSphere,
}

impl LegacyShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyShape::Box => "$box",
            LegacyShape::Polygon => "$polygon",
            LegacyShape::Center => "$center",
            LegacyShape::CenterSphere => "$centerSphere",
        }
    }
}

impl fmt::Display for LegacyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds `{ "$geometry": { type, coordinates[, crs] } }`.
pub(crate) fn geometry(geometry_type: GeometryType, coordinates: Bson, strict_winding: bool) -> Document {
    let mut geometry = doc! {
        "type": geometry_type.as_str(),
        "coordinates": coordinates,
    };

    if strict_winding {
        geometry.insert(
            "crs",
            doc! {
                "type": "name",
                "properties": { "name": STRICT_WINDING_CRS },
            },
        );
    }

    doc! { "$geometry": geometry }
}

/// Builds the GeoJSON point value used by `$near` and `$nearSphere`.
pub(crate) fn near_point(longitude: f64, latitude: f64, max: Option<f64>, min: Option<f64>) -> Document {
    let mut value = geometry(GeometryType::Point, Bson::from(vec![longitude, latitude]), false);

    if let Some(max) = max {
        value.insert("$maxDistance", max);
    }
    if let Some(min) = min {
        value.insert("$minDistance", min);
    }

    value
}
