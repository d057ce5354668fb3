//! Vector geometry in geographic coordinates.
//!
//! [`Geometry`] is a closed sum type over the `geo-types` primitives so that
//! every consumer has to decide what to do with each kind. Coordinates are
//! (longitude, latitude) in degrees; area and centroid are planar in degree
//! space and come from `geo`. The JSON form is a GeoJSON geometry object.

use geo::{Area, BoundingRect, Centroid, InteriorPoint};
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;

pub use geo_types::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

/// Geometry sum type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "geojson::Geometry", into = "geojson::Geometry")]
pub enum Geometry {
    Point(Point),
    MultiPoint(MultiPoint),
    LineString(LineString),
    MultiLineString(MultiLineString),
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
    GeometryCollection(Vec<Geometry>),
}

/// Geometry kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    /// Upper-case tag as stored alongside features.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// Copy into the `geo-types` geometry enum.
    pub fn to_geo(&self) -> geo_types::Geometry {
        match self {
            Geometry::Point(p) => geo_types::Geometry::Point(*p),
            Geometry::MultiPoint(m) => geo_types::Geometry::MultiPoint(m.clone()),
            Geometry::LineString(l) => geo_types::Geometry::LineString(l.clone()),
            Geometry::MultiLineString(m) => geo_types::Geometry::MultiLineString(m.clone()),
            Geometry::Polygon(p) => geo_types::Geometry::Polygon(p.clone()),
            Geometry::MultiPolygon(m) => geo_types::Geometry::MultiPolygon(m.clone()),
            Geometry::GeometryCollection(gs) => geo_types::Geometry::GeometryCollection(
                geo_types::GeometryCollection(gs.iter().map(Geometry::to_geo).collect()),
            ),
        }
    }

    /// Bounding box of all coordinates, None when the geometry is empty.
    pub fn envelope(&self) -> Option<BoundingBox> {
        let rect = match self {
            Geometry::Point(p) => Some(p.bounding_rect()),
            Geometry::MultiPoint(m) => m.bounding_rect(),
            Geometry::LineString(l) => l.bounding_rect(),
            Geometry::MultiLineString(m) => m.bounding_rect(),
            Geometry::Polygon(p) => p.bounding_rect(),
            Geometry::MultiPolygon(m) => m.bounding_rect(),
            Geometry::GeometryCollection(gs) => {
                return gs
                    .iter()
                    .filter_map(Geometry::envelope)
                    .reduce(|a, b| a.union(&b));
            }
        };
        rect.map(BoundingBox::from)
    }

    /// Planar area of the areal parts, holes subtracted.
    pub fn area(&self) -> f64 {
        match self {
            Geometry::Polygon(p) => p.unsigned_area(),
            Geometry::MultiPolygon(m) => m.unsigned_area(),
            Geometry::GeometryCollection(gs) => gs.iter().map(Geometry::area).sum(),
            _ => 0.0,
        }
    }

    /// Center of mass of the highest-dimension parts.
    ///
    /// Areal parts are weighted by area, lineal parts by length, points count
    /// equally.
    pub fn centroid(&self) -> Option<Coord> {
        let point = match self {
            Geometry::Point(p) => Some(*p),
            Geometry::MultiPoint(m) => m.centroid(),
            Geometry::LineString(l) => l.centroid(),
            Geometry::MultiLineString(m) => m.centroid(),
            Geometry::Polygon(p) => p.centroid(),
            Geometry::MultiPolygon(m) => m.centroid(),
            Geometry::GeometryCollection(_) => self.to_geo().centroid(),
        };
        point.map(|p| p.0)
    }

    /// A point on the geometry, used to anchor labels of concave areas.
    pub fn interior_point(&self) -> Option<Coord> {
        let point = match self {
            Geometry::Point(p) => Some(*p),
            Geometry::MultiPoint(m) => m.interior_point(),
            Geometry::LineString(l) => l.interior_point(),
            Geometry::MultiLineString(m) => m.interior_point(),
            Geometry::Polygon(p) => p.interior_point(),
            Geometry::MultiPolygon(m) => m.interior_point(),
            Geometry::GeometryCollection(_) => self.to_geo().interior_point(),
        };
        point.map(|p| p.0)
    }
}

impl From<geo_types::Geometry> for Geometry {
    fn from(geometry: geo_types::Geometry) -> Self {
        match geometry {
            geo_types::Geometry::Point(p) => Geometry::Point(p),
            geo_types::Geometry::Line(l) => {
                Geometry::LineString(LineString::new(vec![l.start, l.end]))
            }
            geo_types::Geometry::LineString(l) => Geometry::LineString(l),
            geo_types::Geometry::Polygon(p) => Geometry::Polygon(p),
            geo_types::Geometry::MultiPoint(m) => Geometry::MultiPoint(m),
            geo_types::Geometry::MultiLineString(m) => Geometry::MultiLineString(m),
            geo_types::Geometry::MultiPolygon(m) => Geometry::MultiPolygon(m),
            geo_types::Geometry::GeometryCollection(gc) => {
                Geometry::GeometryCollection(gc.0.into_iter().map(Geometry::from).collect())
            }
            geo_types::Geometry::Rect(r) => Geometry::Polygon(r.to_polygon()),
            geo_types::Geometry::Triangle(t) => Geometry::Polygon(t.to_polygon()),
        }
    }
}

impl TryFrom<geojson::Geometry> for Geometry {
    type Error = geojson::Error;

    fn try_from(value: geojson::Geometry) -> Result<Self, Self::Error> {
        let geometry = geo_types::Geometry::<f64>::try_from(value.value)?;
        Ok(geometry.into())
    }
}

impl From<Geometry> for geojson::Geometry {
    fn from(geometry: Geometry) -> Self {
        geojson::Geometry::new(geojson::Value::from(&geometry.to_geo()))
    }
}
