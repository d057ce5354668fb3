//! Common types shared by the map renderer and its command line front end.

pub mod bbox;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod style;

pub use bbox::{BboxParseError, BoundingBox, DEFAULT_METERS_PER_DEG_LAT, DEFAULT_METERS_PER_DEG_LON};
pub use error::{ErrorKind, MapError, MapResult};
pub use feature::{ClassCodes, Feature};
pub use geometry::{
    Coord, Geometry, GeometryKind, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};
pub use style::{Color, ColorPair};
