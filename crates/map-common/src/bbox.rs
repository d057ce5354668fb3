//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::geometry::{Coord, LineString, Polygon};

/// Approximate meters per degree of longitude around Nuremberg (49.45 N).
pub const DEFAULT_METERS_PER_DEG_LON: f64 = 72_300.0;

/// Approximate meters per degree of latitude.
pub const DEFAULT_METERS_PER_DEG_LAT: f64 = 111_320.0;

/// A geographic bounding box in degrees (x = longitude, y = latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Derive the target area around a center point.
    ///
    /// The box is `width_m` meters wide and keeps the aspect ratio of the
    /// `width_px` x `height_px` canvas. Degrees are approximated with fixed
    /// meters-per-degree factors, which is only accurate near the latitude
    /// they were chosen for.
    pub fn from_center(
        center_lat: f64,
        center_lon: f64,
        width_px: u32,
        height_px: u32,
        width_m: f64,
        meters_per_deg_lon: f64,
        meters_per_deg_lat: f64,
    ) -> Result<Self, BboxParseError> {
        if width_px == 0 || height_px == 0 {
            return Err(BboxParseError::Degenerate(format!(
                "canvas {}x{} has no area",
                width_px, height_px
            )));
        }
        if !(width_m > 0.0) || !width_m.is_finite() {
            return Err(BboxParseError::Degenerate(format!(
                "ground width {} must be positive",
                width_m
            )));
        }

        let half_width_deg = (width_m / 2.0) / meters_per_deg_lon;
        let height_m = width_m * (height_px as f64 / width_px as f64);
        let half_height_deg = (height_m / 2.0) / meters_per_deg_lat;

        Ok(Self {
            min_x: center_lon - half_width_deg,
            min_y: center_lat - half_height_deg,
            max_x: center_lon + half_width_deg,
            max_y: center_lat + half_height_deg,
        })
    }

    /// Parse a comma separated "minx,miny,maxx,maxy" string.
    pub fn from_bbox_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let parse = |p: &str| {
            p.parse::<f64>()
                .map_err(|_| BboxParseError::InvalidNumber(p.to_string()))
        };

        let bbox = Self {
            min_x: parse(parts[0])?,
            min_y: parse(parts[1])?,
            max_x: parse(parts[2])?,
            max_y: parse(parts[3])?,
        };

        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return Err(BboxParseError::Degenerate(s.to_string()));
        }

        Ok(bbox)
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center coordinate.
    pub fn center(&self) -> Coord {
        Coord {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    /// Check if this bbox intersects another. Touching edges count.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// The box as a closed polygon ring, counter-clockwise from the south-west corner.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(
            LineString::from(vec![
                (self.min_x, self.min_y),
                (self.max_x, self.min_y),
                (self.max_x, self.max_y),
                (self.min_x, self.max_y),
                (self.min_x, self.min_y),
            ]),
            Vec::new(),
        )
    }
}

impl From<geo_types::Rect> for BoundingBox {
    fn from(rect: geo_types::Rect) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),

    #[error("Degenerate BBOX: {0}")]
    Degenerate(String),
}

impl From<BboxParseError> for crate::MapError {
    fn from(err: BboxParseError) -> Self {
        crate::MapError::InvalidRequest(err.to_string())
    }
}
