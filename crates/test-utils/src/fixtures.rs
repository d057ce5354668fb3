//! Common feature fixtures.
//!
//! Coordinates are degrees (x = longitude, y = latitude). Most tests work in
//! the unit-ish boxes below, where projection arithmetic stays exact.

use map_common::{BoundingBox, ClassCodes, Feature, Geometry, LineString, Point, Polygon};

/// Canned bounding boxes.
pub mod bbox {
    /// Nuremberg old town, the reference area of the renderer.
    pub const NUREMBERG: (f64, f64, f64, f64) = (11.074, 49.443, 11.091, 49.448);

    /// A 100 x 100 degree box; with a 100 x 100 canvas one degree is one
    /// pixel.
    pub const HUNDRED: (f64, f64, f64, f64) = (0.0, 0.0, 100.0, 100.0);

    /// Unit box.
    pub const UNIT: (f64, f64, f64, f64) = (0.0, 0.0, 1.0, 1.0);
}

/// Reference center used by the scale adapter examples.
pub const NUREMBERG_CENTER: (f64, f64) = (49.445555, 11.082587);

/// Turn a canned tuple into a bounding box.
pub fn bbox_from(t: (f64, f64, f64, f64)) -> BoundingBox {
    BoundingBox::new(t.0, t.1, t.2, t.3)
}

/// Codes with only the primary set.
pub fn codes(primary: i64) -> ClassCodes {
    ClassCodes::new(primary, 0, 0)
}

/// Closed square ring centered on `(cx, cy)`.
pub fn square_ring(cx: f64, cy: f64, half: f64) -> LineString {
    LineString::from(vec![
        (cx - half, cy - half),
        (cx + half, cy - half),
        (cx + half, cy + half),
        (cx - half, cy + half),
        (cx - half, cy - half),
    ])
}

/// Axis-aligned square polygon feature.
pub fn square_feature(id: i64, codes: ClassCodes, cx: f64, cy: f64, half: f64) -> Feature {
    let polygon = Polygon::new(square_ring(cx, cy, half), Vec::new());
    Feature::new(id, format!("square-{}", id), codes, Geometry::Polygon(polygon))
}

/// Square with a square hole of `hole_half`.
pub fn donut_feature(id: i64, codes: ClassCodes, cx: f64, cy: f64, half: f64, hole_half: f64) -> Feature {
    let polygon = Polygon::new(
        square_ring(cx, cy, half),
        vec![square_ring(cx, cy, hole_half)],
    );
    Feature::new(id, format!("donut-{}", id), codes, Geometry::Polygon(polygon))
}

/// Line string feature through `points`.
pub fn line_feature(id: i64, name: &str, codes: ClassCodes, points: &[(f64, f64)]) -> Feature {
    let line = LineString::from(points.to_vec());
    Feature::new(id, name, codes, Geometry::LineString(line))
}

/// Point feature.
pub fn point_feature(id: i64, name: &str, codes: ClassCodes, x: f64, y: f64) -> Feature {
    Feature::new(id, name, codes, Geometry::Point(Point::new(x, y)))
}

/// Feature ids in order, for comparing partitions.
pub fn ids(features: &[Feature]) -> Vec<i64> {
    features.iter().map(|f| f.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_feature_area() {
        let f = square_feature(1, codes(10), 5.0, 5.0, 2.0);
        assert!((f.area - 16.0).abs() < 1e-9);
        assert_eq!(f.geometry_type, "POLYGON");
    }

    #[test]
    fn test_donut_area_subtracts_hole() {
        let f = donut_feature(1, codes(10), 5.0, 5.0, 2.0, 1.0);
        assert!((f.area - 12.0).abs() < 1e-9);
    }
}
