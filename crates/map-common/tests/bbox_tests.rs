//! Tests for BoundingBox construction and queries.

use map_common::bbox::{
    BboxParseError, BoundingBox, DEFAULT_METERS_PER_DEG_LAT, DEFAULT_METERS_PER_DEG_LON,
};
use map_common::{Geometry, MapError};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(11.0, 49.0, 12.0, 50.0);
    assert_eq!(bbox.min_x, 11.0);
    assert_eq!(bbox.min_y, 49.0);
    assert_eq!(bbox.max_x, 12.0);
    assert_eq!(bbox.max_y, 50.0);
}

// ============================================================================
// from_center tests
// ============================================================================

#[test]
fn test_from_center_square_canvas() {
    let bbox = BoundingBox::from_center(
        49.0,
        11.0,
        500,
        500,
        723.0,
        DEFAULT_METERS_PER_DEG_LON,
        DEFAULT_METERS_PER_DEG_LAT,
    )
    .unwrap();

    assert!((bbox.width() - 0.01).abs() < 1e-12);
    assert!((bbox.height() - 723.0 / DEFAULT_METERS_PER_DEG_LAT).abs() < 1e-12);
}

#[test]
fn test_from_center_zero_canvas_rejected() {
    let result = BoundingBox::from_center(49.0, 11.0, 0, 512, 1000.0, 72_300.0, 111_320.0);
    assert!(matches!(result, Err(BboxParseError::Degenerate(_))));
}

#[test]
fn test_from_center_negative_width_rejected() {
    let result = BoundingBox::from_center(49.0, 11.0, 512, 512, -5.0, 72_300.0, 111_320.0);
    assert!(result.is_err());

    let result = BoundingBox::from_center(49.0, 11.0, 512, 512, f64::NAN, 72_300.0, 111_320.0);
    assert!(result.is_err());
}

// ============================================================================
// from_bbox_string tests
// ============================================================================

#[test]
fn test_parse_bbox_with_spaces() {
    let bbox = BoundingBox::from_bbox_string(" 11.0 , 49.0 , 11.5 , 49.5 ").unwrap();
    assert_eq!(bbox, BoundingBox::new(11.0, 49.0, 11.5, 49.5));
}

#[test]
fn test_parse_bbox_wrong_arity() {
    let result = BoundingBox::from_bbox_string("1,2,3");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_bbox_bad_number() {
    let result = BoundingBox::from_bbox_string("1,2,x,4");
    assert!(matches!(result, Err(BboxParseError::InvalidNumber(_))));
}

#[test]
fn test_parse_bbox_inverted_is_degenerate() {
    let result = BoundingBox::from_bbox_string("10,0,0,10");
    assert!(matches!(result, Err(BboxParseError::Degenerate(_))));
}

#[test]
fn test_parse_error_maps_to_invalid_request() {
    let err: MapError = BoundingBox::from_bbox_string("nope").unwrap_err().into();
    assert!(matches!(err, MapError::InvalidRequest(_)));
}

// ============================================================================
// Query tests
// ============================================================================

#[test]
fn test_union() {
    let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    let b = BoundingBox::new(2.0, -1.0, 3.0, 0.5);
    assert_eq!(a.union(&b), BoundingBox::new(0.0, -1.0, 3.0, 1.0));
}

#[test]
fn test_contains_point_edges() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(0.0, 0.0));
    assert!(bbox.contains_point(10.0, 10.0));
    assert!(!bbox.contains_point(10.1, 5.0));
}

#[test]
fn test_to_polygon_area_matches_extent() {
    let bbox = BoundingBox::new(0.0, 0.0, 4.0, 2.0);
    let polygon = bbox.to_polygon();
    assert_eq!(polygon.exterior().0.len(), 5);
    assert!((Geometry::Polygon(polygon).area() - 8.0).abs() < 1e-12);
}
