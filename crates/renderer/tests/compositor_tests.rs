//! Tests for painter's-algorithm compositing and icon collection.

use map_common::{Color, ColorPair};
use renderer::catalog::{CategoryCatalog, CodeRange};
use renderer::compositor::{Compositor, DisplayList};
use renderer::painter::GeometryPainter;
use renderer::projection::Projector;
use test_utils::{bbox, bbox_from, codes, square_feature, square_grid};
use tiny_skia::Pixmap;

fn painter() -> GeometryPainter {
    let projector = Projector::new(bbox_from(bbox::HUNDRED), 100, 100).unwrap();
    GeometryPainter::new(projector, 1.0, 0.000001)
}

fn solid(r: u8, g: u8, b: u8) -> ColorPair {
    let c = Color::rgb(r, g, b);
    ColorPair::new(c, c)
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_sorted_list_is_non_increasing() {
    let mut list = DisplayList::new();
    list.extend_styled(
        square_grid(25, &bbox_from(bbox::HUNDRED), &[1]),
        solid(0, 0, 0),
        0.0,
    );
    let areas: Vec<f64> = list
        .into_paint_order()
        .iter()
        .map(|d| d.feature.area)
        .collect();
    assert!(areas.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_equal_areas_keep_insertion_order() {
    let mut list = DisplayList::new();
    for id in [7, 3, 5] {
        list.push(square_feature(id, codes(1), 50.0, 50.0, 5.0), solid(0, 0, 0), 0.0);
    }
    let ids: Vec<i64> = list
        .into_paint_order()
        .iter()
        .map(|d| d.feature.id)
        .collect();
    assert_eq!(ids, vec![7, 3, 5]);
}

#[test]
fn test_large_polygon_painted_before_small() {
    let small_half = 500f64.sqrt() / 2.0;
    let small = square_feature(1, codes(1), 50.0, 50.0, small_half);
    let large = square_feature(2, codes(1), 50.0, 50.0, 50.0);
    assert!((small.area - 500.0).abs() < 1e-6);
    assert!((large.area - 10_000.0).abs() < 1e-6);

    // Pushed small first; the large one must still end up underneath.
    let mut list = DisplayList::new();
    list.push(small, solid(0, 0, 255), 0.0);
    list.push(large, solid(255, 0, 0), 0.0);

    let painter = painter();
    let catalog = CategoryCatalog::default();
    let compositor = Compositor::new(&painter, &catalog, 20);
    let mut pixmap = Pixmap::new(100, 100).unwrap();
    compositor.paint(&mut pixmap, list);

    let center = pixmap.pixel(50, 50).unwrap();
    assert_eq!((center.red(), center.blue()), (0, 255));
    let edge = pixmap.pixel(5, 5).unwrap();
    assert_eq!((edge.red(), edge.blue()), (255, 0));
}

// ============================================================================
// Background and icons
// ============================================================================

#[test]
fn test_background_covers_canvas() {
    let painter = painter();
    let catalog = CategoryCatalog::default();
    let compositor = Compositor::new(&painter, &catalog, 20);
    let mut pixmap = Pixmap::new(100, 100).unwrap();
    compositor.paint_background(&mut pixmap, &bbox_from(bbox::HUNDRED), Color::rgba(66, 76, 71, 181));

    assert_eq!(pixmap.pixel(50, 50).unwrap().alpha(), 181);
    assert_eq!(pixmap.pixel(1, 98).unwrap().alpha(), 181);
}

#[test]
fn test_icon_requests_follow_rules() {
    let catalog = CategoryCatalog::default()
        .with_icon("castle", true, vec![CodeRange::single(93310000)])
        .with_icon("taxi", false, vec![CodeRange::single(32115000)]);

    let mut castle = square_feature(1, codes(93310000), 50.0, 50.0, 10.0);
    castle.name = "Kaiserburg".to_string();
    let taxi = square_feature(2, codes(32115000), 20.0, 80.0, 2.0);
    let plain = square_feature(3, codes(1), 70.0, 30.0, 5.0);

    let mut list = DisplayList::new();
    for f in [castle, taxi, plain] {
        list.push(f, solid(1, 2, 3), 0.0);
    }

    let painter = painter();
    let compositor = Compositor::new(&painter, &catalog, 20);
    let mut pixmap = Pixmap::new(100, 100).unwrap();
    let requests = compositor.paint(&mut pixmap, list);

    assert_eq!(requests.len(), 2);
    // Paint order: the castle is larger.
    assert_eq!(requests[0].icon, "castle");
    assert_eq!((requests[0].x, requests[0].y), (40, 40));
    assert_eq!(requests[0].size, 20);
    assert_eq!(requests[0].label, "Kaiserburg");

    assert_eq!(requests[1].icon, "taxi");
    assert_eq!((requests[1].x, requests[1].y), (10, 10));
    assert!(requests[1].label.is_empty());
}
