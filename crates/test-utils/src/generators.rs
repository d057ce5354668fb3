//! Deterministic feature pools.
//!
//! Pools are laid out on fixed grids so that tests and benches can predict
//! positions, areas and code assignments without randomness.

use map_common::{BoundingBox, ClassCodes, Feature};

use crate::fixtures::{line_feature, point_feature, square_feature};

/// `count` squares spread over `bbox` on a square grid.
///
/// Primary codes cycle through `codes`; square `i` gets `codes[i % len]`.
/// Sizes cycle through three steps so paint order is not the insertion
/// order.
pub fn square_grid(count: usize, bbox: &BoundingBox, codes: &[i64]) -> Vec<Feature> {
    let side = (count as f64).sqrt().ceil().max(1.0) as usize;
    let cell_w = bbox.width() / side as f64;
    let cell_h = bbox.height() / side as f64;
    let cell = cell_w.min(cell_h);

    (0..count)
        .map(|i| {
            let col = i % side;
            let row = i / side;
            let cx = bbox.min_x + (col as f64 + 0.5) * cell_w;
            let cy = bbox.min_y + (row as f64 + 0.5) * cell_h;
            let half = cell * (0.15 + 0.1 * (i % 3) as f64);
            let code = codes.get(i % codes.len().max(1)).copied().unwrap_or(0);
            square_feature(i as i64, ClassCodes::new(code, 0, 0), cx, cy, half)
        })
        .collect()
}

/// Horizontal streets, one per row, named `Street <n>`.
pub fn street_rows(count: usize, bbox: &BoundingBox, code: i64) -> Vec<Feature> {
    let step = bbox.height() / (count + 1) as f64;
    (0..count)
        .map(|i| {
            let y = bbox.min_y + step * (i + 1) as f64;
            let points = [
                (bbox.min_x, y),
                (bbox.min_x + bbox.width() * 0.5, y),
                (bbox.max_x, y),
            ];
            line_feature(
                10_000 + i as i64,
                &format!("Street {}", i),
                ClassCodes::new(code, 0, 0),
                &points,
            )
        })
        .collect()
}

/// Named points on a grid, one per cell.
pub fn point_grid(count: usize, bbox: &BoundingBox, code: i64) -> Vec<Feature> {
    let side = (count as f64).sqrt().ceil().max(1.0) as usize;
    let cell_w = bbox.width() / side as f64;
    let cell_h = bbox.height() / side as f64;
    (0..count)
        .map(|i| {
            let x = bbox.min_x + ((i % side) as f64 + 0.5) * cell_w;
            let y = bbox.min_y + ((i / side) as f64 + 0.5) * cell_h;
            point_feature(
                20_000 + i as i64,
                &format!("Poi {}", i),
                ClassCodes::new(code, 0, 0),
                x,
                y,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{bbox, bbox_from};

    #[test]
    fn test_square_grid_is_deterministic() {
        let b = bbox_from(bbox::HUNDRED);
        let a = square_grid(9, &b, &[1, 2]);
        let c = square_grid(9, &b, &[1, 2]);
        assert_eq!(a, c);
        assert_eq!(a.len(), 9);
        assert_eq!(a[0].codes.primary, 1);
        assert_eq!(a[1].codes.primary, 2);
    }

    #[test]
    fn test_square_grid_stays_inside() {
        let b = bbox_from(bbox::HUNDRED);
        for f in square_grid(16, &b, &[1]) {
            let env = f.geometry.envelope().unwrap();
            assert!(env.min_x >= b.min_x && env.max_x <= b.max_x);
            assert!(env.min_y >= b.min_y && env.max_y <= b.max_y);
        }
    }

    #[test]
    fn test_street_rows_names() {
        let b = bbox_from(bbox::HUNDRED);
        let streets = street_rows(3, &b, 5);
        assert_eq!(streets[2].name, "Street 2");
        assert_eq!(streets[0].geometry_type, "LINESTRING");
    }
}
