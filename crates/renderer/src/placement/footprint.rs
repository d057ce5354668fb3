//! Screen-space footprints of placed icons and labels.
//!
//! A footprint is either an axis-aligned rectangle or a convex quadrilateral
//! (a rectangle under rotation). Touching edges do not count as overlap.

use tiny_skia::{Point, Transform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Interiors overlap. Empty rectangles never intersect anything.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Corners clockwise from the top-left (Y down).
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::from_xy(self.x, self.y),
            Point::from_xy(self.right(), self.y),
            Point::from_xy(self.right(), self.bottom()),
            Point::from_xy(self.x, self.bottom()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Footprint {
    Rect(Rect),
    Quad([Point; 4]),
}

impl Footprint {
    /// The rectangle mapped through `transform`.
    pub fn transformed(rect: Rect, transform: Transform) -> Self {
        let mut corners = rect.corners();
        transform.map_points(&mut corners);
        Footprint::Quad(corners)
    }

    pub fn corners(&self) -> [Point; 4] {
        match self {
            Footprint::Rect(r) => r.corners(),
            Footprint::Quad(q) => *q,
        }
    }

    /// Axis-aligned bounds.
    pub fn bounds(&self) -> Rect {
        let corners = self.corners();
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in &corners {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn intersects(&self, other: &Footprint) -> bool {
        if let (Footprint::Rect(a), Footprint::Rect(b)) = (self, other) {
            return a.intersects(b);
        }
        if !self.bounds().intersects(&other.bounds()) {
            return false;
        }
        let (a, b) = (self.corners(), other.corners());
        !has_separating_axis(&a, &b) && !has_separating_axis(&b, &a)
    }
}

impl From<Rect> for Footprint {
    fn from(r: Rect) -> Self {
        Footprint::Rect(r)
    }
}

/// Whether one of `a`'s edge normals separates the two convex polygons.
fn has_separating_axis(a: &[Point; 4], b: &[Point; 4]) -> bool {
    for i in 0..a.len() {
        let p = a[i];
        let q = a[(i + 1) % a.len()];
        let axis = (q.y - p.y, p.x - q.x);
        if axis.0 == 0.0 && axis.1 == 0.0 {
            continue;
        }
        let (a_min, a_max) = project(a, axis);
        let (b_min, b_max) = project(b, axis);
        if a_max <= b_min || b_max <= a_min {
            return true;
        }
    }
    false
}

fn project(points: &[Point; 4], axis: (f32, f32)) -> (f32, f32) {
    points
        .iter()
        .map(|p| p.x * axis.0 + p.y * axis.1)
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9.0, 9.0, 5.0, 5.0)));
    }

    #[test]
    fn test_empty_rect_never_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&Rect::new(5.0, 5.0, 0.0, 3.0)));
    }

    #[test]
    fn test_rotated_quad_misses_corner_box() {
        // A 45 degree diamond around (10, 10); its bounds overlap the box
        // near the corner but the shapes do not.
        let diamond = Footprint::transformed(
            Rect::new(-5.0, -5.0, 10.0, 10.0),
            Transform::from_translate(10.0, 10.0).pre_rotate(45.0),
        );
        let corner = Footprint::Rect(Rect::new(15.5, 15.5, 3.0, 3.0));
        assert!(diamond.bounds().intersects(&Rect::new(15.5, 15.5, 3.0, 3.0)));
        assert!(!diamond.intersects(&corner));

        let center = Footprint::Rect(Rect::new(9.0, 9.0, 2.0, 2.0));
        assert!(diamond.intersects(&center));
        assert!(center.intersects(&diamond));
    }
}
