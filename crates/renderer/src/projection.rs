//! Linear projection from a geographic envelope onto the canvas.
//!
//! X grows east, Y is flipped so that north is up. The same projector is
//! used for painting and for anchoring icons and labels.

use map_common::{BoundingBox, Coord, MapError, MapResult};
use tiny_skia::Transform;

#[derive(Debug, Clone, Copy)]
pub struct Projector {
    bbox: BoundingBox,
    width: u32,
    height: u32,
    scale_x: f64,
    scale_y: f64,
}

impl Projector {
    pub fn new(bbox: BoundingBox, width: u32, height: u32) -> MapResult<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidRequest(format!(
                "canvas {}x{} has no area",
                width, height
            )));
        }
        if !(bbox.width() > 0.0 && bbox.height() > 0.0) {
            return Err(MapError::InvalidRequest(format!(
                "envelope {:?} has no area",
                bbox
            )));
        }
        Ok(Self {
            bbox,
            width,
            height,
            scale_x: width as f64 / bbox.width(),
            scale_y: height as f64 / bbox.height(),
        })
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels per degree of longitude.
    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    /// Pixels per degree of latitude.
    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn project_x(&self, lon: f64) -> f32 {
        ((lon - self.bbox.min_x) * self.scale_x) as f32
    }

    pub fn project_y(&self, lat: f64) -> f32 {
        (self.height as f64 - (lat - self.bbox.min_y) * self.scale_y) as f32
    }

    pub fn project(&self, c: &Coord) -> (f32, f32) {
        (self.project_x(c.x), self.project_y(c.y))
    }

    /// Whole-pixel position, rounding each axis before the flip.
    pub fn to_pixel(&self, c: &Coord) -> (i32, i32) {
        let x = ((c.x - self.bbox.min_x) * self.scale_x).round() as i32;
        let y = self.height as i32 - ((c.y - self.bbox.min_y) * self.scale_y).round() as i32;
        (x, y)
    }

    /// Map a coordinate into the isotropic frame used for buffering.
    ///
    /// Both axes are scaled by the X scale so that circles in degree space
    /// stay circles; [`Projector::isotropic_to_canvas`] restores the Y scale.
    pub fn to_isotropic(&self, c: &Coord) -> (f32, f32) {
        (
            ((c.x - self.bbox.min_x) * self.scale_x) as f32,
            ((c.y - self.bbox.min_y) * self.scale_x) as f32,
        )
    }

    pub fn isotropic_to_canvas(&self) -> Transform {
        let ratio = (self.scale_y / self.scale_x) as f32;
        Transform::from_row(1.0, 0.0, 0.0, -ratio, 0.0, self.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> Projector {
        Projector::new(BoundingBox::new(10.0, 40.0, 20.0, 45.0), 1000, 500).unwrap()
    }

    #[test]
    fn test_corners() {
        let p = projector();
        assert_eq!(p.to_pixel(&Coord { x: 10.0, y: 45.0 }), (0, 0));
        assert_eq!(p.to_pixel(&Coord { x: 20.0, y: 40.0 }), (1000, 500));
        assert_eq!(p.project(&Coord { x: 15.0, y: 42.5 }), (500.0, 250.0));
    }

    #[test]
    fn test_isotropic_round_trip() {
        let p = projector();
        let c = Coord { x: 12.5, y: 41.0 };
        let (ix, iy) = p.to_isotropic(&c);
        let mut pt = [tiny_skia::Point::from_xy(ix, iy)];
        p.isotropic_to_canvas().map_points(&mut pt);
        let (px, py) = p.project(&c);
        assert!((pt[0].x - px).abs() < 1e-3);
        assert!((pt[0].y - py).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_envelope_rejected() {
        assert!(Projector::new(BoundingBox::new(1.0, 1.0, 1.0, 2.0), 10, 10).is_err());
        assert!(Projector::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0, 10).is_err());
    }
}
