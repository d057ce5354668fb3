//! Geometry rasterization onto the canvas.
//!
//! Painting happens in two steps: [`GeometryPainter::plan`] turns a geometry
//! and its style into [`PaintOp`]s, and [`GeometryPainter::execute`] draws
//! them. Keeping the policy in `plan` lets it be checked without pixels.
//!
//! Policy per geometry kind:
//! - polygons are filled, then outlined
//! - lines are buffered into an area when `inflate > 0`, otherwise stroked
//! - points are always buffered by a small fixed radius
//! - collections are not drawn

use map_common::{Color, ColorPair, Coord, Geometry, LineString, Polygon};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};
use tracing::warn;

use crate::projection::Projector;

/// A single drawing instruction in canvas pixels.
#[derive(Debug, Clone)]
pub enum PaintOp {
    /// Fill the area, then trace its outline with `stroke`.
    Fill {
        path: Path,
        fill: Color,
        stroke: Color,
        rule: FillRule,
    },
    /// Trace an open path.
    Stroke { path: Path, color: Color },
}

impl PaintOp {
    pub fn path(&self) -> &Path {
        match self {
            PaintOp::Fill { path, .. } | PaintOp::Stroke { path, .. } => path,
        }
    }
}

pub struct GeometryPainter {
    projector: Projector,
    stroke_width: f32,
    point_buffer: f64,
}

impl GeometryPainter {
    pub fn new(projector: Projector, stroke_width: f32, point_buffer: f64) -> Self {
        Self {
            projector,
            stroke_width,
            point_buffer,
        }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Decide how a geometry is drawn with `style` and buffer `inflate`
    /// (degrees).
    pub fn plan(&self, geometry: &Geometry, style: ColorPair, inflate: f64) -> Vec<PaintOp> {
        let mut ops = Vec::new();
        match geometry {
            Geometry::Polygon(p) => ops.extend(self.polygon_op(p, style)),
            Geometry::MultiPolygon(ps) => {
                ops.extend(ps.iter().filter_map(|p| self.polygon_op(p, style)));
            }
            Geometry::LineString(line) => {
                ops.extend(self.line_op(std::slice::from_ref(line), style, inflate));
            }
            Geometry::MultiLineString(lines) => ops.extend(self.line_op(&lines.0, style, inflate)),
            Geometry::Point(p) => ops.extend(self.point_op(&p.0, style)),
            Geometry::MultiPoint(ps) => {
                ops.extend(ps.iter().filter_map(|p| self.point_op(&p.0, style)));
            }
            Geometry::GeometryCollection(_) => {
                warn!(kind = %geometry.kind(), "Geometry kind is not supported, skipping");
            }
        }
        ops
    }

    /// Plan and draw. Returns the number of operations executed.
    pub fn paint(&self, pixmap: &mut Pixmap, geometry: &Geometry, style: ColorPair, inflate: f64) -> usize {
        let ops = self.plan(geometry, style, inflate);
        for op in &ops {
            self.execute(pixmap, op);
        }
        ops.len()
    }

    /// Fill the areal parts of a geometry and outline them.
    pub fn paint_filled(&self, pixmap: &mut Pixmap, geometry: &Geometry, fill: Color, stroke: Color) {
        let style = ColorPair::new(fill, stroke);
        let polygons: Vec<&Polygon> = match geometry {
            Geometry::Polygon(p) => vec![p],
            Geometry::MultiPolygon(ps) => ps.iter().collect(),
            _ => Vec::new(),
        };
        for op in polygons.into_iter().filter_map(|p| self.polygon_op(p, style)) {
            self.execute(pixmap, &op);
        }
    }

    /// Trace the lines of a geometry without filling.
    pub fn paint_stroke(&self, pixmap: &mut Pixmap, geometry: &Geometry, color: Color) {
        let style = ColorPair::new(color, color);
        let op = match geometry {
            Geometry::LineString(line) => self.line_op(std::slice::from_ref(line), style, 0.0),
            Geometry::MultiLineString(lines) => self.line_op(&lines.0, style, 0.0),
            _ => None,
        };
        if let Some(op) = op {
            self.execute(pixmap, &op);
        }
    }

    pub fn execute(&self, pixmap: &mut Pixmap, op: &PaintOp) {
        let mut stroke = Stroke::default();
        stroke.width = self.stroke_width;

        match op {
            PaintOp::Fill {
                path,
                fill,
                stroke: border,
                rule,
            } => {
                pixmap.fill_path(path, &paint_for(*fill), *rule, Transform::identity(), None);
                pixmap.stroke_path(path, &paint_for(*border), &stroke, Transform::identity(), None);
            }
            PaintOp::Stroke { path, color } => {
                pixmap.stroke_path(path, &paint_for(*color), &stroke, Transform::identity(), None);
            }
        }
    }

    fn polygon_op(&self, polygon: &Polygon, style: ColorPair) -> Option<PaintOp> {
        let mut pb = PathBuilder::new();
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            self.trace(&mut pb, &ring.0, true);
        }
        Some(PaintOp::Fill {
            path: pb.finish()?,
            fill: style.fill,
            stroke: style.stroke,
            rule: FillRule::EvenOdd,
        })
    }

    fn line_op(&self, lines: &[LineString], style: ColorPair, inflate: f64) -> Option<PaintOp> {
        if inflate > 0.0 {
            let path = self.buffer_lines(lines, inflate)?;
            return Some(PaintOp::Fill {
                path,
                fill: style.fill,
                stroke: style.fill,
                rule: FillRule::Winding,
            });
        }

        let mut pb = PathBuilder::new();
        for line in lines {
            self.trace(&mut pb, &line.0, false);
        }
        Some(PaintOp::Stroke {
            path: pb.finish()?,
            color: style.stroke,
        })
    }

    fn point_op(&self, c: &Coord, style: ColorPair) -> Option<PaintOp> {
        let (x, y) = self.projector.to_isotropic(c);
        let radius = (self.point_buffer * self.projector.scale_x()) as f32;
        let path = PathBuilder::from_circle(x, y, radius)?
            .transform(self.projector.isotropic_to_canvas())?;
        Some(PaintOp::Fill {
            path,
            fill: style.fill,
            stroke: style.stroke,
            rule: FillRule::Winding,
        })
    }

    /// Outline of the lines grown by `inflate` degrees on every side.
    fn buffer_lines(&self, lines: &[LineString], inflate: f64) -> Option<Path> {
        let mut pb = PathBuilder::new();
        for line in lines.iter().map(|l| l.0.as_slice()).filter(|l| !l.is_empty()) {
            let (x, y) = self.projector.to_isotropic(&line[0]);
            pb.move_to(x, y);
            if line.len() == 1 {
                // A zero-length segment still gets round caps.
                pb.line_to(x, y);
            }
            for c in &line[1..] {
                let (x, y) = self.projector.to_isotropic(c);
                pb.line_to(x, y);
            }
        }
        let centerline = pb.finish()?;

        let mut stroke = Stroke::default();
        stroke.width = (2.0 * inflate * self.projector.scale_x()) as f32;
        stroke.line_cap = LineCap::Round;
        stroke.line_join = LineJoin::Round;

        centerline
            .stroke(&stroke, 1.0)?
            .transform(self.projector.isotropic_to_canvas())
    }

    fn trace(&self, pb: &mut PathBuilder, coords: &[Coord], close: bool) {
        let mut iter = coords.iter();
        let Some(first) = iter.next() else {
            return;
        };
        let (x, y) = self.projector.project(first);
        pb.move_to(x, y);
        for c in iter {
            let (x, y) = self.projector.project(c);
            pb.line_to(x, y);
        }
        if close {
            pb.close();
        }
    }
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::{BoundingBox, Point};

    fn painter() -> GeometryPainter {
        let projector = Projector::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 100, 100).unwrap();
        GeometryPainter::new(projector, 1.0, 0.000001)
    }

    fn style() -> ColorPair {
        ColorPair::new(Color::rgb(10, 20, 30), Color::rgb(200, 100, 50))
    }

    #[test]
    fn test_polygon_with_hole_is_even_odd() {
        let outer = BoundingBox::new(0.1, 0.1, 0.9, 0.9).to_polygon();
        let hole = BoundingBox::new(0.4, 0.4, 0.6, 0.6).to_polygon();
        let polygon = Polygon::new(outer.exterior().clone(), vec![hole.exterior().clone()]);
        let ops = painter().plan(&Geometry::Polygon(polygon), style(), 0.0);
        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], PaintOp::Fill { rule: FillRule::EvenOdd, .. }));
    }

    #[test]
    fn test_buffered_line_bounds_grow_by_inflate() {
        let line = Geometry::LineString(LineString::from(vec![(0.2, 0.5), (0.8, 0.5)]));
        let ops = painter().plan(&line, style(), 0.05);
        let bounds = ops[0].path().bounds();
        // 0.05 degrees at 100 px per degree is 5 px on every side.
        assert!((bounds.left() - 15.0).abs() < 1.0);
        assert!((bounds.right() - 85.0).abs() < 1.0);
        assert!((bounds.top() - 45.0).abs() < 1.0);
        assert!((bounds.bottom() - 55.0).abs() < 1.0);
    }

    #[test]
    fn test_collection_produces_no_ops() {
        let g = Geometry::GeometryCollection(vec![Geometry::Point(Point::new(0.5, 0.5))]);
        assert!(painter().plan(&g, style(), 0.0).is_empty());
    }
}
