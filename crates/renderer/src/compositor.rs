//! Painter's algorithm over every thematic pass.
//!
//! Passes only append to a [`DisplayList`]. Nothing is drawn until all of
//! them have run; the list is then ordered by descending area so large
//! features end up underneath the small ones they contain.

use map_common::{BoundingBox, Color, ColorPair, Feature, Geometry};
use tiny_skia::Pixmap;
use tracing::debug;

use crate::catalog::CategoryCatalog;
use crate::painter::GeometryPainter;
use crate::placement::IconRequest;

/// A feature with the style and buffer it is painted with.
#[derive(Debug, Clone)]
pub struct StyledDrawable {
    pub feature: Feature,
    pub style: ColorPair,
    /// Buffer in degrees for line geometry; 0 draws a plain stroke.
    pub inflate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    items: Vec<StyledDrawable>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: Feature, style: ColorPair, inflate: f64) {
        self.items.push(StyledDrawable {
            feature,
            style,
            inflate,
        });
    }

    /// Append all `features` with the same style.
    pub fn extend_styled(
        &mut self,
        features: impl IntoIterator<Item = Feature>,
        style: ColorPair,
        inflate: f64,
    ) {
        for feature in features {
            self.push(feature, style, inflate);
        }
    }

    pub fn append(&mut self, other: DisplayList) {
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyledDrawable> {
        self.items.iter()
    }

    /// Largest area first. The sort is stable, so equal areas keep the
    /// order they were pushed in.
    pub fn into_paint_order(self) -> Vec<StyledDrawable> {
        let mut items = self.items;
        items.sort_by(|a, b| b.feature.area.total_cmp(&a.feature.area));
        items
    }
}

/// Paints a display list and collects the icons its features ask for.
pub struct Compositor<'a> {
    painter: &'a GeometryPainter,
    catalog: &'a CategoryCatalog,
    icon_size: u32,
}

impl<'a> Compositor<'a> {
    pub fn new(painter: &'a GeometryPainter, catalog: &'a CategoryCatalog, icon_size: u32) -> Self {
        Self {
            painter,
            catalog,
            icon_size,
        }
    }

    /// Fill the whole target area with one color.
    pub fn paint_background(&self, pixmap: &mut Pixmap, target: &BoundingBox, color: Color) {
        let area = Geometry::Polygon(target.to_polygon());
        self.painter.paint_filled(pixmap, &area, color, color);
    }

    /// Sort and paint. Returns the icon requests in paint order.
    pub fn paint(&self, pixmap: &mut Pixmap, list: DisplayList) -> Vec<IconRequest> {
        let items = list.into_paint_order();
        let mut icons = Vec::new();
        let mut ops = 0usize;

        for item in &items {
            ops += self
                .painter
                .paint(pixmap, &item.feature.geometry, item.style, item.inflate);
            if let Some(request) = self.icon_request(&item.feature) {
                icons.push(request);
            }
        }

        debug!(
            drawables = items.len(),
            paint_ops = ops,
            icons = icons.len(),
            "Display list painted"
        );
        icons
    }

    /// Icon for a feature, centered on its centroid.
    pub fn icon_request(&self, feature: &Feature) -> Option<IconRequest> {
        let rule = self.catalog.icon_for(feature.codes.primary)?;
        let centroid = feature.geometry.centroid()?;
        let (x, y) = self.painter.projector().to_pixel(&centroid);
        let half = (self.icon_size / 2) as i32;
        Some(IconRequest {
            icon: rule.icon.clone(),
            x: x - half,
            y: y - half,
            size: self.icon_size,
            label: if rule.label {
                feature.name.clone()
            } else {
                String::new()
            },
        })
    }
}
