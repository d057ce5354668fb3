//! One complete render pass.
//!
//! Order: background, thematic passes, sort and paint, icons, point labels,
//! water labels, street labels. Canvas, display list and occupancy sets are
//! created per call, so one [`MapRenderer`] can serve parallel renders.

use std::time::Instant;

use map_common::{
    BoundingBox, Color, MapError, MapResult, DEFAULT_METERS_PER_DEG_LAT,
    DEFAULT_METERS_PER_DEG_LON,
};
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;
use tracing::info;

use crate::catalog::CategoryCatalog;
use crate::compositor::Compositor;
use crate::icons::IconSource;
use crate::painter::GeometryPainter;
use crate::placement::{LayoutState, PlacementConfig, PlacementEngine, PlacementStats};
use crate::projection::Projector;
use crate::scale::ScaleAdapter;
use crate::source::FeatureSource;
use crate::text::TextShaper;
use crate::themes::{default_themes, run_themes, ThemeSpec};

/// What to render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRequest {
    pub center_lat: f64,
    pub center_lon: f64,
    pub width_px: u32,
    pub height_px: u32,
    /// Ground width in meters; drives font and icon sizes.
    pub width_m: f64,
    pub target: BoundingBox,
}

impl MapRequest {
    /// Derive the target area from a center point and ground width.
    pub fn new(
        center_lat: f64,
        center_lon: f64,
        width_px: u32,
        height_px: u32,
        width_m: f64,
        config: &RenderConfig,
    ) -> MapResult<Self> {
        let target = BoundingBox::from_center(
            center_lat,
            center_lon,
            width_px,
            height_px,
            width_m,
            config.meters_per_deg_lon,
            config.meters_per_deg_lat,
        )?;
        Ok(Self {
            center_lat,
            center_lon,
            width_px,
            height_px,
            width_m,
            target,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub background: Color,
    pub scale: ScaleAdapter,
    pub placement: PlacementConfig,
    /// Buffer radius of point features in degrees.
    pub point_buffer: f64,
    /// Outline and open-line width in pixels.
    pub stroke_width: f32,
    pub meters_per_deg_lon: f64,
    pub meters_per_deg_lat: f64,
    /// Thematic passes in paint-list order.
    pub themes: Vec<ThemeSpec>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Color::rgba(66, 76, 71, 181),
            scale: ScaleAdapter::default(),
            placement: PlacementConfig::default(),
            point_buffer: 0.000001,
            stroke_width: 1.0,
            meters_per_deg_lon: DEFAULT_METERS_PER_DEG_LON,
            meters_per_deg_lat: DEFAULT_METERS_PER_DEG_LAT,
            themes: default_themes(),
        }
    }
}

/// Counters of one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    pub drawables: usize,
    /// Themes left out for configuration errors.
    pub themes_skipped: usize,
    pub font_size: u32,
    pub icon_size: u32,
    pub icons: PlacementStats,
    pub labels: PlacementStats,
    pub water_labels: PlacementStats,
    pub streets: PlacementStats,
}

/// A finished canvas.
pub struct RenderedMap {
    pub pixmap: Pixmap,
    pub stats: RenderStats,
    /// Footprints of every placed icon and label.
    pub layout: LayoutState,
}

impl RenderedMap {
    pub fn encode_png(&self) -> MapResult<Vec<u8>> {
        crate::png::encode_pixmap(&self.pixmap)
    }
}

pub struct MapRenderer {
    catalog: CategoryCatalog,
    config: RenderConfig,
}

impl MapRenderer {
    pub fn new(catalog: CategoryCatalog, config: RenderConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Check every theme against the catalog without rendering.
    pub fn validate(&self) -> MapResult<()> {
        self.catalog.validate()?;
        for theme in &self.config.themes {
            theme.validate(&self.catalog)?;
        }
        Ok(())
    }

    /// Build a request with this renderer's meters-per-degree constants.
    pub fn request(
        &self,
        center_lat: f64,
        center_lon: f64,
        width_px: u32,
        height_px: u32,
        width_m: f64,
    ) -> MapResult<MapRequest> {
        MapRequest::new(center_lat, center_lon, width_px, height_px, width_m, &self.config)
    }

    pub fn render<S: TextShaper + ?Sized>(
        &self,
        request: &MapRequest,
        source: &dyn FeatureSource,
        icons: &dyn IconSource,
        shaper: &S,
    ) -> MapResult<RenderedMap> {
        let start = Instant::now();
        info!(
            lat = request.center_lat,
            lon = request.center_lon,
            width = request.width_px,
            height = request.height_px,
            width_m = request.width_m,
            "Rendering map"
        );

        let projector = Projector::new(request.target, request.width_px, request.height_px)?;
        let mut pixmap = Pixmap::new(request.width_px, request.height_px).ok_or_else(|| {
            MapError::RenderError(format!(
                "cannot allocate {}x{} canvas",
                request.width_px, request.height_px
            ))
        })?;

        let mut stats = RenderStats {
            font_size: self.config.scale.font_size(request.width_m),
            icon_size: self.config.scale.icon_size(request.width_m),
            ..RenderStats::default()
        };

        let painter = GeometryPainter::new(
            projector,
            self.config.stroke_width,
            self.config.point_buffer,
        );
        let compositor = Compositor::new(&painter, &self.catalog, stats.icon_size);
        compositor.paint_background(&mut pixmap, &request.target, self.config.background);

        let themed = run_themes(&self.config.themes, &self.catalog, source, &projector)?;
        stats.drawables = themed.drawables.len();
        stats.themes_skipped = themed.skipped.len();
        let icon_requests = compositor.paint(&mut pixmap, themed.drawables);

        let placement = &self.config.placement;
        let engine = PlacementEngine::new(shaper, placement, stats.font_size, stats.icon_size);
        let mut layout = LayoutState::new();

        stats.icons = engine.place_icons(&mut pixmap, &mut layout, &icon_requests, icons);
        stats.labels =
            engine.place_labels(&mut pixmap, &mut layout, &themed.labels, placement.neutral);
        stats.water_labels =
            engine.place_labels(&mut pixmap, &mut layout, &themed.water_labels, placement.water);
        stats.streets =
            engine.place_street_labels(&mut pixmap, &mut layout, &themed.streets, placement.neutral);

        info!(
            drawables = stats.drawables,
            themes_skipped = stats.themes_skipped,
            icons = stats.icons.placed,
            labels = stats.labels.placed + stats.water_labels.placed,
            streets = stats.streets.placed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Map rendered"
        );
        Ok(RenderedMap {
            pixmap,
            stats,
            layout,
        })
    }
}
