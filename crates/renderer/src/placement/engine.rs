use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};
use tracing::{debug, warn};

use super::footprint::{Footprint, Rect};
use super::state::LayoutState;
use crate::icons::IconSource;
use crate::text::{clean_label, draw_shadowed_text, LabelPalette, TextExtent, TextShaper};

/// An icon to draw, optionally with the feature name below it.
#[derive(Debug, Clone, PartialEq)]
pub struct IconRequest {
    pub icon: String,
    /// Top-left corner of the icon before any offset.
    pub x: i32,
    pub y: i32,
    pub size: u32,
    /// Empty when the icon has no label.
    pub label: String,
}

/// A free-standing label: centered on `x`, baseline at `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRequest {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

/// A street name to draw along its projected center line.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetLabel {
    pub name: String,
    pub points: Vec<(f32, f32)>,
}

/// Outcome counts of one placement stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementStats {
    pub placed: usize,
    /// No candidate position was free.
    pub dropped: usize,
    /// Same street name already placed nearby.
    pub suppressed: usize,
    /// Icon could not be loaded.
    pub failed_assets: usize,
}

impl std::ops::AddAssign for PlacementStats {
    fn add_assign(&mut self, other: Self) {
        self.placed += other.placed;
        self.dropped += other.dropped;
        self.suppressed += other.suppressed;
        self.failed_assets += other.failed_assets;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Candidate shifts for icon + label pairs, tried in order.
    pub icon_offsets: Vec<(i32, i32)>,
    /// Candidate shifts for street labels, tried in order.
    pub street_offsets: Vec<(i32, i32)>,
    /// Gap between icon and label baseline as a fraction of the icon size.
    pub label_gap: f32,
    /// Vertical spacing for the above / below-corner point label candidates.
    pub label_spacing: f32,
    /// Horizontal spacing for the left / right point label candidates.
    pub side_spacing: f32,
    /// Same-name street labels closer than this (pixels) are suppressed.
    pub suppression_radius: f32,
    pub neutral: LabelPalette,
    pub water: LabelPalette,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            icon_offsets: vec![
                (0, 0),
                (4, 0),
                (-4, 0),
                (0, 4),
                (0, -4),
                (4, 4),
                (-4, -4),
                (6, 0),
                (0, 6),
            ],
            street_offsets: vec![
                (0, 0),
                (6, 0),
                (-6, 0),
                (0, 6),
                (0, -6),
                (6, 6),
                (-6, -6),
                (8, 0),
                (0, 8),
            ],
            label_gap: 0.8,
            label_spacing: 4.0,
            side_spacing: 5.0,
            suppression_radius: 200.0,
            neutral: LabelPalette::NEUTRAL,
            water: LabelPalette::WATER,
        }
    }
}

/// Greedy collision-aware placement of icons and labels.
///
/// Each request tries a fixed list of candidate positions and takes the
/// first one that overlaps nothing already placed. Requests without a free
/// candidate are dropped.
pub struct PlacementEngine<'a, S: TextShaper + ?Sized> {
    shaper: &'a S,
    config: &'a PlacementConfig,
    font_size: f32,
    icon_size: u32,
}

impl<'a, S: TextShaper + ?Sized> PlacementEngine<'a, S> {
    pub fn new(shaper: &'a S, config: &'a PlacementConfig, font_size: u32, icon_size: u32) -> Self {
        Self {
            shaper,
            config,
            font_size: font_size as f32,
            icon_size,
        }
    }

    fn measure(&self, text: &str) -> TextExtent {
        self.shaper.extent(text, self.font_size)
    }

    /// Draw icons with their labels underneath.
    pub fn place_icons(
        &self,
        pixmap: &mut Pixmap,
        state: &mut LayoutState,
        requests: &[IconRequest],
        icons: &dyn IconSource,
    ) -> PlacementStats {
        let mut stats = PlacementStats::default();
        let mut loaded: HashMap<&str, Option<Pixmap>> = HashMap::new();
        let padding = (self.icon_size as f32 * self.config.label_gap).floor();

        for request in requests {
            let image = loaded.entry(request.icon.as_str()).or_insert_with(|| {
                icons
                    .load(&request.icon)
                    .map_err(|e| warn!(icon = %request.icon, error = %e, "Skipping icon"))
                    .ok()
            });
            let Some(image) = image.as_ref() else {
                stats.failed_assets += 1;
                continue;
            };

            let label = clean_label(&request.label);
            let extent = (!label.is_empty()).then(|| self.measure(label));
            let size = request.size as f32;

            let mut placed = false;
            for &(dx, dy) in &self.config.icon_offsets {
                let x = (request.x + dx) as f32;
                let y = (request.y + dy) as f32;
                let icon_box = Rect::new(x, y, size, size);

                let center_x = x + size / 2.0;
                // The label box never reaches up into its own icon.
                let label_box = extent.map(|e| {
                    let top = y + size + (padding - e.ascent).max(0.0);
                    let b = Rect::new(center_x - e.width / 2.0, top, e.width, e.height);
                    (e, b, top + e.ascent)
                });

                if !state.is_free(&icon_box.into())
                    || label_box.is_some_and(|(_, b, _)| !state.is_free(&b.into()))
                {
                    continue;
                }

                draw_icon(pixmap, image, icon_box);
                state.icons.push(icon_box);
                if let Some((e, b, baseline)) = label_box {
                    draw_shadowed_text(
                        pixmap,
                        self.shaper,
                        label,
                        self.font_size,
                        Transform::from_translate(center_x - e.width / 2.0, baseline),
                        self.config.neutral,
                    );
                    state.labels.push(b);
                }
                placed = true;
                break;
            }

            if placed {
                stats.placed += 1;
            } else {
                stats.dropped += 1;
            }
        }

        debug!(
            stage = "icons",
            placed = stats.placed,
            dropped = stats.dropped,
            failed_assets = stats.failed_assets,
            "Icon placement finished"
        );
        stats
    }

    /// Draw free-standing labels around their anchors.
    pub fn place_labels(
        &self,
        pixmap: &mut Pixmap,
        state: &mut LayoutState,
        requests: &[LabelRequest],
        palette: LabelPalette,
    ) -> PlacementStats {
        let mut stats = PlacementStats::default();

        for request in requests {
            let text = clean_label(&request.text);
            if text.is_empty() {
                continue;
            }
            let e = self.measure(text);
            let (w, h) = (e.width, e.height);
            let spacing = self.config.label_spacing;
            let side = self.config.side_spacing;

            // below, above, left, right, bottom-left, bottom-right
            let candidates = [
                (0.0, 0.0),
                (0.0, -h - spacing),
                (-w / 2.0 - side, 0.0),
                (w / 2.0 + side, 0.0),
                (-w / 2.0, h / 2.0 + spacing),
                (w / 2.0, h / 2.0 + spacing),
            ];

            let found = candidates.iter().find_map(|&(ox, oy)| {
                let left = request.x as f32 + ox - w / 2.0;
                let baseline = request.y as f32 + oy;
                let footprint = Rect::new(left, baseline - h, w, h);
                state
                    .is_free(&footprint.into())
                    .then_some((footprint, left, baseline))
            });

            match found {
                Some((footprint, left, baseline)) => {
                    draw_shadowed_text(
                        pixmap,
                        self.shaper,
                        text,
                        self.font_size,
                        Transform::from_translate(left, baseline),
                        palette,
                    );
                    state.labels.push(footprint);
                    stats.placed += 1;
                }
                None => stats.dropped += 1,
            }
        }

        debug!(
            stage = "labels",
            placed = stats.placed,
            dropped = stats.dropped,
            "Label placement finished"
        );
        stats
    }

    /// Draw street names rotated along the middle of each street.
    pub fn place_street_labels(
        &self,
        pixmap: &mut Pixmap,
        state: &mut LayoutState,
        streets: &[StreetLabel],
        palette: LabelPalette,
    ) -> PlacementStats {
        let mut stats = PlacementStats::default();

        for street in streets {
            let Some((anchor, angle)) = street_anchor(&street.points) else {
                continue;
            };
            if street.name.is_empty() {
                continue;
            }
            if state.street_nearby(&street.name, anchor, self.config.suppression_radius) {
                stats.suppressed += 1;
                continue;
            }

            let e = self.measure(&street.name);
            let text_box = Rect::new(0.0, -e.ascent, e.width, e.height);
            let degrees = angle.to_degrees();

            let found = self.config.street_offsets.iter().find_map(|&(dx, dy)| {
                let position = (anchor.0 + dx as f32, anchor.1 + dy as f32);
                let transform = Transform::from_translate(position.0, position.1)
                    .pre_rotate(degrees)
                    .pre_translate(-e.width / 2.0, e.height / 3.0);
                let footprint = Footprint::transformed(text_box, transform);
                state
                    .is_free(&footprint)
                    .then_some((footprint, transform, position))
            });

            match found {
                Some((footprint, transform, position)) => {
                    draw_shadowed_text(
                        pixmap,
                        self.shaper,
                        &street.name,
                        self.font_size,
                        transform,
                        palette,
                    );
                    state.labels.push(footprint);
                    state.record_street(&street.name, position);
                    stats.placed += 1;
                }
                None => stats.dropped += 1,
            }
        }

        debug!(
            stage = "streets",
            placed = stats.placed,
            dropped = stats.dropped,
            suppressed = stats.suppressed,
            "Street label placement finished"
        );
        stats
    }
}

/// Middle vertex of a polyline and the reading angle (radians) of the line
/// around it. The angle is kept within +-90 degrees so text is never
/// upside down.
pub fn street_anchor(points: &[(f32, f32)]) -> Option<((f32, f32), f32)> {
    if points.len() < 2 {
        return None;
    }
    let mid = points.len() / 2;
    let a = points[mid.saturating_sub(1)];
    let b = points[(mid + 1).min(points.len() - 1)];

    let mut angle = (b.1 - a.1).atan2(b.0 - a.0);
    if angle > std::f32::consts::FRAC_PI_2 {
        angle -= std::f32::consts::PI;
    } else if angle < -std::f32::consts::FRAC_PI_2 {
        angle += std::f32::consts::PI;
    }
    Some((points[mid], angle))
}

/// Draw `image` scaled into `target`.
fn draw_icon(pixmap: &mut Pixmap, image: &Pixmap, target: Rect) {
    let sx = target.width / image.width() as f32;
    let sy = target.height / image.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(
        0,
        0,
        image.as_ref(),
        &paint,
        Transform::from_row(sx, 0.0, 0.0, sy, target.x, target.y),
        None,
    );
}
