//! Text metrics, glyph outlines and label drawing.
//!
//! Labels are drawn as filled glyph outlines so that the same code path
//! handles horizontal point labels and rotated street labels. The
//! [`TextShaper`] trait hides where outlines come from: [`FontShaper`] reads
//! a TrueType font with rusttype, [`BoxShaper`] draws one box per character
//! and needs no font file.

use std::path::Path as FsPath;

use map_common::{Color, MapError, MapResult};
use rusttype::{point, Font, OutlineBuilder, Scale};
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Transform};

/// Size of a single line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    /// Advance width of the whole string.
    pub width: f32,
    /// Line height: ascent + descent + line gap.
    pub height: f32,
    /// Distance from the top of the line to the baseline.
    pub ascent: f32,
}

/// Source of text metrics and outlines.
pub trait TextShaper: Send + Sync {
    fn extent(&self, text: &str, size: f32) -> TextExtent;

    /// Outline of `text` with the left end of the baseline at the origin,
    /// Y pointing down. None for text without visible glyphs.
    fn outline(&self, text: &str, size: f32) -> Option<Path>;
}

/// Shaper backed by a TrueType font.
pub struct FontShaper {
    font: Font<'static>,
}

impl FontShaper {
    pub fn from_bytes(data: Vec<u8>) -> MapResult<Self> {
        let font = Font::try_from_vec(data)
            .ok_or_else(|| MapError::FontLoad("font data could not be parsed".to_string()))?;
        Ok(Self { font })
    }

    pub fn from_file(path: impl AsRef<FsPath>) -> MapResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| MapError::FontLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }
}

impl TextShaper for FontShaper {
    fn extent(&self, text: &str, size: f32) -> TextExtent {
        let scale = Scale::uniform(size);
        let v = self.font.v_metrics(scale);
        let width = self
            .font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        TextExtent {
            width,
            height: v.ascent - v.descent + v.line_gap,
            ascent: v.ascent,
        }
    }

    fn outline(&self, text: &str, size: f32) -> Option<Path> {
        let mut sink = GlyphSink {
            builder: PathBuilder::new(),
            origin_x: 0.0,
        };
        for glyph in self.font.layout(text, Scale::uniform(size), point(0.0, 0.0)) {
            // Scaled outlines are baseline-relative with Y down; only the
            // pen position has to be added.
            sink.origin_x = glyph.position().x;
            glyph.unpositioned().build_outline(&mut sink);
        }
        sink.builder.finish()
    }
}

/// Forwards rusttype outline callbacks into a tiny-skia path.
struct GlyphSink {
    builder: PathBuilder,
    origin_x: f32,
}

impl OutlineBuilder for GlyphSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(self.origin_x + x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(self.origin_x + x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder
            .quad_to(self.origin_x + x1, y1, self.origin_x + x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.origin_x + x1,
            y1,
            self.origin_x + x2,
            y2,
            self.origin_x + x,
            y,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Deterministic shaper with fixed-width box glyphs.
///
/// Every character advances `0.6 * size`; the line is `1.2 * size` high
/// with the baseline at `0.9 * size`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxShaper;

impl BoxShaper {
    const ADVANCE: f32 = 0.6;
    const HEIGHT: f32 = 1.2;
    const ASCENT: f32 = 0.9;
}

impl TextShaper for BoxShaper {
    fn extent(&self, text: &str, size: f32) -> TextExtent {
        TextExtent {
            width: text.chars().count() as f32 * Self::ADVANCE * size,
            height: Self::HEIGHT * size,
            ascent: Self::ASCENT * size,
        }
    }

    fn outline(&self, text: &str, size: f32) -> Option<Path> {
        let advance = Self::ADVANCE * size;
        let glyph_height = Self::ASCENT * size * 0.8;
        let mut pb = PathBuilder::new();
        for (i, _) in text.chars().enumerate().filter(|(_, c)| !c.is_whitespace()) {
            let x = i as f32 * advance + advance * 0.1;
            if let Some(rect) = Rect::from_xywh(x, -glyph_height, advance * 0.8, glyph_height) {
                pb.push_rect(rect);
            }
        }
        pb.finish()
    }
}

/// Shadow and foreground colors of a label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelPalette {
    pub shadow: Color,
    pub fill: Color,
}

impl LabelPalette {
    pub const NEUTRAL: LabelPalette = LabelPalette {
        shadow: Color::BLACK,
        fill: Color::WHITE,
    };

    pub const WATER: LabelPalette = LabelPalette {
        shadow: Color::rgb(90, 140, 200),
        fill: Color::rgb(200, 240, 255),
    };
}

/// Drop everything from the first underscore on: `"ZUFAHRT_4564485"` becomes
/// `"ZUFAHRT"`.
pub fn clean_label(name: &str) -> &str {
    match name.find('_') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Draw `text` with a one pixel drop shadow.
///
/// `transform` maps the text origin (left end of the baseline) to the
/// canvas. The shadow is offset in text space, so it follows rotation.
pub fn draw_shadowed_text<S: TextShaper + ?Sized>(
    pixmap: &mut Pixmap,
    shaper: &S,
    text: &str,
    size: f32,
    transform: Transform,
    palette: LabelPalette,
) {
    let Some(outline) = shaper.outline(text, size) else {
        return;
    };
    let shadow = transform.pre_translate(1.0, 1.0);
    pixmap.fill_path(&outline, &solid(palette.shadow), FillRule::Winding, shadow, None);
    pixmap.fill_path(&outline, &solid(palette.fill), FillRule::Winding, transform, None);
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}
