//! Icon assets.
//!
//! Icons are looked up by name. A failing lookup is recoverable: the
//! placement engine skips that icon and keeps going.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use map_common::{MapError, MapResult};
use tiny_skia::{ColorU8, Pixmap};

/// Source of icon images.
pub trait IconSource: Send + Sync {
    fn load(&self, name: &str) -> MapResult<Pixmap>;
}

/// Loads `<root>/<name>.png`, falling back to `<root>/<name>.svg`.
#[derive(Debug, Clone)]
pub struct DirectoryIconSource {
    root: PathBuf,
    /// Raster size for SVG icons.
    svg_size: u32,
}

impl DirectoryIconSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            svg_size: 64,
        }
    }

    pub fn with_svg_size(mut self, size: u32) -> Self {
        self.svg_size = size.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl IconSource for DirectoryIconSource {
    fn load(&self, name: &str) -> MapResult<Pixmap> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(icon_error(name, "invalid icon name"));
        }

        let png = self.root.join(format!("{}.png", name));
        if png.is_file() {
            return load_raster(&png).map_err(|e| icon_error(name, e));
        }
        let svg = self.root.join(format!("{}.svg", name));
        if svg.is_file() {
            return load_svg(&svg, self.svg_size).map_err(|e| icon_error(name, e));
        }
        Err(icon_error(
            name,
            format!("no {}.png or {}.svg in {}", name, name, self.root.display()),
        ))
    }
}

/// Icons held in memory, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryIcons {
    icons: HashMap<String, Pixmap>,
}

impl MemoryIcons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, pixmap: Pixmap) {
        self.icons.insert(name.into(), pixmap);
    }

    /// Add a square icon filled with a single color.
    pub fn with_solid(mut self, name: impl Into<String>, size: u32, rgba: [u8; 4]) -> Self {
        if let Some(mut pixmap) = Pixmap::new(size, size) {
            pixmap.fill(tiny_skia::Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
            self.insert(name, pixmap);
        }
        self
    }
}

impl IconSource for MemoryIcons {
    fn load(&self, name: &str) -> MapResult<Pixmap> {
        self.icons
            .get(name)
            .cloned()
            .ok_or_else(|| icon_error(name, "not registered"))
    }
}

fn icon_error(name: &str, message: impl ToString) -> MapError {
    MapError::IconLoad {
        name: name.to_string(),
        message: message.to_string(),
    }
}

/// Decode a raster image into a premultiplied pixmap.
fn load_raster(path: &Path) -> Result<Pixmap, String> {
    let rgba = image::open(path).map_err(|e| e.to_string())?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| format!("invalid icon dimensions {}x{}", width, height))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Rasterize an SVG so that it fits a `size` x `size` square.
fn load_svg(path: &Path, size: u32) -> Result<Pixmap, String> {
    let data = std::fs::read(path).map_err(|e| e.to_string())?;
    let tree = usvg::Tree::from_data(&data, &usvg::Options::default()).map_err(|e| e.to_string())?;

    let mut pixmap =
        Pixmap::new(size, size).ok_or_else(|| format!("invalid icon size {}", size))?;

    let svg_size = tree.size();
    let scale = (size as f32 / svg_size.width()).min(size as f32 / svg_size.height());
    let offset_x = (size as f32 - svg_size.width() * scale) / 2.0;
    let offset_y = (size as f32 - svg_size.height() * scale) / 2.0;
    let transform = tiny_skia::Transform::from_scale(scale, scale).post_translate(offset_x, offset_y);

    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}
