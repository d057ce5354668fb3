//! Temporary icon directories and workspace paths.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Path of the shipped CLI configuration.
pub fn default_config_path() -> PathBuf {
    workspace_root().join("config").join("mapout.yaml")
}

/// A temporary directory of PNG icons, removed on drop.
pub struct TempIconDir {
    dir: TempDir,
}

impl TempIconDir {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<name>.png`, a square of one color.
    pub fn add_solid(&self, name: &str, size: u32, rgba: [u8; 4]) -> image::ImageResult<PathBuf> {
        let path = self.dir.path().join(format!("{}.png", name));
        RgbaImage::from_pixel(size, size, Rgba(rgba)).save(&path)?;
        Ok(path)
    }

    /// Write `<name>.png` with garbage content.
    pub fn add_corrupt(&self, name: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(format!("{}.png", name));
        std::fs::write(&path, b"not a png")?;
        Ok(path)
    }
}
