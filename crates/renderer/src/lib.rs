//! Map raster rendering.
//!
//! Turns a pool of classified spatial features into a styled raster image:
//! - ordered partitioning of features into thematic layers ([`classify`])
//! - painter's-algorithm compositing by footprint area ([`compositor`])
//! - projection and rasterization of vector geometry ([`painter`])
//! - collision-aware placement of icons and labels ([`placement`])
//!
//! [`pipeline::MapRenderer`] ties the stages together.

pub mod catalog;
pub mod classify;
pub mod compositor;
pub mod icons;
pub mod painter;
pub mod pipeline;
pub mod placement;
pub mod png;
pub mod projection;
pub mod scale;
pub mod source;
pub mod text;
pub mod themes;

pub use catalog::{CategoryCatalog, CodeRange, IconRule, DEFAULT_STYLE};
pub use compositor::{Compositor, DisplayList, StyledDrawable};
pub use icons::{DirectoryIconSource, IconSource, MemoryIcons};
pub use painter::{GeometryPainter, PaintOp};
pub use pipeline::{MapRenderer, MapRequest, RenderConfig, RenderStats, RenderedMap};
pub use projection::Projector;
pub use scale::ScaleAdapter;
pub use source::{FeatureQuery, FeatureSource, MemoryFeatureSource};
pub use text::{BoxShaper, FontShaper, LabelPalette, TextShaper};
pub use themes::{default_themes, ThemeSpec};
