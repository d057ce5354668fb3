//! Collision-aware placement of icons and labels.
//!
//! Stages run in a fixed order (icons, point labels, water labels, street
//! labels) and share one [`LayoutState`], so each stage avoids everything the
//! earlier stages placed.

mod engine;
mod footprint;
mod state;

pub use engine::{
    street_anchor, IconRequest, LabelRequest, PlacementConfig, PlacementEngine, PlacementStats,
    StreetLabel,
};
pub use footprint::{Footprint, Rect};
pub use state::{LayoutState, OccupancySet};
