use std::collections::HashMap;

use super::footprint::Footprint;

/// Append-only list of occupied screen areas.
#[derive(Debug, Clone, Default)]
pub struct OccupancySet {
    items: Vec<Footprint>,
}

impl OccupancySet {
    pub fn push(&mut self, footprint: impl Into<Footprint>) {
        self.items.push(footprint.into());
    }

    pub fn collides(&self, footprint: &Footprint) -> bool {
        self.items.iter().any(|f| f.intersects(footprint))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Footprint> {
        self.items.iter()
    }
}

/// Everything placed so far in one render pass.
///
/// Threaded through the icon, label and street label stages in that order,
/// so later stages avoid what earlier ones placed.
#[derive(Debug, Clone, Default)]
pub struct LayoutState {
    pub icons: OccupancySet,
    pub labels: OccupancySet,
    street_positions: HashMap<String, Vec<(f32, f32)>>,
}

impl LayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free of both icons and labels.
    pub fn is_free(&self, footprint: &Footprint) -> bool {
        !self.icons.collides(footprint) && !self.labels.collides(footprint)
    }

    /// Whether `name` was already placed closer than `radius` to `pos`.
    pub fn street_nearby(&self, name: &str, pos: (f32, f32), radius: f32) -> bool {
        self.street_positions.get(name).is_some_and(|positions| {
            positions.iter().any(|p| {
                let (dx, dy) = (p.0 - pos.0, p.1 - pos.1);
                (dx * dx + dy * dy).sqrt() < radius
            })
        })
    }

    pub fn record_street(&mut self, name: &str, pos: (f32, f32)) {
        self.street_positions
            .entry(name.to_string())
            .or_default()
            .push(pos);
    }

    /// Every footprint placed so far, icons first.
    pub fn footprints(&self) -> impl Iterator<Item = &Footprint> {
        self.icons.iter().chain(self.labels.iter())
    }
}
