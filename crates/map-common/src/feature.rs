//! Spatial feature records as delivered by a feature source.

use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

/// The three classification codes of a feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassCodes {
    pub primary: i64,
    #[serde(default)]
    pub secondary: i64,
    #[serde(default)]
    pub tertiary: i64,
}

impl ClassCodes {
    pub fn new(primary: i64, secondary: i64, tertiary: i64) -> Self {
        Self {
            primary,
            secondary,
            tertiary,
        }
    }

    /// Codes in the order rules test them: tertiary, secondary, primary.
    pub fn in_match_order(&self) -> [i64; 3] {
        [self.tertiary, self.secondary, self.primary]
    }
}

/// One spatial object with its classification and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: i64,

    #[serde(default)]
    pub name: String,

    pub codes: ClassCodes,

    pub geometry: Geometry,

    /// Upper-case geometry tag ("POLYGON", "LINESTRING", ...).
    #[serde(default)]
    pub geometry_type: String,

    /// Footprint area used for paint ordering. Computed from the geometry
    /// when absent.
    #[serde(default)]
    pub area: f64,

    /// Free-text tag list, e.g. "waterway=stream tunnel=yes".
    #[serde(default)]
    pub tags: String,
}

impl Feature {
    /// Build a feature and derive its geometry tag and area.
    pub fn new(id: i64, name: impl Into<String>, codes: ClassCodes, geometry: Geometry) -> Self {
        let mut feature = Self {
            id,
            name: name.into(),
            codes,
            geometry_type: String::new(),
            area: 0.0,
            tags: String::new(),
            geometry,
        };
        feature.fill_derived();
        feature
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn with_area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }

    /// Fill in the geometry tag and area if they were not supplied.
    pub fn fill_derived(&mut self) {
        if self.geometry_type.is_empty() {
            self.geometry_type = self.geometry.kind().as_str().to_string();
        }
        if self.area == 0.0 {
            self.area = self.geometry.area();
        }
    }

    /// ASCII case-insensitive substring test on the tag list.
    pub fn has_tag(&self, needle: &str) -> bool {
        let needle = needle.as_bytes();
        if needle.is_empty() {
            return true;
        }
        self.tags
            .as_bytes()
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle))
    }

    /// Whether any classification code lies in `[lo, hi]`.
    pub fn matches_range(&self, lo: i64, hi: i64) -> bool {
        self.codes
            .in_match_order()
            .iter()
            .any(|c| (lo..=hi).contains(c))
    }
}
