//! Feature sources.
//!
//! The renderer asks for one code range at a time and gets back the
//! features intersecting the target area, largest first.

use std::path::Path;

use map_common::{BoundingBox, Feature, MapError, MapResult};
use tracing::debug;

use crate::catalog::CodeRange;

/// What a thematic pass asks a source for.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureQuery {
    pub target: BoundingBox,
    /// Matches when any of the three codes lies in the range.
    pub range: CodeRange,
    /// Only features with this geometry tag, e.g. "POLYGON".
    pub geometry_type: Option<String>,
    /// Drop features whose secondary code lies in this range.
    pub exclude_secondary: Option<CodeRange>,
}

impl FeatureQuery {
    pub fn new(target: BoundingBox, range: CodeRange) -> Self {
        Self {
            target,
            range,
            geometry_type: None,
            exclude_secondary: None,
        }
    }

    pub fn with_geometry_type(mut self, geometry_type: impl Into<String>) -> Self {
        self.geometry_type = Some(geometry_type.into());
        self
    }

    pub fn excluding_secondary(mut self, range: CodeRange) -> Self {
        self.exclude_secondary = Some(range);
        self
    }

    pub fn accepts(&self, feature: &Feature) -> bool {
        if !feature.matches_range(self.range.lower, self.range.upper) {
            return false;
        }
        if let Some(geometry_type) = &self.geometry_type {
            if !feature.geometry_type.eq_ignore_ascii_case(geometry_type) {
                return false;
            }
        }
        if let Some(excluded) = &self.exclude_secondary {
            if excluded.contains(feature.codes.secondary) {
                return false;
            }
        }
        feature
            .geometry
            .envelope()
            .is_some_and(|env| env.intersects(&self.target))
    }
}

/// Delivers the feature pool of one query.
pub trait FeatureSource: Send + Sync {
    /// Features accepted by `query`, ordered by descending area.
    fn features(&self, query: &FeatureQuery) -> MapResult<Vec<Feature>>;
}

/// A source over features held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeatureSource {
    features: Vec<Feature>,
}

impl MemoryFeatureSource {
    pub fn new(features: Vec<Feature>) -> Self {
        let mut features = features;
        for feature in &mut features {
            feature.fill_derived();
        }
        Self { features }
    }

    /// Parse a JSON array of features.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let features: Vec<Feature> = serde_json::from_str(json)
            .map_err(|e| MapError::FeatureSource(format!("invalid feature JSON: {}", e)))?;
        Ok(Self::new(features))
    }

    pub fn from_file(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MapError::FeatureSource(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FeatureSource for MemoryFeatureSource {
    fn features(&self, query: &FeatureQuery) -> MapResult<Vec<Feature>> {
        let mut matched: Vec<Feature> = self
            .features
            .iter()
            .filter(|f| query.accepts(f))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.area.total_cmp(&a.area));
        debug!(
            lower = query.range.lower,
            upper = query.range.upper,
            count = matched.len(),
            "Features fetched"
        );
        Ok(matched)
    }
}
