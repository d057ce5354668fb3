//! Category rule table: named classification-code ranges with styles, plus
//! the icon rules keyed by primary code.
//!
//! The catalog is loaded once from configuration and only read during a
//! render, so it can be shared between parallel renders.

use std::collections::HashMap;
use std::path::Path;

use map_common::{Color, ColorPair, MapError, MapResult};
use serde::{Deserialize, Serialize};

/// Style returned for categories without an explicit style.
pub const DEFAULT_STYLE: ColorPair = ColorPair::new(
    Color::rgba(200, 200, 200, 180),
    Color::rgba(150, 150, 150, 200),
);

/// Inclusive range of classification codes. Serialized as `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct CodeRange {
    pub lower: i64,
    pub upper: i64,
}

impl CodeRange {
    pub fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }

    /// A range holding exactly one code.
    pub fn single(code: i64) -> Self {
        Self::new(code, code)
    }

    pub fn contains(&self, code: i64) -> bool {
        code >= self.lower && code <= self.upper
    }
}

impl From<[i64; 2]> for CodeRange {
    fn from(v: [i64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<CodeRange> for [i64; 2] {
    fn from(r: CodeRange) -> Self {
        [r.lower, r.upper]
    }
}

/// One named category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub range: CodeRange,

    /// Fill and stroke; absent means the neutral default.
    #[serde(default)]
    pub style: Option<ColorPair>,
}

/// Maps primary codes to an icon and whether the feature name is shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconRule {
    pub icon: String,

    #[serde(default)]
    pub label: bool,

    pub codes: Vec<CodeRange>,
}

impl IconRule {
    pub fn matches(&self, primary: i64) -> bool {
        self.codes.iter().any(|r| r.contains(primary))
    }
}

/// The category and icon lookup tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryCatalog {
    #[serde(default)]
    pub categories: HashMap<String, CategoryEntry>,

    /// Icon rules in priority order; the first match wins.
    #[serde(default)]
    pub icons: Vec<IconRule>,
}

impl CategoryCatalog {
    /// Parse a catalog from YAML and validate it.
    pub fn from_yaml(yaml: &str) -> MapResult<Self> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> MapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Add or replace a category.
    pub fn with_category(
        mut self,
        name: impl Into<String>,
        range: CodeRange,
        style: Option<ColorPair>,
    ) -> Self {
        self.categories
            .insert(name.into(), CategoryEntry { range, style });
        self
    }

    /// Append an icon rule after the existing ones.
    pub fn with_icon(mut self, icon: impl Into<String>, label: bool, codes: Vec<CodeRange>) -> Self {
        self.icons.push(IconRule {
            icon: icon.into(),
            label,
            codes,
        });
        self
    }

    /// Reject inverted ranges and icon rules without codes.
    pub fn validate(&self) -> MapResult<()> {
        for (name, entry) in &self.categories {
            if entry.range.lower > entry.range.upper {
                return Err(MapError::InvalidConfig(format!(
                    "category {} has inverted range [{}, {}]",
                    name, entry.range.lower, entry.range.upper
                )));
            }
        }
        for rule in &self.icons {
            if rule.codes.is_empty() {
                return Err(MapError::InvalidConfig(format!(
                    "icon rule {} has no codes",
                    rule.icon
                )));
            }
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// Code range of a category. Unknown names are a configuration error.
    pub fn range(&self, name: &str) -> MapResult<CodeRange> {
        self.categories
            .get(name)
            .map(|e| e.range)
            .ok_or_else(|| MapError::UnknownCategory(name.to_string()))
    }

    /// Style of a category, or [`DEFAULT_STYLE`] when none is configured.
    pub fn style(&self, name: &str) -> ColorPair {
        self.categories
            .get(name)
            .and_then(|e| e.style)
            .unwrap_or(DEFAULT_STYLE)
    }

    /// Style of a category, with `fallback` standing in for the default.
    ///
    /// A category explicitly configured with the default fill is treated as
    /// unstyled too.
    pub fn style_or(&self, name: &str, fallback: ColorPair) -> ColorPair {
        let style = self.style(name);
        if style.fill == DEFAULT_STYLE.fill {
            fallback
        } else {
            style
        }
    }

    /// First icon rule matching a primary code.
    pub fn icon_for(&self, primary: i64) -> Option<&IconRule> {
        self.icons.iter().find(|rule| rule.matches(primary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CategoryCatalog {
        CategoryCatalog::default()
            .with_category(
                "WATER",
                CodeRange::new(100, 199),
                Some(ColorPair::new(
                    Color::rgb(70, 130, 180),
                    Color::rgb(25, 90, 140),
                )),
            )
            .with_category("PLAIN", CodeRange::new(200, 299), None)
            .with_icon("taxi", false, vec![CodeRange::single(32115000)])
            .with_icon("parkinglot", false, vec![CodeRange::new(32110000, 32130000)])
    }

    #[test]
    fn test_unknown_category_is_error() {
        let err = catalog().range("NOPE").unwrap_err();
        assert!(matches!(err, MapError::UnknownCategory(name) if name == "NOPE"));
    }

    #[test]
    fn test_style_falls_back_to_default() {
        let c = catalog();
        assert_eq!(c.style("PLAIN"), DEFAULT_STYLE);
        assert_eq!(c.style("MISSING"), DEFAULT_STYLE);
        assert_eq!(c.style("WATER").fill, Color::rgb(70, 130, 180));
    }

    #[test]
    fn test_style_or_uses_fallback_for_default() {
        let c = catalog();
        let fallback = ColorPair::new(Color::rgb(1, 2, 3), Color::rgb(4, 5, 6));
        assert_eq!(c.style_or("PLAIN", fallback), fallback);
        assert_eq!(c.style_or("WATER", fallback), c.style("WATER"));
    }

    #[test]
    fn test_first_icon_rule_wins() {
        let c = catalog();
        assert_eq!(c.icon_for(32115000).unwrap().icon, "taxi");
        assert_eq!(c.icon_for(32120000).unwrap().icon, "parkinglot");
        assert!(c.icon_for(1).is_none());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let yaml = "categories:\n  BAD:\n    range: [10, 5]\n";
        assert!(matches!(
            CategoryCatalog::from_yaml(yaml),
            Err(MapError::InvalidConfig(_))
        ));
    }
}
