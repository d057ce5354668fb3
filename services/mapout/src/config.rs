//! CLI configuration file: the category catalog plus render settings.

use std::path::Path;

use anyhow::{Context, Result};
use renderer::{CategoryCatalog, MapRenderer, RenderConfig};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct MapoutConfig {
    pub catalog: CategoryCatalog,

    #[serde(default)]
    pub render: RenderConfig,
}

impl MapoutConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse configuration")?;
        config.catalog.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!(
            path = %path.display(),
            categories = config.catalog.categories.len(),
            icon_rules = config.catalog.icons.len(),
            themes = config.render.themes.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Build a renderer and check every theme against the catalog.
    pub fn into_renderer(self) -> Result<MapRenderer> {
        let renderer = MapRenderer::new(self.catalog, self.render);
        renderer
            .validate()
            .context("Themes reference categories missing from the catalog")?;
        Ok(renderer)
    }
}
