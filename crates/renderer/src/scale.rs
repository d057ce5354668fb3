//! Font and icon sizes derived from the ground width of the map.
//!
//! Both grow with the decimal logarithm of the width in meters and are
//! clamped to readable bounds.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleAdapter {
    pub font_multiplier: f64,
    pub font_min: u32,
    pub font_max: u32,
    pub icon_multiplier: f64,
    pub icon_min: u32,
    pub icon_max: u32,
}

impl Default for ScaleAdapter {
    fn default() -> Self {
        Self {
            font_multiplier: 6.0,
            font_min: 8,
            font_max: 30,
            icon_multiplier: 7.0,
            icon_min: 12,
            icon_max: 32,
        }
    }
}

impl ScaleAdapter {
    /// Font size in pixels for a map `width_m` meters wide.
    pub fn font_size(&self, width_m: f64) -> u32 {
        log_scaled(width_m, self.font_multiplier, self.font_min, self.font_max)
    }

    /// Icon edge length in pixels for a map `width_m` meters wide.
    pub fn icon_size(&self, width_m: f64) -> u32 {
        log_scaled(width_m, self.icon_multiplier, self.icon_min, self.icon_max)
    }
}

fn log_scaled(width_m: f64, multiplier: f64, min: u32, max: u32) -> u32 {
    if !width_m.is_finite() || width_m <= 0.0 {
        return min;
    }
    let value = (width_m.log10() * multiplier).round();
    value.clamp(min as f64, max as f64) as u32
}
