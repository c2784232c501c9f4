//! Canvas settings, stored as RON

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rasterizer::Color;

/// Rendering options that persist between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Clear color; also picks add vs subtract in transparent mode
    pub background: Color,
    /// Cull back faces of closed meshes
    pub hide_backfaces: bool,
    /// Color scale for faces drawn in transparent mode
    pub transparent_opacity: f32,
    /// Images kept converted for 3D rendering
    pub image_cache_capacity: usize,
    pub font_scale: i32,
    /// Subtracted from line depths so edges win over their own faces
    pub line_depth_bias: f32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            hide_backfaces: true,
            transparent_opacity: 0.35,
            image_cache_capacity: 16,
            font_scale: 1,
            line_depth_bias: 0.0,
        }
    }
}

impl CanvasSettings {
    /// Pull out-of-range values back into range
    pub fn sanitize(&mut self) {
        self.background = self.background.clip();
        self.transparent_opacity = if self.transparent_opacity.is_finite() {
            self.transparent_opacity.clamp(0.0, 1.0)
        } else {
            Self::default().transparent_opacity
        };
        self.font_scale = self.font_scale.max(1);
        if !self.line_depth_bias.is_finite() {
            self.line_depth_bias = 0.0;
        }
    }
}

/// Load settings from a RON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<CanvasSettings, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_settings_from_str(&contents)
}

/// Save settings to a RON file
pub fn save_settings<P: AsRef<Path>>(settings: &CanvasSettings, path: P) -> Result<(), ConfigError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(settings, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load settings from a RON string (for embedded defaults or testing)
pub fn load_settings_from_str(s: &str) -> Result<CanvasSettings, ConfigError> {
    let mut settings: CanvasSettings = ron::from_str(s)?;
    settings.sanitize();
    Ok(settings)
}
