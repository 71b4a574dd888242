//! Embedder-facing configuration with TOML load/save support.
//!
//! All sub-structs use `#[serde(default)]` so partial TOML files (e.g.
//! only overriding `[view]`) work correctly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::lut::DEFAULT_PRESET;

/// Render-view construction options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewOptions {
    /// Renderer background color.
    pub background: [f64; 3],
    /// Whether render windows are created off-screen.
    pub off_screen_rendering: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            background: [0.8, 0.8, 0.8],
            off_screen_rendering: true,
        }
    }
}

/// Color-mapping options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorOptions {
    /// Preset applied to lookup tables the embedder creates explicitly.
    pub default_preset: String,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            default_preset: DEFAULT_PRESET.to_owned(),
        }
    }
}

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Render-view construction options.
    pub view: ViewOptions,
    /// Color-mapping options.
    pub color: ColorOptions,
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// [`SceneError::Io`] when the file cannot be read;
    /// [`SceneError::OptionsParse`] on invalid TOML.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path).map_err(SceneError::Io)?;
        toml::from_str(&content)
            .map_err(|e| SceneError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// [`SceneError::Io`] when the file cannot be written;
    /// [`SceneError::OptionsParse`] when serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SceneError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SceneError::Io)?;
        }
        std::fs::write(path, content).map_err(SceneError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[view]
off_screen_rendering = false
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert!(!opts.view.off_screen_rendering);
        // Everything else should be default
        assert_eq!(opts.view.background, [0.8, 0.8, 0.8]);
        assert_eq!(opts.color.default_preset, DEFAULT_PRESET);
    }
}
