//! Authored color-map preset catalog.
//!
//! Presets follow the ParaView transfer-function schema: a name, a color
//! interpolation space, a flat stride-4 `RGBPoints` array and an optional
//! NaN color. The catalog is embedded in the crate and parsed once on
//! first use; it is read-only to the rest of the crate.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::lut::RgbPoint;

/// Color interpolation space tag carried by a preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
pub enum ColorSpace {
    /// Plain RGB interpolation.
    #[default]
    #[serde(rename = "RGB")]
    Rgb,
    /// Hue/saturation/value interpolation.
    #[serde(rename = "HSV")]
    Hsv,
    /// CIE L*a*b* interpolation.
    #[serde(rename = "Lab")]
    Lab,
    /// Diverging (Moreland) interpolation.
    #[serde(rename = "Diverging")]
    Diverging,
    /// CIEDE2000-corrected L*a*b* interpolation.
    #[serde(rename = "CIELAB")]
    CieLab,
}

#[derive(Debug, Deserialize)]
struct RawPreset {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ColorSpace")]
    color_space: ColorSpace,
    #[serde(rename = "RGBPoints")]
    rgb_points: Vec<f64>,
    #[serde(rename = "NanColor", default)]
    nan_color: Option<[f64; 3]>,
}

/// A named, authored color ramp independent of any live data range.
#[derive(Clone, Debug)]
pub struct Preset {
    /// Preset name (the catalog key).
    pub name: String,
    /// Interpolation space.
    pub color_space: ColorSpace,
    /// Authored control points, ascending in position.
    pub points: Vec<RgbPoint>,
    /// Color for NaN/invalid values, when authored.
    pub nan_color: Option<[f64; 3]>,
}

const PRESETS_JSON: &str = include_str!("presets.json");

static CATALOG: OnceLock<FxHashMap<String, Preset>> = OnceLock::new();

fn parse_catalog() -> FxHashMap<String, Preset> {
    let raw: Vec<RawPreset> = match serde_json::from_str(PRESETS_JSON) {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("embedded preset catalog is invalid: {e}");
            return FxHashMap::default();
        }
    };

    let mut catalog = FxHashMap::default();
    for entry in raw {
        let points = entry
            .rgb_points
            .chunks_exact(4)
            .map(|chunk| RgbPoint {
                x: chunk[0],
                rgb: [chunk[1], chunk[2], chunk[3]],
            })
            .collect();
        let _ = catalog.insert(
            entry.name.clone(),
            Preset {
                name: entry.name,
                color_space: entry.color_space,
                points,
                nan_color: entry.nan_color,
            },
        );
    }
    catalog
}

fn catalog() -> &'static FxHashMap<String, Preset> {
    CATALOG.get_or_init(parse_catalog)
}

/// Look up a preset by name.
#[must_use]
pub fn preset(name: &str) -> Option<&'static Preset> {
    catalog().get(name)
}

/// Sorted names of every available preset.
#[must_use]
pub fn preset_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> =
        catalog().keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
