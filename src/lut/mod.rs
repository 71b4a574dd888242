//! Per-field color lookup tables with preset and rescale support.
//!
//! A [`LookupTable`] is a piecewise-linear color ramp keyed by the field
//! name it colors. Control-point positions always track the last-applied
//! scalar range: applying a preset immediately rescales the authored
//! points to the table's current range, and [`LookupTable::rescale`]
//! affinely remaps every point from the previous range to the new one.

mod presets;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub use presets::{preset, preset_names, ColorSpace, Preset};

use crate::error::SceneError;
use crate::field::{ColorMode, VectorMode};
use crate::scene::{SceneRegistry, SharedScene, WeakScene};

/// Preset applied to tables created without an explicit one.
pub const DEFAULT_PRESET: &str = "Fast";

/// Spans below this are degenerate; rescaling across them is a no-op.
const RANGE_EPSILON: f64 = 1e-7;

/// One control point of a color ramp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RgbPoint {
    /// Scalar position.
    pub x: f64,
    /// Color at the position.
    pub rgb: [f64; 3],
}

/// Shared handle to a lookup table.
pub type SharedLookupTable = Rc<RefCell<LookupTable>>;

/// A piecewise-linear color ramp mapping a scalar range to colors.
///
/// Registers itself under its field name in the active scene's `luts`
/// group on construction.
#[derive(Debug)]
pub struct LookupTable {
    field_name: String,
    scene: Option<WeakScene>,
    points: Vec<RgbPoint>,
    nan_color: [f64; 3],
    color_space: ColorSpace,
    scalar_range: [f64; 2],
    color_mode: ColorMode,
}

impl LookupTable {
    /// New table for a field with the default preset and color mode.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownPreset`] when the embedded catalog is missing
    /// the default preset.
    pub fn new(
        registry: &SceneRegistry,
        field_name: &str,
    ) -> Result<SharedLookupTable, SceneError> {
        Self::with_settings(
            registry,
            field_name,
            DEFAULT_PRESET,
            ColorMode::default(),
        )
    }

    /// New table for a field with an explicit preset and color mode.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownPreset`] when `preset_name` is not in the
    /// catalog; nothing is registered in that case.
    pub fn with_settings(
        registry: &SceneRegistry,
        field_name: &str,
        preset_name: &str,
        color_mode: ColorMode,
    ) -> Result<SharedLookupTable, SceneError> {
        let mut table = Self {
            field_name: field_name.to_owned(),
            scene: None,
            points: Vec::new(),
            nan_color: [0.5, 0.0, 0.0],
            color_space: ColorSpace::default(),
            scalar_range: [0.0, 1.0],
            color_mode,
        };
        table.apply_preset(preset_name)?;

        let lut = Rc::new(RefCell::new(table));
        let scene = registry.register(|scene| {
            scene.luts_mut().register(field_name, Rc::clone(&lut));
        });
        lut.borrow_mut().scene = scene.as_ref().map(Rc::downgrade);
        Ok(lut)
    }

    /// The field name this table colors (its registry key).
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The scene that was active when this table was constructed.
    #[must_use]
    pub fn scene(&self) -> Option<SharedScene> {
        self.scene.as_ref().and_then(Weak::upgrade)
    }

    /// Replace points, color space and NaN color from a named preset,
    /// then rescale the authored positions to the table's current scalar
    /// range so visual appearance reflects live data.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownPreset`] when the name is not in the catalog;
    /// the table is left untouched.
    pub fn apply_preset(
        &mut self,
        preset_name: &str,
    ) -> Result<(), SceneError> {
        let Some(preset) = preset(preset_name) else {
            return Err(SceneError::UnknownPreset(preset_name.to_owned()));
        };

        self.color_space = preset.color_space;
        if let Some(nan_color) = preset.nan_color {
            self.nan_color = nan_color;
        }
        self.points = preset.points.clone();

        let [min, max] = self.scalar_range;
        self.rescale(min, max);
        Ok(())
    }

    /// Affinely remap every control-point position from the previous
    /// point span to `[min_value, max_value]` and store the new range.
    ///
    /// A degenerate span (previous or requested, below `1e-7`) is a
    /// silent no-op: data that is momentarily constant must not collapse
    /// the table to a single point.
    pub fn rescale(&mut self, min_value: f64, max_value: f64) {
        let (Some(first), Some(last)) =
            (self.points.first(), self.points.last())
        else {
            return;
        };

        let prev_min = first.x;
        let prev_delta = last.x - prev_min;
        let next_delta = max_value - min_value;
        if prev_delta < RANGE_EPSILON || next_delta < RANGE_EPSILON {
            return;
        }

        self.scalar_range = [min_value, max_value];
        for point in &mut self.points {
            point.x =
                next_delta * (point.x - prev_min) / prev_delta + min_value;
        }
    }

    /// The last-applied scalar range.
    #[must_use]
    pub fn scalar_range(&self) -> [f64; 2] {
        self.scalar_range
    }

    /// Control points, ascending in position.
    #[must_use]
    pub fn points(&self) -> &[RgbPoint] {
        &self.points
    }

    /// Color used for NaN/invalid values.
    #[must_use]
    pub fn nan_color(&self) -> [f64; 3] {
        self.nan_color
    }

    /// Set the color used for NaN/invalid values.
    pub fn set_nan_color(&mut self, color: [f64; 3]) {
        self.nan_color = color;
    }

    /// Interpolation space of the current ramp.
    #[must_use]
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// How multi-component data reduces to a mapped scalar.
    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Set the color mode, re-applying the vector interpretation.
    pub fn set_color_mode(&mut self, color_mode: ColorMode) {
        self.color_mode = color_mode;
    }

    /// The active vector interpretation.
    #[must_use]
    pub fn vector_mode(&self) -> VectorMode {
        self.color_mode.vector_mode()
    }

    /// Sample the ramp at a scalar value.
    ///
    /// NaN maps to the NaN color; values outside the ramp clamp to the
    /// end points. Interpolation is linear in RGB regardless of the
    /// color-space tag (the native engine owns the exact interpolation).
    #[must_use]
    pub fn color(&self, value: f64) -> [f64; 3] {
        if value.is_nan() || self.points.is_empty() {
            return self.nan_color;
        }

        let Some(first) = self.points.first() else {
            return self.nan_color;
        };
        if value <= first.x {
            return first.rgb;
        }
        let Some(last) = self.points.last() else {
            return self.nan_color;
        };
        if value >= last.x {
            return last.rgb;
        }

        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if value <= b.x {
                let span = b.x - a.x;
                let t = if span < RANGE_EPSILON {
                    0.0
                } else {
                    (value - a.x) / span
                };
                return [
                    a.rgb[0] + (b.rgb[0] - a.rgb[0]) * t,
                    a.rgb[1] + (b.rgb[1] - a.rgb[1]) * t,
                    a.rgb[2] + (b.rgb[2] - a.rgb[2]) * t,
                ];
            }
        }
        last.rgb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(registry: &SceneRegistry, field: &str) -> SharedLookupTable {
        LookupTable::new(registry, field).unwrap()
    }

    #[test]
    fn new_table_registers_under_field_name() {
        let registry = SceneRegistry::new();
        let lut = table(&registry, "pressure");
        let scene = registry.active_scene().unwrap();
        assert!(scene.borrow().luts().contains("pressure"));
        assert!(lut.borrow().scene().is_some());
        assert_eq!(lut.borrow().scalar_range(), [0.0, 1.0]);
    }

    #[test]
    fn unknown_preset_fails_and_registers_nothing() {
        let registry = SceneRegistry::new();
        let err = LookupTable::with_settings(
            &registry,
            "pressure",
            "No Such Ramp",
            ColorMode::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::UnknownPreset(_)));
        let scene = registry.active_scene().unwrap();
        assert!(!scene.borrow().luts().contains("pressure"));
    }

    #[test]
    fn rescale_remaps_points_affinely() {
        let registry = SceneRegistry::new();
        let lut = table(&registry, "pressure");
        lut.borrow_mut().rescale(0.0, 5.0);
        assert_eq!(lut.borrow().scalar_range(), [0.0, 5.0]);

        let before: Vec<f64> =
            lut.borrow().points().iter().map(|p| p.x).collect();
        lut.borrow_mut().rescale(2.0, 8.0);
        assert_eq!(lut.borrow().scalar_range(), [2.0, 8.0]);
        let after: Vec<f64> =
            lut.borrow().points().iter().map(|p| p.x).collect();
        for (x0, x1) in before.iter().zip(&after) {
            let expected = (x0 - 0.0) * (8.0 - 2.0) / (5.0 - 0.0) + 2.0;
            assert!((x1 - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn rescale_is_idempotent() {
        let registry = SceneRegistry::new();
        let lut = table(&registry, "pressure");
        lut.borrow_mut().rescale(-3.0, 7.0);
        let once: Vec<RgbPoint> = lut.borrow().points().to_vec();
        lut.borrow_mut().rescale(-3.0, 7.0);
        assert_eq!(lut.borrow().points(), once.as_slice());
    }

    #[test]
    fn degenerate_span_is_a_noop() {
        let registry = SceneRegistry::new();
        let lut = table(&registry, "pressure");
        let points: Vec<RgbPoint> = lut.borrow().points().to_vec();

        lut.borrow_mut().rescale(2.0, 2.0);
        assert_eq!(lut.borrow().scalar_range(), [0.0, 1.0]);
        assert_eq!(lut.borrow().points(), points.as_slice());

        // Reversed ranges are degenerate too.
        lut.borrow_mut().rescale(5.0, 1.0);
        assert_eq!(lut.borrow().scalar_range(), [0.0, 1.0]);
    }

    #[test]
    fn apply_preset_keeps_current_range() {
        let registry = SceneRegistry::new();
        let lut = table(&registry, "pressure");
        lut.borrow_mut().rescale(10.0, 20.0);

        lut.borrow_mut().apply_preset("Cool to Warm").unwrap();
        let table = lut.borrow();
        assert_eq!(table.scalar_range(), [10.0, 20.0]);
        assert_eq!(table.color_space(), ColorSpace::Diverging);
        assert_eq!(table.nan_color(), [1.0, 1.0, 0.0]);
        assert_eq!(table.points().first().map(|p| p.x), Some(10.0));
        assert_eq!(table.points().last().map(|p| p.x), Some(20.0));
    }

    #[test]
    fn color_samples_the_ramp() {
        let registry = SceneRegistry::new();
        let lut = LookupTable::with_settings(
            &registry,
            "mask",
            "Grayscale",
            ColorMode::default(),
        )
        .unwrap();
        let table = lut.borrow();
        assert_eq!(table.color(-1.0), [0.0, 0.0, 0.0]);
        assert_eq!(table.color(2.0), [1.0, 1.0, 1.0]);
        let mid = table.color(0.5);
        for channel in mid {
            assert!((channel - 0.5).abs() < 1e-12);
        }
        assert_eq!(table.color(f64::NAN), table.nan_color());
    }

    #[test]
    fn color_mode_updates_vector_interpretation() {
        let registry = SceneRegistry::new();
        let lut = table(&registry, "velocity");
        assert_eq!(lut.borrow().vector_mode(), VectorMode::Magnitude);
        lut.borrow_mut().set_color_mode(ColorMode::FieldComponent(1));
        assert_eq!(lut.borrow().vector_mode(), VectorMode::Component(1));
    }
}
