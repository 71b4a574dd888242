//! Field/color taxonomy shared by representations and lookup tables.
//!
//! [`FieldLocation`] says where a named data array lives on a dataset;
//! [`ColorMode`] says how a multi-component array reduces to a single
//! color-mapped scalar. Both are stateless value types with no lifecycle
//! of their own.

use std::fmt;

use crate::engine::data::{DataArray, DataSet};

// ---------------------------------------------------------------------------
// FieldLocation
// ---------------------------------------------------------------------------

/// Where a named data array lives on a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldLocation {
    /// Data located on points.
    PointData,
    /// Data located on cells.
    CellData,
    /// Data located on the dataset itself.
    FieldData,
    /// No field coloring.
    Unavailable,
}

impl FieldLocation {
    /// Default resolution order: first location containing the array wins.
    pub const LOOKUP_ORDER: [Self; 3] =
        [Self::PointData, Self::CellData, Self::FieldData];

    /// Resolve the location of `field_name` using the default lookup
    /// order. [`Self::Unavailable`] when no location holds the array.
    #[must_use]
    pub fn find(dataset: &DataSet, field_name: &str) -> Self {
        Self::find_in(dataset, field_name, &Self::LOOKUP_ORDER)
    }

    /// Resolve the location of `field_name` using an explicit lookup
    /// order.
    #[must_use]
    pub fn find_in(
        dataset: &DataSet,
        field_name: &str,
        lookup_order: &[Self],
    ) -> Self {
        for &location in lookup_order {
            if dataset
                .attributes(location)
                .is_some_and(|attrs| attrs.contains(field_name))
            {
                return location;
            }
        }
        Self::Unavailable
    }

    /// The named array at this location, if present.
    #[must_use]
    pub fn array<'a>(
        self,
        dataset: &'a DataSet,
        field_name: &str,
    ) -> Option<&'a DataArray> {
        dataset.attributes(self)?.array(field_name)
    }

    /// Names of every array at this location (empty for
    /// [`Self::Unavailable`]).
    #[must_use]
    pub fn field_names(self, dataset: &DataSet) -> Vec<String> {
        dataset
            .attributes(self)
            .map(|attrs| attrs.names().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::PointData => "Data located on points",
            Self::CellData => "Data located on cells",
            Self::FieldData => "Data located on dataset",
            Self::Unavailable => "No field coloring",
        }
    }
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::PointData => "point_data",
            Self::CellData => "cell_data",
            Self::FieldData => "field_data",
            Self::Unavailable => "unavailable",
        };
        f.write_str(tag)
    }
}

// ---------------------------------------------------------------------------
// ColorMode
// ---------------------------------------------------------------------------

/// Highest vector component a lookup table can single out.
pub const MAX_VECTOR_COMPONENTS: usize = 9;

/// How a lookup table interprets multi-component data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorMode {
    /// Color by vector magnitude.
    Magnitude,
    /// Color by one zero-based component.
    Component(usize),
    /// Pass components through as RGB directly.
    RgbColors,
}

/// How a multi-component array's values reduce to a color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Direct color mapping: components are RGB values.
    Rgb,
    /// Color by vector magnitude.
    #[default]
    FieldMagnitude,
    /// Color by one zero-based vector component (`0..MAX_VECTOR_COMPONENTS`).
    FieldComponent(usize),
}

impl ColorMode {
    /// Mode singling out the zero-based component `index`; `None` when the
    /// index is beyond [`MAX_VECTOR_COMPONENTS`].
    #[must_use]
    pub fn component(index: usize) -> Option<Self> {
        (index < MAX_VECTOR_COMPONENTS).then_some(Self::FieldComponent(index))
    }

    /// The vector interpretation this mode applies to a lookup table.
    #[must_use]
    pub const fn vector_mode(self) -> VectorMode {
        match self {
            Self::Rgb => VectorMode::RgbColors,
            Self::FieldMagnitude => VectorMode::Magnitude,
            Self::FieldComponent(index) => VectorMode::Component(index),
        }
    }

    /// UI label.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Rgb => "Direct color mapping".to_owned(),
            Self::FieldMagnitude => "Magnitude".to_owned(),
            Self::FieldComponent(0) => "X".to_owned(),
            Self::FieldComponent(1) => "Y".to_owned(),
            Self::FieldComponent(2) => "Z".to_owned(),
            Self::FieldComponent(index) => format!("Component {}", index + 1),
        }
    }

    /// The modes that make sense for a given array: magnitude always,
    /// direct RGB for 3-component arrays or 4-component byte arrays, and
    /// one entry per component for vector arrays.
    #[must_use]
    pub fn options(array: &DataArray) -> Vec<Self> {
        let mut results = vec![Self::FieldMagnitude];
        let components = array.components();
        if components == 3
            || (components == 4 && array.value_width() == 1)
        {
            results.push(Self::Rgb);
        }
        if components > 1 {
            for index in 0..components.min(MAX_VECTOR_COMPONENTS) {
                results.push(Self::FieldComponent(index));
            }
        }
        results
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset_with_cell_temperature() -> DataSet {
        let mut ds = DataSet::new();
        ds.cell_data_mut()
            .add(DataArray::new("temperature", 1, vec![1.0, 2.0]));
        ds
    }

    #[test]
    fn find_prefers_point_data() {
        let mut ds = dataset_with_cell_temperature();
        ds.point_data_mut()
            .add(DataArray::new("temperature", 1, vec![0.0]));
        assert_eq!(
            FieldLocation::find(&ds, "temperature"),
            FieldLocation::PointData
        );
    }

    #[test]
    fn find_falls_through_to_cell_data() {
        let ds = dataset_with_cell_temperature();
        assert_eq!(
            FieldLocation::find(&ds, "temperature"),
            FieldLocation::CellData
        );
    }

    #[test]
    fn find_missing_array_is_unavailable() {
        let ds = dataset_with_cell_temperature();
        assert_eq!(
            FieldLocation::find(&ds, "velocity"),
            FieldLocation::Unavailable
        );
        assert!(FieldLocation::Unavailable.field_names(&ds).is_empty());
    }

    #[test]
    fn custom_lookup_order_is_honored() {
        let mut ds = dataset_with_cell_temperature();
        ds.field_data_mut()
            .add(DataArray::new("temperature", 1, vec![0.0]));
        assert_eq!(
            FieldLocation::find_in(
                &ds,
                "temperature",
                &[FieldLocation::FieldData, FieldLocation::CellData],
            ),
            FieldLocation::FieldData
        );
    }

    #[test]
    fn color_mode_options_for_scalar_array() {
        let array = DataArray::new("pressure", 1, vec![1.0]);
        assert_eq!(ColorMode::options(&array), [ColorMode::FieldMagnitude]);
    }

    #[test]
    fn color_mode_options_for_vec3_array() {
        let array = DataArray::new("velocity", 3, vec![0.0; 9]);
        let options = ColorMode::options(&array);
        assert!(options.contains(&ColorMode::Rgb));
        assert!(options.contains(&ColorMode::FieldComponent(2)));
        assert_eq!(options.len(), 5);
    }

    #[test]
    fn rgba_bytes_allow_direct_rgb() {
        let wide = DataArray::new("rgba", 4, vec![0.0; 8]);
        assert!(!ColorMode::options(&wide).contains(&ColorMode::Rgb));

        let bytes = DataArray::new("rgba", 4, vec![0.0; 8])
            .with_value_width(1);
        assert!(ColorMode::options(&bytes).contains(&ColorMode::Rgb));
    }

    #[test]
    fn component_constructor_validates_index() {
        assert_eq!(
            ColorMode::component(2),
            Some(ColorMode::FieldComponent(2))
        );
        assert_eq!(ColorMode::component(9), None);
    }

    #[test]
    fn component_labels() {
        assert_eq!(ColorMode::FieldComponent(0).label(), "X");
        assert_eq!(ColorMode::FieldComponent(3).label(), "Component 4");
    }
}
