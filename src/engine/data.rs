//! In-memory dataset model exchanged with the native pipeline.
//!
//! A [`DataSet`] is the unit of exchange between sources, representations
//! and mappers: three attribute blocks (point, cell, dataset-wide), an
//! optional bounding box, and a modification time drawn from a global
//! monotonic clock so downstream consumers can detect upstream changes.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::field::FieldLocation;

/// Global modification clock. Every stamp is unique and monotonic for the
/// lifetime of the process.
static MOD_CLOCK: AtomicU64 = AtomicU64::new(0);

/// Next modification time stamp.
pub(crate) fn next_mtime() -> u64 {
    MOD_CLOCK.fetch_add(1, Ordering::Relaxed) + 1
}

// ---------------------------------------------------------------------------
// DataArray
// ---------------------------------------------------------------------------

/// A named, fixed-width array of scalar tuples.
///
/// Values are stored flat as `f64` regardless of the native element type;
/// `value_width` records the native element size in bytes so consumers can
/// still distinguish byte-valued arrays (direct RGB candidates) from wide
/// ones.
#[derive(Clone, Debug, PartialEq)]
pub struct DataArray {
    name: String,
    components: usize,
    value_width: usize,
    values: Vec<f64>,
}

impl DataArray {
    /// New array with the given tuple width. A component count of zero is
    /// treated as one.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        components: usize,
        values: Vec<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            components: components.max(1),
            value_width: 8,
            values,
        }
    }

    /// Override the native element width in bytes (e.g. 1 for `u8` color
    /// arrays).
    #[must_use]
    pub fn with_value_width(mut self, bytes: usize) -> Self {
        self.value_width = bytes.max(1);
        self
    }

    /// Array name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Components per tuple.
    #[must_use]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Native element width in bytes.
    #[must_use]
    pub fn value_width(&self) -> usize {
        self.value_width
    }

    /// Flat value storage.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of complete tuples.
    #[must_use]
    pub fn tuple_count(&self) -> usize {
        self.values.len() / self.components
    }

    /// Whether the array holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric `(min, max)` over every finite stored value, or `None` when
    /// the array is empty or entirely non-finite.
    #[must_use]
    pub fn range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for &v in &self.values {
            if !v.is_finite() {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        range
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// A name-keyed, insertion-ordered set of arrays attached to one location
/// of a dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    arrays: Vec<DataArray>,
}

impl Attributes {
    /// Read access to an array by name.
    #[must_use]
    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name() == name)
    }

    /// Write access to an array by name.
    pub fn array_mut(&mut self, name: &str) -> Option<&mut DataArray> {
        self.arrays.iter_mut().find(|a| a.name() == name)
    }

    /// Add an array, replacing any existing array with the same name in
    /// place.
    pub fn add(&mut self, array: DataArray) {
        match self.arrays.iter_mut().find(|a| a.name() == array.name()) {
            Some(existing) => *existing = array,
            None => self.arrays.push(array),
        }
    }

    /// Remove an array by name. Returns the removed array, if any.
    pub fn remove(&mut self, name: &str) -> Option<DataArray> {
        let idx = self.arrays.iter().position(|a| a.name() == name)?;
        Some(self.arrays.remove(idx))
    }

    /// Whether an array with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.arrays.iter().any(|a| a.name() == name)
    }

    /// Array names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.iter().map(DataArray::name)
    }

    /// Arrays in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, DataArray> {
        self.arrays.iter()
    }

    /// Number of arrays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Whether the block holds no arrays.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a DataArray;
    type IntoIter = std::slice::Iter<'a, DataArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// DataSet
// ---------------------------------------------------------------------------

/// An opaque data object produced by a source and consumed by mappers.
///
/// Cloning is the defensive-copy operation: the clone keeps the original's
/// modification time, so watermark comparisons against the upstream object
/// stay meaningful.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSet {
    point_data: Attributes,
    cell_data: Attributes,
    field_data: Attributes,
    bounds: Option<[f64; 6]>,
    mtime: u64,
}

impl DataSet {
    /// Empty dataset stamped with a fresh modification time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            point_data: Attributes::default(),
            cell_data: Attributes::default(),
            field_data: Attributes::default(),
            bounds: None,
            mtime: next_mtime(),
        }
    }

    /// Attribute block for a location; `None` for
    /// [`FieldLocation::Unavailable`].
    #[must_use]
    pub fn attributes(&self, location: FieldLocation) -> Option<&Attributes> {
        match location {
            FieldLocation::PointData => Some(&self.point_data),
            FieldLocation::CellData => Some(&self.cell_data),
            FieldLocation::FieldData => Some(&self.field_data),
            FieldLocation::Unavailable => None,
        }
    }

    /// Mutable attribute block for a location; `None` for
    /// [`FieldLocation::Unavailable`].
    pub fn attributes_mut(
        &mut self,
        location: FieldLocation,
    ) -> Option<&mut Attributes> {
        match location {
            FieldLocation::PointData => Some(&mut self.point_data),
            FieldLocation::CellData => Some(&mut self.cell_data),
            FieldLocation::FieldData => Some(&mut self.field_data),
            FieldLocation::Unavailable => None,
        }
    }

    /// Point-associated attributes.
    #[must_use]
    pub fn point_data(&self) -> &Attributes {
        &self.point_data
    }

    /// Mutable point-associated attributes. Call [`Self::mark_modified`]
    /// after editing so downstream watermarks advance.
    pub fn point_data_mut(&mut self) -> &mut Attributes {
        &mut self.point_data
    }

    /// Cell-associated attributes.
    #[must_use]
    pub fn cell_data(&self) -> &Attributes {
        &self.cell_data
    }

    /// Mutable cell-associated attributes.
    pub fn cell_data_mut(&mut self) -> &mut Attributes {
        &mut self.cell_data
    }

    /// Dataset-wide attributes.
    #[must_use]
    pub fn field_data(&self) -> &Attributes {
        &self.field_data
    }

    /// Mutable dataset-wide attributes.
    pub fn field_data_mut(&mut self) -> &mut Attributes {
        &mut self.field_data
    }

    /// Axis-aligned bounds `[xmin, xmax, ymin, ymax, zmin, zmax]`, when
    /// known.
    #[must_use]
    pub fn bounds(&self) -> Option<[f64; 6]> {
        self.bounds
    }

    /// Set the axis-aligned bounds.
    pub fn set_bounds(&mut self, bounds: [f64; 6]) {
        self.bounds = Some(bounds);
    }

    /// Modification time of this object.
    #[must_use]
    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    /// Stamp a fresh modification time.
    pub fn mark_modified(&mut self) {
        self.mtime = next_mtime();
    }
}

impl Default for DataSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mtime_is_monotonic() {
        let a = DataSet::new();
        let mut b = DataSet::new();
        assert!(b.mtime() > a.mtime());
        let stamped = b.mtime();
        b.mark_modified();
        assert!(b.mtime() > stamped);
    }

    #[test]
    fn clone_keeps_mtime() {
        let ds = DataSet::new();
        assert_eq!(ds.clone().mtime(), ds.mtime());
    }

    #[test]
    fn array_range_skips_non_finite() {
        let array =
            DataArray::new("pressure", 1, vec![2.0, f64::NAN, -1.0, 5.0]);
        assert_eq!(array.range(), Some((-1.0, 5.0)));
        assert_eq!(DataArray::new("empty", 1, vec![]).range(), None);
    }

    #[test]
    fn attributes_add_replaces_in_place() {
        let mut attrs = Attributes::default();
        attrs.add(DataArray::new("a", 1, vec![1.0]));
        attrs.add(DataArray::new("b", 1, vec![2.0]));
        attrs.add(DataArray::new("a", 1, vec![3.0]));
        let names: Vec<&str> = attrs.names().collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(attrs.array("a").unwrap().values(), [3.0]);
    }
}
