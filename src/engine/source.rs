//! Data-source side of the pipeline facade.
//!
//! A [`DataSource`] is anything that can produce a [`DataSet`] on demand:
//! file readers resolved through [`crate::io::FormatRegistry`], procedural
//! generators, or the in-memory [`MemorySource`]. Time-step introspection
//! is part of the trait, so every source uniformly reports
//! `time_steps`/`time_value` regardless of its implementation.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::engine::data::DataSet;
use crate::scene::{Scene, SceneRegistry, SharedScene};

/// Shared handle to a data source.
pub type SharedSource = Rc<RefCell<dyn DataSource>>;

/// A producer of datasets with optional time-series support.
pub trait DataSource {
    /// Bring the current output up to date.
    fn update(&mut self);

    /// Advance the source to the given time, then bring the output up to
    /// date. Sources without time support treat this as [`Self::update`].
    fn update_time_step(&mut self, time: f64);

    /// The current output data object.
    fn output(&self) -> Rc<DataSet>;

    /// The time steps this source can produce, ascending. Empty when the
    /// source is not time-aware.
    fn time_steps(&self) -> Vec<f64>;

    /// The time value of the current output (NaN when untimed).
    fn time_value(&self) -> f64;
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Upstream input of a representation: either a static data object
/// (connected directly) or a live source (connected by reference so
/// upstream updates propagate).
#[derive(Clone)]
pub enum Input {
    /// A static data object.
    Data(Rc<DataSet>),
    /// A shared processing source.
    Source(SharedSource),
}

impl Input {
    /// Whether this input is a static data object.
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    /// Pointer identity between two inputs.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Data(a), Self::Data(b)) => Rc::ptr_eq(a, b),
            (Self::Source(a), Self::Source(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<DataSet> for Input {
    fn from(data: DataSet) -> Self {
        Self::Data(Rc::new(data))
    }
}

impl From<Rc<DataSet>> for Input {
    fn from(data: Rc<DataSet>) -> Self {
        Self::Data(data)
    }
}

impl From<SharedSource> for Input {
    fn from(source: SharedSource) -> Self {
        Self::Source(source)
    }
}

impl<T: DataSource + 'static> From<Rc<RefCell<T>>> for Input {
    fn from(source: Rc<RefCell<T>>) -> Self {
        Self::Source(source)
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// An in-memory source over caller-provided datasets, with optional
/// per-time-step frames.
///
/// Registers itself into the active scene's `sources` group on
/// construction.
pub struct MemorySource {
    name: String,
    scene: Option<Weak<RefCell<Scene>>>,
    data: Rc<DataSet>,
    time_steps: Vec<f64>,
    frames: Vec<DataSet>,
    current_frame: Option<usize>,
    time_value: f64,
}

impl MemorySource {
    /// New source over a single dataset.
    pub fn new(
        registry: &SceneRegistry,
        name: &str,
        data: DataSet,
    ) -> Rc<RefCell<Self>> {
        let source = Rc::new(RefCell::new(Self {
            name: name.to_owned(),
            scene: None,
            data: Rc::new(data),
            time_steps: Vec::new(),
            frames: Vec::new(),
            current_frame: None,
            time_value: f64::NAN,
        }));
        let shared: SharedSource = source.clone();
        let scene = registry
            .register(|scene| scene.sources_mut().register(name, shared));
        source.borrow_mut().scene = scene.as_ref().map(Rc::downgrade);
        source
    }

    /// Source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scene that was active when this source was constructed.
    #[must_use]
    pub fn scene(&self) -> Option<SharedScene> {
        self.scene.as_ref().and_then(Weak::upgrade)
    }

    /// Replace the current dataset. Stamps a fresh modification time so
    /// downstream representations re-snapshot on their next update.
    pub fn set_data(&mut self, mut data: DataSet) {
        data.mark_modified();
        self.data = Rc::new(data);
        self.current_frame = None;
    }

    /// Install a time series: `(time, frame)` pairs, expected ascending in
    /// time. [`DataSource::update_time_step`] snaps to the nearest step.
    pub fn set_time_series(&mut self, series: Vec<(f64, DataSet)>) {
        self.time_steps = series.iter().map(|(t, _)| *t).collect();
        self.frames = series.into_iter().map(|(_, frame)| frame).collect();
        self.current_frame = None;
    }

    /// Index of the registered step nearest to `time`.
    fn nearest_step(&self, time: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &step) in self.time_steps.iter().enumerate() {
            let distance = (step - time).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }
        best.map(|(i, _)| i)
    }
}

impl DataSource for MemorySource {
    fn update(&mut self) {}

    fn update_time_step(&mut self, time: f64) {
        let Some(idx) = self.nearest_step(time) else {
            self.time_value = time;
            return;
        };
        self.time_value = self.time_steps[idx];
        if self.current_frame == Some(idx) {
            return;
        }
        if let Some(frame) = self.frames.get(idx) {
            let mut frame = frame.clone();
            frame.mark_modified();
            self.data = Rc::new(frame);
            self.current_frame = Some(idx);
        }
    }

    fn output(&self) -> Rc<DataSet> {
        Rc::clone(&self.data)
    }

    fn time_steps(&self) -> Vec<f64> {
        self.time_steps.clone()
    }

    fn time_value(&self) -> f64 {
        self.time_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_data_advances_mtime() {
        let registry = SceneRegistry::new();
        let source = MemorySource::new(&registry, "grid", DataSet::new());
        let before = source.borrow().output().mtime();
        source.borrow_mut().set_data(DataSet::new());
        assert!(source.borrow().output().mtime() > before);
    }

    #[test]
    fn registers_into_active_scene() {
        let registry = SceneRegistry::new();
        let _source = MemorySource::new(&registry, "grid", DataSet::new());
        let scene = registry.active_scene().unwrap();
        assert!(scene.borrow().sources().contains("grid"));
    }

    #[test]
    fn update_time_step_snaps_to_nearest_frame() {
        let registry = SceneRegistry::new();
        let source = MemorySource::new(&registry, "series", DataSet::new());
        source.borrow_mut().set_time_series(vec![
            (0.0, DataSet::new()),
            (1.0, DataSet::new()),
            (2.0, DataSet::new()),
        ]);

        source.borrow_mut().update_time_step(1.2);
        assert_eq!(source.borrow().time_value(), 1.0);

        let first = source.borrow().output().mtime();
        // Same step again: output unchanged.
        source.borrow_mut().update_time_step(0.9);
        assert_eq!(source.borrow().output().mtime(), first);

        // Different step: fresh stamp even for a previously shown frame.
        source.borrow_mut().update_time_step(2.0);
        source.borrow_mut().update_time_step(1.0);
        assert!(source.borrow().output().mtime() > first);
    }
}
