//! Suffix-driven reader/writer resolution.
//!
//! A [`FormatRegistry`] maps lowercased file suffixes to [`Format`]
//! entries, each holding named reader/writer constructors plus a default.
//! Callers can prioritize resolution with a preference list; otherwise
//! the format's declared default wins. Actual file parsing lives in the
//! registered implementations, not here.

use std::path::Path;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::engine::data::DataSet;
use crate::engine::source::{DataSource, SharedSource};
use crate::error::SceneError;
use crate::scene::SceneRegistry;

/// Constructor producing a reader source for a path.
pub type ReaderConstructor =
    fn(&Path) -> Result<SharedSource, SceneError>;

/// Constructor producing a writer for a path.
pub type WriterConstructor =
    fn(&Path) -> Result<Box<dyn DataWriter>, SceneError>;

/// A dataset sink resolved per format.
pub trait DataWriter {
    /// Write the dataset to the writer's destination.
    ///
    /// # Errors
    ///
    /// Implementation-defined; typically [`SceneError::Io`].
    fn write(&mut self, dataset: &DataSet) -> Result<(), SceneError>;
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Reader/writer implementations registered for one file suffix.
#[derive(Clone, Default)]
pub struct Format {
    readers: IndexMap<String, ReaderConstructor>,
    default_reader: Option<String>,
    writers: IndexMap<String, WriterConstructor>,
    default_writer: Option<String>,
}

impl Format {
    /// New empty format entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named reader. The first registered reader becomes the
    /// default.
    #[must_use]
    pub fn with_reader(
        mut self,
        name: &str,
        constructor: ReaderConstructor,
    ) -> Self {
        if self.default_reader.is_none() {
            self.default_reader = Some(name.to_owned());
        }
        let _ = self.readers.insert(name.to_owned(), constructor);
        self
    }

    /// Declare the default reader by name.
    #[must_use]
    pub fn with_default_reader(mut self, name: &str) -> Self {
        self.default_reader = Some(name.to_owned());
        self
    }

    /// Add a named writer. The first registered writer becomes the
    /// default.
    #[must_use]
    pub fn with_writer(
        mut self,
        name: &str,
        constructor: WriterConstructor,
    ) -> Self {
        if self.default_writer.is_none() {
            self.default_writer = Some(name.to_owned());
        }
        let _ = self.writers.insert(name.to_owned(), constructor);
        self
    }

    /// Declare the default writer by name.
    #[must_use]
    pub fn with_default_writer(mut self, name: &str) -> Self {
        self.default_writer = Some(name.to_owned());
        self
    }

    /// Registered reader names, in registration order.
    pub fn reader_names(&self) -> impl Iterator<Item = &str> {
        self.readers.keys().map(String::as_str)
    }

    /// Registered writer names, in registration order.
    pub fn writer_names(&self) -> impl Iterator<Item = &str> {
        self.writers.keys().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// FormatRegistry
// ---------------------------------------------------------------------------

fn normalize_suffix(suffix: &str) -> String {
    suffix.trim_start_matches('.').to_lowercase()
}

fn source_name(path: &Path) -> String {
    path.file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .map_or_else(|| path.display().to_string(), str::to_owned)
}

/// Suffix → format registry resolving readers and writers.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    formats: FxHashMap<String, Format>,
}

impl FormatRegistry {
    /// New empty registry; the embedding application registers its
    /// formats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the format for a suffix (`"vtu"` and
    /// `".vtu"` are equivalent; matching is case-insensitive).
    pub fn register_format(&mut self, suffix: &str, format: Format) {
        let _ = self.formats.insert(normalize_suffix(suffix), format);
    }

    fn format_for(&self, path: &Path) -> Option<&Format> {
        let suffix = path.extension()?.to_str()?.to_lowercase();
        self.formats.get(&suffix)
    }

    /// Whether the path's suffix resolves to a format with at least one
    /// reader.
    #[must_use]
    pub fn can_read(&self, path: &Path) -> bool {
        self.format_for(path)
            .is_some_and(|format| !format.readers.is_empty())
    }

    /// Whether the path's suffix resolves to a format with at least one
    /// writer.
    #[must_use]
    pub fn can_write(&self, path: &Path) -> bool {
        self.format_for(path)
            .is_some_and(|format| !format.writers.is_empty())
    }

    /// Resolve the reader constructor for a path. The first
    /// `preferred_names` entry matching a registered reader wins;
    /// otherwise the format's default is used.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnreadableFile`] when the suffix has no registered
    /// format or the format has zero readers.
    pub fn reader(
        &self,
        path: &Path,
        preferred_names: &[&str],
    ) -> Result<ReaderConstructor, SceneError> {
        let unreadable =
            || SceneError::UnreadableFile(path.display().to_string());
        let format = self
            .format_for(path)
            .filter(|format| !format.readers.is_empty())
            .ok_or_else(unreadable)?;

        for name in preferred_names {
            if let Some(constructor) = format.readers.get(*name) {
                return Ok(*constructor);
            }
        }
        format
            .default_reader
            .as_ref()
            .and_then(|name| format.readers.get(name))
            .or_else(|| format.readers.values().next())
            .copied()
            .ok_or_else(unreadable)
    }

    /// Instantiate a reader for the path and register it into the active
    /// scene's `sources` group under the file stem.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnreadableFile`] on resolution failure; any error
    /// from the reader constructor.
    pub fn create(
        &self,
        registry: &SceneRegistry,
        path: &Path,
        preferred_names: &[&str],
    ) -> Result<SharedSource, SceneError> {
        let constructor = self.reader(path, preferred_names)?;
        let source = constructor(path)?;
        let name = source_name(path);
        log::debug!("created reader for '{}' as '{name}'", path.display());
        let _ = registry.register(|scene| {
            scene.sources_mut().register(name.as_str(), Rc::clone(&source));
        });
        Ok(source)
    }

    /// Instantiate a reader, update it and return its dataset.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`].
    pub fn read(
        &self,
        registry: &SceneRegistry,
        path: &Path,
        preferred_names: &[&str],
    ) -> Result<Rc<DataSet>, SceneError> {
        let source = self.create(registry, path, preferred_names)?;
        let output = {
            let mut source = source.borrow_mut();
            source.update();
            source.output()
        };
        Ok(output)
    }

    /// Resolve the writer constructor for a path, honoring the
    /// preference order.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnwritableFile`] when the suffix has no registered
    /// format or the format has zero writers.
    pub fn writer(
        &self,
        path: &Path,
        preferred_names: &[&str],
    ) -> Result<WriterConstructor, SceneError> {
        let unwritable =
            || SceneError::UnwritableFile(path.display().to_string());
        let format = self
            .format_for(path)
            .filter(|format| !format.writers.is_empty())
            .ok_or_else(unwritable)?;

        for name in preferred_names {
            if let Some(constructor) = format.writers.get(*name) {
                return Ok(*constructor);
            }
        }
        format
            .default_writer
            .as_ref()
            .and_then(|name| format.writers.get(name))
            .or_else(|| format.writers.values().next())
            .copied()
            .ok_or_else(unwritable)
    }

    /// Write a dataset to the path with the resolved writer.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnwritableFile`] on resolution failure; any error
    /// from the writer itself.
    pub fn write(
        &self,
        dataset: &DataSet,
        path: &Path,
        preferred_names: &[&str],
    ) -> Result<(), SceneError> {
        let constructor = self.writer(path, preferred_names)?;
        constructor(path)?.write(dataset)
    }

    /// Union of every format's reader names, sorted.
    #[must_use]
    pub fn reader_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .formats
            .values()
            .flat_map(|format| format.reader_names().map(str::to_owned))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Union of every format's writer names, sorted.
    #[must_use]
    pub fn writer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .formats
            .values()
            .flat_map(|format| format.writer_names().map(str::to_owned))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Registered suffixes (with leading dot), sorted.
    #[must_use]
    pub fn suffixes(&self) -> Vec<String> {
        let mut suffixes: Vec<String> =
            self.formats.keys().map(|s| format!(".{s}")).collect();
        suffixes.sort();
        suffixes
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::engine::data::DataArray;
    use crate::engine::source::DataSource;

    struct StubReader {
        data: Rc<DataSet>,
        marker: f64,
    }

    impl DataSource for StubReader {
        fn update(&mut self) {}

        fn update_time_step(&mut self, _time: f64) {}

        fn output(&self) -> Rc<DataSet> {
            Rc::clone(&self.data)
        }

        fn time_steps(&self) -> Vec<f64> {
            Vec::new()
        }

        fn time_value(&self) -> f64 {
            self.marker
        }
    }

    fn stub(marker: f64) -> SharedSource {
        let mut data = DataSet::new();
        data.field_data_mut()
            .add(DataArray::new("marker", 1, vec![marker]));
        Rc::new(RefCell::new(StubReader {
            data: Rc::new(data),
            marker,
        }))
    }

    fn default_reader(_path: &Path) -> Result<SharedSource, SceneError> {
        Ok(stub(0.0))
    }

    fn alternate_reader(_path: &Path) -> Result<SharedSource, SceneError> {
        Ok(stub(1.0))
    }

    fn registry_with_grid() -> FormatRegistry {
        let mut formats = FormatRegistry::new();
        formats.register_format(
            ".grid",
            Format::new()
                .with_reader("Native", default_reader)
                .with_reader("Alternate", alternate_reader),
        );
        formats
    }

    #[test]
    fn default_reader_wins_without_preference() {
        let formats = registry_with_grid();
        let registry = SceneRegistry::new();
        let source = formats
            .create(&registry, Path::new("data/flow.grid"), &[])
            .unwrap();
        assert_eq!(source.borrow().time_value(), 0.0);
    }

    #[test]
    fn preferred_name_overrides_default() {
        let formats = registry_with_grid();
        let registry = SceneRegistry::new();
        let source = formats
            .create(
                &registry,
                Path::new("data/flow.grid"),
                &["Missing", "Alternate"],
            )
            .unwrap();
        assert_eq!(source.borrow().time_value(), 1.0);
    }

    #[test]
    fn created_source_registers_under_file_stem() {
        let formats = registry_with_grid();
        let registry = SceneRegistry::new();
        let _source = formats
            .create(&registry, Path::new("data/flow.grid"), &[])
            .unwrap();
        let scene = registry.active_scene().unwrap();
        assert!(scene.borrow().sources().contains("flow"));
    }

    #[test]
    fn unknown_suffix_is_unreadable() {
        let formats = registry_with_grid();
        assert!(!formats.can_read(Path::new("flow.xyz")));
        let err = formats
            .reader(Path::new("flow.xyz"), &[])
            .unwrap_err();
        assert!(matches!(err, SceneError::UnreadableFile(_)));
    }

    #[test]
    fn format_without_readers_is_unreadable() {
        let mut formats = FormatRegistry::new();
        formats.register_format("empty", Format::new());
        let err = formats
            .reader(Path::new("flow.empty"), &[])
            .unwrap_err();
        assert!(matches!(err, SceneError::UnreadableFile(_)));
    }

    #[test]
    fn read_returns_the_dataset() {
        let formats = registry_with_grid();
        let registry = SceneRegistry::new();
        let dataset = formats
            .read(&registry, Path::new("flow.grid"), &[])
            .unwrap();
        assert!(dataset.field_data().contains("marker"));
    }

    #[test]
    fn suffix_matching_is_case_insensitive() {
        let formats = registry_with_grid();
        assert!(formats.can_read(Path::new("FLOW.GRID")));
        assert_eq!(formats.suffixes(), [".grid"]);
    }

    #[test]
    fn introspection_lists_names() {
        let formats = registry_with_grid();
        assert_eq!(formats.reader_names(), ["Alternate", "Native"]);
        assert!(formats.writer_names().is_empty());
        assert!(!formats.can_write(Path::new("flow.grid")));
    }
}
