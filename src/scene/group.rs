//! Name-keyed, insertion-ordered object groups.

use indexmap::IndexMap;

use crate::error::SceneError;
use crate::scene::GroupKind;

/// Container for objects of the same category belonging to a scene.
///
/// Names are unique within a group; registering an existing name
/// overwrites the entry in place (the original insertion position is
/// kept). Unregistering an absent name is a lookup error.
#[derive(Clone, Debug)]
pub struct Group<T> {
    kind: GroupKind,
    entries: IndexMap<String, T>,
}

impl<T> Group<T> {
    /// New empty group for a category.
    #[must_use]
    pub(crate) fn new(kind: GroupKind) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    /// The category this group holds.
    #[must_use]
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Add or replace the entry with the given name.
    pub fn register(&mut self, name: impl Into<String>, value: T) {
        let _ = self.entries.insert(name.into(), value);
    }

    /// Remove the entry with the given name, preserving the order of the
    /// remaining entries.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotInGroup`] when the name is absent.
    pub fn unregister(&mut self, name: &str) -> Result<T, SceneError> {
        self.entries.shift_remove(name).ok_or_else(|| {
            SceneError::NotInGroup {
                name: name.to_owned(),
                group: self.kind.label(),
            }
        })
    }

    /// Read access to an entry.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Write access to an entry.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries.get_mut(name)
    }

    /// Whether an entry with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entry names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entry values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the group holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> Group<T> {
    /// Cloned entry value (convenient for shared handles).
    #[must_use]
    pub fn cloned(&self, name: &str) -> Option<T> {
        self.entries.get(name).cloned()
    }
}
