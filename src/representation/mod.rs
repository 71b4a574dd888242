//! Representations: data sources bound to renderable, color-mapped
//! visuals.
//!
//! A representation owns the extraction stage, the mapper and a single
//! renderable actor shared by every view showing it. The
//! [`RepresentationGroup`] owned by each view is the one place where the
//! bidirectional representation↔view relationship is established or torn
//! down; no other code path may mutate either side's membership
//! independently without risking desynchronization.

mod geometry;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use geometry::GeometryRepresentation;

use crate::engine::data::DataSet;
use crate::engine::render::SharedActor;
use crate::engine::source::Input;
use crate::error::SceneError;
use crate::field::FieldLocation;
use crate::scene::{Group, GroupKind, SceneRegistry, SharedScene};
use crate::view::{RenderView, ViewLink};

/// Shared handle to a representation.
pub type SharedRepresentation = Rc<RefCell<dyn Representation>>;

/// Constructor registered per representation kind.
pub type RepresentationConstructor = fn(
    &SceneRegistry,
    Input,
    Option<String>,
) -> Result<SharedRepresentation, SceneError>;

/// The closed set of representation kinds.
///
/// The registry's factory map is keyed by this enum and stays open for
/// future variants through
/// [`SceneRegistry::register_representation_kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    /// Surface geometry extraction.
    Geometry,
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry => f.write_str("Geometry"),
        }
    }
}

/// Constructor for [`RepresentationKind::Geometry`], registered with
/// every new registry.
///
/// # Errors
///
/// Infallible today; the signature matches
/// [`RepresentationConstructor`].
pub fn geometry_constructor(
    registry: &SceneRegistry,
    input: Input,
    name: Option<String>,
) -> Result<SharedRepresentation, SceneError> {
    Ok(GeometryRepresentation::new(registry, input, name))
}

// ---------------------------------------------------------------------------
// ColorBy
// ---------------------------------------------------------------------------

/// Settings for [`Representation::color_by`].
#[derive(Clone, Copy, Debug)]
pub struct ColorBy<'a> {
    /// Explicit field location; `None` resolves from the data (point,
    /// then cell, then dataset-wide).
    pub location: Option<FieldLocation>,
    /// Preset to apply to the field's lookup table.
    pub preset: Option<&'a str>,
    /// Re-pull the data and rescale the table to the array's range.
    pub reset_range: bool,
    /// Map scalars through the table instead of using raw component
    /// values as colors.
    pub map_scalar: bool,
}

impl Default for ColorBy<'_> {
    fn default() -> Self {
        Self {
            location: None,
            preset: None,
            reset_range: false,
            map_scalar: true,
        }
    }
}

/// Array names present on a representation's data, per location.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AvailableFields {
    /// Arrays on points.
    pub point_data: Vec<String>,
    /// Arrays on cells.
    pub cell_data: Vec<String>,
    /// Dataset-wide arrays.
    pub field_data: Vec<String>,
}

// ---------------------------------------------------------------------------
// Representation
// ---------------------------------------------------------------------------

/// The binding of a data source to a renderable, color-mapped visual.
pub trait Representation {
    /// Name (the registry key in `representations`).
    fn name(&self) -> &str;

    /// The scene that was active when this representation was
    /// constructed.
    fn scene(&self) -> Option<SharedScene>;

    /// The renderable actor: a singleton shared by every view showing
    /// this representation, never duplicated per view.
    fn actor(&self) -> SharedActor;

    /// Links to the views currently displaying this representation.
    fn view_links(&self) -> &[ViewLink];

    /// Record membership in a view and insert the shared actor into its
    /// renderer. Attaching an already-present view is a no-op.
    fn attach_view(&mut self, link: ViewLink);

    /// Drop membership in a view and remove the shared actor from its
    /// renderer. Detaching an absent view is a benign no-op: "already
    /// removed" is a valid end state.
    fn detach_view(&mut self, link: &ViewLink);

    /// Last-applied time value (NaN when none).
    fn time_value(&self) -> f64;

    /// Store the time value applied by the next update.
    fn set_time_value(&mut self, time: f64);

    /// Time steps reported by the upstream source.
    fn time_values(&self) -> Vec<f64>;

    /// Advance the upstream source (to `time_value` when given, else the
    /// stored time), re-snapshot its output when it changed, and return
    /// the current output data object.
    fn update(&mut self, time_value: Option<f64>) -> Rc<DataSet>;

    /// Drive scalar coloring by a named field; `None`/empty disables
    /// scalar coloring entirely.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownPreset`] when the settings name a preset the
    /// catalog does not know.
    fn color_by(
        &mut self,
        registry: &SceneRegistry,
        field_name: Option<&str>,
        settings: &ColorBy<'_>,
    ) -> Result<(), SceneError>;

    /// Per-location array names on the current data, for populating
    /// selection UI.
    fn available_fields(&mut self) -> AvailableFields;

    /// The views currently displaying this representation.
    fn views(&self) -> Vec<RenderView> {
        self.view_links().iter().filter_map(ViewLink::view).collect()
    }

    /// Whether the representation is shown in the given view.
    fn shown_in(&self, view: &RenderView) -> bool {
        self.view_links().iter().any(|link| link.is(view))
    }

    /// Attach to a view (idempotent).
    fn add_view(&mut self, view: &RenderView) {
        self.attach_view(view.link());
    }

    /// Detach from a view (no-op when absent).
    fn remove_view(&mut self, view: &RenderView) {
        self.detach_view(&view.link());
    }
}

// ---------------------------------------------------------------------------
// RepresentationGroup
// ---------------------------------------------------------------------------

/// Group specialization owned by a view: inserting or removing a
/// representation also attaches/detaches it from the owning view, keeping
/// the representation's view set and the view's group in sync.
pub struct RepresentationGroup {
    link: ViewLink,
    entries: Group<SharedRepresentation>,
}

impl RepresentationGroup {
    pub(crate) fn new(link: ViewLink) -> Self {
        Self {
            link,
            entries: Group::new(GroupKind::Representations),
        }
    }

    /// Add a representation under its own name, linking it to the owning
    /// view. Registering an existing name overwrites the entry.
    pub fn register(&mut self, representation: &SharedRepresentation) {
        representation.borrow_mut().attach_view(self.link.clone());
        let name = representation.borrow().name().to_owned();
        self.entries.register(name, Rc::clone(representation));
    }

    /// Remove a representation by name, unlinking it from the owning
    /// view.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotInGroup`] when the name is absent.
    pub fn unregister(
        &mut self,
        name: &str,
    ) -> Result<SharedRepresentation, SceneError> {
        let representation = self.entries.unregister(name)?;
        representation.borrow_mut().detach_view(&self.link);
        Ok(representation)
    }

    /// Unlink and drop every member.
    pub fn unregister_all(&mut self) {
        let members: Vec<SharedRepresentation> =
            self.entries.values().cloned().collect();
        for representation in members {
            representation.borrow_mut().detach_view(&self.link);
        }
        self.entries.clear();
    }

    /// Read access to an entry.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SharedRepresentation> {
        self.entries.get(name)
    }

    /// Cloned handle to an entry.
    #[must_use]
    pub fn cloned(&self, name: &str) -> Option<SharedRepresentation> {
        self.entries.cloned(name)
    }

    /// Whether an entry with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// Entry names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.names()
    }

    /// Entries in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &SharedRepresentation> {
        self.entries.values()
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
}
