//! Render views: a native render surface plus the representations drawn
//! into it.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::engine::render::{RenderWindow, Renderer, SharedRenderer};
use crate::engine::source::Input;
use crate::error::SceneError;
use crate::options::ViewOptions;
use crate::representation::{
    Representation, RepresentationGroup, RepresentationKind,
    SharedRepresentation,
};
use crate::scene::{SceneRegistry, SharedScene, WeakScene};

struct ViewState {
    name: String,
    scene: Option<WeakScene>,
    representations: RepresentationGroup,
    renderer: SharedRenderer,
    render_window: RenderWindow,
    time_value: f64,
}

// ---------------------------------------------------------------------------
// ViewLink
// ---------------------------------------------------------------------------

/// Link between a representation and one view displaying it.
///
/// Holds the view identity weakly (membership must not keep a dropped
/// view alive) plus a strong handle to its renderer so attach/detach can
/// move the shared actor without touching the view's own state.
#[derive(Clone)]
pub struct ViewLink {
    view: Weak<RefCell<ViewState>>,
    renderer: SharedRenderer,
}

impl ViewLink {
    /// The linked view, when still alive.
    #[must_use]
    pub fn view(&self) -> Option<RenderView> {
        self.view.upgrade().map(|inner| RenderView { inner })
    }

    /// Renderer of the linked view.
    #[must_use]
    pub fn renderer(&self) -> &SharedRenderer {
        &self.renderer
    }

    /// Whether two links point at the same view.
    #[must_use]
    pub fn same_view(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.view, &other.view)
    }

    /// Whether this link points at the given view.
    #[must_use]
    pub fn is(&self, view: &RenderView) -> bool {
        self.view
            .upgrade()
            .is_some_and(|inner| Rc::ptr_eq(&inner, &view.inner))
    }
}

// ---------------------------------------------------------------------------
// RenderView
// ---------------------------------------------------------------------------

/// Cheap-clone handle to a render view.
///
/// A view owns a renderer, an (off-screen by default) render window and
/// the membership set of representations shown in it. Registers itself
/// into the active scene's `views` group on construction.
#[derive(Clone)]
pub struct RenderView {
    inner: Rc<RefCell<ViewState>>,
}

impl RenderView {
    /// New view with default options and an auto-generated name
    /// (`renderview_{n}`).
    #[must_use]
    pub fn new(registry: &SceneRegistry) -> Self {
        Self::with_options(registry, None, &ViewOptions::default())
    }

    /// New view with default options and an explicit name.
    #[must_use]
    pub fn named(registry: &SceneRegistry, name: &str) -> Self {
        Self::with_options(registry, Some(name), &ViewOptions::default())
    }

    /// New view with explicit options.
    #[must_use]
    pub fn with_options(
        registry: &SceneRegistry,
        name: Option<&str>,
        options: &ViewOptions,
    ) -> Self {
        let name =
            name.map_or_else(|| registry.next_view_name(), str::to_owned);

        let renderer: SharedRenderer =
            Rc::new(RefCell::new(Renderer::new(options.background)));
        let mut render_window =
            RenderWindow::new(options.off_screen_rendering);
        render_window.add_renderer(&renderer);

        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<ViewState>>| {
            RefCell::new(ViewState {
                name: name.clone(),
                scene: None,
                representations: RepresentationGroup::new(ViewLink {
                    view: weak.clone(),
                    renderer: Rc::clone(&renderer),
                }),
                renderer,
                render_window,
                time_value: f64::NAN,
            })
        });
        let view = Self { inner };

        let scene = registry.register(|scene| {
            scene.views_mut().register(name.as_str(), view.clone());
        });
        view.inner.borrow_mut().scene = scene.as_ref().map(Rc::downgrade);
        view
    }

    /// View name (its registry key in `views`).
    #[must_use]
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// The scene that was active when this view was constructed.
    #[must_use]
    pub fn scene(&self) -> Option<SharedScene> {
        self.inner.borrow().scene.as_ref().and_then(Weak::upgrade)
    }

    /// Renderer owning this view's actor set.
    #[must_use]
    pub fn renderer(&self) -> SharedRenderer {
        Rc::clone(&self.inner.borrow().renderer)
    }

    /// Link describing this view for representation membership.
    #[must_use]
    pub fn link(&self) -> ViewLink {
        ViewLink {
            view: Rc::downgrade(&self.inner),
            renderer: self.renderer(),
        }
    }

    /// Pointer identity between two view handles.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Resolve a representation kind through the registry's factory map,
    /// construct the representation over `input` and add it to this view.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownRepresentation`] when no constructor is
    /// registered for `kind`; any error from the constructor itself.
    pub fn create_representation(
        &self,
        registry: &SceneRegistry,
        input: impl Into<Input>,
        name: Option<&str>,
        kind: RepresentationKind,
    ) -> Result<SharedRepresentation, SceneError> {
        let constructor =
            registry.representation_constructor(kind).ok_or_else(|| {
                SceneError::UnknownRepresentation(kind.to_string())
            })?;
        let representation =
            constructor(registry, input.into(), name.map(str::to_owned))?;
        self.add_representation(&representation);
        Ok(representation)
    }

    /// Add a representation to this view, cross-linking both sides and
    /// inserting its shared actor into the renderer.
    pub fn add_representation(
        &self,
        representation: &SharedRepresentation,
    ) {
        self.inner
            .borrow_mut()
            .representations
            .register(representation);
    }

    /// Remove a representation by name, severing the cross-link and
    /// removing its actor from the renderer.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotInGroup`] when no representation with that name
    /// is shown in this view.
    pub fn remove_representation(
        &self,
        name: &str,
    ) -> Result<SharedRepresentation, SceneError> {
        self.inner.borrow_mut().representations.unregister(name)
    }

    /// Remove every representation from this view.
    pub fn clear_representations(&self) {
        self.inner.borrow_mut().representations.unregister_all();
    }

    /// Handle to a member representation.
    #[must_use]
    pub fn representation(
        &self,
        name: &str,
    ) -> Option<SharedRepresentation> {
        self.inner.borrow().representations.cloned(name)
    }

    /// Whether a representation with the given name is shown here.
    #[must_use]
    pub fn contains_representation(&self, name: &str) -> bool {
        self.inner.borrow().representations.contains(name)
    }

    /// Names of the member representations, in registration order.
    #[must_use]
    pub fn representation_names(&self) -> Vec<String> {
        self.inner
            .borrow()
            .representations
            .names()
            .map(str::to_owned)
            .collect()
    }

    /// Number of member representations.
    #[must_use]
    pub fn representation_count(&self) -> usize {
        self.inner.borrow().representations.len()
    }

    /// Fit the camera to the current scene bounds (delegates to the
    /// native renderer).
    pub fn reset_camera(&self) {
        let renderer = self.renderer();
        renderer.borrow_mut().reset_camera();
    }

    /// Current time value (NaN when none was applied).
    #[must_use]
    pub fn time_value(&self) -> f64 {
        self.inner.borrow().time_value
    }

    /// Sorted, deduplicated union of every member representation's time
    /// steps.
    #[must_use]
    pub fn time_values(&self) -> Vec<f64> {
        let members: Vec<SharedRepresentation> = self
            .inner
            .borrow()
            .representations
            .values()
            .cloned()
            .collect();

        let mut values: Vec<f64> = members
            .iter()
            .flat_map(|rep| rep.borrow().time_values())
            .filter(|t| !t.is_nan())
            .collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        values.dedup();
        values
    }

    /// Store `time_value` as current when given, then update every
    /// member representation in registration order.
    pub fn update(&self, time_value: Option<f64>) {
        if let Some(time) = time_value {
            self.inner.borrow_mut().time_value = time;
        }
        let (members, time) = {
            let state = self.inner.borrow();
            let members: Vec<SharedRepresentation> =
                state.representations.values().cloned().collect();
            (members, state.time_value)
        };
        for representation in members {
            let _ = representation.borrow_mut().update(Some(time));
        }
    }

    /// Update (only when a time value is given) and present the window.
    pub fn render(&self, time_value: Option<f64>) {
        if time_value.is_some() {
            self.update(time_value);
        }
        self.inner.borrow_mut().render_window.render();
    }

    /// Number of completed render calls on this view's window.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.inner.borrow().render_window.render_count()
    }
}

impl PartialEq for RenderView {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for RenderView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("RenderView")
            .field("name", &state.name)
            .field("representations", &state.representations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::data::{DataArray, DataSet};
    use crate::engine::source::{DataSource, MemorySource};
    use crate::representation::ColorBy;

    fn pressure_grid() -> DataSet {
        let mut ds = DataSet::new();
        ds.set_bounds([0.0, 9.0, 0.0, 9.0, 0.0, 0.0]);
        let values: Vec<f64> =
            (0..100).map(|i| f64::from(i) * 5.0 / 99.0).collect();
        ds.point_data_mut()
            .add(DataArray::new("pressure", 1, values));
        ds
    }

    #[test]
    fn view_registers_with_auto_name() {
        let registry = SceneRegistry::new();
        let view = RenderView::new(&registry);
        assert_eq!(view.name(), "renderview_1");
        let scene = registry.active_scene().unwrap();
        assert!(scene.borrow().views().contains("renderview_1"));
    }

    #[test]
    fn create_representation_cross_links_both_sides() {
        let registry = SceneRegistry::new();
        let view = RenderView::new(&registry);
        let rep = view
            .create_representation(
                &registry,
                pressure_grid(),
                Some("grid"),
                RepresentationKind::Geometry,
            )
            .unwrap();

        assert!(view.contains_representation("grid"));
        assert!(rep.borrow().shown_in(&view));
        let actor = rep.borrow().actor();
        assert!(view.renderer().borrow().has_actor(&actor));
    }

    #[test]
    fn remove_representation_severs_both_sides() {
        let registry = SceneRegistry::new();
        let view = RenderView::new(&registry);
        let rep = view
            .create_representation(
                &registry,
                pressure_grid(),
                Some("grid"),
                RepresentationKind::Geometry,
            )
            .unwrap();

        let removed = view.remove_representation("grid").unwrap();
        assert!(Rc::ptr_eq(&removed, &rep));
        assert!(!view.contains_representation("grid"));
        assert!(rep.borrow().views().is_empty());
        let actor = rep.borrow().actor();
        assert!(!view.renderer().borrow().has_actor(&actor));

        // Strict group contract: removing again is an error.
        assert!(matches!(
            view.remove_representation("grid"),
            Err(SceneError::NotInGroup { .. })
        ));
    }

    #[test]
    fn representation_shared_between_two_views() {
        let registry = SceneRegistry::new();
        let left = RenderView::new(&registry);
        let right = RenderView::new(&registry);
        let rep = left
            .create_representation(
                &registry,
                pressure_grid(),
                Some("grid"),
                RepresentationKind::Geometry,
            )
            .unwrap();
        right.add_representation(&rep);

        assert_eq!(rep.borrow().views().len(), 2);
        let actor = rep.borrow().actor();
        assert!(left.renderer().borrow().has_actor(&actor));
        assert!(right.renderer().borrow().has_actor(&actor));
        // One shared actor, never duplicated per view.
        assert_eq!(left.renderer().borrow().actors().len(), 1);
        assert_eq!(right.renderer().borrow().actors().len(), 1);
    }

    #[test]
    fn time_values_union_is_sorted_and_deduplicated() {
        let registry = SceneRegistry::new();
        let view = RenderView::new(&registry);

        let a = MemorySource::new(&registry, "a", DataSet::new());
        a.borrow_mut().set_time_series(vec![
            (0.0, DataSet::new()),
            (1.0, DataSet::new()),
            (2.0, DataSet::new()),
        ]);
        let b = MemorySource::new(&registry, "b", DataSet::new());
        b.borrow_mut().set_time_series(vec![
            (1.0, DataSet::new()),
            (3.0, DataSet::new()),
        ]);

        let _ = view
            .create_representation(
                &registry,
                a,
                None,
                RepresentationKind::Geometry,
            )
            .unwrap();
        let _ = view
            .create_representation(
                &registry,
                b,
                None,
                RepresentationKind::Geometry,
            )
            .unwrap();

        assert_eq!(view.time_values(), [0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn update_propagates_time_to_members() {
        let registry = SceneRegistry::new();
        let view = RenderView::new(&registry);
        let source = MemorySource::new(&registry, "a", DataSet::new());
        source.borrow_mut().set_time_series(vec![
            (0.0, DataSet::new()),
            (1.0, DataSet::new()),
        ]);
        let rep = view
            .create_representation(
                &registry,
                source.clone(),
                None,
                RepresentationKind::Geometry,
            )
            .unwrap();

        view.update(Some(1.0));
        assert_eq!(view.time_value(), 1.0);
        assert_eq!(rep.borrow().time_value(), 1.0);
        assert_eq!(source.borrow().time_value(), 1.0);

        // A bare update keeps the stored time.
        view.update(None);
        assert_eq!(rep.borrow().time_value(), 1.0);
    }

    #[test]
    fn render_counts_and_optionally_updates() {
        let registry = SceneRegistry::new();
        let view = RenderView::new(&registry);
        assert_eq!(view.render_count(), 0);
        view.render(None);
        assert_eq!(view.render_count(), 1);
        view.render(Some(0.5));
        assert_eq!(view.render_count(), 2);
        assert_eq!(view.time_value(), 0.5);
    }

    #[test]
    fn end_to_end_pressure_coloring() {
        let registry = SceneRegistry::new();
        let scene = registry.scene("analysis");
        let _guard = registry.scoped(&scene);

        let view = RenderView::new(&registry);
        let rep = view
            .create_representation(
                &registry,
                pressure_grid(),
                Some("grid"),
                RepresentationKind::Geometry,
            )
            .unwrap();

        rep.borrow_mut()
            .color_by(&registry, Some("pressure"), &ColorBy::default())
            .unwrap();

        let lut = scene.borrow().luts().cloned("pressure").unwrap();
        assert_eq!(lut.borrow().scalar_range(), [0.0, 5.0]);

        let before: Vec<f64> =
            lut.borrow().points().iter().map(|p| p.x).collect();
        lut.borrow_mut().rescale(2.0, 8.0);
        assert_eq!(lut.borrow().scalar_range(), [2.0, 8.0]);
        for (x0, x1) in before
            .iter()
            .zip(lut.borrow().points().iter().map(|p| p.x))
        {
            let expected = (x0 - 0.0) * (8.0 - 2.0) / (5.0 - 0.0) + 2.0;
            assert!((x1 - expected).abs() < 1e-12);
        }
    }
}
