//! Context-scoped scene registry and the scene graph it manages.
//!
//! A [`Scene`] owns one [`Group`] per entity category. The
//! [`SceneRegistry`] is an explicit context object (cheap-clone handle,
//! single-threaded): it owns every scene by name plus the active-scene
//! stack, and every scene object created while a scene is active
//! self-registers into that scene's matching group.
//!
//! Entering a scene is the acquisition, exiting the release: code blocks
//! can build a sub-scene's contents without passing an explicit scene to
//! every constructor. [`SceneRegistry::scoped`] wraps the pair in a
//! drop-guard.

mod group;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub use group::Group;
use rustc_hash::FxHashMap;

use crate::annotation::SharedAnnotation;
use crate::engine::source::SharedSource;
use crate::lut::SharedLookupTable;
use crate::representation::{
    RepresentationConstructor, RepresentationKind, SharedRepresentation,
};
use crate::view::RenderView;

/// Shared handle to a scene.
pub type SharedScene = Rc<RefCell<Scene>>;

/// Weak back-reference captured by scene objects.
pub(crate) type WeakScene = Weak<RefCell<Scene>>;

/// Name of the scene that is created and entered with every registry.
pub const DEFAULT_SCENE: &str = "default";

// ---------------------------------------------------------------------------
// GroupKind
// ---------------------------------------------------------------------------

/// The five fixed entity categories of a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Data sources.
    Sources,
    /// Renderable representations.
    Representations,
    /// Render views.
    Views,
    /// Annotations.
    Annotations,
    /// Color lookup tables.
    Luts,
}

impl GroupKind {
    /// Every category, in scene layout order.
    pub const ALL: [Self; 5] = [
        Self::Sources,
        Self::Representations,
        Self::Views,
        Self::Annotations,
        Self::Luts,
    ];

    /// Registry label of the category.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sources => "sources",
            Self::Representations => "representations",
            Self::Views => "views",
            Self::Annotations => "annotations",
            Self::Luts => "luts",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// A named container of five typed groups of visualization entities.
///
/// The category set is fixed for the scene's whole lifetime; each group's
/// contents are mutable. Scenes are created only through
/// [`SceneRegistry::scene`].
pub struct Scene {
    name: String,
    sources: Group<SharedSource>,
    representations: Group<SharedRepresentation>,
    views: Group<RenderView>,
    annotations: Group<SharedAnnotation>,
    luts: Group<SharedLookupTable>,
}

impl Scene {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            sources: Group::new(GroupKind::Sources),
            representations: Group::new(GroupKind::Representations),
            views: Group::new(GroupKind::Views),
            annotations: Group::new(GroupKind::Annotations),
            luts: Group::new(GroupKind::Luts),
        }
    }

    /// Scene name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data sources registered in this scene.
    #[must_use]
    pub fn sources(&self) -> &Group<SharedSource> {
        &self.sources
    }

    /// Mutable access to the sources group.
    pub fn sources_mut(&mut self) -> &mut Group<SharedSource> {
        &mut self.sources
    }

    /// Representations registered in this scene.
    #[must_use]
    pub fn representations(&self) -> &Group<SharedRepresentation> {
        &self.representations
    }

    /// Mutable access to the representations group.
    pub fn representations_mut(
        &mut self,
    ) -> &mut Group<SharedRepresentation> {
        &mut self.representations
    }

    /// Views registered in this scene.
    #[must_use]
    pub fn views(&self) -> &Group<RenderView> {
        &self.views
    }

    /// Mutable access to the views group.
    pub fn views_mut(&mut self) -> &mut Group<RenderView> {
        &mut self.views
    }

    /// Annotations registered in this scene.
    #[must_use]
    pub fn annotations(&self) -> &Group<SharedAnnotation> {
        &self.annotations
    }

    /// Mutable access to the annotations group.
    pub fn annotations_mut(&mut self) -> &mut Group<SharedAnnotation> {
        &mut self.annotations
    }

    /// Lookup tables registered in this scene, keyed by field name.
    #[must_use]
    pub fn luts(&self) -> &Group<SharedLookupTable> {
        &self.luts
    }

    /// Mutable access to the lookup-table group.
    pub fn luts_mut(&mut self) -> &mut Group<SharedLookupTable> {
        &mut self.luts
    }

    /// Drop every entry from every group.
    ///
    /// No cross-object cleanup is performed: callers are responsible for
    /// severing representation/view links beforehand.
    pub fn clear(&mut self) {
        self.sources.clear();
        self.representations.clear();
        self.views.clear();
        self.annotations.clear();
        self.luts.clear();
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("sources", &self.sources.len())
            .field("representations", &self.representations.len())
            .field("views", &self.views.len())
            .field("annotations", &self.annotations.len())
            .field("luts", &self.luts.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// SceneRegistry
// ---------------------------------------------------------------------------

struct RegistryInner {
    scenes: FxHashMap<String, SharedScene>,
    stack: Vec<SharedScene>,
    constructors: FxHashMap<RepresentationKind, RepresentationConstructor>,
    representation_count: usize,
    view_count: usize,
}

/// The context object owning scenes and the active-scene stack.
///
/// Cloning yields another handle to the same registry. Independent
/// registries carry independent scene stacks, so tests (or embedders) can
/// run several side by side.
#[derive(Clone)]
pub struct SceneRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl SceneRegistry {
    /// New registry with a `"default"` scene created and entered, and the
    /// [`RepresentationKind::Geometry`] constructor registered.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                scenes: FxHashMap::default(),
                stack: Vec::new(),
                constructors: FxHashMap::default(),
                representation_count: 0,
                view_count: 0,
            })),
        };
        registry.register_representation_kind(
            RepresentationKind::Geometry,
            crate::representation::geometry_constructor,
        );
        let default = registry.scene(DEFAULT_SCENE);
        registry.enter(&default);
        registry
    }

    /// The scene registered under `name`, lazily creating an empty one.
    #[must_use]
    pub fn scene(&self, name: &str) -> SharedScene {
        let mut inner = self.inner.borrow_mut();
        if let Some(scene) = inner.scenes.get(name) {
            return Rc::clone(scene);
        }
        log::trace!("creating scene '{name}'");
        let scene = Rc::new(RefCell::new(Scene::new(name)));
        let _ = inner.scenes.insert(name.to_owned(), Rc::clone(&scene));
        scene
    }

    /// Names of every registered scene, sorted.
    #[must_use]
    pub fn scene_names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.inner.borrow().scenes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Push a scene onto the active-scene stack.
    pub fn enter(&self, scene: &SharedScene) {
        log::trace!("enter scene '{}'", scene.borrow().name());
        self.inner.borrow_mut().stack.push(Rc::clone(scene));
    }

    /// Pop the stack top iff it is the given scene.
    ///
    /// A mismatched exit performs no mutation: this guards against
    /// double-exit, at the cost of swallowing exit-without-matching-enter.
    pub fn exit(&self, scene: &SharedScene) {
        let mut inner = self.inner.borrow_mut();
        let is_top = inner
            .stack
            .last()
            .is_some_and(|top| Rc::ptr_eq(top, scene));
        if is_top {
            let _ = inner.stack.pop();
            log::trace!("exit scene '{}'", scene.borrow().name());
        } else {
            log::trace!(
                "ignoring exit of non-active scene '{}'",
                scene.borrow().name()
            );
        }
    }

    /// Enter a scene and return a guard that exits it on drop.
    ///
    /// The tolerant [`Self::exit`] makes a guard safe to combine with a
    /// manual exit of the same scene.
    #[must_use = "the guard exits the scene when dropped"]
    pub fn scoped(&self, scene: &SharedScene) -> SceneGuard {
        self.enter(scene);
        SceneGuard {
            registry: self.clone(),
            scene: Rc::clone(scene),
        }
    }

    /// The top of the active-scene stack, or `None` when the stack is
    /// empty.
    #[must_use]
    pub fn active_scene(&self) -> Option<SharedScene> {
        self.inner.borrow().stack.last().cloned()
    }

    /// Depth of the active-scene stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.inner.borrow().stack.len()
    }

    /// Self-registration seam called by every scene object at
    /// construction: runs `register_fn` against the active scene and
    /// returns it, or does nothing when no scene is active.
    pub fn register(
        &self,
        register_fn: impl FnOnce(&mut Scene),
    ) -> Option<SharedScene> {
        let scene = self.active_scene()?;
        register_fn(&mut scene.borrow_mut());
        Some(scene)
    }

    /// Register (or replace) the constructor for a representation kind.
    pub fn register_representation_kind(
        &self,
        kind: RepresentationKind,
        constructor: RepresentationConstructor,
    ) {
        let _ = self.inner.borrow_mut().constructors.insert(kind, constructor);
    }

    /// The registered constructor for a representation kind.
    #[must_use]
    pub fn representation_constructor(
        &self,
        kind: RepresentationKind,
    ) -> Option<RepresentationConstructor> {
        self.inner.borrow().constructors.get(&kind).copied()
    }

    /// Next auto-generated representation name.
    pub(crate) fn next_representation_name(&self) -> String {
        let mut inner = self.inner.borrow_mut();
        inner.representation_count += 1;
        format!("representation_{}", inner.representation_count)
    }

    /// Next auto-generated view name.
    pub(crate) fn next_view_name(&self) -> String {
        let mut inner = self.inner.borrow_mut();
        inner.view_count += 1;
        format!("renderview_{}", inner.view_count)
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SceneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SceneRegistry")
            .field("scenes", &inner.scenes.len())
            .field("depth", &inner.stack.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// SceneGuard
// ---------------------------------------------------------------------------

/// Scoped-acquisition wrapper around enter/exit: exits its scene when
/// dropped.
pub struct SceneGuard {
    registry: SceneRegistry,
    scene: SharedScene,
}

impl SceneGuard {
    /// The scene this guard entered.
    #[must_use]
    pub fn scene(&self) -> &SharedScene {
        &self.scene
    }
}

impl Drop for SceneGuard {
    fn drop(&mut self) {
        self.registry.exit(&self.scene);
    }
}
