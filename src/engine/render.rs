//! Rendering side of the pipeline facade: filters, mappers, actors,
//! renderers and render windows.
//!
//! These types hold exactly the state the scene layer manipulates through
//! the native engine's command surface (add/remove actor, array selection,
//! lookup-table binding, camera fit). Geometry extraction and
//! rasterization happen behind them in the external engine.

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec3;

use crate::engine::data::DataSet;
use crate::field::FieldLocation;
use crate::lut::SharedLookupTable;

// ---------------------------------------------------------------------------
// SurfaceFilter
// ---------------------------------------------------------------------------

/// Extraction stage between a representation's input and its mapper.
///
/// The native engine performs the actual surface extraction; this facade
/// passes the dataset through unchanged.
#[derive(Clone, Debug, Default)]
pub struct SurfaceFilter {
    input: Option<Rc<DataSet>>,
}

impl SurfaceFilter {
    /// Connect an input data object.
    pub fn set_input(&mut self, data: Rc<DataSet>) {
        self.input = Some(data);
    }

    /// The connected input, if any.
    #[must_use]
    pub fn input(&self) -> Option<Rc<DataSet>> {
        self.input.clone()
    }

    /// The extracted output (pass-through).
    #[must_use]
    pub fn output(&self) -> Option<Rc<DataSet>> {
        self.input.clone()
    }
}

// ---------------------------------------------------------------------------
// Mapper
// ---------------------------------------------------------------------------

/// Which attribute block the mapper reads its scalars from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScalarMode {
    /// Engine default (active point scalars).
    #[default]
    Default,
    /// Named array from point data.
    PointFieldData,
    /// Named array from cell data.
    CellFieldData,
    /// Named array from dataset-wide field data.
    FieldData,
}

/// How scalar values become colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MapperColorMode {
    /// Map scalars through the bound lookup table.
    #[default]
    MapScalars,
    /// Use raw component values directly as colors.
    DirectScalars,
}

/// Scalar-coloring state of a renderable.
#[derive(Clone, Default)]
pub struct Mapper {
    input: Option<Rc<DataSet>>,
    scalar_visibility: bool,
    scalar_mode: ScalarMode,
    color_mode: MapperColorMode,
    active_array: Option<String>,
    lookup_table: Option<SharedLookupTable>,
}

impl Mapper {
    /// New mapper with scalar coloring enabled and engine defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scalar_visibility: true,
            ..Self::default()
        }
    }

    /// Connect the input data object.
    pub fn set_input(&mut self, data: Rc<DataSet>) {
        self.input = Some(data);
    }

    /// The connected input, if any.
    #[must_use]
    pub fn input(&self) -> Option<Rc<DataSet>> {
        self.input.clone()
    }

    /// Whether scalars color the surface at all.
    #[must_use]
    pub fn scalar_visibility(&self) -> bool {
        self.scalar_visibility
    }

    /// Enable or disable scalar coloring. Disabled renders the actor in
    /// its flat color.
    pub fn set_scalar_visibility(&mut self, visible: bool) {
        self.scalar_visibility = visible;
    }

    /// Current scalar association.
    #[must_use]
    pub fn scalar_mode(&self) -> ScalarMode {
        self.scalar_mode
    }

    /// Current color mode.
    #[must_use]
    pub fn color_mode(&self) -> MapperColorMode {
        self.color_mode
    }

    /// Choose between lookup-table mapping and direct component colors.
    pub fn set_color_mode(&mut self, mode: MapperColorMode) {
        self.color_mode = mode;
    }

    /// Select the named array to color by.
    pub fn select_color_array(&mut self, name: &str) {
        self.active_array = Some(name.to_owned());
    }

    /// The selected color array, if any.
    #[must_use]
    pub fn active_array(&self) -> Option<&str> {
        self.active_array.as_deref()
    }

    /// Bind a lookup table.
    pub fn set_lookup_table(&mut self, lut: &SharedLookupTable) {
        self.lookup_table = Some(Rc::clone(lut));
    }

    /// The bound lookup table, if any.
    #[must_use]
    pub fn lookup_table(&self) -> Option<SharedLookupTable> {
        self.lookup_table.clone()
    }

    /// Configure the scalar association from a resolved field location.
    ///
    /// [`FieldLocation::Unavailable`] turns scalar visibility off; every
    /// other location turns it on and selects the matching attribute
    /// block.
    pub fn select_scalar_location(&mut self, location: FieldLocation) {
        match location {
            FieldLocation::PointData => {
                self.scalar_visibility = true;
                self.scalar_mode = ScalarMode::PointFieldData;
            }
            FieldLocation::CellData => {
                self.scalar_visibility = true;
                self.scalar_mode = ScalarMode::CellFieldData;
            }
            FieldLocation::FieldData => {
                self.scalar_visibility = true;
                self.scalar_mode = ScalarMode::FieldData;
            }
            FieldLocation::Unavailable => {
                self.scalar_visibility = false;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Shared handle to an actor.
pub type SharedActor = Rc<RefCell<Actor>>;

/// A renderable: a mapper plus display properties.
///
/// A representation's actor is a singleton shared by every view showing
/// it, so a property change is instantly visible everywhere.
#[derive(Clone, Default)]
pub struct Actor {
    mapper: Mapper,
    color: [f64; 3],
    visible: bool,
}

impl Actor {
    /// New actor wrapping the given mapper.
    #[must_use]
    pub fn new(mapper: Mapper) -> Self {
        Self {
            mapper,
            color: [1.0, 1.0, 1.0],
            visible: true,
        }
    }

    /// New shared actor wrapping the given mapper.
    #[must_use]
    pub fn shared(mapper: Mapper) -> SharedActor {
        Rc::new(RefCell::new(Self::new(mapper)))
    }

    /// Read access to the mapper.
    #[must_use]
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Write access to the mapper.
    pub fn mapper_mut(&mut self) -> &mut Mapper {
        &mut self.mapper
    }

    /// Flat color used when scalar coloring is off.
    #[must_use]
    pub fn color(&self) -> [f64; 3] {
        self.color
    }

    /// Set the flat color.
    pub fn set_color(&mut self, color: [f64; 3]) {
        self.color = color;
    }

    /// Whether the actor is drawn.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the actor.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

// ---------------------------------------------------------------------------
// Camera / Renderer
// ---------------------------------------------------------------------------

/// Minimal camera state the fit operation manipulates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    position: DVec3,
    focal_point: DVec3,
    view_up: DVec3,
}

impl Camera {
    /// Camera position.
    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Point the camera looks at.
    #[must_use]
    pub fn focal_point(&self) -> DVec3 {
        self.focal_point
    }

    /// Up direction.
    #[must_use]
    pub fn view_up(&self) -> DVec3 {
        self.view_up
    }

    /// Move the camera.
    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }

    /// Re-aim the camera.
    pub fn set_focal_point(&mut self, focal_point: DVec3) {
        self.focal_point = focal_point;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DVec3::Z,
            focal_point: DVec3::ZERO,
            view_up: DVec3::Y,
        }
    }
}

/// Half of the vertical view angle used by the camera fit.
const FIT_HALF_ANGLE_DEG: f64 = 15.0;

/// Shared handle to a renderer.
pub type SharedRenderer = Rc<RefCell<Renderer>>;

/// Owner of the actor set drawn into one viewport.
#[derive(Clone, Default)]
pub struct Renderer {
    actors: Vec<SharedActor>,
    background: [f64; 3],
    camera: Camera,
}

impl Renderer {
    /// New renderer with the given background color.
    #[must_use]
    pub fn new(background: [f64; 3]) -> Self {
        Self {
            actors: Vec::new(),
            background,
            camera: Camera::default(),
        }
    }

    /// Add an actor. Adding an actor already present is a no-op.
    pub fn add_actor(&mut self, actor: &SharedActor) {
        if !self.has_actor(actor) {
            self.actors.push(Rc::clone(actor));
        }
    }

    /// Remove an actor, if present.
    pub fn remove_actor(&mut self, actor: &SharedActor) {
        self.actors.retain(|a| !Rc::ptr_eq(a, actor));
    }

    /// Whether the actor is currently part of this renderer.
    #[must_use]
    pub fn has_actor(&self, actor: &SharedActor) -> bool {
        self.actors.iter().any(|a| Rc::ptr_eq(a, actor))
    }

    /// Actors in insertion order.
    #[must_use]
    pub fn actors(&self) -> &[SharedActor] {
        &self.actors
    }

    /// Background color.
    #[must_use]
    pub fn background(&self) -> [f64; 3] {
        self.background
    }

    /// Set the background color.
    pub fn set_background(&mut self, background: [f64; 3]) {
        self.background = background;
    }

    /// Read access to the camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Write access to the camera.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Fit the camera to the bounds of the visible actors' inputs,
    /// keeping the current view direction. No-op when no actor exposes
    /// bounds.
    pub fn reset_camera(&mut self) {
        let mut bounds: Option<[f64; 6]> = None;
        for actor in &self.actors {
            let actor = actor.borrow();
            if !actor.visible() {
                continue;
            }
            let Some(b) = actor.mapper().input().and_then(|d| d.bounds())
            else {
                continue;
            };
            bounds = Some(match bounds {
                None => b,
                Some(acc) => [
                    acc[0].min(b[0]),
                    acc[1].max(b[1]),
                    acc[2].min(b[2]),
                    acc[3].max(b[3]),
                    acc[4].min(b[4]),
                    acc[5].max(b[5]),
                ],
            });
        }
        let Some(b) = bounds else { return };

        let min = DVec3::new(b[0], b[2], b[4]);
        let max = DVec3::new(b[1], b[3], b[5]);
        let center = (min + max) * 0.5;
        let radius = ((max - min).length() * 0.5).max(1e-3);

        let direction = (self.camera.position - self.camera.focal_point)
            .try_normalize()
            .unwrap_or(DVec3::Z);
        let distance = radius / FIT_HALF_ANGLE_DEG.to_radians().tan();

        self.camera.set_focal_point(center);
        self.camera.set_position(center + direction * distance);
    }
}

// ---------------------------------------------------------------------------
// RenderWindow
// ---------------------------------------------------------------------------

/// The render surface a view presents into.
#[derive(Clone, Default)]
pub struct RenderWindow {
    renderers: Vec<SharedRenderer>,
    off_screen: bool,
    render_count: u64,
}

impl RenderWindow {
    /// New window, optionally off-screen.
    #[must_use]
    pub fn new(off_screen: bool) -> Self {
        Self {
            renderers: Vec::new(),
            off_screen,
            render_count: 0,
        }
    }

    /// Attach a renderer.
    pub fn add_renderer(&mut self, renderer: &SharedRenderer) {
        self.renderers.push(Rc::clone(renderer));
    }

    /// Attached renderers.
    #[must_use]
    pub fn renderers(&self) -> &[SharedRenderer] {
        &self.renderers
    }

    /// Whether the window renders off-screen.
    #[must_use]
    pub fn off_screen(&self) -> bool {
        self.off_screen
    }

    /// Present the current scene state.
    pub fn render(&mut self) {
        self.render_count += 1;
        log::trace!("render #{}", self.render_count);
    }

    /// Number of completed render calls.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.render_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_actor_is_idempotent() {
        let mut renderer = Renderer::new([0.0, 0.0, 0.0]);
        let actor = Actor::shared(Mapper::new());
        renderer.add_actor(&actor);
        renderer.add_actor(&actor);
        assert_eq!(renderer.actors().len(), 1);
        renderer.remove_actor(&actor);
        assert!(!renderer.has_actor(&actor));
    }

    #[test]
    fn select_scalar_location_drives_visibility() {
        let mut mapper = Mapper::new();
        mapper.select_scalar_location(FieldLocation::CellData);
        assert!(mapper.scalar_visibility());
        assert_eq!(mapper.scalar_mode(), ScalarMode::CellFieldData);

        mapper.select_scalar_location(FieldLocation::Unavailable);
        assert!(!mapper.scalar_visibility());
    }

    #[test]
    fn reset_camera_centers_on_bounds() {
        let mut renderer = Renderer::new([0.8, 0.8, 0.8]);
        let mut dataset = DataSet::new();
        dataset.set_bounds([0.0, 2.0, 0.0, 2.0, 0.0, 0.0]);
        let mut mapper = Mapper::new();
        mapper.set_input(Rc::new(dataset));
        let actor = Actor::shared(mapper);
        renderer.add_actor(&actor);

        renderer.reset_camera();
        assert_eq!(
            renderer.camera().focal_point(),
            DVec3::new(1.0, 1.0, 0.0)
        );
        let offset =
            renderer.camera().position() - renderer.camera().focal_point();
        assert!(offset.length() > 1.0);
    }
}
