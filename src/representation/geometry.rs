//! Geometry representation: surface extraction plus color mapping.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::engine::data::{DataArray, DataSet};
use crate::engine::render::{
    Actor, Mapper, MapperColorMode, SharedActor, SurfaceFilter,
};
use crate::engine::source::{DataSource, Input};
use crate::error::SceneError;
use crate::field::FieldLocation;
use crate::lut::LookupTable;
use crate::representation::{
    AvailableFields, ColorBy, Representation, SharedRepresentation,
};
use crate::scene::{SceneRegistry, SharedScene, WeakScene};
use crate::view::ViewLink;

/// Surface-extracting representation of a data source.
///
/// Static inputs connect directly to the extraction stage; pipeline
/// inputs connect by reference and are re-snapshotted (defensive copy)
/// whenever the upstream modification time advances, so downstream
/// mutation of the snapshot cannot corrupt the shared upstream.
pub struct GeometryRepresentation {
    name: String,
    scene: Option<WeakScene>,
    input: Input,
    time_value: f64,
    input_mtime: u64,
    geometry: SurfaceFilter,
    actor: SharedActor,
    views: Vec<ViewLink>,
}

impl GeometryRepresentation {
    /// Build a representation reading from `input`, register it into the
    /// active scene and perform an initial update. A missing name is
    /// auto-generated (`representation_{n}`).
    pub fn new(
        registry: &SceneRegistry,
        input: impl Into<Input>,
        name: Option<String>,
    ) -> Rc<RefCell<Self>> {
        let input = input.into();
        let name =
            name.unwrap_or_else(|| registry.next_representation_name());

        let mut geometry = SurfaceFilter::default();
        let mut mapper = Mapper::new();
        if let Input::Data(data) = &input {
            geometry.set_input(Rc::clone(data));
            mapper.set_input(Rc::clone(data));
        }

        let representation = Rc::new(RefCell::new(Self {
            name: name.clone(),
            scene: None,
            input,
            time_value: f64::NAN,
            input_mtime: 0,
            geometry,
            actor: Actor::shared(mapper),
            views: Vec::new(),
        }));
        let _ = representation.borrow_mut().pull();

        let shared: SharedRepresentation = representation.clone();
        let scene = registry.register(|scene| {
            scene.representations_mut().register(name.as_str(), shared);
        });
        representation.borrow_mut().scene =
            scene.as_ref().map(Rc::downgrade);
        representation
    }

    /// Current upstream input.
    #[must_use]
    pub fn input(&self) -> Input {
        self.input.clone()
    }

    /// Swap the upstream input. Static data reconnects the extraction
    /// stage immediately; a pipeline input reconnects on the next update.
    pub fn set_input(&mut self, input: impl Into<Input>) {
        let input = input.into();
        if self.input.same(&input) {
            return;
        }
        self.input = input;
        if let Input::Data(data) = &self.input {
            self.geometry.set_input(Rc::clone(data));
            self.actor
                .borrow_mut()
                .mapper_mut()
                .set_input(Rc::clone(data));
        }
    }

    /// Dataset currently connected to the extraction stage.
    #[must_use]
    pub fn input_data(&self) -> Option<Rc<DataSet>> {
        self.geometry.input()
    }

    /// Advance the upstream to the stored time and re-snapshot its output
    /// when the modification time advanced since the last pull.
    fn pull(&mut self) -> Rc<DataSet> {
        let source = match &self.input {
            Input::Data(data) => return Rc::clone(data),
            Input::Source(source) => Rc::clone(source),
        };

        {
            let mut source = source.borrow_mut();
            if self.time_value.is_nan() {
                source.update();
            } else {
                source.update_time_step(self.time_value);
            }
        }

        let output = source.borrow().output();
        if output.mtime() > self.input_mtime {
            self.input_mtime = output.mtime();
            let snapshot = Rc::new((*output).clone());
            self.geometry.set_input(Rc::clone(&snapshot));
            if let Some(extracted) = self.geometry.output() {
                self.actor.borrow_mut().mapper_mut().set_input(extracted);
            }
        }
        output
    }

    /// Resolve the location to configure on the mapper when the caller
    /// gave none.
    fn resolve_location(&mut self, field_name: &str) -> FieldLocation {
        let _ = self.pull();
        self.geometry.input().map_or(
            FieldLocation::Unavailable,
            |dataset| FieldLocation::find(&dataset, field_name),
        )
    }
}

impl Representation for GeometryRepresentation {
    fn name(&self) -> &str {
        &self.name
    }

    fn scene(&self) -> Option<SharedScene> {
        self.scene.as_ref().and_then(Weak::upgrade)
    }

    fn actor(&self) -> SharedActor {
        Rc::clone(&self.actor)
    }

    fn view_links(&self) -> &[ViewLink] {
        &self.views
    }

    fn attach_view(&mut self, link: ViewLink) {
        if self.views.iter().any(|l| l.same_view(&link)) {
            return;
        }
        link.renderer().borrow_mut().add_actor(&self.actor);
        self.views.push(link);
    }

    fn detach_view(&mut self, link: &ViewLink) {
        let count = self.views.len();
        self.views.retain(|l| !l.same_view(link));
        if self.views.len() != count {
            link.renderer().borrow_mut().remove_actor(&self.actor);
        }
    }

    fn time_value(&self) -> f64 {
        self.time_value
    }

    fn set_time_value(&mut self, time: f64) {
        self.time_value = time;
    }

    fn time_values(&self) -> Vec<f64> {
        match &self.input {
            Input::Data(_) => Vec::new(),
            Input::Source(source) => source.borrow().time_steps(),
        }
    }

    fn update(&mut self, time_value: Option<f64>) -> Rc<DataSet> {
        if let Some(time) = time_value {
            self.time_value = time;
        }
        self.pull()
    }

    fn color_by(
        &mut self,
        registry: &SceneRegistry,
        field_name: Option<&str>,
        settings: &ColorBy<'_>,
    ) -> Result<(), SceneError> {
        log::debug!(
            "color_by: field_name={:?}, location={:?}, preset={:?}, \
             reset_range={}, map_scalar={}",
            field_name,
            settings.location,
            settings.preset,
            settings.reset_range,
            settings.map_scalar,
        );

        let Some(field_name) = field_name.filter(|name| !name.is_empty())
        else {
            self.actor
                .borrow_mut()
                .mapper_mut()
                .set_scalar_visibility(false);
            return Ok(());
        };
        self.actor
            .borrow_mut()
            .mapper_mut()
            .set_scalar_visibility(true);

        // Resolve or create the table for this field in the active scene.
        // A brand-new table has no sensible range yet, so creation forces
        // a range reset.
        let mut reset_range = settings.reset_range;
        let existing = registry
            .active_scene()
            .and_then(|scene| scene.borrow().luts().cloned(field_name));
        let lut = match existing {
            Some(lut) => lut,
            None => {
                reset_range = true;
                LookupTable::new(registry, field_name)?
            }
        };

        if let Some(preset) = settings.preset {
            lut.borrow_mut().apply_preset(preset)?;
        }

        let mut location = settings.location;
        if reset_range {
            let _ = self.pull();
            if let Some(dataset) = self.geometry.input() {
                let resolved = location.unwrap_or_else(|| {
                    FieldLocation::find(&dataset, field_name)
                });
                location = Some(resolved);
                if let Some((min, max)) = resolved
                    .array(&dataset, field_name)
                    .and_then(DataArray::range)
                {
                    log::debug!(
                        "color_by => rescale {field_name}=[{min}, {max}]"
                    );
                    lut.borrow_mut().rescale(min, max);
                }
            }
        }

        {
            let mut actor = self.actor.borrow_mut();
            let mapper = actor.mapper_mut();
            mapper.set_color_mode(if settings.map_scalar {
                MapperColorMode::MapScalars
            } else {
                MapperColorMode::DirectScalars
            });
            mapper.select_color_array(field_name);
            mapper.set_lookup_table(&lut);
        }

        let resolved = match location {
            Some(location) => location,
            None => self.resolve_location(field_name),
        };
        // Unresolved still colors: fall back to point association.
        let resolved = if resolved == FieldLocation::Unavailable {
            FieldLocation::PointData
        } else {
            resolved
        };
        log::debug!("color_by => {resolved}");
        self.actor
            .borrow_mut()
            .mapper_mut()
            .select_scalar_location(resolved);
        Ok(())
    }

    fn available_fields(&mut self) -> AvailableFields {
        let dataset = self.pull();
        AvailableFields {
            point_data: FieldLocation::PointData.field_names(&dataset),
            cell_data: FieldLocation::CellData.field_names(&dataset),
            field_data: FieldLocation::FieldData.field_names(&dataset),
        }
    }
}
