//! Facade over the native rendering/geometry pipeline.
//!
//! The scene layer drives an external visualization engine through a
//! narrow command surface: create renderer/render surface, add/remove
//! actor, set mapper input/array selection/lookup table, query numeric
//! ranges, fit the camera. The types in this module hold the book-keeping
//! state behind that surface; mesh extraction, rasterization and file
//! parsing are the engine's business, not this crate's.

pub mod data;
pub mod render;
pub mod source;

pub use data::{Attributes, DataArray, DataSet};
pub use render::{
    Actor, Camera, Mapper, MapperColorMode, RenderWindow, Renderer,
    ScalarMode, SharedActor, SharedRenderer, SurfaceFilter,
};
pub use source::{DataSource, Input, MemorySource, SharedSource};
