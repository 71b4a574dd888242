// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Multiple crate versions: transitive deps — not actionable
#![allow(clippy::multiple_crate_versions)]

//! Scene-graph and color-mapping layer for a native 3D visualization
//! pipeline.
//!
//! Vista lets an application register visualization entities (data
//! sources, renderable representations, views, annotations, color lookup
//! tables) into named, context-scoped scenes, automatically wires
//! representations to the views that display them, and drives per-field
//! color mapping (range rescaling, presets, vector-component selection)
//! without the caller touching the underlying pipeline objects.
//!
//! # Key entry points
//!
//! - [`scene::SceneRegistry`] - the context object owning scenes and the
//!   active-scene stack
//! - [`view::RenderView`] - a render surface plus the representations
//!   drawn into it
//! - [`lut::LookupTable`] - a per-field color ramp with preset and
//!   rescale support
//! - [`io::FormatRegistry`] - suffix-driven reader/writer resolution
//!
//! # Architecture
//!
//! The crate is a thin state layer: every scene object created while a
//! scene is active self-registers into that scene's matching group, and a
//! view's representation group is the single point where the
//! bidirectional representation↔view relationship is established or torn
//! down. Mesh extraction and rasterization belong to the external engine
//! behind the [`engine`] facade; after any `update`/`color_by`/`rescale`
//! the embedding application re-renders explicitly.
//!
//! Everything is single-threaded and synchronous: scene graphs are shared
//! through `Rc<RefCell<_>>` handles and callers embedding the crate in an
//! event-driven host serialize their own calls.

pub mod annotation;
pub mod engine;
pub mod error;
pub mod field;
pub mod io;
pub mod lut;
pub mod options;
pub mod representation;
pub mod scene;
pub mod view;

pub use error::SceneError;
pub use field::{ColorMode, FieldLocation};
pub use scene::{SceneRegistry, SharedScene};
pub use view::RenderView;
