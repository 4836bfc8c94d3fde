//! Scrawl recognition - pluggable classification over intensity grids
//!
//! This crate provides the classification half of the pipeline:
//! - [`classifier`] - The `Classifier` capability and result types
//! - [`registry`] - Ordered collection of loaded backends
//! - [`orchestrator`] - Runs a vector through every backend and renders
//!   the textual report
//! - [`loader`] - Asynchronous backend construction off the owner thread
//! - [`backends`] - Bundled backend implementations
//!
//! Backends receive a validated, normalized [`scrawl_canvas::IntensityVector`]
//! and must answer with a label or `None`; they never fail on well-formed
//! input.

pub mod backends;
pub mod classifier;
pub mod error;
pub mod loader;
pub mod orchestrator;
pub mod registry;

pub use classifier::*;
pub use error::*;
pub use loader::*;
pub use orchestrator::*;
pub use registry::*;
