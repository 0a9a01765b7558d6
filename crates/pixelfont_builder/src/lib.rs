//! Font assembly side of the pipeline
//!
//! Pixelated glyph images are traced into polygons ([`trace`]) and written into a
//! TrueType font by [`TrueTypeAssembler`].

pub mod trace;
mod ttf;

pub use crate::ttf::TrueTypeAssembler;
