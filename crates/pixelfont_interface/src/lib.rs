//! The two seams of the pipeline: something that turns a character into a coverage
//! bitmap, and something that turns a set of raster glyphs into font bytes.

pub mod assembler;
pub mod font;
