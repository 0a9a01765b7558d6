//! Rasterization side of the pipeline
//!
//! [`SwashRenderer`] turns characters of a scalable font into coverage masks, and
//! [`Pixelator`] places such a mask on a canvas and gives it the blocky look.

mod pixelate;
mod renderer;

pub use crate::pixelate::Pixelator;
pub use crate::renderer::SwashRenderer;
