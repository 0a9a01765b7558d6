//! Pixelfont turns a scalable font into a pixelated one.
//!
//! Every character of a configured range is rendered onto a square canvas, resampled
//! down to a coarse grid and back up (both nearest-neighbour) and stored as
//! `<code point>.png`. The stored images are then traced and written into a new
//! TrueType font.
//!
//! ```no_run
//! use pixelfont::pipeline::Pipeline;
//! use pixelfont_config::PipelineConfig;
//!
//! let mut pipeline = Pipeline::from_config(PipelineConfig::default())?;
//! let report = pipeline.run()?;
//! println!("Pixelated font saved to {}", report.output.display());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod glyph_store;
pub mod pipeline;
