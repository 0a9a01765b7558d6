//! The pixelation run: render every character of the configured range, pixelate it and
//! store it as a png, then trace the stored images into a new font.

use crate::glyph_store::GlyphStore;
use anyhow::{anyhow, Context};
use derive_more::Display;
use log::{debug, info, warn};
use pixelfont_builder::TrueTypeAssembler;
use pixelfont_config::{GlyphErrorPolicy, PipelineConfig};
use pixelfont_interface::assembler::{FontAssembler, GlyphImages};
use pixelfont_interface::font::{GlyphError, GlyphRenderer};
use pixelfont_raster::{Pixelator, SwashRenderer};
use pixelfont_shared::types::Result;
use std::path::PathBuf;

pub const LOG_TARGET: &str = "pipeline";

/// Why a character did not make it into the glyph directory or the font
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum SkipReason {
    #[display("{_0}")]
    Render(GlyphError),
    #[display("unreadable image: {_0}")]
    Unreadable(String),
}

/// Result of the raster stage for a single character
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GlyphOutcome {
    Written(PathBuf),
    Skipped(SkipReason),
}

/// Everything that happened during a run
#[derive(Clone, Debug, Default)]
pub struct PipelineReport {
    /// One entry per character of the range, in ascending order
    pub outcomes: Vec<(char, GlyphOutcome)>,
    /// Code points that ended up in the font
    pub assembled: Vec<u32>,
    /// Code points of the range that had no image in the glyph directory
    pub missing: Vec<u32>,
    /// Code points whose image could not be decoded
    pub unreadable: Vec<(u32, SkipReason)>,
    pub output: PathBuf,
}

impl PipelineReport {
    pub fn written(&self) -> impl Iterator<Item = char> + '_ {
        self.outcomes.iter().filter_map(|(ch, outcome)| match outcome {
            GlyphOutcome::Written(_) => Some(*ch),
            GlyphOutcome::Skipped(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (char, &SkipReason)> + '_ {
        self.outcomes.iter().filter_map(|(ch, outcome)| match outcome {
            GlyphOutcome::Skipped(reason) => Some((*ch, reason)),
            GlyphOutcome::Written(_) => None,
        })
    }
}

/// Drives a run. The renderer and assembler are injected, so the pipeline itself does not
/// depend on a particular rasterizer or font writer.
pub struct Pipeline<R, A> {
    config: PipelineConfig,
    renderer: R,
    assembler: A,
}

impl Pipeline<SwashRenderer, TrueTypeAssembler> {
    /// Loads the input font. A missing or invalid font aborts here, before any glyph is
    /// processed.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let renderer = SwashRenderer::from_file(&config.input_font, config.font_index)?;
        let assembler = TrueTypeAssembler::new(config.image_size, config.units_per_em, config.threshold);
        Ok(Self::new(config, renderer, assembler))
    }
}

impl<R, A> Pipeline<R, A>
where
    R: GlyphRenderer,
    A: FontAssembler,
{
    pub fn new(config: PipelineConfig, renderer: R, assembler: A) -> Self {
        Self {
            config,
            renderer,
            assembler,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Renders and pixelates every character of the range into the glyph directory
    pub fn rasterize(&mut self) -> Result<Vec<(char, GlyphOutcome)>> {
        self.config.validate()?;

        let store = GlyphStore::create(&self.config.glyph_dir)?;
        let pixelator = Pixelator::new(self.config.image_size, self.config.pixel_size);
        let mut outcomes = Vec::new();

        for ch in self.config.characters.chars() {
            let outcome = match pixelator.transform(&mut self.renderer, ch) {
                Ok(image) => GlyphOutcome::Written(store.save(u32::from(ch), &image)?),
                Err(err) => {
                    if self.config.on_error == GlyphErrorPolicy::Abort {
                        return Err(anyhow!(err).context(format!("rendering U+{:04X} failed", u32::from(ch))));
                    }
                    debug!(target: LOG_TARGET, "skipping {ch:?}: {err}");
                    // an image left by an earlier run must not end up in the font
                    store.remove(u32::from(ch))?;
                    GlyphOutcome::Skipped(SkipReason::Render(err))
                }
            };
            outcomes.push((ch, outcome));
        }

        info!(
            target: LOG_TARGET,
            "rasterized {} characters into {}",
            outcomes.len(),
            store.dir().display()
        );
        Ok(outcomes)
    }

    /// Traces whatever images the glyph directory holds for the range and writes the font.
    /// Code points without an image are left out of the font.
    pub fn assemble(&mut self, report: &mut PipelineReport) -> Result<()> {
        let store = GlyphStore::open(&self.config.glyph_dir);
        let mut glyphs = GlyphImages::new();

        for code_point in self.config.characters.chars().map(u32::from) {
            match store.load(code_point) {
                Ok(Some(image)) => {
                    glyphs.insert(code_point, image);
                }
                Ok(None) => {
                    debug!(target: LOG_TARGET, "no image for {code_point}, leaving it out");
                    report.missing.push(code_point);
                }
                Err(err) => {
                    if self.config.on_error == GlyphErrorPolicy::Abort {
                        return Err(err);
                    }
                    report
                        .unreadable
                        .push((code_point, SkipReason::Unreadable(format!("{err:#}"))));
                }
            }
        }

        let bytes = self.assembler.assemble(&self.config.names, &glyphs)?;
        std::fs::write(&self.config.output_font, bytes)
            .with_context(|| format!("unable to write {}", self.config.output_font.display()))?;

        report.assembled = glyphs.into_keys().collect();
        report.output = self.config.output_font.clone();

        info!(
            target: LOG_TARGET,
            "assembled {} glyphs into {}",
            report.assembled.len(),
            report.output.display()
        );
        Ok(())
    }

    /// Runs both stages
    pub fn run(&mut self) -> Result<PipelineReport> {
        let mut report = PipelineReport {
            outcomes: self.rasterize()?,
            ..Default::default()
        };

        self.assemble(&mut report)?;

        for (ch, reason) in report.skipped() {
            warn!(target: LOG_TARGET, "{ch:?} (U+{:04X}) skipped: {reason}", u32::from(ch));
        }
        for (code_point, reason) in &report.unreadable {
            warn!(target: LOG_TARGET, "{code_point} left out of the font: {reason}");
        }

        Ok(report)
    }
}
