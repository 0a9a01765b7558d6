use anyhow::Context;
use image::GrayImage;
use log::debug;
use pixelfont_interface::font::{GlyphBitmap, GlyphError, GlyphRenderer};
use pixelfont_shared::types::{Error, Result};
use std::path::Path;
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::Format;
use swash::FontRef;

pub const LOG_TARGET: &str = "raster";

/// Glyph renderer backed by swash. Owns the font data, so it can be loaded once at startup
/// and used for every character of the run.
pub struct SwashRenderer {
    data: Vec<u8>,
    index: usize,
    context: ScaleContext,
}

impl SwashRenderer {
    /// Loads the face at `index` from the font file at `path`. Fails when the file cannot be
    /// read or does not contain a usable face.
    pub fn from_file(path: &Path, index: u32) -> Result<Self> {
        let data = std::fs::read(path).with_context(|| format!("unable to read font {}", path.display()))?;
        Self::from_bytes(data, index).with_context(|| format!("unable to load font {}", path.display()))
    }

    pub fn from_bytes(data: Vec<u8>, index: u32) -> Result<Self> {
        let index = index as usize;
        if FontRef::from_index(&data, index).is_none() {
            return Err(Error::Font(format!("no valid font face at index {index}")).into());
        }

        Ok(Self {
            data,
            index,
            context: ScaleContext::new(),
        })
    }
}

impl GlyphRenderer for SwashRenderer {
    fn render_glyph(&mut self, ch: char, size: u32) -> std::result::Result<GlyphBitmap, GlyphError> {
        let Some(font) = FontRef::from_index(&self.data, self.index) else {
            return Err(GlyphError::Render {
                ch,
                reason: "font face is not available".into(),
            });
        };

        let glyph_id = font.charmap().map(ch);
        if glyph_id == 0 {
            return Err(GlyphError::Missing(ch));
        }

        let mut scaler = self.context.builder(font).size(size as f32).hint(false).build();

        if !scaler.has_outlines() {
            return Err(GlyphError::NoOutline(ch));
        }

        // Empty glyphs (space) have either no outline at all or one without segments
        let has_ink = scaler
            .scale_outline(glyph_id)
            .is_some_and(|outline| !outline.verbs().is_empty());
        if !has_ink {
            debug!(target: LOG_TARGET, "{ch:?} has no ink");
            return Ok(GlyphBitmap::blank());
        }

        let image = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .render(&mut scaler, glyph_id)
            .ok_or_else(|| GlyphError::Render {
                ch,
                reason: "rasterizer returned no image".into(),
            })?;

        let (width, height) = (image.placement.width, image.placement.height);
        if width == 0 || height == 0 {
            return Ok(GlyphBitmap::blank());
        }

        let coverage = GrayImage::from_raw(width, height, image.data).ok_or_else(|| GlyphError::Render {
            ch,
            reason: format!("coverage does not match {width}x{height}"),
        })?;

        debug!(target: LOG_TARGET, "{ch:?} rendered at {size}px as {width}x{height}");
        Ok(GlyphBitmap::new(coverage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage() {
        assert!(SwashRenderer::from_bytes(b"definitely not a font".to_vec(), 0).is_err());
        assert!(SwashRenderer::from_bytes(Vec::new(), 0).is_err());
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = SwashRenderer::from_file(Path::new("/nonexistent/font.ttf"), 0)
            .err()
            .unwrap();
        assert!(err.to_string().contains("unable to read font"));
    }
}
