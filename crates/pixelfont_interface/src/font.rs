use image::GrayImage;
use thiserror::Error;

/// Coverage mask of a single rendered glyph. 255 means full ink, 0 means no ink. The
/// dimensions of the mask are the measured size of the glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphBitmap {
    pub coverage: GrayImage,
}

impl GlyphBitmap {
    pub fn new(coverage: GrayImage) -> Self {
        Self { coverage }
    }

    /// A glyph without any ink, like the space character
    pub fn blank() -> Self {
        Self {
            coverage: GrayImage::new(0, 0),
        }
    }

    pub fn width(&self) -> u32 {
        self.coverage.width()
    }

    pub fn height(&self) -> u32 {
        self.coverage.height()
    }

    pub fn is_blank(&self) -> bool {
        self.coverage.pixels().all(|p| p.0[0] == 0)
    }
}

/// Reasons why a single glyph could not be rendered. These never abort a run by
/// themselves; the pipeline decides what to do with them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GlyphError {
    #[error("no glyph for {0:?} in the font")]
    Missing(char),

    #[error("glyph for {0:?} has no outline")]
    NoOutline(char),

    #[error("failed to render {ch:?}: {reason}")]
    Render { ch: char, reason: String },
}

/// Rasterizes characters of a loaded font face
pub trait GlyphRenderer {
    /// Renders `ch` at `size` pixels per em. The returned bitmap is cropped to the ink.
    fn render_glyph(&mut self, ch: char, size: u32) -> Result<GlyphBitmap, GlyphError>;
}
