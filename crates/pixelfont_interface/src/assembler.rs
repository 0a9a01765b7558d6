use image::GrayImage;
use pixelfont_shared::types::Result;
use std::collections::BTreeMap;

/// Raster glyph images keyed by code point. Ordered, so assembly is deterministic.
pub type GlyphImages = BTreeMap<u32, GrayImage>;

/// Naming information written into the generated font
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontNames {
    /// PostScript name (e.g. "PixelatedFont")
    pub font_name: String,
    /// Family name (e.g. "Pixelated Font")
    pub family_name: String,
    /// Full name (e.g. "Pixelated Font")
    pub full_name: String,
}

impl Default for FontNames {
    fn default() -> Self {
        Self {
            font_name: "PixelatedFont".into(),
            family_name: "Pixelated Font".into(),
            full_name: "Pixelated Font".into(),
        }
    }
}

/// Builds a font file out of raster glyph images
pub trait FontAssembler {
    /// Traces every image and returns the serialized font. Code points without an
    /// image are not part of the font.
    fn assemble(&mut self, names: &FontNames, glyphs: &GlyphImages) -> Result<Vec<u8>>;
}
