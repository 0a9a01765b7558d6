use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use pixelfont_interface::font::{GlyphBitmap, GlyphError, GlyphRenderer};

const WHITE: Luma<u8> = Luma([255]);

/// Renders characters onto a square canvas and pixelates them.
///
/// The canvas is `image_size` pixels wide. Pixelation resamples it down to a
/// `pixel_size` grid and back up, both nearest-neighbour, which leaves blocks of
/// `image_size / pixel_size` pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pixelator {
    image_size: u32,
    pixel_size: u32,
}

impl Pixelator {
    /// `pixel_size` must be at least 1 and smaller than `image_size`
    pub fn new(image_size: u32, pixel_size: u32) -> Self {
        debug_assert!(pixel_size > 0 && pixel_size < image_size);
        Self {
            image_size,
            pixel_size,
        }
    }

    /// Renders `ch` at `image_size` pixels per em and returns the pixelated canvas
    pub fn transform<R>(&self, renderer: &mut R, ch: char) -> Result<GrayImage, GlyphError>
    where
        R: GlyphRenderer + ?Sized,
    {
        let glyph = renderer.render_glyph(ch, self.image_size)?;
        let canvas = self.canvas(&glyph);
        Ok(self.pixelate(&canvas))
    }

    /// White canvas with the glyph drawn in black, centred on its measured size. Ink that
    /// falls outside the canvas is clipped.
    pub fn canvas(&self, glyph: &GlyphBitmap) -> GrayImage {
        let mut canvas = GrayImage::from_pixel(self.image_size, self.image_size, WHITE);
        if glyph.is_blank() {
            return canvas;
        }

        let (x, y) = self.offset(glyph);

        let mut ink = glyph.coverage.clone();
        imageops::invert(&mut ink);
        imageops::overlay(&mut canvas, &ink, x, y);

        canvas
    }

    /// Top-left position of the glyph on the canvas: ((N - w) / 2, (N - h) / 2), rounded down
    pub fn offset(&self, glyph: &GlyphBitmap) -> (i64, i64) {
        let size = i64::from(self.image_size);
        (
            (size - i64::from(glyph.width())).div_euclid(2),
            (size - i64::from(glyph.height())).div_euclid(2),
        )
    }

    pub fn pixelate(&self, canvas: &GrayImage) -> GrayImage {
        let grid = imageops::resize(canvas, self.pixel_size, self.pixel_size, FilterType::Nearest);
        imageops::resize(&grid, self.image_size, self.image_size, FilterType::Nearest)
    }
}
