//! The scratch directory that sits between rasterization and font assembly. It holds one
//! png per code point, named `<decimal code point>.png`, and is left in place after a run.

use anyhow::Context;
use image::{GrayImage, ImageFormat};
use log::debug;
use pixelfont_shared::types::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const LOG_TARGET: &str = "glyph-store";

#[derive(Clone, Debug)]
pub struct GlyphStore {
    dir: PathBuf,
}

impl GlyphStore {
    /// Opens the store, creating the directory when it does not exist yet
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("unable to create glyph directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Opens an existing store without touching the filesystem
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, code_point: u32) -> PathBuf {
        self.dir.join(format!("{code_point}.png"))
    }

    pub fn save(&self, code_point: u32, image: &GrayImage) -> Result<PathBuf> {
        let path = self.path_for(code_point);
        image
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("unable to write {}", path.display()))?;

        debug!(target: LOG_TARGET, "wrote {}", path.display());
        Ok(path)
    }

    /// Removes the image for `code_point`, if there is one
    pub fn remove(&self, code_point: u32) -> Result<()> {
        let path = self.path_for(code_point);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(target: LOG_TARGET, "removed stale {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("unable to remove {}", path.display())),
        }
    }

    /// Returns `None` when there is no image for `code_point`
    pub fn load(&self, code_point: u32) -> Result<Option<GrayImage>> {
        let path = self.path_for(code_point);
        if !path.is_file() {
            return Ok(None);
        }

        let image = image::open(&path).with_context(|| format!("unable to decode {}", path.display()))?;
        Ok(Some(image.into_luma8()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn file_names_are_decimal_code_points() {
        let store = GlyphStore::open("glyphs");
        assert_eq!(store.path_for(65), PathBuf::from("glyphs").join("65.png"));
        assert_eq!(store.path_for(32), PathBuf::from("glyphs").join("32.png"));
    }

    #[test]
    fn create_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("glyphs");

        GlyphStore::create(&dir).unwrap();
        GlyphStore::create(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let store = GlyphStore::create(tmp.path()).unwrap();

        let image = GrayImage::from_fn(8, 8, |x, y| Luma([((x + y) * 16) as u8]));
        let path = store.save(65, &image).unwrap();
        assert_eq!(path, tmp.path().join("65.png"));

        assert_eq!(store.load(65).unwrap(), Some(image));
        assert_eq!(store.load(66).unwrap(), None);
    }

    #[test]
    fn remove_drops_the_image() {
        let tmp = tempfile::tempdir().unwrap();
        let store = GlyphStore::create(tmp.path()).unwrap();
        store.save(65, &GrayImage::new(4, 4)).unwrap();

        store.remove(65).unwrap();
        assert_eq!(store.load(65).unwrap(), None);

        // nothing left to remove
        store.remove(65).unwrap();
    }

    #[test]
    fn undecodable_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = GlyphStore::create(tmp.path()).unwrap();
        std::fs::write(store.path_for(65), b"not a png").unwrap();

        assert!(store.load(65).is_err());
    }
}
