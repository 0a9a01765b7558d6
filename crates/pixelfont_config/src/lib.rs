//! Configuration of a pixelation run
//!
//! Defaults for every setting live in `settings.json`, which is compiled into the binary.
//! A [`ConfigStore`] starts out with those defaults, can be overridden from a json file or
//! programmatically, and is finally turned into a validated [`PipelineConfig`] which is
//! passed explicitly into the pipeline. There is no process-wide configuration state.

pub mod errors;
pub mod settings;

use crate::errors::Error;
use crate::settings::{Setting, SettingInfo};
use log::{debug, warn};
use pixelfont_interface::assembler::FontNames;
use pixelfont_shared::charset::CharRange;
use serde_derive::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::mem;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const LOG_TARGET: &str = "config";

/// Settings are stored in a json file, but this is included in the binary for mostly easy editing.
const SETTINGS_JSON: &str = include_str!("./settings.json");

/// `JsonEntry` is used for parsing the settings.json file
#[derive(Debug, Deserialize)]
struct JsonEntry {
    key: String,
    #[serde(rename = "type")]
    _entry_type: String,
    default: String,
    description: String,
}

/// Holds the current value of every known setting
pub struct ConfigStore {
    /// Current values
    settings: HashMap<String, Setting>,
    /// Descriptions, default values and type information
    settings_info: HashMap<String, SettingInfo>,
    /// Keys of all settings in the order of settings.json
    setting_keys: Vec<String>,
}

impl ConfigStore {
    /// Creates a store populated with the defaults from settings.json
    pub fn new() -> Result<Self, Error> {
        let mut store = Self {
            settings: HashMap::new(),
            settings_info: HashMap::new(),
            setting_keys: Vec::new(),
        };

        store.populate_default_settings()?;
        Ok(store)
    }

    /// All keys in declaration order
    pub fn keys(&self) -> &[String] {
        &self.setting_keys
    }

    /// Retrieves information about the given key, or returns None when key is unknown
    pub fn get_info(&self, key: &str) -> Option<&SettingInfo> {
        self.settings_info.get(key)
    }

    pub fn get(&self, key: &str) -> Option<&Setting> {
        self.settings.get(key)
    }

    /// Sets the given setting to the given value. Unknown keys and values whose type does not
    /// match the default are logged and ignored.
    pub fn set(&mut self, key: &str, value: Setting) {
        let Some(info) = self.settings_info.get(key) else {
            warn!(target: LOG_TARGET, "config: Setting {key} is not known");
            return;
        };

        if mem::discriminant(&info.default) != mem::discriminant(&value) {
            warn!(target: LOG_TARGET, "config: Setting {key} is of different type than setting expects");
            return;
        }

        debug!(target: LOG_TARGET, "config: {key} = {value}");
        self.settings.insert(key.to_owned(), value);
    }

    /// Applies overrides from a json file holding a single object of `"key": "typed value"`
    /// pairs, e.g. `{ "glyphs.pixel_size": "u:4" }`.
    pub fn load_file(&mut self, path: &Path) -> Result<(), Error> {
        let data = std::fs::read_to_string(path)?;
        self.load_str(&data)
    }

    pub fn load_str(&mut self, data: &str) -> Result<(), Error> {
        let parsed_json: Value = serde_json::from_str(data)?;

        let Value::Object(settings) = parsed_json else {
            return Err(Error::Config("settings file must contain a json object".into()));
        };

        for (key, value) in settings {
            match serde_json::from_value::<Setting>(value) {
                Ok(setting) => self.set(&key, setting),
                Err(err) => {
                    warn!(target: LOG_TARGET, "problem reading setting {key} from json: {err}");
                }
            }
        }

        Ok(())
    }

    fn string(&self, key: &str) -> String {
        self.get(key).map(Setting::to_string).unwrap_or_default()
    }

    fn uint(&self, key: &str) -> usize {
        self.get(key).map(Setting::to_uint).unwrap_or_default()
    }

    /// Converts the current settings into a validated pipeline configuration
    pub fn pipeline_config(&self) -> Result<PipelineConfig, Error> {
        let config = PipelineConfig {
            input_font: PathBuf::from(self.string("font.input")),
            font_index: to_narrow("font.index", self.uint("font.index"))?,
            output_font: PathBuf::from(self.string("font.output")),
            glyph_dir: PathBuf::from(self.string("glyphs.dir")),
            image_size: to_narrow("glyphs.image_size", self.uint("glyphs.image_size"))?,
            pixel_size: to_narrow("glyphs.pixel_size", self.uint("glyphs.pixel_size"))?,
            characters: CharRange::new(
                to_narrow("glyphs.first", self.uint("glyphs.first"))?,
                to_narrow("glyphs.last", self.uint("glyphs.last"))?,
            ),
            threshold: to_narrow("glyphs.threshold", self.uint("glyphs.threshold"))?,
            units_per_em: to_narrow("font.units_per_em", self.uint("font.units_per_em"))?,
            on_error: GlyphErrorPolicy::from_str(&self.string("glyphs.on_error"))?,
            names: FontNames {
                font_name: self.string("font.name"),
                family_name: self.string("font.family"),
                full_name: self.string("font.fullname"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Populates the settings in the storage from the settings.json file
    fn populate_default_settings(&mut self) -> Result<(), Error> {
        let json_data: Value = serde_json::from_str(SETTINGS_JSON)?;

        if let Value::Object(data) = json_data {
            for (section_prefix, section_entries) in data {
                let section_entries: Vec<JsonEntry> = serde_json::from_value(section_entries)?;

                for entry in section_entries {
                    let key = format!("{}.{}", section_prefix, entry.key);

                    let info = SettingInfo {
                        key: key.clone(),
                        description: entry.description,
                        default: Setting::from_str(&entry.default)?,
                    };

                    self.setting_keys.push(key.clone());
                    self.settings.insert(key.clone(), info.default.clone());
                    self.settings_info.insert(key, info);
                }
            }
        }

        Ok(())
    }
}

fn to_narrow<T: TryFrom<usize>>(key: &str, value: usize) -> Result<T, Error> {
    T::try_from(value).map_err(|_| Error::Config(format!("{key}: value {value} is out of range")))
}

/// What the pipeline does when a single glyph cannot be rendered, written or decoded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GlyphErrorPolicy {
    /// Record the glyph as skipped and continue with the next one
    #[default]
    Skip,
    /// Fail the whole run
    Abort,
}

impl FromStr for GlyphErrorPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(Error::Config(format!("unknown glyph error policy: {s}"))),
        }
    }
}

impl Display for GlyphErrorPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Everything a pixelation run needs to know
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Scalable font that is rasterized
    pub input_font: PathBuf,
    /// Face index inside `input_font`
    pub font_index: u32,
    /// Generated font, overwritten when it exists
    pub output_font: PathBuf,
    /// Scratch directory for the per-glyph png files. Not cleaned up after a run.
    pub glyph_dir: PathBuf,
    /// Side of the square glyph canvas in pixels, also the rendering size
    pub image_size: u32,
    /// Side of the grid the canvas is downsampled to
    pub pixel_size: u32,
    /// Code points to convert
    pub characters: CharRange,
    /// Pixels darker than this are ink when tracing
    pub threshold: u8,
    /// Em size of the generated font
    pub units_per_em: u16,
    pub on_error: GlyphErrorPolicy,
    pub names: FontNames,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_font: PathBuf::from("PlayfairDisplay-Bold.ttf"),
            font_index: 0,
            output_font: PathBuf::from("pixelated_font.ttf"),
            glyph_dir: PathBuf::from("glyphs"),
            image_size: 64,
            pixel_size: 8,
            characters: CharRange::default(),
            threshold: 128,
            units_per_em: 1024,
            on_error: GlyphErrorPolicy::Skip,
            names: FontNames::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.pixel_size == 0 {
            return Err(Error::Config("pixel_size must be larger than zero".into()));
        }

        if self.pixel_size >= self.image_size {
            return Err(Error::Config(format!(
                "pixel_size ({}) must be smaller than image_size ({})",
                self.pixel_size, self.image_size
            )));
        }

        if self.characters.is_empty() {
            return Err(Error::Config(format!("empty character range {}", self.characters)));
        }

        if !(16..=16384).contains(&self.units_per_em) {
            return Err(Error::Config(format!(
                "units_per_em ({}) must be between 16 and 16384",
                self.units_per_em
            )));
        }

        if self.image_size % self.pixel_size != 0 {
            warn!(
                target: LOG_TARGET,
                "image_size {} is not a multiple of pixel_size {}, blocks will be uneven",
                self.image_size,
                self.pixel_size
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use test_case::test_case;

    #[test]
    fn defaults_match_pipeline_defaults() {
        let store = ConfigStore::new().unwrap();
        assert_eq!(store.pipeline_config().unwrap(), PipelineConfig::default());
        assert_eq!(store.keys().len(), 14);
        assert_eq!(store.keys()[0], "font.input");
    }

    #[test]
    fn setting_info() {
        let store = ConfigStore::new().unwrap();
        let info = store.get_info("glyphs.pixel_size").unwrap();
        assert_eq!(info.default, Setting::UInt(8));
        assert!(!info.description.is_empty());
        assert!(store.get_info("glyphs.unknown").is_none());
    }

    #[test]
    fn set_and_convert() {
        let mut store = ConfigStore::new().unwrap();
        store.set("glyphs.pixel_size", Setting::UInt(4));
        store.set("font.output", Setting::String("out.ttf".into()));

        let config = store.pipeline_config().unwrap();
        assert_eq!(config.pixel_size, 4);
        assert_eq!(config.output_font, PathBuf::from("out.ttf"));
    }

    #[test]
    fn invalid_setting() {
        testing_logger::setup();

        let mut store = ConfigStore::new().unwrap();
        store.set("glyphs.pixel_size", Setting::String("four".into()));
        store.set("glyphs.does_not_exist", Setting::UInt(1));

        testing_logger::validate(|captured_logs| {
            assert_eq!(captured_logs.len(), 2);
            assert!(captured_logs[0].body.contains("different type"));
            assert!(captured_logs[1].body.contains("is not known"));
        });

        assert_eq!(store.get("glyphs.pixel_size"), Some(&Setting::UInt(8)));
        assert_eq!(store.get("glyphs.does_not_exist"), None);
    }

    #[test]
    fn load_overrides_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "glyphs.pixel_size": "u:16", "glyphs.on_error": "s:abort", "glyphs.first": "bogus" }}"#
        )
        .unwrap();

        let mut store = ConfigStore::new().unwrap();
        store.load_file(file.path()).unwrap();

        let config = store.pipeline_config().unwrap();
        assert_eq!(config.pixel_size, 16);
        assert_eq!(config.on_error, GlyphErrorPolicy::Abort);
        assert_eq!(config.characters.first, 32);
    }

    #[test]
    fn load_rejects_non_object() {
        let mut store = ConfigStore::new().unwrap();
        assert!(matches!(store.load_str("[1, 2]"), Err(Error::Config(_))));
        assert!(matches!(store.load_str("{"), Err(Error::JsonSerde(_))));
    }

    #[test_case("glyphs.pixel_size", 0 ; "zero pixel size")]
    #[test_case("glyphs.pixel_size", 64 ; "pixel size equals image size")]
    #[test_case("glyphs.first", 200 ; "inverted range")]
    #[test_case("font.units_per_em", 8 ; "tiny em")]
    #[test_case("glyphs.threshold", 256 ; "threshold out of range")]
    fn rejected(key: &str, value: usize) {
        let mut store = ConfigStore::new().unwrap();
        store.set(key, Setting::UInt(value));
        assert!(matches!(store.pipeline_config(), Err(Error::Config(_))));
    }

    #[test]
    fn unknown_policy() {
        let mut store = ConfigStore::new().unwrap();
        store.set("glyphs.on_error", Setting::String("retry".into()));
        assert!(store.pipeline_config().is_err());
        assert_eq!(GlyphErrorPolicy::Abort.to_string(), "abort");
    }
}
