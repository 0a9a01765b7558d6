use crate::errors::Error;
use core::fmt::Display;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// A setting can be either an unsigned integer or a string.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Setting {
    UInt(usize),
    String(String),
}

impl Setting {
    #[must_use]
    pub fn to_uint(&self) -> usize {
        if !matches!(self, Self::UInt(_)) {
            warn!("setting is not an unsigned integer");
        }

        match self {
            Self::UInt(value) => *value,
            Self::String(value) => value.parse().unwrap_or_default(),
        }
    }

    #[allow(clippy::inherent_to_string_shadow_display)]
    #[must_use]
    pub fn to_string(&self) -> String {
        if !matches!(self, Self::String(_)) {
            warn!("setting is not a string");
        }

        match self {
            Self::UInt(value) => value.to_string(),
            Self::String(value) => value.clone(),
        }
    }
}

impl Serialize for Setting {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Setting {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::from_str(&value)
            .map_err(|err| serde::de::Error::custom(format!("cannot deserialize: {err}")))
    }
}

impl Display for Setting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UInt(value) => write!(f, "u:{value}"),
            Self::String(value) => write!(f, "s:{value}"),
        }
    }
}

impl FromStr for Setting {
    type Err = Error;

    // first element is the type:
    //   u:234
    //   s:hello world

    /// Converts a typed string to a setting
    fn from_str(key: &str) -> Result<Self, Error> {
        let Some((key_type, key_value)) = key.split_once(':') else {
            return Err(Error::Config(format!("setting without type: {key}")));
        };

        let setting = match key_type {
            "u" => Self::UInt(
                key_value
                    .parse::<usize>()
                    .map_err(|err| Error::Config(format!("error parsing {key_value}: {err}")))?,
            ),
            "s" => Self::String(key_value.to_string()),
            _ => return Err(Error::Config(format!("unknown setting type: {key_type}"))),
        };

        Ok(setting)
    }
}

/// `SettingInfo` returns information about a given setting
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SettingInfo {
    /// Name of the key (dot notation, ie: glyphs.pixel_size)
    pub key: String,
    /// Description of the setting
    pub description: String,
    /// Default setting if none has been specified
    pub default: Setting,
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn setting() {
        let s = Setting::from_str("u:64").unwrap();
        assert_eq!(s, Setting::UInt(64));
        assert_eq!(64, s.to_uint());
        assert_eq!("u:64", format!("{s}"));

        let s = Setting::from_str("s:Pixelated Font").unwrap();
        assert_eq!(s, Setting::String("Pixelated Font".into()));
        assert_eq!("Pixelated Font", s.to_string());

        // Colons after the type prefix are part of the value
        let s = Setting::from_str("s:C:\\fonts\\a.ttf").unwrap();
        assert_eq!(s, Setting::String("C:\\fonts\\a.ttf".into()));
    }

    #[test_case("b:true" ; "unknown type")]
    #[test_case("u:-1" ; "negative unsigned")]
    #[test_case("u:eight" ; "not a number")]
    #[test_case("64" ; "missing type")]
    fn invalid(input: &str) {
        assert!(matches!(Setting::from_str(input), Err(Error::Config(_))));
    }

    #[test]
    fn serde() {
        let s: Setting = serde_json::from_str("\"u:8\"").unwrap();
        assert_eq!(s, Setting::UInt(8));
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"u:8\"");
        assert!(serde_json::from_str::<Setting>("\"x:8\"").is_err());
    }
}
