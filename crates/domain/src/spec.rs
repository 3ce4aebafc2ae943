//! Declarative description of one adapter to build and attach.

use crate::{AdapterId, FormatMode, Level};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind-specific adapter options (for example `path`, `rolling`, `color`).
pub type AdapterOptions = BTreeMap<Box<str>, serde_json::Value>;

/// What a factory needs to construct an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterSpec {
    /// Registry identifier.
    pub id: AdapterId,
    /// Factory name (`console`, `file`, ...).
    pub kind: Box<str>,
    /// Initial threshold.
    pub level: Level,
    /// Output encoding.
    #[serde(default)]
    pub format: FormatMode,
    /// Kind-specific options.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: AdapterOptions,
}

impl AdapterSpec {
    /// Create a spec with no options.
    pub fn new(id: AdapterId, kind: impl Into<Box<str>>, level: Level, format: FormatMode) -> Self {
        Self {
            id,
            kind: kind.into(),
            level,
            format,
            options: AdapterOptions::new(),
        }
    }

    /// Add one option.
    #[must_use]
    pub fn with_option(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Option lookup as a string.
    #[must_use]
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(serde_json::Value::as_str)
    }

    /// Option lookup as an unsigned integer; numeric strings are accepted.
    #[must_use]
    pub fn option_u64(&self, key: &str) -> Option<u64> {
        match self.options.get(key)? {
            serde_json::Value::Number(number) => number.as_u64(),
            serde_json::Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Option lookup as a boolean; `"true"`/`"false"` strings are accepted.
    #[must_use]
    pub fn option_bool(&self, key: &str) -> Option<bool> {
        match self.options.get(key)? {
            serde_json::Value::Bool(flag) => Some(*flag),
            serde_json::Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_read_leniently() -> Result<(), Box<dyn std::error::Error>> {
        let spec = AdapterSpec::new(AdapterId::parse("f")?, "file", Level::Debug, FormatMode::Json)
            .with_option("path", "./logs")
            .with_option("maxLine", 3)
            .with_option("maxSize", "64")
            .with_option("color", "false");

        assert_eq!(spec.option_str("path"), Some("./logs"));
        assert_eq!(spec.option_u64("maxLine"), Some(3));
        assert_eq!(spec.option_u64("maxSize"), Some(64));
        assert_eq!(spec.option_bool("color"), Some(false));
        assert_eq!(spec.option_u64("path"), None);
        assert_eq!(spec.option_str("missing"), None);
        Ok(())
    }

    #[test]
    fn spec_deserializes_with_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let spec: AdapterSpec =
            serde_json::from_str(r#"{"id":"console","kind":"console","level":"warn"}"#)?;
        assert_eq!(spec.format, FormatMode::Plain);
        assert_eq!(spec.level, Level::Warn);
        assert!(spec.options.is_empty());
        Ok(())
    }
}
