// Tool settings
// Loaded from the file named by --config / $TABSUM_CONFIG, else from
// the platform config dir (~/.config/tabsum/config.toml on Linux)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use tabsum_engine::aggregate::{DEFAULT_CATEGORY_COLUMN, DEFAULT_VALUE_COLUMN};
use tabsum_engine::{AggregateOptions, BlankCategory, NumberStyle};

/// Environment variable naming a settings file.
pub const CONFIG_ENV: &str = "TABSUM_CONFIG";

pub const DEFAULT_INDENT: usize = 4;

/// Widest JSON indentation accepted from flags or the settings file.
pub const MAX_INDENT: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Header of the numeric column to clean and sum
    pub value_column: String,

    /// Header of the grouping column; rows are totalled when it is absent
    pub category_column: String,

    pub number_style: NumberStyle,

    pub blank_category: BlankCategory,

    /// Spaces of JSON indentation, at most `MAX_INDENT`; 0 = compact
    #[serde(deserialize_with = "bounded_indent")]
    pub indent: usize,

    /// CSV field delimiter; sniffed from the input when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
            category_column: DEFAULT_CATEGORY_COLUMN.to_string(),
            number_style: NumberStyle::Strict,
            blank_category: BlankCategory::Skip,
            indent: DEFAULT_INDENT,
            delimiter: None,
        }
    }
}

fn bounded_indent<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let indent = usize::deserialize(deserializer)?;
    if indent > MAX_INDENT {
        let message = format!("indent {indent} is out of range 0..={MAX_INDENT}");
        return Err(serde::de::Error::custom(message));
    }
    Ok(indent)
}

impl Settings {
    /// Default settings file location in the platform config dir.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabsum")
            .join("config.toml")
    }

    /// Load settings from the default location. No file there means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load settings from a file the user named. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("loaded config from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Aggregation options described by these settings.
    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            value_column: self.value_column.clone(),
            category_column: Some(self.category_column.clone()),
            number_style: self.number_style,
            blank_category: self.blank_category,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.value_column, "Value");
        assert_eq!(s.category_column, "Category");
        assert_eq!(s.indent, 4);
        assert_eq!(s.delimiter, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let s = Settings::from_toml("value_column = \"Amount\"\n").unwrap();
        assert_eq!(s.value_column, "Amount");
        assert_eq!(s.category_column, "Category");
        assert_eq!(s.number_style, NumberStyle::Strict);
        assert_eq!(s.indent, DEFAULT_INDENT);
    }

    #[test]
    fn test_full_file() {
        let s = Settings::from_toml(
            r#"
value_column = "sales"
category_column = "region"
number_style = "financial"
blank_category = "group"
indent = 0
delimiter = ";"
"#,
        )
        .unwrap();
        assert_eq!(s.number_style, NumberStyle::Financial);
        assert_eq!(s.blank_category, BlankCategory::Group);
        assert_eq!(s.indent, 0);
        assert_eq!(s.delimiter, Some(';'));

        let opts = s.aggregate_options();
        assert_eq!(opts.value_column, "sales");
        assert_eq!(opts.category_column.as_deref(), Some("region"));
    }

    #[test]
    fn test_unknown_style_is_error() {
        let result = Settings::from_toml("number_style = \"roman\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_indent_is_bounded() {
        let s = Settings::from_toml("indent = 16").unwrap();
        assert_eq!(s.indent, MAX_INDENT);

        let err = Settings::from_toml("indent = 17").unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
        assert!(Settings::from_toml("indent = -1").is_err());
    }

    #[test]
    fn test_default_path_is_in_tabsum_dir() {
        let path = Settings::config_path();
        assert!(path.ends_with("tabsum/config.toml"), "{}", path.display());
    }

    #[test]
    fn test_load_named_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("typo.toml");

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("typo.toml"));
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "indent = \"wide\"").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_load_out_of_range_indent_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "indent = 1000\n").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("indent"), "{err}");
    }

    #[test]
    fn test_to_json_shape() {
        let json = Settings::default().to_json();
        assert_eq!(json["value_column"], "Value");
        assert_eq!(json["number_style"], "strict");
        assert!(json.get("delimiter").is_none());
    }
}
