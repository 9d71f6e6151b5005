//! Render Options - Defaults the helper falls back to

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read options: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid options: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid option {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Splits dotted paths.
    #[serde(default = "default_path_separator")]
    pub path_separator: String,
    /// Joins lines in `with_line_breaks`.
    #[serde(default = "default_line_separator")]
    pub line_separator: String,
    /// Size name passed to the media host for plain images.
    #[serde(default = "default_image_size")]
    pub image_size: String,
    /// Tag used by `maybe_anchor` when there is no link.
    #[serde(default = "default_fallback_tag")]
    pub fallback_tag: String,
}

fn default_path_separator() -> String { crate::data::DEFAULT_SEPARATOR.to_string() }
fn default_line_separator() -> String { crate::markup::DEFAULT_LINE_SEPARATOR.to_string() }
fn default_image_size() -> String { "full".to_string() }
fn default_fallback_tag() -> String { "div".to_string() }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            path_separator: default_path_separator(),
            line_separator: default_line_separator(),
            image_size: default_image_size(),
            fallback_tag: default_fallback_tag(),
        }
    }
}

impl RenderOptions {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path_separator.is_empty() {
            return Err(ConfigError::Invalid { field: "pathSeparator", reason: "must not be empty" });
        }
        if self.fallback_tag.is_empty() {
            return Err(ConfigError::Invalid { field: "fallbackTag", reason: "must not be empty" });
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let options = RenderOptions::from_json(r#"{"pathSeparator": "/"}"#).unwrap();
        assert_eq!(options.path_separator, "/");
        assert_eq!(options.line_separator, "<br/>");
        assert_eq!(options.image_size, "full");
        assert_eq!(options.fallback_tag, "div");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        fs::write(&path, r#"{"fallbackTag": "span", "imageSize": "medium"}"#).unwrap();

        let options = RenderOptions::load(&path).unwrap();
        assert_eq!(options.fallback_tag, "span");
        assert_eq!(options.image_size, "medium");
        assert!(RenderOptions::load(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_empty_separator_rejected() {
        let result = RenderOptions::from_json(r#"{"pathSeparator": ""}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { field: "pathSeparator", .. })));
        assert!(matches!(
            RenderOptions::from_json(r#"{"fallbackTag": ""}"#),
            Err(ConfigError::Invalid { field: "fallbackTag", .. })
        ));
        assert!(RenderOptions::default().validate().is_ok());
    }
}
