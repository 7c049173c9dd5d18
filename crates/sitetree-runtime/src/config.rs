#![forbid(unsafe_code)]

//! Editor configuration.
//!
//! [`EditorConfig`] holds the drop classification threshold and the layout
//! sizing. Every field has a default, so a config file only lists what it
//! overrides:
//!
//! ```toml
//! child_threshold = 0.4
//!
//! [layout]
//! indent = 2
//! placeholders = false
//! ```
//!
//! File loading requires the `config` feature.

#[cfg(feature = "config")]
use std::path::Path;

use serde::{Deserialize, Serialize};
use sitetree_widgets::{DEFAULT_CHILD_THRESHOLD, DropClassifier, LayoutOptions};
use thiserror::Error;

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Fraction of the dragged row's width past which a gap drop nests
    /// under the page above.
    pub child_threshold: f32,
    pub layout: LayoutPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            child_threshold: DEFAULT_CHILD_THRESHOLD,
            layout: LayoutPolicy::default(),
        }
    }
}

/// Row sizing for the tree layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPolicy {
    pub indent: u16,
    pub row_height: u16,
    pub gap_height: u16,
    pub width: u16,
    pub placeholders: bool,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        let options = LayoutOptions::default();
        Self {
            indent: options.indent,
            row_height: options.row_height,
            gap_height: options.gap_height,
            width: options.width,
            placeholders: options.placeholders,
        }
    }
}

impl LayoutPolicy {
    #[must_use]
    pub fn to_layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            indent: self.indent,
            row_height: self.row_height,
            gap_height: self.gap_height,
            width: self.width,
            placeholders: self.placeholders,
        }
    }
}

impl EditorConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load a file, picking the format from its extension (`.json` is JSON,
    /// anything else TOML), and reject invalid values.
    #[cfg(feature = "config")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_toml_str(&content)?,
        };
        config.validated()
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(0.0..=1.0).contains(&self.child_threshold) {
            errors.push(format!(
                "child_threshold must be in [0, 1], got {}",
                self.child_threshold
            ));
        }
        if self.layout.row_height == 0 {
            errors.push("layout.row_height must be > 0".to_string());
        }
        if self.layout.width == 0 {
            errors.push("layout.width must be > 0".to_string());
        }
        if self.layout.indent >= self.layout.width {
            errors.push(format!(
                "layout.indent ({}) must be smaller than layout.width ({})",
                self.layout.indent, self.layout.width
            ));
        }
        errors
    }

    /// `self` if [`validate`](Self::validate) reports nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    #[must_use]
    pub fn classifier(&self) -> DropClassifier {
        DropClassifier::new(self.child_threshold)
    }

    #[must_use]
    pub fn layout_options(&self) -> LayoutOptions {
        self.layout.to_layout_options()
    }
}

/// Errors from loading editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
