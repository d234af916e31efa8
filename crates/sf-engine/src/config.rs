//! Extraction configuration.

use serde::{Deserialize, Serialize};
use sf_ir::{BuildOptions, WindowConfig, DEFAULT_UNTERMINATED_NOTE_TOLERANCE};

use crate::error::ConfigError;

/// Input tolerance settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub unterminated_note_tolerance: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            unterminated_note_tolerance: DEFAULT_UNTERMINATED_NOTE_TOLERANCE,
        }
    }
}

/// Everything the core consumes from its host.
///
/// ```toml
/// parallel = true
/// enabled = ["Range"]
///
/// [window]
/// size_seconds = 10.0
/// overlap = 0.5
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Fan features out across the rayon pool within a window
    pub parallel: bool,
    /// Features to extract; `None` means the whole catalog. Dependencies
    /// of enabled features are always added.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Vec<String>>,
    pub window: WindowConfig,
    pub input: InputConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            enabled: None,
            window: WindowConfig::default(),
            input: InputConfig::default(),
        }
    }
}

impl ExtractionConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;
        Ok(())
    }

    /// Options for the representation builder.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            window: self.window,
            unterminated_note_tolerance: self.input.unterminated_note_tolerance,
        }
    }
}
