//! Configuration types and profile persistence
//!
//! A [`Profile`] bundles the parser and display settings and can be saved
//! to and loaded from disk. TOML is the primary on-disk format; `.json`
//! files are also accepted for interoperability.

pub mod display;
pub mod parser;

pub use display::DisplayConfig;
pub use parser::{ParserConfig, XAxisSource};

use crate::error::{LinevisError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A saved configuration profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Human-readable profile name
    pub name: String,
    /// Parser settings
    pub parser: ParserConfig,
    /// Display and history settings
    pub display: DisplayConfig,
}

impl Profile {
    /// Create a new profile with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load a profile from disk, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(LinevisError::from)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;

        let parsed = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| LinevisError::Config(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| LinevisError::Config(e.to_string()))
        };
        parsed.with_context(|| format!("Failed to parse profile {}", path.display()))
    }

    /// Load a profile, returning defaults if any error occurs.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Save the profile to disk, choosing the format by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| LinevisError::Serialization(e.to_string()))?
        } else {
            toml::to_string_pretty(self)
                .map_err(|e| LinevisError::Serialization(e.to_string()))?
        };

        std::fs::write(path, content)
            .map_err(LinevisError::from)
            .with_context(|| format!("Failed to write profile {}", path.display()))
    }
}
