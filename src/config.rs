//! Application configuration.
//!
//! The configuration is loaded from a JSON file.  Every key is optional —
//! a minimal `{}` file is valid and unknown keys are ignored, so the file
//! can grow more sections later without breaking older setups.
//!
//! # Example
//!
//! ```json
//! {
//!   "output": "eDP-1",
//!   "format-icons": {
//!     "1": "●",
//!     "2": "◆",
//!     "default": "○"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Maps a workspace name to the icon shown on its button.  The
    /// special `"default"` entry applies to every name without an exact
    /// match; with no entry at all, the raw name is used as the label.
    #[serde(rename = "format-icons", default)]
    pub format_icons: HashMap<String, String>,

    /// Which output this strip instance renders.  When absent, the
    /// embedding surface is expected to resolve it at runtime (e.g. from
    /// the display the widget lands on).
    #[serde(default)]
    pub output: Option<String>,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
