use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the `xcrun` executable.
pub const XCRUN_ENV: &str = "FRAMEWORK_PROCESSOR_XCRUN";

fn default_xcrun() -> PathBuf {
    PathBuf::from("xcrun")
}

/// Locations of the external developer tools used during processing.
///
/// Optionally read from a JSON file such as `{"xcrun": "/usr/bin/xcrun"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Launcher for `lipo` and `bitcode_strip`.
    #[serde(default = "default_xcrun")]
    pub xcrun: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self { xcrun: default_xcrun() }
    }
}

impl ToolConfig {
    /// Defaults, with `FRAMEWORK_PROCESSOR_XCRUN` applied when set.
    pub fn from_env() -> Self {
        std::env::var_os(XCRUN_ENV)
            .map(|xcrun| Self { xcrun: PathBuf::from(xcrun) })
            .unwrap_or_default()
    }

    /// Load a tool config JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tool config at {}", path.display()))?;
        let config: ToolConfig =
            serde_json::from_str(&body).context("Failed to parse tool config JSON")?;
        Ok(config)
    }

    /// An explicit config file wins; otherwise fall back to the environment.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(Self::from_env()),
        }
    }
}
