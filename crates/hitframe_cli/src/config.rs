//! hitframe configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up next to project files
pub const CONFIG_FILE: &str = "hitframe.toml";

/// Top-level configuration (hitframe.toml)
#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct HitframeConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Headless playback configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct PlaybackConfig {
    /// Frames per second; the project's own rate when unset
    #[serde(default)]
    pub fps: Option<u32>,
    /// Wrap around the timeline bounds
    #[serde(default = "default_true")]
    pub looping: bool,
    /// Simulated time per update in milliseconds; one frame when unset
    #[serde(default)]
    pub step_ms: Option<u64>,
}

fn default_true() -> bool {
    true
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: None,
            looping: true,
            step_ms: None,
        }
    }
}

/// Project file output configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct OutputConfig {
    /// Pretty-print saved project files
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl HitframeConfig {
    /// Load configuration for a project file.
    ///
    /// An explicit path must exist. Otherwise `hitframe.toml` is looked up in
    /// the project's directory and defaults are used when there is none.
    pub fn load(explicit: Option<&Path>, project: &Path) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = config_dir(project).join(CONFIG_FILE);
                if !candidate.exists() {
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Simulated seconds per playback update at `fps`
    pub fn step_seconds(&self, fps: u32) -> f32 {
        match self.playback.step_ms {
            Some(ms) => ms as f32 / 1000.0,
            None => 1.0 / fps.max(1) as f32,
        }
    }
}

fn config_dir(project: &Path) -> PathBuf {
    match project.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
