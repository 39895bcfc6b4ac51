// Global configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory tree scanned for source videos
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Root for normalized outputs (mirrors the input tree)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Append-mode run log
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Recognized source extensions, matched case-insensitively
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

fn videos_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Videos")
}

fn default_input_dir() -> PathBuf {
    videos_dir().join("ToConvert")
}

fn default_output_dir() -> PathBuf {
    videos_dir().join("Converted")
}

fn default_log_file() -> PathBuf {
    videos_dir().join("Logs").join("video_transcode.log")
}

fn default_video_extensions() -> Vec<String> {
    crate::engine::scan::VIDEO_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            log_file: default_log_file(),
            video_extensions: default_video_extensions(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("ffnorm")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("ffnorm")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk, or fall back to built-in defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            let config: Config = toml::from_str(&contents).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?;

            Ok(config)
        } else {
            let config = Config::default();

            // Try to save the default config, but don't fail if we can't
            if let Err(e) = config.save() {
                eprintln!("Warning: Could not create default config file: {}", e);
                eprintln!(
                    "Using built-in defaults. Run 'ffnorm init-config' to create a config file."
                );
            }

            Ok(config)
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Check if config file exists
    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Create a default config file if it doesn't exist
    pub fn ensure_default() -> Result<()> {
        if !Self::exists() {
            let config = Config::default();
            config.save()?;
        }
        Ok(())
    }
}
