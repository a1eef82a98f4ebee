use crate::constants::{
    CONFIG_SEARCH_PATHS, DEFAULT_OCR_COMMAND, DEFAULT_OCR_LANGUAGE, DEFAULT_WRAP_WIDTH,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration loaded from settings.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub backends: BackendsConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_wrap_width() -> usize {
    DEFAULT_WRAP_WIDTH
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}

/// Backends switched off regardless of what the probe finds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendsConfig {
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl BackendsConfig {
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|d| d.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_command")]
    pub command: String,
    #[serde(default = "default_ocr_language")]
    pub language: String,
}

fn default_ocr_command() -> String {
    DEFAULT_OCR_COMMAND.to_string()
}

fn default_ocr_language() -> String {
    DEFAULT_OCR_LANGUAGE.to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: default_ocr_command(),
            language: default_ocr_language(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration from default location or return defaults
    pub fn load() -> Result<Self> {
        for candidate in CONFIG_SEARCH_PATHS {
            let path = PathBuf::from(shellexpand::tilde(candidate).as_ref());
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }
}
