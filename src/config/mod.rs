//! Application Configuration
//!
//! User settings and preferences stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::capture::MIN_RECT_SIZE;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Capture settings
    pub capture: CaptureSettings,
    /// Recognition settings
    pub recognition: RecognitionSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Capture-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Minimum width and height of a drawn region, in source pixels
    pub min_region_size: f64,
    /// How often the recognition scheduler looks for pending regions
    pub scan_interval_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            min_region_size: MIN_RECT_SIZE,
            scan_interval_ms: 250,
        }
    }
}

/// Recognition-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Recognition language (e.g., "eng")
    pub language: String,
    /// Lower bound of the mock recognizer latency
    pub mock_min_delay_ms: u64,
    /// Upper bound (exclusive) of the mock recognizer latency
    pub mock_max_delay_ms: u64,
    /// Filters applied to region images before recognition
    pub preprocessing: OcrPreprocessing,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            mock_min_delay_ms: 600,
            mock_max_delay_ms: 1400,
            preprocessing: OcrPreprocessing::default(),
        }
    }
}

/// OCR preprocessing options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrPreprocessing {
    /// Whether preprocessing is applied at all
    pub enabled: bool,
    /// Convert to grayscale
    pub grayscale: bool,
    /// Invert colors (light text on dark backgrounds)
    pub invert: bool,
    /// Contrast factor, 1.0 = unchanged
    pub contrast: f32,
    /// Minimum upscale factor; small regions are upscaled further
    pub scale: u32,
}

impl Default for OcrPreprocessing {
    fn default() -> Self {
        Self {
            enabled: true,
            grayscale: true,
            invert: false,
            contrast: 1.0,
            scale: 1,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
