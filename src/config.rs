use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result, RetroError},
    overlay::damage::damage_seed,
    pipeline::{RetroParams, PARAM_SPECS},
    video::{capture::DEFAULT_JPEG_QUALITY, Facing, FlashMode},
};

/// Main configuration for the retro camcorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Effect parameters
    pub params: RetroParams,

    /// Camera settings
    pub camera: CameraConfig,

    /// Still capture settings
    pub capture: CaptureConfig,

    /// Threads, identity and display
    pub runtime: RuntimeConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_params(&self.params)?;
        self.capture.validate()?;
        self.runtime.validate()?;
        Ok(())
    }
}

/// A parameter file value outside its range is rejected rather than clamped
fn validate_params(params: &RetroParams) -> Result<()> {
    for spec in PARAM_SPECS {
        let Some(value) = params.get(spec.key) else { continue };
        if !value.is_finite() || value < spec.min || value > spec.max {
            return Err(ConfigError::InvalidValue {
                key: format!("params.{}", spec.key),
                value: value.to_string()
            }.into());
        }
    }
    Ok(())
}

/// Requested camera stream resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceResolution {
    #[serde(rename = "480p")]
    Sd,
    #[default]
    #[serde(rename = "720p")]
    Hd,
    #[serde(rename = "1080p")]
    FullHd,
}

impl SourceResolution {
    /// Landscape bounding box of the stream
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            SourceResolution::Sd => (640, 480),
            SourceResolution::Hd => (1280, 720),
            SourceResolution::FullHd => (1920, 1080),
        }
    }
}

impl FromStr for SourceResolution {
    type Err = RetroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "480p" | "sd" => Ok(SourceResolution::Sd),
            "720p" | "hd" => Ok(SourceResolution::Hd),
            "1080p" | "fhd" => Ok(SourceResolution::FullHd),
            _ => Err(ConfigError::InvalidValue {
                key: "camera.source_resolution".to_string(),
                value: s.to_string()
            }.into()),
        }
    }
}

impl fmt::Display for SourceResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (_, height) = self.dimensions();
        write!(f, "{}p", height)
    }
}

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Which camera the frames come from
    pub facing: Facing,

    /// Device held upright; drives `orientation = auto`
    pub device_portrait: bool,

    /// Stream resolution requested from the camera
    pub source_resolution: SourceResolution,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            device_portrait: false,
            source_resolution: SourceResolution::Hd,
        }
    }
}

/// Still capture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub flash_mode: FlashMode,

    /// JPEG quality (0.0-1.0]
    pub jpeg_quality: f32,

    /// Where stills are written
    pub output_dir: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            flash_mode: FlashMode::Auto,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            output_dir: PathBuf::from("stills"),
        }
    }
}

impl CaptureConfig {
    fn validate(&self) -> Result<()> {
        if !(self.jpeg_quality > 0.0 && self.jpeg_quality <= 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "capture.jpeg_quality".to_string(),
                value: self.jpeg_quality.to_string()
            }.into());
        }
        Ok(())
    }
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Threads for the blur and blend passes
    pub render_threads: usize,

    /// Stable per-install identifier; keys the lens damage pattern
    pub installation_id: String,

    /// Display size and density, also part of the damage key
    pub display_width: u32,
    pub display_height: u32,
    pub pixel_ratio: f32,

    /// Fixed RNG seed for reproducible renders
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            render_threads: num_cpus::get(),
            installation_id: "retro-camcorder".to_string(),
            display_width: 1920,
            display_height: 1080,
            pixel_ratio: 1.0,
            seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Seed for this installation's lens damage texture
    pub fn damage_seed(&self) -> u32 {
        damage_seed(&self.installation_id, self.display_width, self.display_height, self.pixel_ratio)
    }

    fn validate(&self) -> Result<()> {
        if self.render_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "runtime.render_threads".to_string(),
                value: self.render_threads.to_string()
            }.into());
        }

        if self.display_width == 0 || self.display_height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "runtime.display".to_string(),
                value: format!("{}x{}", self.display_width, self.display_height)
            }.into());
        }

        if !(self.pixel_ratio > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "runtime.pixel_ratio".to_string(),
                value: self.pixel_ratio.to_string()
            }.into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original_config = Config::default();
        original_config.params.set("noise", 60.0).unwrap();
        original_config.params.set("aspect_ratio", "16:9").unwrap();
        original_config.camera.facing = Facing::User;
        original_config.runtime.seed = Some(42);

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(
            &file_path,
            "[params]\nnoise = 10.0\n\n[camera]\nsource_resolution = \"1080p\"\n",
        )
        .unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.params.noise, 10.0);
        assert_eq!(config.params.saturation, RetroParams::default().saturation);
        assert_eq!(config.camera.source_resolution, SourceResolution::FullHd);
        assert_eq!(config.capture.jpeg_quality, DEFAULT_JPEG_QUALITY);
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempdir().unwrap();
        assert!(Config::from_file(dir.path().join("nope.toml")).is_err());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[params\nnoise = ").unwrap();
        assert!(Config::from_file(&broken).is_err());
    }

    #[test]
    fn test_out_of_range_param_rejected() {
        let mut config = Config::default();
        config.params.noise = 400.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_runtime_config() {
        let mut config = Config::default();
        config.runtime.render_threads = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.capture.jpeg_quality = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_damage_seed_follows_display() {
        let mut runtime = RuntimeConfig::default();
        let a = runtime.damage_seed();
        runtime.pixel_ratio = 2.0;
        assert_ne!(a, runtime.damage_seed());
    }
}
