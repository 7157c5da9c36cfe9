use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CaptureError, ConfigError, Result, RetroError};
use crate::video::types::Frame;

/// Scene luma below which the automatic flash fires
pub const AUTO_FLASH_LUMA: f32 = 80.0;

/// Default still quality, 0-1
pub const DEFAULT_JPEG_QUALITY: f32 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    /// Fire only in dark scenes
    #[default]
    Auto,
    On,
    Off,
}

impl FlashMode {
    pub fn should_fire(self, luma: f32) -> bool {
        match self {
            FlashMode::Auto => luma < AUTO_FLASH_LUMA,
            FlashMode::On => true,
            FlashMode::Off => false,
        }
    }
}

impl FromStr for FlashMode {
    type Err = RetroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(FlashMode::Auto),
            "on" => Ok(FlashMode::On),
            "off" => Ok(FlashMode::Off),
            _ => Err(ConfigError::InvalidValue {
                key: "flash_mode".to_string(),
                value: s.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for FlashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlashMode::Auto => "auto",
            FlashMode::On => "on",
            FlashMode::Off => "off",
        };
        f.write_str(name)
    }
}

/// Encode a rendered frame as JPEG. `quality` is 0-1.
pub fn encode_still(frame: &Frame, quality: f32) -> Result<Vec<u8>> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptureError::NoFrame.into());
    }

    let quality = (quality.clamp(0.01, 1.0) * 100.0).round() as u8;
    let rgb = image::DynamicImage::ImageRgba8(frame.as_image().clone()).to_rgb8();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode(rgb.as_raw(), width, height, image::ColorType::Rgb8)
        .map_err(|e| CaptureError::EncodingFailed { reason: e.to_string() })?;
    Ok(bytes)
}

/// File name for a still taken at `when`
pub fn still_file_name(when: DateTime<Local>) -> String {
    format!("retro_{}.jpg", when.format("%Y%m%d_%H%M%S"))
}

/// Write encoded still bytes into `directory`, named for `when`
pub fn save_still<P: AsRef<Path>>(jpeg: &[u8], directory: P, when: DateTime<Local>) -> Result<PathBuf> {
    if jpeg.is_empty() {
        return Err(CaptureError::NoFrame.into());
    }
    std::fs::create_dir_all(directory.as_ref())?;
    let path = directory.as_ref().join(still_file_name(when));
    std::fs::write(&path, jpeg)?;
    info!("Saved still {:?} ({} bytes)", path, jpeg.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_auto_flash_threshold() {
        assert!(FlashMode::Auto.should_fire(40.0));
        assert!(!FlashMode::Auto.should_fire(120.0));
        assert!(FlashMode::On.should_fire(200.0));
        assert!(!FlashMode::Off.should_fire(0.0));
    }

    #[test]
    fn test_encode_still_is_jpeg() {
        let frame = Frame::new_filled(32, 24, [200, 120, 40]);
        let bytes = encode_still(&frame, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 24));
    }

    #[test]
    fn test_encode_empty_frame_fails() {
        let err = encode_still(&Frame::new_black(0, 0), 0.85).unwrap_err();
        assert!(matches!(err, RetroError::Capture(CaptureError::NoFrame)));
    }

    #[test]
    fn test_save_still_writes_file() {
        let dir = TempDir::new().unwrap();
        let jpeg = encode_still(&Frame::new_black(8, 8), 0.5).unwrap();
        let when = Local.with_ymd_and_hms(1994, 7, 4, 18, 30, 0).unwrap();

        let path = save_still(&jpeg, dir.path().join("stills"), when).unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("retro_19940704_183000.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), jpeg);
    }

    #[test]
    fn test_save_empty_still_fails() {
        let dir = TempDir::new().unwrap();
        assert!(save_still(&[], dir.path(), Local::now()).is_err());
    }

    #[test]
    fn test_still_file_name() {
        let when = Local.with_ymd_and_hms(2026, 10, 19, 8, 5, 3).unwrap();
        assert_eq!(still_file_name(when), "retro_20261019_080503.jpg");
    }

    #[test]
    fn test_flash_mode_parse() {
        assert_eq!("AUTO".parse::<FlashMode>().unwrap(), FlashMode::Auto);
        assert!("strobe".parse::<FlashMode>().is_err());
    }
}
