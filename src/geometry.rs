use std::fmt;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RetroError};
use crate::video::Frame;

/// Largest digital zoom the crop resolver accepts
pub const MAX_ZOOM: f32 = 4.0;

/// Requested output aspect ratio, stored as `W:H`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::new(4, 3)
    }
}

impl FromStr for AspectRatio {
    type Err = RetroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            key: "aspect_ratio".to_string(),
            value: s.to_string(),
        };

        let (w, h) = s.split_once(':').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid().into());
        }
        Ok(Self { width, height })
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = RetroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(value: AspectRatio) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Orientation mode for the output canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Follow the device
    #[default]
    Auto,
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn is_portrait(self, device_portrait: bool) -> bool {
        match self {
            Orientation::Auto => device_portrait,
            Orientation::Landscape => false,
            Orientation::Portrait => true,
        }
    }
}

impl FromStr for Orientation {
    type Err = RetroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Orientation::Auto),
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            other => Err(ConfigError::InvalidValue {
                key: "orientation".to_string(),
                value: other.to_string(),
            }
            .into()),
        }
    }
}

/// Compute the render canvas size.
///
/// The long side equals `quality`; the ratio is inverted when the effective
/// orientation disagrees with it. Both sides are floored to even numbers and
/// never drop below 2.
pub fn target_dimensions(
    aspect: AspectRatio,
    orientation: Orientation,
    device_portrait: bool,
    quality: u32,
) -> (u32, u32) {
    let mut ratio = aspect.ratio();
    let portrait = orientation.is_portrait(device_portrait);

    if (portrait && ratio > 1.0) || (!portrait && ratio < 1.0) {
        ratio = 1.0 / ratio;
    }

    let quality = quality.max(2) as f32;
    let (w, h) = if ratio >= 1.0 {
        (quality, (quality / ratio).round())
    } else {
        ((quality * ratio).round(), quality)
    };

    let even = |v: f32| ((v as u32 / 2) * 2).max(2);
    (even(w), even(h))
}

/// Region of the source frame that is scaled onto the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Centred crop of a `source_w` x `source_h` frame matching `target_aspect`,
/// shrunk by `zoom` (clamped to `[1, MAX_ZOOM]`).
pub fn crop_rect(source_w: u32, source_h: u32, target_aspect: f32, zoom: f32) -> CropRect {
    let vw = source_w as f32;
    let vh = source_h as f32;
    let source_aspect = vw / vh;

    let (mut crop_w, mut crop_h) = if target_aspect > source_aspect {
        (vw, vw / target_aspect)
    } else {
        (vh * target_aspect, vh)
    };

    let zoom = if zoom.is_finite() { zoom.clamp(1.0, MAX_ZOOM) } else { 1.0 };
    crop_w /= zoom;
    crop_h /= zoom;

    CropRect {
        x: (vw - crop_w) / 2.0,
        y: (vh - crop_h) / 2.0,
        width: crop_w,
        height: crop_h,
    }
}

/// Cut `crop` out of `source`, scale it to `width` x `height` and optionally
/// mirror it for a user-facing camera. The result is the raw frame.
pub fn crop_and_scale(source: &Frame, crop: CropRect, width: u32, height: u32, mirror: bool) -> Frame {
    let (sw, sh) = source.dimensions();
    let x = (crop.x.floor().max(0.0) as u32).min(sw.saturating_sub(1));
    let y = (crop.y.floor().max(0.0) as u32).min(sh.saturating_sub(1));
    let w = (crop.width.round() as u32).clamp(1, sw - x);
    let h = (crop.height.round() as u32).clamp(1, sh - y);

    let view = imageops::crop_imm(source.as_image(), x, y, w, h).to_image();
    let mut frame = Frame::new(imageops::resize(&view, width, height, FilterType::Triangle));
    if mirror {
        frame.mirror_horizontal();
    }
    frame
}
