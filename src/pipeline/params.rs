use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    geometry::{AspectRatio, Orientation},
};

/// Range and default of one numeric control
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub key: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub description: &'static str,
}

/// Every numeric control with its documented range.
pub const PARAM_SPECS: &[ParamSpec] = &[
    ParamSpec { key: "fps", min: 1.0, max: 30.0, default: 12.0, description: "Target frame rate" },
    ParamSpec { key: "motion_threshold", min: 0.01, max: 0.5, default: 0.20, description: "Corner motion ratio that triggers shake" },
    ParamSpec { key: "jitter_intensity", min: 0.0, max: 50.0, default: 10.0, description: "Maximum shake displacement (px)" },
    ParamSpec { key: "interlace", min: 0.0, max: 1.0, default: 0.2, description: "Odd-row blend toward the previous frame" },
    ParamSpec { key: "wave_amount", min: 0.0, max: 10.0, default: 0.0, description: "Horizontal tear offset (px)" },
    ParamSpec { key: "roll_speed", min: 0.0, max: 20.0, default: 0.0, description: "Vertical roll (rows per frame)" },
    ParamSpec { key: "curvature", min: -0.5, max: 0.5, default: -0.1, description: "Barrel (+) / pincushion (-) lens curvature" },
    ParamSpec { key: "sharpen", min: 0.0, max: 3.0, default: 1.0, description: "Edge enhancement" },
    ParamSpec { key: "color_bleed", min: 0.0, max: 10.0, default: 2.0, description: "Chroma smear distance (px)" },
    ParamSpec { key: "lens_fringe", min: 0.0, max: 10.0, default: 1.0, description: "Chromatic aberration distance (px)" },
    ParamSpec { key: "hue_shift", min: 0.0, max: 2.0, default: 0.4, description: "White-balance drift multiplier" },
    ParamSpec { key: "saturation", min: 0.0, max: 4.0, default: 1.6, description: "Saturation factor" },
    ParamSpec { key: "contrast", min: 0.0, max: 5.0, default: 2.4, description: "Contrast factor" },
    ParamSpec { key: "brightness", min: 0.0, max: 2.0, default: 0.9, description: "Brightness factor" },
    ParamSpec { key: "bit_crush", min: 0.0, max: 100.0, default: 0.0, description: "Bit-depth reduction" },
    ParamSpec { key: "vignette", min: 0.0, max: 1.0, default: 0.3, description: "Edge darkening strength" },
    ParamSpec { key: "noise", min: 0.0, max: 100.0, default: 35.0, description: "Luma noise amplitude" },
    ParamSpec { key: "scanline_intensity", min: 0.0, max: 1.0, default: 0.8, description: "Even-row dimming" },
    ParamSpec { key: "tracking_noise", min: 0.0, max: 1.0, default: 0.3, description: "Tracking band probability" },
    ParamSpec { key: "blur", min: 0.0, max: 3.0, default: 0.5, description: "Softness before the effect stages (px)" },
    ParamSpec { key: "bloom", min: 0.0, max: 1.0, default: 0.4, description: "Light bloom opacity" },
    ParamSpec { key: "lens_damage", min: 0.0, max: 1.0, default: 0.3, description: "Dust and dropout overlay opacity" },
    ParamSpec { key: "quality", min: 80.0, max: 480.0, default: 240.0, description: "Long side of the effect canvas (px)" },
    ParamSpec { key: "zoom", min: 1.0, max: 4.0, default: 1.0, description: "Digital zoom" },
];

/// Look up the range of a numeric control
pub fn spec_for(key: &str) -> Option<&'static ParamSpec> {
    PARAM_SPECS.iter().find(|spec| spec.key == key)
}

fn default_of(key: &str) -> f32 {
    spec_for(key).map(|spec| spec.default).unwrap_or_default()
}

/// Named access to the numeric controls, by value and by slot
macro_rules! numeric_fields {
    ($($key:literal => $field:ident),* $(,)?) => {
        fn slot(&mut self, key: &str) -> Option<&mut f32> {
            match key {
                $($key => Some(&mut self.$field),)*
                _ => None,
            }
        }

        /// Read a numeric control by name
        pub fn get(&self, key: &str) -> Option<f32> {
            match key {
                $($key => Some(self.$field),)*
                _ => None,
            }
        }
    };
}

/// Value assigned to a control by name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Float(f32),
    Bool(bool),
    String(String),
}

impl ParamValue {
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::String(s) => match s.as_str() {
                "on" | "true" | "1" => Some(true),
                "off" | "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_string(&self) -> String {
        match self {
            ParamValue::Float(f) => f.to_string(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::String(s) => s.clone(),
        }
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

/// The live parameter set.
///
/// The pipeline reads a clamped snapshot of this once per frame; nothing
/// mutates it mid-frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetroParams {
    pub fps: f32,
    pub motion_threshold: f32,
    pub jitter_intensity: f32,
    pub interlace: f32,
    pub wave_amount: f32,
    pub roll_speed: f32,
    pub curvature: f32,
    pub sharpen: f32,
    pub color_bleed: f32,
    pub lens_fringe: f32,
    pub hue_shift: f32,
    pub saturation: f32,
    pub contrast: f32,
    pub brightness: f32,
    pub bit_crush: f32,
    pub vignette: f32,
    pub noise: f32,
    pub scanline_intensity: f32,
    pub tracking_noise: f32,
    pub blur: f32,
    pub bloom: f32,
    pub lens_damage: f32,
    pub quality: f32,
    pub zoom: f32,
    pub aspect_ratio: AspectRatio,
    pub orientation: Orientation,
    pub date_stamp: bool,
}

impl Default for RetroParams {
    fn default() -> Self {
        Self {
            fps: default_of("fps"),
            motion_threshold: default_of("motion_threshold"),
            jitter_intensity: default_of("jitter_intensity"),
            interlace: default_of("interlace"),
            wave_amount: default_of("wave_amount"),
            roll_speed: default_of("roll_speed"),
            curvature: default_of("curvature"),
            sharpen: default_of("sharpen"),
            color_bleed: default_of("color_bleed"),
            lens_fringe: default_of("lens_fringe"),
            hue_shift: default_of("hue_shift"),
            saturation: default_of("saturation"),
            contrast: default_of("contrast"),
            brightness: default_of("brightness"),
            bit_crush: default_of("bit_crush"),
            vignette: default_of("vignette"),
            noise: default_of("noise"),
            scanline_intensity: default_of("scanline_intensity"),
            tracking_noise: default_of("tracking_noise"),
            blur: default_of("blur"),
            bloom: default_of("bloom"),
            lens_damage: default_of("lens_damage"),
            quality: default_of("quality"),
            zoom: default_of("zoom"),
            aspect_ratio: AspectRatio::default(),
            orientation: Orientation::Auto,
            date_stamp: false,
        }
    }
}

impl RetroParams {
    /// Every effect stage at its neutral value. Geometry and frame rate keep
    /// their defaults.
    pub fn neutral() -> Self {
        Self {
            motion_threshold: 0.5,
            jitter_intensity: 0.0,
            interlace: 0.0,
            wave_amount: 0.0,
            roll_speed: 0.0,
            curvature: 0.0,
            sharpen: 0.0,
            color_bleed: 0.0,
            lens_fringe: 0.0,
            hue_shift: 0.0,
            saturation: 1.0,
            contrast: 1.0,
            brightness: 1.0,
            bit_crush: 0.0,
            vignette: 0.0,
            noise: 0.0,
            scanline_intensity: 0.0,
            tracking_noise: 0.0,
            blur: 0.0,
            bloom: 0.0,
            lens_damage: 0.0,
            ..Self::default()
        }
    }

    numeric_fields! {
        "fps" => fps,
        "motion_threshold" => motion_threshold,
        "jitter_intensity" => jitter_intensity,
        "interlace" => interlace,
        "wave_amount" => wave_amount,
        "roll_speed" => roll_speed,
        "curvature" => curvature,
        "sharpen" => sharpen,
        "color_bleed" => color_bleed,
        "lens_fringe" => lens_fringe,
        "hue_shift" => hue_shift,
        "saturation" => saturation,
        "contrast" => contrast,
        "brightness" => brightness,
        "bit_crush" => bit_crush,
        "vignette" => vignette,
        "noise" => noise,
        "scanline_intensity" => scanline_intensity,
        "tracking_noise" => tracking_noise,
        "blur" => blur,
        "bloom" => bloom,
        "lens_damage" => lens_damage,
        "quality" => quality,
        "zoom" => zoom,
    }

    /// Set a control by name, clamping numeric values to their range
    pub fn set<V: Into<ParamValue>>(&mut self, key: &str, value: V) -> Result<()> {
        let value = value.into();
        let invalid = |value: &ParamValue| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.as_string(),
        };

        match key {
            "aspect_ratio" => {
                self.aspect_ratio = value.as_string().parse()?;
            }
            "orientation" => {
                self.orientation = value.as_string().parse()?;
            }
            "date_stamp" => {
                self.date_stamp = value.as_bool().ok_or_else(|| invalid(&value))?;
            }
            _ => {
                let spec = spec_for(key).ok_or_else(|| ConfigError::UnknownParameter { key: key.to_string() })?;
                let number = value.as_f32().filter(|v| v.is_finite()).ok_or_else(|| invalid(&value))?;
                if let Some(slot) = self.slot(key) {
                    *slot = number.clamp(spec.min, spec.max);
                }
            }
        }
        Ok(())
    }

    /// Copy with every numeric value clamped into its documented range.
    /// Non-finite values fall back to the default.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        for spec in PARAM_SPECS {
            if let Some(slot) = out.slot(spec.key) {
                let value = *slot;
                *slot = if value.is_finite() { value.clamp(spec.min, spec.max) } else { spec.default };
            }
        }
        out
    }

    /// Whole-pixel render quality
    pub fn quality_px(&self) -> u32 {
        self.quality.round() as u32
    }

    /// Minimum spacing between rendered frames in milliseconds
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.fps.max(1.0) as f64
    }
}
