use thiserror::Error;

/// Main error type for the retro-camcorder library
#[derive(Error, Debug)]
pub enum RetroError {
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Frame source and frame buffer errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Failed to load frame: {path}")]
    LoadFailed { path: String },

    #[error("No frames found in: {path}")]
    NoFrames { path: String },

    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Configuration and parameter errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown parameter: {key}")]
    UnknownParameter { key: String },

    #[error("Unknown preset: {name}")]
    UnknownPreset { name: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Still capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No completed frame available to capture")]
    NoFrame,

    #[error("Still encoding failed: {reason}")]
    EncodingFailed { reason: String },
}

/// Convenience type alias for Results using RetroError
pub type Result<T> = std::result::Result<T, RetroError>;

impl RetroError {
    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            // A frame that failed to load may be readable next tick
            Self::Frame(FrameError::LoadFailed { .. }) => true,
            Self::Capture(CaptureError::NoFrame) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Frame(FrameError::LoadFailed { path }) => {
                format!("Could not load frame '{}'. Please check the file exists and is a PNG or JPEG.", path)
            }
            Self::Config(ConfigError::UnknownPreset { name }) => {
                format!("Preset '{}' not found. Available presets: camcorder, classic, worn, clean", name)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
