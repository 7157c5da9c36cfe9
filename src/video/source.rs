use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, FrameError, Result, RetroError};
use crate::video::types::Frame;

/// Which way the camera points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Selfie camera; frames are mirrored before rendering
    User,
    #[default]
    Environment,
}

impl Facing {
    pub fn mirrored(self) -> bool {
        matches!(self, Facing::User)
    }
}

impl FromStr for Facing {
    type Err = RetroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "user" | "front" => Ok(Facing::User),
            "environment" | "back" | "rear" => Ok(Facing::Environment),
            _ => Err(ConfigError::InvalidValue {
                key: "facing".to_string(),
                value: s.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::User => write!(f, "user"),
            Facing::Environment => write!(f, "environment"),
        }
    }
}

/// Where raw camera frames come from
pub trait FrameSource {
    /// A frame can be read right now
    fn is_ready(&self) -> bool;

    /// Native size of the frames this source produces
    fn native_dimensions(&self) -> (u32, u32);

    fn facing(&self) -> Facing;

    /// Most recent frame. File-backed sources advance on every call.
    fn latest_frame(&mut self) -> Result<Frame>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn native_dimensions(&self) -> (u32, u32) {
        (**self).native_dimensions()
    }

    fn facing(&self) -> Facing {
        (**self).facing()
    }

    fn latest_frame(&mut self) -> Result<Frame> {
        (**self).latest_frame()
    }
}

pub fn is_image_path<P: AsRef<Path>>(path: P) -> bool {
    match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png"),
        None => false,
    }
}

fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Load an image file as an RGBA frame
pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<Frame> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|e| {
        debug!("Decoding {:?} failed: {}", path, e);
        FrameError::LoadFailed {
            path: path.display().to_string(),
        }
    })?;
    Ok(Frame::new(image.to_rgba8()))
}

/// One image shown forever, like a camera pointed at a still scene
#[derive(Debug, Clone)]
pub struct StillSource {
    frame: Frame,
    facing: Facing,
}

impl StillSource {
    pub fn new(frame: Frame, facing: Facing) -> Self {
        Self { frame, facing }
    }

    pub fn open<P: AsRef<Path>>(path: P, facing: Facing) -> Result<Self> {
        let frame = load_frame(path.as_ref())?;
        info!(
            "Opened still source {:?} ({}x{})",
            path.as_ref(),
            frame.width(),
            frame.height()
        );
        Ok(Self::new(frame, facing))
    }
}

impl FrameSource for StillSource {
    fn is_ready(&self) -> bool {
        self.frame.width() > 0 && self.frame.height() > 0
    }

    fn native_dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn facing(&self) -> Facing {
        self.facing
    }

    fn latest_frame(&mut self) -> Result<Frame> {
        Ok(self.frame.clone())
    }
}

/// A directory of numbered image files played back in name order
#[derive(Debug, Clone)]
pub struct SequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    looping: bool,
    facing: Facing,
    dimensions: (u32, u32),
}

impl SequenceSource {
    pub fn open<P: AsRef<Path>>(directory: P, facing: Facing, looping: bool) -> Result<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(FrameError::LoadFailed {
                path: directory.display().to_string(),
            }
            .into());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            let path = entry?.path();
            if path.is_file() && !is_hidden_file(&path) && is_image_path(&path) {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(FrameError::NoFrames {
                path: directory.display().to_string(),
            }
            .into());
        }
        paths.sort();

        let dimensions = image::image_dimensions(&paths[0]).map_err(|_| FrameError::LoadFailed {
            path: paths[0].display().to_string(),
        })?;

        info!(
            "Opened sequence {:?}: {} frames at {}x{}",
            directory,
            paths.len(),
            dimensions.0,
            dimensions.1
        );
        Ok(Self {
            paths,
            cursor: 0,
            looping,
            facing,
            dimensions,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for SequenceSource {
    fn is_ready(&self) -> bool {
        self.looping || self.cursor < self.paths.len()
    }

    fn native_dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn facing(&self) -> Facing {
        self.facing
    }

    fn latest_frame(&mut self) -> Result<Frame> {
        if !self.is_ready() {
            return Err(FrameError::NoFrames {
                path: "sequence exhausted".to_string(),
            }
            .into());
        }

        let path = &self.paths[self.cursor % self.paths.len()];
        self.cursor += 1;
        let frame = load_frame(path)?;
        if frame.dimensions() != self.dimensions {
            warn!(
                "Frame {:?} is {}x{}, sequence started at {}x{}",
                path,
                frame.width(),
                frame.height(),
                self.dimensions.0,
                self.dimensions.1
            );
            self.dimensions = frame.dimensions();
        }
        Ok(frame)
    }
}

/// Size of a `width` x `height` frame once fitted inside a landscape
/// `bounds` box (turned upright for portrait frames). Never upscales.
pub fn fit_within(width: u32, height: u32, bounds: (u32, u32)) -> (u32, u32) {
    let (long, short) = (bounds.0.max(bounds.1), bounds.0.min(bounds.1));
    let (max_w, max_h) = if height > width { (short, long) } else { (long, short) };
    if width <= max_w && height <= max_h {
        return (width, height);
    }
    let scale = (max_w as f32 / width as f32).min(max_h as f32 / height as f32);
    (
        ((width as f32 * scale).round() as u32).max(1),
        ((height as f32 * scale).round() as u32).max(1),
    )
}

/// Caps another source at a camera stream resolution
#[derive(Debug, Clone)]
pub struct LimitedSource<S> {
    inner: S,
    bounds: (u32, u32),
}

impl<S: FrameSource> LimitedSource<S> {
    pub fn new(inner: S, bounds: (u32, u32)) -> Self {
        Self { inner, bounds }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSource> FrameSource for LimitedSource<S> {
    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    fn native_dimensions(&self) -> (u32, u32) {
        let (w, h) = self.inner.native_dimensions();
        fit_within(w, h, self.bounds)
    }

    fn facing(&self) -> Facing {
        self.inner.facing()
    }

    fn latest_frame(&mut self) -> Result<Frame> {
        let frame = self.inner.latest_frame()?;
        let (w, h) = frame.dimensions();
        let (fw, fh) = fit_within(w, h, self.bounds);
        if (fw, fh) == (w, h) {
            return Ok(frame);
        }
        Ok(Frame::new(image::imageops::resize(
            frame.as_image(),
            fw,
            fh,
            image::imageops::FilterType::Triangle,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fit_within_bounds() {
        assert_eq!(fit_within(1920, 1080, (1280, 720)), (1280, 720));
        assert_eq!(fit_within(640, 480, (1280, 720)), (640, 480));
        // Portrait frames get an upright box
        assert_eq!(fit_within(1080, 1920, (1280, 720)), (720, 1280));
    }

    #[test]
    fn test_limited_source_downscales() {
        let still = StillSource::new(Frame::new_black(400, 300), Facing::Environment);
        let mut limited = LimitedSource::new(still, (200, 150));
        assert_eq!(limited.native_dimensions(), (200, 150));
        assert_eq!(limited.latest_frame().unwrap().dimensions(), (200, 150));
    }

    fn write_frames(dir: &Path, count: u32) {
        for i in 0..count {
            let frame = Frame::new_filled(8, 6, [(i * 40) as u8, 0, 0]);
            frame.save_png(dir.join(format!("frame_{:03}.png", i))).unwrap();
        }
    }

    #[test]
    fn test_sequence_plays_in_name_order() {
        let dir = TempDir::new().unwrap();
        write_frames(dir.path(), 3);
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut source = SequenceSource::open(dir.path(), Facing::Environment, false).unwrap();
        assert_eq!(source.len(), 3);
        assert_eq!(source.native_dimensions(), (8, 6));

        let reds: Vec<u8> = (0..3).map(|_| source.latest_frame().unwrap().get_pixel(0, 0)[0]).collect();
        assert_eq!(reds, vec![0, 40, 80]);
        assert!(!source.is_ready());
        assert!(source.latest_frame().is_err());
    }

    #[test]
    fn test_looping_sequence_wraps() {
        let dir = TempDir::new().unwrap();
        write_frames(dir.path(), 2);

        let mut source = SequenceSource::open(dir.path(), Facing::User, true).unwrap();
        for _ in 0..2 {
            source.latest_frame().unwrap();
        }
        assert!(source.is_ready());
        assert_eq!(source.latest_frame().unwrap().get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_empty_directory_has_no_frames() {
        let dir = TempDir::new().unwrap();
        let err = SequenceSource::open(dir.path(), Facing::Environment, false).unwrap_err();
        assert!(matches!(err, RetroError::Frame(FrameError::NoFrames { .. })));
    }

    #[test]
    fn test_still_source_missing_file() {
        let err = StillSource::open("/definitely/not/here.png", Facing::Environment).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_facing_parse() {
        assert_eq!("front".parse::<Facing>().unwrap(), Facing::User);
        assert!(Facing::User.mirrored());
        assert!(!Facing::Environment.mirrored());
        assert!("sideways".parse::<Facing>().is_err());
    }
}
