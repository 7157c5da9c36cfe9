use image::{imageops, ImageBuffer, Rgba, RgbaImage};

use crate::error::{FrameError, Result};

/// A single RGBA frame buffer
///
/// This is a thin wrapper around an RGBA image buffer that provides the
/// pixel accessors the effect stages and compositing passes need.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbaImage,
}

impl Frame {
    /// Create a new frame from an RGBA image buffer
    pub fn new(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Create an opaque black frame with the given dimensions
    pub fn new_black(width: u32, height: u32) -> Self {
        Self::new_filled(width, height, [0, 0, 0])
    }

    /// Create an opaque frame filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([color[0], color[1], color[2], 255]));
        Self { buffer }
    }

    /// Create a fully transparent frame, used as an overlay layer
    pub fn new_transparent(width: u32, height: u32) -> Self {
        Self { buffer: ImageBuffer::new(width, height) }
    }

    /// Build a frame from raw RGBA bytes
    pub fn from_rgba_bytes(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        ImageBuffer::from_raw(width, height, data)
            .map(|buffer| Self { buffer })
            .ok_or_else(|| FrameError::BufferSize { expected, actual }.into())
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGBA array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get a mutable reference to a pixel at the given coordinates
    pub fn get_pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8; 4] {
        &mut self.buffer.get_pixel_mut(x, y).0
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        self.buffer.put_pixel(x, y, Rgba(color));
    }

    /// Raw interleaved RGBA samples, row-major
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Mutable raw interleaved RGBA samples, row-major
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }

    /// Nearest-neighbour resample to a new size.
    ///
    /// Used to carry the previous raw frame across a render-size change so
    /// the temporal effects never read a buffer of the wrong shape.
    pub fn resize_nearest(&self, width: u32, height: u32) -> Frame {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        let (sw, sh) = self.dimensions();
        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            let sx = (x as u64 * sw as u64 / width as u64) as u32;
            let sy = (y as u64 * sh as u64 / height as u64) as u32;
            *self.buffer.get_pixel(sx, sy)
        });
        Frame::new(buffer)
    }

    /// Mirror the frame horizontally in place (user-facing camera)
    pub fn mirror_horizontal(&mut self) {
        imageops::flip_horizontal_in_place(&mut self.buffer);
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        self.buffer.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_bytes_rejects_short_buffer() {
        let err = Frame::from_rgba_bytes(4, 4, vec![0; 10]).unwrap_err();
        assert!(err.to_string().contains("64"));
    }

    #[test]
    fn test_resize_nearest_picks_source_pixels() {
        let mut frame = Frame::new_black(2, 2);
        frame.set_pixel(1, 1, [200, 10, 20, 255]);

        let big = frame.resize_nearest(4, 4);
        assert_eq!(big.dimensions(), (4, 4));
        assert_eq!(big.get_pixel(3, 3), [200, 10, 20, 255]);
        assert_eq!(big.get_pixel(2, 2), [200, 10, 20, 255]);
        assert_eq!(big.get_pixel(1, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn test_mirror_horizontal() {
        let mut frame = Frame::new_black(3, 1);
        frame.set_pixel(0, 0, [255, 0, 0, 255]);
        frame.mirror_horizontal();
        assert_eq!(frame.get_pixel(2, 0), [255, 0, 0, 255]);
        assert_eq!(frame.get_pixel(0, 0), [0, 0, 0, 255]);
    }
}
