use std::path::Path;

use image::{ImageBuffer, ImageFormat, Luma, RgbImage};
use ndarray::{Array2, Array3};

use crate::error::{CameraError, Result};
use crate::frame::FrameSet;

/// A color image and a depth image captured at the same instant.
///
/// Immutable once built. The color array is `(height, width, 3)` RGB, the depth
/// array `(height, width)` in the sensor's raw units.
#[derive(Debug, Clone, PartialEq)]
pub struct Rgbd {
    color: Array3<u8>,
    depth: Array2<u16>,
}

impl Rgbd {
    /// Take ownership of both arrays as-is.
    pub fn new(color: Array3<u8>, depth: Array2<u16>) -> Self {
        Self { color, depth }
    }

    pub fn image(&self) -> &Array3<u8> {
        &self.color
    }

    pub fn depth(&self) -> &Array2<u16> {
        &self.depth
    }

    /// Raw depth sample at `[row, col]`.
    pub fn depth_point(&self, row: usize, col: usize) -> Result<u16> {
        let (height, width) = self.depth.dim();
        self.depth
            .get([row, col])
            .copied()
            .ok_or(CameraError::IndexOutOfRange { row, col, height, width })
    }

    /// `(height, width)` of the color image.
    pub fn dimensions(&self) -> (usize, usize) {
        let (height, width, _) = self.color.dim();
        (height, width)
    }

    pub fn into_parts(self) -> (Array3<u8>, Array2<u16>) {
        (self.color, self.depth)
    }

    /// Encode the color image to `path`, picking the codec from the extension.
    pub fn save_image(&self, path: impl AsRef<Path>) -> Result<()> {
        save_color_image(&self.color, path)
    }

    /// Write the raw depth as a 16-bit grayscale image (PNG or TIFF).
    pub fn save_depth(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = writable_format(path)?;
        let (height, width) = self.depth.dim();
        let samples: Vec<u16> = self.depth.iter().copied().collect();
        let buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(width as u32, height as u32, samples).ok_or_else(|| {
                let msg = format!("depth image {width}x{height} has a short buffer");
                CameraError::InvalidFrame(msg)
            })?;
        buffer.save_with_format(path, format)?;
        Ok(())
    }
}

impl TryFrom<FrameSet> for Rgbd {
    type Error = CameraError;

    fn try_from(frames: FrameSet) -> Result<Self> {
        Ok(Rgbd::new(frames.color.into_array()?, frames.depth.into_array()?))
    }
}

/// Encode a `(height, width, 3)` RGB array to `path`, picking the codec from the extension.
pub fn save_color_image(image: &Array3<u8>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = writable_format(path)?;
    let (height, width, channels) = image.dim();
    if channels != 3 {
        return Err(CameraError::InvalidFrame(format!(
            "color image has {channels} channels, expected 3"
        )));
    }
    // iter() walks in logical order, so non-standard layouts come out row-major too
    let pixels: Vec<u8> = image.iter().copied().collect();
    let buffer = RgbImage::from_raw(width as u32, height as u32, pixels).ok_or_else(|| {
        CameraError::InvalidFrame(format!("color image {width}x{height} has a short buffer"))
    })?;
    buffer.save_with_format(path, format)?;
    Ok(())
}

fn writable_format(path: &Path) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(path)
        .map_err(|_| CameraError::UnsupportedFormat(path.display().to_string()))?;
    if !format.writing_enabled() {
        return Err(CameraError::UnsupportedFormat(format!("{format:?} cannot be written")));
    }
    Ok(format)
}
