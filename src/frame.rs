//! Frames as delivered by a [`FramePipeline`](crate::pipeline::FramePipeline)

use std::time::Instant;

use ndarray::{Array2, Array3};

use crate::common::{ColorFormat, DepthUnit};
use crate::error::{CameraError, Result};

/// One interleaved 8-bit color frame.
#[derive(Debug, Clone)]
pub struct ColorFrame {
    pub width: usize,
    pub height: usize,
    pub format: ColorFormat,
    pub data: Vec<u8>,
    pub frame_id: u32,
}

impl ColorFrame {
    pub fn new(width: usize, height: usize, format: ColorFormat, data: Vec<u8>) -> Self {
        ColorFrame {
            width,
            height,
            format,
            data,
            frame_id: 0,
        }
    }

    /// Set frame ID for tracking
    pub fn with_frame_id(mut self, frame_id: u32) -> Self {
        self.frame_id = frame_id;
        self
    }

    /// Convert into a `(height, width, 3)` RGB array, swapping channels for BGR input.
    pub fn into_array(self) -> Result<Array3<u8>> {
        let channels = self.format.channels();
        let expected = self.width * self.height * channels;
        if self.data.len() != expected {
            return Err(CameraError::InvalidFrame(format!(
                "color frame {} has {} bytes, expected {expected} for {}x{}",
                self.frame_id,
                self.data.len(),
                self.width,
                self.height
            )));
        }

        let mut data = self.data;
        if self.format == ColorFormat::Bgr888i {
            for px in data.chunks_exact_mut(channels) {
                px.swap(0, 2);
            }
        }
        Ok(Array3::from_shape_vec((self.height, self.width, channels), data)?)
    }
}

/// One depth frame of raw 16-bit samples.
#[derive(Debug, Clone)]
pub struct DepthFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u16>,
    pub unit: DepthUnit,
    pub frame_id: u32,
}

impl DepthFrame {
    pub fn new(width: usize, height: usize, unit: DepthUnit, data: Vec<u16>) -> Self {
        DepthFrame {
            width,
            height,
            data,
            unit,
            frame_id: 0,
        }
    }

    /// Set frame ID for tracking
    pub fn with_frame_id(mut self, frame_id: u32) -> Self {
        self.frame_id = frame_id;
        self
    }

    /// Distance in meters at pixel `(x, y)`, i.e. column then row.
    pub fn distance(&self, x: usize, y: usize) -> Result<f32> {
        if x >= self.width || y >= self.height {
            return Err(CameraError::IndexOutOfRange {
                row: y,
                col: x,
                height: self.height,
                width: self.width,
            });
        }
        let raw = self.data.get(y * self.width + x).copied().ok_or_else(|| {
            CameraError::InvalidFrame(format!("depth frame {} is truncated", self.frame_id))
        })?;
        Ok(raw as f32 * self.unit.meters_per_unit())
    }

    /// Convert into a `(height, width)` array of raw samples.
    pub fn into_array(self) -> Result<Array2<u16>> {
        if self.data.len() != self.width * self.height {
            return Err(CameraError::InvalidFrame(format!(
                "depth frame {} has {} samples, expected {} for {}x{}",
                self.frame_id,
                self.data.len(),
                self.width * self.height,
                self.width,
                self.height
            )));
        }
        Ok(Array2::from_shape_vec((self.height, self.width), self.data)?)
    }
}

/// Color and depth captured at the same instant.
#[derive(Debug, Clone)]
pub struct FrameSet {
    pub color: ColorFrame,
    pub depth: DepthFrame,
    /// When the backend assembled the pair
    pub captured_at: Instant,
}

impl FrameSet {
    pub fn new(color: ColorFrame, depth: DepthFrame) -> Self {
        Self {
            color,
            depth,
            captured_at: Instant::now(),
        }
    }

    pub fn frame_id(&self) -> u32 {
        self.color.frame_id
    }
}

/// Patterns the synthetic device paints into its color frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TestPattern {
    #[default]
    Gradient,
    Checkerboard,
    Noise,
}

impl TestPattern {
    /// Fill an RGB buffer; `phase` shifts the pattern so consecutive frames differ.
    pub fn render_rgb(self, width: usize, height: usize, phase: u32) -> Vec<u8> {
        let phase = phase as usize;
        let mut data = Vec::with_capacity(width * height * 3);
        for i in 0..height * width {
            let x = i % width;
            let y = i / width;
            let v = match self {
                TestPattern::Gradient => ((x + y + phase) % 256) as u8,
                TestPattern::Checkerboard => {
                    if ((x + phase) / 32 + y / 32) % 2 == 0 { 255 } else { 0 }
                }
                TestPattern::Noise => {
                    use std::collections::hash_map::DefaultHasher;
                    use std::hash::{Hash, Hasher};

                    let mut hasher = DefaultHasher::new();
                    (i, phase).hash(&mut hasher);
                    (hasher.finish() % 256) as u8
                }
            };
            data.extend_from_slice(&[v, v.wrapping_add(85), v.wrapping_add(170)]);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgr_frames_come_out_as_rgb() {
        let frame = ColorFrame::new(2, 1, ColorFormat::Bgr888i, vec![1, 2, 3, 4, 5, 6]);
        let array = frame.into_array().unwrap();
        assert_eq!(array.dim(), (1, 2, 3));
        assert_eq!(array[[0, 0, 0]], 3);
        assert_eq!(array[[0, 0, 2]], 1);
        assert_eq!(array[[0, 1, 0]], 6);
    }

    #[test]
    fn short_color_buffer_is_rejected() {
        let frame = ColorFrame::new(4, 4, ColorFormat::Rgb888i, vec![0; 10]);
        assert!(matches!(frame.into_array(), Err(CameraError::InvalidFrame(_))));
    }

    #[test]
    fn distance_is_scaled_and_bounds_checked() {
        let samples = vec![0, 1000, 2000, 3000, 4000, 5000];
        let depth = DepthFrame::new(3, 2, DepthUnit::Millimeter, samples);
        assert!((depth.distance(1, 0).unwrap() - 1.0).abs() < 1e-6);
        assert!((depth.distance(2, 1).unwrap() - 5.0).abs() < 1e-5);
        assert!(matches!(
            depth.distance(3, 0),
            Err(CameraError::IndexOutOfRange { row: 0, col: 3, .. })
        ));
        assert!(matches!(depth.distance(0, 2), Err(CameraError::IndexOutOfRange { .. })));
    }

    #[test]
    fn depth_array_is_row_major() {
        let depth = DepthFrame::new(3, 2, DepthUnit::Meter, vec![0, 1, 2, 3, 4, 5]);
        let array = depth.into_array().unwrap();
        assert_eq!(array.dim(), (2, 3));
        assert_eq!(array[[1, 0]], 3);
    }

    #[test]
    fn patterns_shift_with_phase() {
        for pattern in [TestPattern::Gradient, TestPattern::Checkerboard, TestPattern::Noise] {
            let a = pattern.render_rgb(64, 8, 1);
            let b = pattern.render_rgb(64, 8, 2);
            assert_eq!(a.len(), 64 * 8 * 3);
            assert_ne!(a, b, "{pattern:?}");
        }
    }
}
