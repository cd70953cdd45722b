//! In-process simulated depth camera.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;

use log::{debug, info};

use crate::common::{ColorFormat, DepthUnit, Resolution};
use crate::config::PipelineConfig;
use crate::error::{CameraError, Result};
use crate::frame::{ColorFrame, DepthFrame, FrameSet, TestPattern};
use crate::pipeline::FramePipeline;

/// Wait budget reported by a stalled device when the config sets none.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

/// Device ids held by running synthetic pipelines, process wide.
static CLAIMED_DEVICES: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

fn claim(device_id: &str) -> Result<()> {
    let mut claimed = CLAIMED_DEVICES.lock().unwrap_or_else(|e| e.into_inner());
    if !claimed.insert(device_id.to_owned()) {
        return Err(CameraError::DeviceBusy(device_id.to_owned()));
    }
    Ok(())
}

fn release(device_id: &str) {
    let mut claimed = CLAIMED_DEVICES.lock().unwrap_or_else(|e| e.into_inner());
    claimed.remove(device_id);
}

/// A simulated device that paints test patterns and a depth ramp.
///
/// Scripted frame sets, if any, are served first and in order; after that frames
/// are generated. Frame ids increase by one per wait, and the color pattern moves
/// with the frame id so consecutive captures never compare equal.
///
/// Depth is generated aligned to color: both frames share the color resolution,
/// and `PipelineConfig::depth_resolution` and `fps` are not applied. The config's
/// `timeout_ms` only shows up in the [`CameraError::Timeout`] reported by a device
/// stalled with [`timeout_after`](SyntheticPipeline::timeout_after).
#[derive(Debug)]
pub struct SyntheticPipeline {
    device_id: String,
    resolution: Resolution,
    depth_unit: DepthUnit,
    pattern: TestPattern,
    scripted: VecDeque<FrameSet>,
    disconnect_after: Option<u64>,
    timeout_after: Option<u64>,
    wait_timeout_ms: u64,
    present: bool,
    running: bool,
    frames_served: u64,
    next_frame_id: u32,
}

impl Default for SyntheticPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticPipeline {
    pub fn new() -> Self {
        Self {
            device_id: "synthetic-0".to_owned(),
            resolution: Resolution::default(),
            depth_unit: DepthUnit::Millimeter,
            pattern: TestPattern::Gradient,
            scripted: VecDeque::new(),
            disconnect_after: None,
            timeout_after: None,
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            present: true,
            running: false,
            frames_served: 0,
            next_frame_id: 1,
        }
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Resolution::new(width, height);
        self
    }

    pub fn with_depth_unit(mut self, unit: DepthUnit) -> Self {
        self.depth_unit = unit;
        self
    }

    pub fn with_pattern(mut self, pattern: TestPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Frame sets to hand out, in order, before generated ones.
    pub fn with_scripted_frames(mut self, frames: impl IntoIterator<Item = FrameSet>) -> Self {
        self.scripted.extend(frames);
        self
    }

    /// Fail every wait after the first `frames` frame sets with a disconnect.
    pub fn disconnect_after(mut self, frames: u64) -> Self {
        self.disconnect_after = Some(frames);
        self
    }

    /// Stop delivering after the first `frames` frame sets: every later wait
    /// times out.
    pub fn timeout_after(mut self, frames: u64) -> Self {
        self.timeout_after = Some(frames);
        self
    }

    /// Simulate an unplugged device: `start` reports that nothing was found.
    pub fn absent(mut self) -> Self {
        self.present = false;
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of frame sets delivered since construction.
    pub fn frames_served(&self) -> u64 {
        self.frames_served
    }

    fn generate(&mut self) -> FrameSet {
        let frame_id = self.next_frame_id;
        self.next_frame_id = self.next_frame_id.wrapping_add(1);

        let width = self.resolution.width as usize;
        let height = self.resolution.height as usize;
        let color = ColorFrame::new(
            width,
            height,
            ColorFormat::Rgb888i,
            self.pattern.render_rgb(width, height, frame_id),
        )
        .with_frame_id(frame_id);

        // 0.5 m to 4.5 m ramp in millimeters, converted to the configured unit
        let scale = DepthUnit::Millimeter.meters_per_unit() / self.depth_unit.meters_per_unit();
        let depth_data = (0..height * width)
            .map(|i| {
                let mm = 500 + ((i % width + i / width + frame_id as usize) % 4000);
                (mm as f32 * scale).round().min(u16::MAX as f32) as u16
            })
            .collect();
        let depth =
            DepthFrame::new(width, height, self.depth_unit, depth_data).with_frame_id(frame_id);

        FrameSet::new(color, depth)
    }
}

impl FramePipeline for SyntheticPipeline {
    fn start(&mut self, config: &PipelineConfig) -> Result<()> {
        if !self.present {
            return Err(CameraError::DeviceNotFound);
        }
        if self.running {
            return Err(CameraError::DeviceBusy(self.device_id.clone()));
        }
        claim(&self.device_id)?;

        if let Some(resolution) = config.color_resolution {
            self.resolution = resolution;
        }
        if let Some(unit) = config.depth_unit {
            self.depth_unit = unit;
        }
        self.wait_timeout_ms = config.timeout_ms.unwrap_or(DEFAULT_WAIT_TIMEOUT_MS);
        self.running = true;
        info!("synthetic device {} streaming at {}", self.device_id, self.resolution);
        Ok(())
    }

    fn wait_for_frames(&mut self) -> Result<FrameSet> {
        if !self.running {
            return Err(CameraError::Closed);
        }
        if let Some(limit) = self.disconnect_after {
            if self.frames_served >= limit {
                return Err(CameraError::Disconnected(format!(
                    "{} stopped responding after {limit} frames",
                    self.device_id
                )));
            }
        }

        if let Some(limit) = self.timeout_after {
            if self.frames_served >= limit {
                return Err(CameraError::Timeout(self.wait_timeout_ms));
            }
        }

        let frames = match self.scripted.pop_front() {
            Some(frames) => frames,
            None => self.generate(),
        };
        self.frames_served += 1;
        debug!(
            "synthetic device {} delivered frame {} ({}x{})",
            self.device_id,
            frames.frame_id(),
            frames.color.width,
            frames.color.height
        );
        Ok(frames)
    }

    fn stop(&mut self) -> Result<()> {
        if !self.running {
            return Err(CameraError::Closed);
        }
        self.running = false;
        release(&self.device_id);
        info!("synthetic device {} stopped", self.device_id);
        Ok(())
    }
}

impl Drop for SyntheticPipeline {
    fn drop(&mut self) {
        if self.running {
            release(&self.device_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn frame_ids_increase_per_wait() {
        let mut pipeline = SyntheticPipeline::new()
            .with_device_id("unit-frame-ids")
            .with_resolution(8, 4);
        pipeline.start(&PipelineConfig::default()).unwrap();
        let a = pipeline.wait_for_frames().unwrap();
        let b = pipeline.wait_for_frames().unwrap();
        assert_eq!(b.frame_id(), a.frame_id() + 1);
        assert_eq!(pipeline.frames_served(), 2);
        assert!(b.captured_at >= a.captured_at);
        assert!(pipeline.is_running());
        pipeline.stop().unwrap();
        assert!(!pipeline.is_running());
    }

    #[test]
    fn config_overrides_resolution_and_unit() {
        let mut pipeline = SyntheticPipeline::new().with_device_id("unit-config");
        let config = PipelineConfig::new()
            .color_resolution(16, 8)
            .depth_unit(DepthUnit::Meter);
        pipeline.start(&config).unwrap();
        let frames = pipeline.wait_for_frames().unwrap();
        assert_eq!((frames.color.width, frames.color.height), (16, 8));
        assert_eq!(frames.depth.unit, DepthUnit::Meter);
        // the ramp starts at half a meter, which rounds to 1 m or 0 m in whole meters
        assert!(frames.depth.data.iter().all(|&d| d <= 5));
        pipeline.stop().unwrap();
    }

    #[test]
    fn stalled_device_reports_the_configured_timeout() {
        let mut pipeline = SyntheticPipeline::new()
            .with_device_id("unit-timeout")
            .with_resolution(4, 4)
            .timeout_after(1);
        pipeline.start(&PipelineConfig::new().timeout(Duration::from_millis(250))).unwrap();
        pipeline.wait_for_frames().unwrap();
        assert!(matches!(pipeline.wait_for_frames(), Err(CameraError::Timeout(250))));
        assert!(matches!(pipeline.wait_for_frames(), Err(CameraError::Timeout(250))));
        assert_eq!(pipeline.frames_served(), 1);
        pipeline.stop().unwrap();
    }

    #[test]
    fn waiting_before_start_fails() {
        let mut pipeline = SyntheticPipeline::new().with_device_id("unit-not-started");
        assert!(matches!(pipeline.wait_for_frames(), Err(CameraError::Closed)));
        assert!(matches!(pipeline.stop(), Err(CameraError::Closed)));
    }

    #[test]
    fn dropping_a_running_pipeline_releases_the_claim() {
        {
            let mut pipeline = SyntheticPipeline::new().with_device_id("unit-drop-release");
            pipeline.start(&PipelineConfig::default()).unwrap();
        }
        let mut again = SyntheticPipeline::new().with_device_id("unit-drop-release");
        again.start(&PipelineConfig::default()).unwrap();
        again.stop().unwrap();
    }
}
