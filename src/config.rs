use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::{DepthUnit, Resolution};
use crate::error::{CameraError, Result};

/// Stream settings handed to [`FramePipeline::start`](crate::pipeline::FramePipeline::start).
///
/// Every field is optional; `None` leaves the choice to the backend, which is what
/// [`DepthCamera::open`](crate::DepthCamera::open) does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub color_resolution: Option<Resolution>,
    pub depth_resolution: Option<Resolution>,
    pub fps: Option<f32>,
    pub depth_unit: Option<DepthUnit>,
    /// Frame-wait timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_resolution(mut self, width: u32, height: u32) -> Self {
        self.color_resolution = Some(Resolution::new(width, height));
        self
    }

    pub fn depth_resolution(mut self, width: u32, height: u32) -> Self {
        self.depth_resolution = Some(Resolution::new(width, height));
        self
    }

    pub fn fps(mut self, fps: f32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn depth_unit(mut self, unit: DepthUnit) -> Self {
        self.depth_unit = Some(unit);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Reject values no backend can honour. JSON cannot carry non-finite
    /// floats, so this also keeps `to_json` output loadable.
    pub fn validate(&self) -> Result<()> {
        if let Some(unit) = self.depth_unit {
            if !unit.is_valid() {
                return Err(CameraError::InvalidConfig(format!(
                    "depth unit scale must be finite and positive, got {unit:?}"
                )));
            }
        }
        if let Some(fps) = self.fps {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(CameraError::InvalidConfig(format!(
                    "fps must be finite and positive, got {fps}"
                )));
            }
        }
        for resolution in [self.color_resolution, self.depth_resolution].into_iter().flatten() {
            if resolution.width == 0 || resolution.height == 0 {
                return Err(CameraError::InvalidConfig(format!("empty resolution {resolution}")));
            }
        }
        Ok(())
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(self)?)
    }
}
