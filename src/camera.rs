use std::path::Path;

use log::{debug, info, warn};
use ndarray::{Array2, Array3};

use crate::config::PipelineConfig;
use crate::error::{CameraError, Result};
use crate::frame::FrameSet;
use crate::pipeline::FramePipeline;
use crate::rgbd::{save_color_image, Rgbd};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Open,
    Closed,
}

/// An open streaming session on one depth camera.
///
/// Owns the pipeline exclusively. Every accessor blocks on a fresh frame set from
/// the device, so two calls in a row may see two different moments in time. Once
/// [`close`](DepthCamera::close) has run, every accessor fails with
/// [`CameraError::Closed`]. Dropping an open session stops the pipeline.
pub struct DepthCamera<P: FramePipeline> {
    pipeline: P,
    state: SessionState,
}

impl<P: FramePipeline> DepthCamera<P> {
    /// Start `pipeline` with backend default stream settings.
    pub fn open(pipeline: P) -> Result<Self> {
        Self::open_with(pipeline, PipelineConfig::default())
    }

    pub fn open_with(mut pipeline: P, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        pipeline.start(&config)?;
        info!("depth camera session opened");
        Ok(Self {
            pipeline,
            state: SessionState::Open,
        })
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Next color image, `(height, width, 3)` RGB.
    pub fn image(&mut self) -> Result<Array3<u8>> {
        self.capture()?.color.into_array()
    }

    /// Capture the next color image and encode it to `path`.
    pub fn save_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let image = self.image()?;
        save_color_image(&image, path)
    }

    /// Distance in meters at pixel `(row, col)` of the next depth frame.
    pub fn depth_point(&mut self, row: usize, col: usize) -> Result<f32> {
        self.capture()?.depth.distance(col, row)
    }

    /// Next depth frame as raw sensor units, `(height, width)`.
    pub fn depth(&mut self) -> Result<Array2<u16>> {
        self.capture()?.depth.into_array()
    }

    /// Next synchronized color and depth pair.
    pub fn rgbd(&mut self) -> Result<Rgbd> {
        Rgbd::try_from(self.capture()?)
    }

    /// Stop the pipeline. The session stays closed even if the stop fails.
    pub fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Err(CameraError::Closed);
        }
        self.state = SessionState::Closed;
        self.pipeline.stop()?;
        info!("depth camera session closed");
        Ok(())
    }

    fn capture(&mut self) -> Result<FrameSet> {
        if self.state == SessionState::Closed {
            return Err(CameraError::Closed);
        }
        let frames = self.pipeline.wait_for_frames()?;
        debug!(
            "captured frame set {} (color {}x{}, depth {}x{}, {:?} old)",
            frames.frame_id(),
            frames.color.width,
            frames.color.height,
            frames.depth.width,
            frames.depth.height,
            frames.captured_at.elapsed()
        );
        Ok(frames)
    }
}

#[cfg(feature = "depthai")]
impl DepthCamera<crate::pipeline::OakPipeline> {
    /// Open the first DepthAI device found, with default stream settings.
    pub fn new() -> Result<Self> {
        Self::open(crate::pipeline::OakPipeline::new())
    }
}

impl<P: FramePipeline> Drop for DepthCamera<P> {
    fn drop(&mut self) {
        if self.state == SessionState::Open {
            self.state = SessionState::Closed;
            if let Err(e) = self.pipeline.stop() {
                warn!("failed to stop pipeline on drop: {e}");
            }
        }
    }
}
