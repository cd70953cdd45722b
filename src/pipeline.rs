//! The device pipeline seam and its backends.

#[cfg(feature = "depthai")]
pub mod oak;
pub mod synthetic;

#[cfg(feature = "depthai")]
pub use oak::OakPipeline;
pub use synthetic::SyntheticPipeline;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::frame::FrameSet;

/// A streaming connection to one depth camera.
///
/// Mirrors the start / wait-for-frames / stop shape of vendor SDK pipelines.
/// Implementations are driven from a single thread by one
/// [`DepthCamera`](crate::DepthCamera), which owns them exclusively.
pub trait FramePipeline {
    /// Claim the device and begin streaming.
    fn start(&mut self, config: &PipelineConfig) -> Result<()>;

    /// Block until the device delivers its next synchronized frame set.
    ///
    /// Every call waits for a fresh capture; frames are never replayed.
    fn wait_for_frames(&mut self) -> Result<FrameSet>;

    /// Stop streaming and release the device.
    fn stop(&mut self) -> Result<()>;
}

impl<P: FramePipeline + ?Sized> FramePipeline for Box<P> {
    fn start(&mut self, config: &PipelineConfig) -> Result<()> {
        (**self).start(config)
    }

    fn wait_for_frames(&mut self) -> Result<FrameSet> {
        (**self).wait_for_frames()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }
}
