//! Blocking color + depth capture from a depth camera, returned as `ndarray` arrays.

pub mod camera;
pub mod common;
pub mod config;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod rgbd;
#[cfg(feature = "rerun")]
pub mod visualization;

// Re-export main types for convenience
pub use crate::camera::DepthCamera;
pub use crate::common::{ColorFormat, DepthUnit, Resolution};
pub use crate::config::PipelineConfig;
pub use crate::error::{CameraError, Result};
pub use crate::frame::{ColorFrame, DepthFrame, FrameSet, TestPattern};
#[cfg(feature = "depthai")]
pub use crate::pipeline::OakPipeline;
pub use crate::pipeline::{FramePipeline, SyntheticPipeline};
pub use crate::rgbd::{save_color_image, Rgbd};
#[cfg(feature = "rerun")]
pub use crate::visualization::RerunVisualizer;
