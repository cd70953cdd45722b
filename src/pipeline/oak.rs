//! DepthAI (Luxonis OAK) backend.
//!
//! Color comes from `CamA`; depth is computed by the stereo node from the
//! `CamB`/`CamC` mono pair, aligned to the color camera and paired with the color
//! frame by an RGBD node. Stereo depth is always reported in millimeters.

use std::time::Duration;

use depthai::camera::{CameraNode, CameraOutputConfig, OutputQueue};
use depthai::common::{CameraBoardSocket, ImageFrameType, ResizeMode};
use depthai::pipeline::Pipeline;
use depthai::{DepthUnit as DaiDepthUnit, Device, RgbdNode, StereoDepthNode};
use log::{debug, info};

use crate::common::{ColorFormat, DepthUnit};
use crate::config::PipelineConfig;
use crate::error::{CameraError, Result};
use crate::frame::{ColorFrame, DepthFrame, FrameSet};
use crate::pipeline::FramePipeline;

fn sdk(err: impl std::fmt::Display) -> CameraError {
    CameraError::Sdk(err.to_string())
}

// The bindings only hand back a message, so the two failures callers care about
// are told apart by DepthAI-Core's wording: `dai::DeviceBase` throws "No available
// devices" when discovery finds nothing, and XLink reports a claimed device as
// `X_LINK_DEVICE_ALREADY_IN_USE` ("device already in use"). Anything else is `Sdk`.
// Revisit these strings when bumping the `depthai` dependency.
fn open_device() -> Result<Device> {
    Device::new().map_err(|e| {
        let msg = e.to_string();
        if msg.contains("No available devices") {
            CameraError::DeviceNotFound
        } else if msg.contains("X_LINK_DEVICE_ALREADY_IN_USE") || msg.contains("already in use") {
            CameraError::DeviceBusy(msg)
        } else {
            CameraError::Sdk(msg)
        }
    })
}

struct Running {
    // dropped in declaration order: queue, then pipeline, then the device
    queue: OutputQueue,
    pipeline: Pipeline,
    _device: Device,
}

/// Streaming session on the first DepthAI device found.
pub struct OakPipeline {
    running: Option<Running>,
    timeout: Option<Duration>,
    next_frame_id: u32,
}

impl Default for OakPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl OakPipeline {
    pub fn new() -> Self {
        Self {
            running: None,
            timeout: None,
            next_frame_id: 1,
        }
    }

    fn output_config(
        size: (u32, u32),
        frame_type: ImageFrameType,
        fps: Option<f32>,
    ) -> CameraOutputConfig {
        CameraOutputConfig {
            size,
            frame_type: Some(frame_type),
            resize_mode: ResizeMode::Crop,
            fps,
            enable_undistortion: None,
        }
    }

    fn build(config: &PipelineConfig) -> Result<Running> {
        let device = open_device()?;
        let pipeline = Pipeline::new().with_device(&device).build().map_err(sdk)?;

        let defaults = CameraOutputConfig::default();
        let color_size = config
            .color_resolution
            .map(|r| (r.width, r.height))
            .unwrap_or(defaults.size);
        let mono_size = config
            .depth_resolution
            .map(|r| (r.width, r.height))
            .unwrap_or(defaults.size);

        let cam_color = pipeline
            .create_with::<CameraNode, _>(CameraBoardSocket::CamA)
            .map_err(sdk)?;
        let cam_left = pipeline
            .create_with::<CameraNode, _>(CameraBoardSocket::CamB)
            .map_err(sdk)?;
        let cam_right = pipeline
            .create_with::<CameraNode, _>(CameraBoardSocket::CamC)
            .map_err(sdk)?;

        let out_color = cam_color
            .request_output(Self::output_config(color_size, ImageFrameType::RGB888i, config.fps))
            .map_err(sdk)?;
        let out_left = cam_left
            .request_output(Self::output_config(mono_size, ImageFrameType::GRAY8, config.fps))
            .map_err(sdk)?;
        let out_right = cam_right
            .request_output(Self::output_config(mono_size, ImageFrameType::GRAY8, config.fps))
            .map_err(sdk)?;

        let stereo = pipeline.create::<StereoDepthNode>().map_err(sdk)?;
        out_left.link_to(stereo.as_node(), Some("left")).map_err(sdk)?;
        out_right.link_to(stereo.as_node(), Some("right")).map_err(sdk)?;
        out_color
            .link_to(stereo.as_node(), Some("inputAlignTo"))
            .map_err(sdk)?;

        let rgbd = pipeline.create::<RgbdNode>().map_err(sdk)?;
        rgbd.set_depth_unit(DaiDepthUnit::Millimeter);
        rgbd.build().map_err(sdk)?;
        out_color
            .link_to(rgbd.as_node(), Some("inColorSync"))
            .map_err(sdk)?;
        stereo
            .as_node()
            .output("depth")
            .and_then(|depth| depth.link_to(rgbd.as_node(), Some("inDepthSync")))
            .map_err(sdk)?;

        let queue = rgbd
            .as_node()
            .output("rgbd")
            .and_then(|out| out.create_queue(4, false))
            .map_err(sdk)?;

        pipeline.start().map_err(sdk)?;
        Ok(Running {
            queue,
            pipeline,
            _device: device,
        })
    }
}

impl FramePipeline for OakPipeline {
    fn start(&mut self, config: &PipelineConfig) -> Result<()> {
        if self.running.is_some() {
            return Err(CameraError::DeviceBusy("pipeline already started".into()));
        }
        self.running = Some(Self::build(config)?);
        self.timeout = config.wait_timeout();
        info!("DepthAI pipeline started");
        Ok(())
    }

    fn wait_for_frames(&mut self) -> Result<FrameSet> {
        let running = self.running.as_ref().ok_or(CameraError::Closed)?;
        let msg = running
            .queue
            .blocking_next_rgbd(self.timeout)
            .map_err(|e| CameraError::Disconnected(e.to_string()))?;
        let msg = match msg {
            Some(msg) => msg,
            None => {
                return Err(match self.timeout {
                    Some(t) => CameraError::Timeout(t.as_millis() as u64),
                    None => CameraError::Disconnected("frame queue closed".into()),
                });
            }
        };

        let frame_id = self.next_frame_id;
        self.next_frame_id = self.next_frame_id.wrapping_add(1);

        let rgb = msg.rgb_frame().map_err(sdk)?;
        let format = match rgb.format() {
            Some(ImageFrameType::RGB888i) => ColorFormat::Rgb888i,
            Some(ImageFrameType::BGR888i) => ColorFormat::Bgr888i,
            other => {
                let msg = format!("unexpected color format {other:?}");
                return Err(CameraError::InvalidFrame(msg));
            }
        };
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        let color = ColorFrame::new(width, height, format, rgb.bytes()).with_frame_id(frame_id);

        let depth = msg.depth_frame().map_err(sdk)?;
        let samples = depth
            .bytes()
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        let depth = DepthFrame::new(
            depth.width() as usize,
            depth.height() as usize,
            DepthUnit::Millimeter,
            samples,
        )
        .with_frame_id(frame_id);

        debug!("DepthAI frame {frame_id}: {}", rgb.describe());
        Ok(FrameSet::new(color, depth))
    }

    fn stop(&mut self) -> Result<()> {
        let running = self.running.take().ok_or(CameraError::Closed)?;
        running.pipeline.stop().map_err(sdk)?;
        info!("DepthAI pipeline stopped");
        Ok(())
    }
}
