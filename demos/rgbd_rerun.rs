use std::error::Error;

use depthcam::{DepthCamera, DepthUnit, RerunVisualizer, SyntheticPipeline};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let viz = RerunVisualizer::new_with_file("depthcam_rgbd", "rgbd.rrd")?;
    let mut camera = DepthCamera::open(SyntheticPipeline::new())?;

    for frame_nr in 0..30 {
        viz.recording_stream().set_time_sequence("frame", frame_nr);
        let rgbd = camera.rgbd()?;
        viz.log_rgbd("camera", &rgbd, DepthUnit::Millimeter)?;
    }

    camera.close()?;
    println!("Wrote 30 RGBD frames to rgbd.rrd");
    Ok(())
}
