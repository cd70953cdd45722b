use std::error::Error;

use depthcam::{DepthCamera, FramePipeline};

fn run<P: FramePipeline>(mut camera: DepthCamera<P>) -> Result<(), Box<dyn Error>> {
    for _ in 0..3 {
        let rgbd = camera.rgbd()?;
        let (h, w) = rgbd.dimensions();
        println!(
            "Got RGBD pair: {w}x{h}, raw depth at center = {}",
            rgbd.depth_point(h / 2, w / 2)?
        );
    }

    let distance = camera.depth_point(240, 320)?;
    println!("Distance at (240, 320): {distance:.3} m");

    camera.save_image("capture.png")?;
    println!("Saved color frame to capture.png");

    camera.close()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    #[cfg(feature = "depthai")]
    let camera = DepthCamera::new()?;
    #[cfg(not(feature = "depthai"))]
    let camera = DepthCamera::open(depthcam::SyntheticPipeline::new())?;

    run(camera)
}
