#![cfg(feature = "hit")]

/// Hardware Integration Tests for the DepthAI backend
///
/// These tests require a working DepthAI runtime + an OAK stereo device, and are disabled
/// by default.
#[cfg(test)]
mod hardware_integration_tests {
    use depthcam::{CameraError, DepthCamera};

    #[test]
    fn capture_rgbd_from_device() {
        let mut camera =
            DepthCamera::new().expect("Failed to open device, is an OAK camera connected?");

        let rgbd = camera.rgbd().expect("Failed to capture RGBD pair");
        let (height, width) = rgbd.dimensions();
        assert!(height > 0 && width > 0);
        assert_eq!(rgbd.depth().dim(), (height, width), "depth should be aligned to color");

        let meters = camera
            .depth_point(height / 2, width / 2)
            .expect("Failed to read center distance");
        assert!(meters >= 0.0);

        camera.close().expect("Failed to close device");
        assert!(matches!(camera.image(), Err(CameraError::Closed)));
    }

    #[test]
    fn second_session_is_refused() {
        let _camera =
            DepthCamera::new().expect("Failed to open device, is an OAK camera connected?");
        assert!(DepthCamera::new().is_err());
    }
}
