use rerun::datatypes::{ChannelDatatype, ImageFormat};
use rerun::{RecordingStream, RecordingStreamBuilder};

use crate::common::DepthUnit;
use crate::rgbd::Rgbd;

/// Streams captured RGBD pairs to a Rerun recording.
pub struct RerunVisualizer {
    rec: RecordingStream,
    _storage: Option<rerun::MemorySinkStorage>,
}

impl RerunVisualizer {
    /// Record into memory for real-time viewing
    pub fn new(app_name: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let (rec, storage) = RecordingStreamBuilder::new(app_name).memory()?;
        Ok(RerunVisualizer {
            rec,
            _storage: Some(storage),
        })
    }

    /// Record into an `.rrd` file
    pub fn new_with_file(
        app_name: &str,
        file_path: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let rec = RecordingStreamBuilder::new(app_name).save(file_path)?;
        Ok(RerunVisualizer { rec, _storage: None })
    }

    /// Log the color image under `{entity_path}/rgb` and the depth under
    /// `{entity_path}/depth`.
    pub fn log_rgbd(
        &self,
        entity_path: &str,
        rgbd: &Rgbd,
        unit: DepthUnit,
    ) -> Result<(), rerun::RecordingStreamError> {
        let (height, width) = rgbd.dimensions();
        let rgb: Vec<u8> = rgbd.image().iter().copied().collect();
        let size = [width as u32, height as u32];
        self.rec.log(
            format!("{entity_path}/rgb"),
            &rerun::Image::from_elements(&rgb, size, rerun::ColorModel::RGB),
        )?;

        let (depth_height, depth_width) = rgbd.depth().dim();
        let depth_size = [depth_width as u32, depth_height as u32];
        let depth: Vec<u8> = rgbd.depth().iter().flat_map(|d| d.to_le_bytes()).collect();
        self.rec.log(
            format!("{entity_path}/depth"),
            &rerun::DepthImage::new(depth, ImageFormat::depth(depth_size, ChannelDatatype::U16))
                .with_meter(unit.units_per_meter()),
        )
    }

    pub fn recording_stream(&self) -> &RecordingStream {
        &self.rec
    }
}
