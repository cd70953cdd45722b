//! Error handling for the depth camera wrapper

use thiserror::Error;

/// Result type for camera operations
pub type Result<T> = std::result::Result<T, CameraError>;

/// Errors that can occur while capturing from or saving camera data.
///
/// Nothing in this crate retries or recovers: every variant is handed back to
/// the caller exactly as the backend or codec produced it.
#[derive(Debug, Error)]
pub enum CameraError {
    /// No compatible device is attached
    #[error("no depth camera device found")]
    DeviceNotFound,
    /// The device is already claimed by another session
    #[error("device {0} is already in use")]
    DeviceBusy(String),
    /// The device went away while streaming
    #[error("device disconnected: {0}")]
    Disconnected(String),
    /// The backend gave up waiting for the next frame set
    #[error("timed out after {0} ms waiting for frames")]
    Timeout(u64),
    /// The session (or pipeline) was already closed
    #[error("camera session is closed")]
    Closed,
    /// Pixel coordinates fall outside the frame
    #[error("pixel ({row}, {col}) is outside the {height}x{width} frame")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },
    /// Frame buffer does not match its declared shape or format
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    /// The path's extension does not name a writable image format
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    /// Settings that could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// Settings that parse but cannot be used
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Error reported by the native SDK
    #[error("SDK error: {0}")]
    Sdk(String),
}

impl From<ndarray::ShapeError> for CameraError {
    fn from(err: ndarray::ShapeError) -> Self {
        CameraError::InvalidFrame(err.to_string())
    }
}
