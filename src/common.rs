use std::fmt;

use serde::{Deserialize, Serialize};

/// Pixel layout of a color frame as delivered by the device.
///
/// Both layouts are interleaved, 8 bits per channel. Arrays handed out by this
/// crate are always RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorFormat {
    #[default]
    Rgb888i,
    Bgr888i,
}

impl ColorFormat {
    pub const fn channels(self) -> usize {
        3
    }
}

/// Unit of the raw samples in a depth frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DepthUnit {
    Meter,
    Centimeter,
    #[default]
    Millimeter,
    Inch,
    Foot,
    /// Device specific scale, in meters per raw unit
    Custom(f32),
}

impl DepthUnit {
    /// Meters represented by one raw depth unit.
    pub fn meters_per_unit(self) -> f32 {
        match self {
            DepthUnit::Meter => 1.0,
            DepthUnit::Centimeter => 0.01,
            DepthUnit::Millimeter => 0.001,
            DepthUnit::Inch => 0.0254,
            DepthUnit::Foot => 0.3048,
            DepthUnit::Custom(scale) => scale,
        }
    }

    /// Whether the scale can be used to convert samples; a `Custom` scale
    /// must be finite and positive.
    pub fn is_valid(self) -> bool {
        let scale = self.meters_per_unit();
        scale.is_finite() && scale > 0.0
    }

    /// Raw units per meter, the form visualizers usually want.
    pub fn units_per_meter(self) -> f32 {
        1.0 / self.meters_per_unit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::new(640, 480)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
