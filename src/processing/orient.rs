//! Output orientation (sensor rotation and front-camera mirroring)

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::RgbaImage;

/// Clockwise rotation applied to the filtered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// Does this rotation swap width and height?
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}

impl TryFrom<u32> for Rotation {
    type Error = Error;

    fn try_from(degrees: u32) -> Result<Self> {
        match degrees % 360 {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Cw90),
            180 => Ok(Rotation::Cw180),
            270 => Ok(Rotation::Cw270),
            other => Err(Error::Config(format!(
                "rotation must be a multiple of 90 degrees, got {}",
                other
            ))),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Rotation followed by an optional horizontal mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Orientation {
    #[serde(default)]
    pub rotation: Rotation,
    /// Mirror horizontally after rotating (front camera)
    #[serde(default)]
    pub mirror: bool,
}

impl Orientation {
    pub fn new(rotation: Rotation, mirror: bool) -> Self {
        Self { rotation, mirror }
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == Rotation::None && !self.mirror
    }
}

/// Rotate then mirror an RGBA image
pub fn orient(image: &RgbaImage, orientation: Orientation) -> RgbaImage {
    if orientation.is_identity() {
        return image.clone();
    }

    let src_w = image.width as usize;
    let src_h = image.height as usize;
    let (dst_w, dst_h) = if orientation.rotation.swaps_axes() {
        (src_h, src_w)
    } else {
        (src_w, src_h)
    };

    let mut data = vec![0u8; image.data.len()];

    for (idx, px) in image.data.chunks_exact(4).enumerate() {
        let sx = idx % src_w;
        let sy = idx / src_w;

        let (dx, dy) = match orientation.rotation {
            Rotation::None => (sx, sy),
            Rotation::Cw90 => (src_h - 1 - sy, sx),
            Rotation::Cw180 => (src_w - 1 - sx, src_h - 1 - sy),
            Rotation::Cw270 => (sy, src_w - 1 - sx),
        };
        let dx = if orientation.mirror { dst_w - 1 - dx } else { dx };

        let dst = (dy * dst_w + dx) * 4;
        data[dst..dst + 4].copy_from_slice(px);
    }

    RgbaImage {
        width: dst_w as u32,
        height: dst_h as u32,
        data,
    }
}
