//! Common types used throughout camfilter

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Frame resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    // Common camera preview resolutions
    pub const VGA: Self = Self::new(640, 480);
    pub const HD_720P: Self = Self::new(1280, 720);
    pub const FHD_1080P: Self = Self::new(1920, 1080);
    pub const UHD_4K: Self = Self::new(3840, 2160);

    /// Calculate total pixels
    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Size of the packed RGBA buffer for this resolution
    pub fn rgba_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::FHD_1080P
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Identifies one of the three planes of a YUV frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    /// Luma (Y)
    Luma,
    /// First chroma plane (U / Cb)
    ChromaU,
    /// Second chroma plane (V / Cr)
    ChromaV,
}

impl std::fmt::Display for PlaneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaneKind::Luma => write!(f, "Y"),
            PlaneKind::ChromaU => write!(f, "U"),
            PlaneKind::ChromaV => write!(f, "V"),
        }
    }
}

/// How chroma samples are laid out in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaLayout {
    /// Separate U and V planes (pixel stride 1)
    Planar,
    /// U and V interleaved in one plane (pixel stride 2)
    SemiPlanar,
}

/// Tightly packed 4:2:0 buffer layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum YuvLayout {
    /// Y plane, then U plane, then V plane
    #[default]
    I420,
    /// Y plane, then interleaved U,V pairs
    Nv12,
    /// Y plane, then interleaved V,U pairs (Android camera default)
    Nv21,
}

impl YuvLayout {
    /// Bytes needed for a tightly packed frame of this layout
    pub fn frame_size(&self, width: u32, height: u32) -> usize {
        let w = width as usize;
        let h = height as usize;
        let cw = w.div_ceil(2);
        let ch = h.div_ceil(2);
        w * h + cw * ch * 2
    }

    pub fn chroma_layout(&self) -> ChromaLayout {
        match self {
            YuvLayout::I420 => ChromaLayout::Planar,
            YuvLayout::Nv12 | YuvLayout::Nv21 => ChromaLayout::SemiPlanar,
        }
    }
}

impl std::fmt::Display for YuvLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YuvLayout::I420 => write!(f, "I420"),
            YuvLayout::Nv12 => write!(f, "NV12"),
            YuvLayout::Nv21 => write!(f, "NV21"),
        }
    }
}

/// A borrowed 4:2:0 camera frame.
///
/// The three planes are independent views. For semi-planar frames the U and
/// V views point into the same interleaved plane, one byte apart, and
/// `uv_pixel_stride` is 2. A plane of `None` models an unmapped host buffer.
#[derive(Debug, Clone, Copy)]
pub struct YuvFrame<'a> {
    /// Luma plane
    pub y: Option<&'a [u8]>,
    /// U (Cb) plane view
    pub u: Option<&'a [u8]>,
    /// V (Cr) plane view
    pub v: Option<&'a [u8]>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Luma row stride in bytes
    pub y_stride: usize,
    /// Chroma row stride in bytes (shared by U and V)
    pub uv_stride: usize,
    /// Distance in bytes between horizontally adjacent chroma samples
    pub uv_pixel_stride: usize,
}

impl<'a> YuvFrame<'a> {
    /// Fully planar frame (I420) with tightly packed rows
    pub fn i420(y: &'a [u8], u: &'a [u8], v: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            y: Some(y),
            u: Some(u),
            v: Some(v),
            width,
            height,
            y_stride: width as usize,
            uv_stride: (width as usize).div_ceil(2),
            uv_pixel_stride: 1,
        }
    }

    /// Semi-planar frame with U first in each chroma pair
    pub fn nv12(y: &'a [u8], uv: &'a [u8], width: u32, height: u32) -> Self {
        Self::semi_planar(y, Some(uv), uv.get(1..), width, height)
    }

    /// Semi-planar frame with V first in each chroma pair
    pub fn nv21(y: &'a [u8], vu: &'a [u8], width: u32, height: u32) -> Self {
        Self::semi_planar(y, vu.get(1..), Some(vu), width, height)
    }

    fn semi_planar(
        y: &'a [u8],
        u: Option<&'a [u8]>,
        v: Option<&'a [u8]>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            y: Some(y),
            u,
            v,
            width,
            height,
            y_stride: width as usize,
            uv_stride: (width as usize).div_ceil(2) * 2,
            uv_pixel_stride: 2,
        }
    }

    /// Split a tightly packed buffer into plane views
    pub fn from_packed(data: &'a [u8], layout: YuvLayout, width: u32, height: u32) -> Result<Self> {
        let required = layout.frame_size(width, height);
        if data.len() < required {
            return Err(Error::InvalidGeometry(format!(
                "{} {}x{} needs {} bytes, got {}",
                layout,
                width,
                height,
                required,
                data.len()
            )));
        }

        let y_size = width as usize * height as usize;
        let (y, chroma) = data.split_at(y_size);
        let frame = match layout {
            YuvLayout::I420 => {
                let plane_size = (width as usize).div_ceil(2) * (height as usize).div_ceil(2);
                let (u, v) = chroma.split_at(plane_size);
                Self::i420(y, u, v, width, height)
            }
            YuvLayout::Nv12 => Self::nv12(y, chroma, width, height),
            YuvLayout::Nv21 => Self::nv21(y, chroma, width, height),
        };
        Ok(frame)
    }

    /// Override row strides (for padded camera buffers)
    pub fn with_strides(mut self, y_stride: usize, uv_stride: usize) -> Self {
        self.y_stride = y_stride;
        self.uv_stride = uv_stride;
        self
    }

    /// Get resolution
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Chroma layout implied by the pixel stride
    pub fn chroma_layout(&self) -> ChromaLayout {
        if self.uv_pixel_stride == 1 {
            ChromaLayout::Planar
        } else {
            ChromaLayout::SemiPlanar
        }
    }

    /// Chroma plane dimensions (4:2:0)
    pub fn chroma_size(&self) -> (usize, usize) {
        (
            (self.width as usize).div_ceil(2),
            (self.height as usize).div_ceil(2),
        )
    }
}

/// A packed RGBA image, 4 bytes per pixel, no row padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Pixel data, row-major RGBA
    pub data: Vec<u8>,
}

impl RgbaImage {
    /// Get resolution
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Read one pixel. Returns `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Iterate over pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(4)
    }

    /// Size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Take the raw buffer
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// Statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Frames converted successfully
    pub frames_processed: u64,
    /// Frames rejected (bad planes, bad geometry, allocation)
    pub frames_failed: u64,
    /// Frames that exceeded the frame budget
    pub frames_over_budget: u64,
    /// Average processing time per successful frame in ms
    pub avg_frame_ms: f64,
}
