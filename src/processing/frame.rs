//! Per-frame YUV → filtered RGBA conversion

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::convert::{to_u8, yuv_to_rgb};
use super::orient::{orient, Orientation};
use crate::config::ProcessorConfig;
use crate::error::{Error, Result};
use crate::lut::{self, ColorCube};
use crate::registry::FilterContext;
use crate::types::{PlaneKind, RgbaImage, Stats, YuvFrame};

/// Validated plane views of a frame
struct Planes<'a> {
    y: &'a [u8],
    u: &'a [u8],
    v: &'a [u8],
}

/// Bytes a plane must hold to cover `rows × cols` samples
fn plane_extent(rows: usize, row_stride: usize, cols: usize, pixel_stride: usize) -> Option<usize> {
    (rows - 1)
        .checked_mul(row_stride)?
        .checked_add((cols - 1).checked_mul(pixel_stride)?)?
        .checked_add(1)
}

fn check_len<'a>(data: &'a [u8], kind: PlaneKind, required: usize) -> Result<&'a [u8]> {
    if data.len() < required {
        return Err(Error::PlaneTooSmall {
            plane: kind,
            required,
            actual: data.len(),
        });
    }
    Ok(data)
}

/// Check geometry and plane sizes before any pixel is read
fn validate<'a>(frame: &YuvFrame<'a>) -> Result<Planes<'a>> {
    let width = frame.width as usize;
    let height = frame.height as usize;

    if width == 0 || height == 0 {
        return Err(Error::InvalidGeometry(format!(
            "empty frame {}",
            frame.resolution()
        )));
    }

    // Missing planes are reported before stride problems
    let y = frame.y.ok_or(Error::UnmappedPlane(PlaneKind::Luma))?;
    let u = frame.u.ok_or(Error::UnmappedPlane(PlaneKind::ChromaU))?;
    let v = frame.v.ok_or(Error::UnmappedPlane(PlaneKind::ChromaV))?;

    if frame.y_stride < width {
        return Err(Error::InvalidGeometry(format!(
            "luma stride {} smaller than width {}",
            frame.y_stride, width
        )));
    }
    if frame.uv_pixel_stride == 0 {
        return Err(Error::InvalidGeometry("chroma pixel stride is 0".into()));
    }

    let (chroma_w, chroma_h) = frame.chroma_size();
    let chroma_row = (chroma_w - 1) * frame.uv_pixel_stride + 1;
    if frame.uv_stride < chroma_row {
        return Err(Error::InvalidGeometry(format!(
            "chroma stride {} smaller than chroma row extent {}",
            frame.uv_stride, chroma_row
        )));
    }

    let overflow = || Error::InvalidGeometry("plane extent overflows".into());
    let luma_required = plane_extent(height, frame.y_stride, width, 1).ok_or_else(overflow)?;
    let chroma_required =
        plane_extent(chroma_h, frame.uv_stride, chroma_w, frame.uv_pixel_stride)
            .ok_or_else(overflow)?;

    Ok(Planes {
        y: check_len(y, PlaneKind::Luma, luma_required)?,
        u: check_len(u, PlaneKind::ChromaU, chroma_required)?,
        v: check_len(v, PlaneKind::ChromaV, chroma_required)?,
    })
}

/// Convert a YUV 4:2:0 frame to packed RGBA through an optional cube.
///
/// Output is `width × height × 4` bytes, row-major, alpha fixed at 255.
/// Fails as a whole (no partial output) on unmapped planes, planes too
/// small for the geometry, or allocation failure.
pub fn process_frame(frame: &YuvFrame<'_>, cube: Option<&ColorCube>) -> Result<RgbaImage> {
    let planes = validate(frame)?;

    let width = frame.width as usize;
    let height = frame.height as usize;
    let len = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| Error::InvalidGeometry("output size overflows".into()))?;

    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::Allocation(len))?;

    let pixel_stride = frame.uv_pixel_stride;
    for j in 0..height {
        let y_row = &planes.y[j * frame.y_stride..j * frame.y_stride + width];
        let uv_row = (j / 2) * frame.uv_stride;

        for (i, &luma) in y_row.iter().enumerate() {
            let uv = uv_row + (i / 2) * pixel_stride;
            let rgb = yuv_to_rgb(luma, planes.u[uv], planes.v[uv]);
            let [r, g, b] = lut::apply(rgb, cube);
            data.extend_from_slice(&[to_u8(r), to_u8(g), to_u8(b), 255]);
        }
    }

    Ok(RgbaImage {
        width: frame.width,
        height: frame.height,
        data,
    })
}

/// Frame processor bound to a filter context.
///
/// Reads the active filter once per frame, so a filter switch from another
/// thread never produces a frame mixing two tables.
pub struct FrameProcessor {
    context: Arc<FilterContext>,
    orientation: Orientation,
    frame_budget: Option<Duration>,
    frames_processed: AtomicU64,
    frames_failed: AtomicU64,
    frames_over_budget: AtomicU64,
    total_processing_us: AtomicU64,
}

impl FrameProcessor {
    pub fn new(context: Arc<FilterContext>) -> Self {
        Self {
            context,
            orientation: Orientation::default(),
            frame_budget: None,
            frames_processed: AtomicU64::new(0),
            frames_failed: AtomicU64::new(0),
            frames_over_budget: AtomicU64::new(0),
            total_processing_us: AtomicU64::new(0),
        }
    }

    /// Create a processor using processor settings from the config file
    pub fn from_config(context: Arc<FilterContext>, config: &ProcessorConfig) -> Self {
        let mut processor = Self::new(context).with_orientation(config.orientation);
        if let Some(ms) = config.frame_budget_ms {
            processor = processor.with_frame_budget(Duration::from_millis(ms));
        }
        processor
    }

    /// Rotate/mirror every output frame
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Warn when a frame takes longer than `budget`
    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = Some(budget);
        self
    }

    /// The filter context this processor reads from
    pub fn context(&self) -> &Arc<FilterContext> {
        &self.context
    }

    /// Process one frame with the currently active filter
    pub fn process(&self, frame: &YuvFrame<'_>) -> Result<RgbaImage> {
        let cube = self.context.current();
        let start = Instant::now();

        let image = match process_frame(frame, cube.as_deref()) {
            Ok(image) => image,
            Err(e) => {
                self.frames_failed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Frame rejected: {}", e);
                return Err(e);
            }
        };

        let image = if self.orientation.is_identity() {
            image
        } else {
            orient(&image, self.orientation)
        };

        let elapsed = start.elapsed();
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
        self.total_processing_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);

        if let Some(budget) = self.frame_budget {
            if elapsed > budget {
                self.frames_over_budget.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "Frame {} took {:.2} ms (budget {} ms)",
                    frame.resolution(),
                    elapsed.as_secs_f64() * 1000.0,
                    budget.as_millis()
                );
            }
        }

        Ok(image)
    }

    /// Get processing statistics
    pub fn stats(&self) -> Stats {
        let processed = self.frames_processed.load(Ordering::Relaxed);
        let total_us = self.total_processing_us.load(Ordering::Relaxed);
        Stats {
            frames_processed: processed,
            frames_failed: self.frames_failed.load(Ordering::Relaxed),
            frames_over_budget: self.frames_over_budget.load(Ordering::Relaxed),
            avg_frame_ms: if processed == 0 {
                0.0
            } else {
                total_us as f64 / processed as f64 / 1000.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::Rotation;
    use crate::registry::FilterRegistry;
    use crate::types::YuvLayout;

    fn solid_i420(width: u32, height: u32, y: u8, u: u8, v: u8) -> Vec<u8> {
        let luma = width as usize * height as usize;
        let chroma = (width as usize).div_ceil(2) * (height as usize).div_ceil(2);
        let mut data = vec![y; luma];
        data.extend(std::iter::repeat(u).take(chroma));
        data.extend(std::iter::repeat(v).take(chroma));
        data
    }

    #[test]
    fn test_black_frame() {
        let data = solid_i420(4, 4, 16, 128, 128);
        let frame = YuvFrame::from_packed(&data, YuvLayout::I420, 4, 4).unwrap();
        let image = process_frame(&frame, None).unwrap();
        assert_eq!(image.size_bytes(), 4 * 4 * 4);
        assert!(image.pixels().all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn test_white_frame() {
        let data = solid_i420(3, 3, 235, 128, 128);
        let frame = YuvFrame::from_packed(&data, YuvLayout::I420, 3, 3).unwrap();
        let image = process_frame(&frame, None).unwrap();
        for px in image.pixels() {
            for &c in &px[..3] {
                assert!(c >= 254);
            }
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn test_planar_and_semi_planar_match() {
        let y = [16u8, 80, 160, 235];
        let u = [90u8];
        let v = [200u8];
        let planar = YuvFrame::i420(&y, &u, &v, 2, 2);

        let uv = [90u8, 200];
        let semi = YuvFrame::nv12(&y, &uv, 2, 2);
        let vu = [200u8, 90];
        let semi21 = YuvFrame::nv21(&y, &vu, 2, 2);

        let a = process_frame(&planar, None).unwrap();
        let b = process_frame(&semi, None).unwrap();
        let c = process_frame(&semi21, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_padded_semi_planar_matches_planar() {
        // 4x4 frame, 2x2 chroma, padded luma and chroma rows
        const PAD: u8 = 0xEE;
        let u = [[60u8, 200], [128, 90]];
        let v = [[220u8, 60], [128, 160]];

        let mut y = vec![PAD; 6 * 4];
        for row in y.chunks_exact_mut(6) {
            row[..4].fill(128);
        }

        let mut u_plane = vec![PAD; 4 * 2];
        let mut v_plane = vec![PAD; 4 * 2];
        let mut uv = vec![PAD; 6 * 2];
        let mut vu = vec![PAD; 6 * 2];
        for j in 0..2 {
            for i in 0..2 {
                u_plane[j * 4 + i] = u[j][i];
                v_plane[j * 4 + i] = v[j][i];
                uv[j * 6 + i * 2] = u[j][i];
                uv[j * 6 + i * 2 + 1] = v[j][i];
                vu[j * 6 + i * 2] = v[j][i];
                vu[j * 6 + i * 2 + 1] = u[j][i];
            }
        }

        let planar = YuvFrame::i420(&y, &u_plane, &v_plane, 4, 4).with_strides(6, 4);
        let nv12 = YuvFrame::nv12(&y, &uv, 4, 4).with_strides(6, 6);
        let nv21 = YuvFrame::nv21(&y, &vu, 4, 4).with_strides(6, 6);

        let a = process_frame(&planar, None).unwrap();
        let b = process_frame(&nv12, None).unwrap();
        let c = process_frame(&nv21, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);

        // Each chroma sample drives its own 2x2 block
        let blocks = [(0, 0), (2, 0), (0, 2), (2, 2)].map(|(x, y)| a.pixel(x, y).unwrap());
        for i in 0..4 {
            for k in i + 1..4 {
                assert_ne!(blocks[i], blocks[k]);
            }
        }
        for (x, y) in [(0, 0), (2, 0), (0, 2), (2, 2)] {
            let px = a.pixel(x, y);
            assert_eq!(a.pixel(x + 1, y), px);
            assert_eq!(a.pixel(x, y + 1), px);
            assert_eq!(a.pixel(x + 1, y + 1), px);
        }
    }

    #[test]
    fn test_chroma_subsampling_and_strides() {
        // 4x2 luma with 8-byte padded rows; two distinct chroma columns
        let mut y = vec![0xAAu8; 16];
        y[..4].fill(128);
        y[8..12].fill(128);
        let u = [128u8, 128, 0, 0];
        let v = [128u8, 240, 0, 0];
        let frame = YuvFrame::i420(&y, &u, &v, 4, 2).with_strides(8, 4);

        let image = process_frame(&frame, None).unwrap();
        // Columns 0-1 share neutral chroma, columns 2-3 share red-shifted chroma
        assert_eq!(image.pixel(0, 0), image.pixel(1, 1));
        assert_eq!(image.pixel(2, 0), image.pixel(3, 1));
        assert_ne!(image.pixel(0, 0), image.pixel(2, 0));
        let [r, g, b, _] = image.pixel(0, 0).unwrap();
        assert!(r == g && g == b);
    }

    #[test]
    fn test_null_luma_yields_no_output() {
        let u = [128u8];
        let v = [128u8];
        let frame = YuvFrame {
            y: None,
            u: Some(&u),
            v: Some(&v),
            width: 1,
            height: 1,
            y_stride: 1,
            uv_stride: 1,
            uv_pixel_stride: 1,
        };
        let err = process_frame(&frame, None).unwrap_err();
        assert!(matches!(err, Error::UnmappedPlane(PlaneKind::Luma)));
        assert!(err.is_frame_error());
    }

    #[test]
    fn test_short_planes_rejected() {
        let y = [16u8; 3];
        let u = [128u8];
        let v = [128u8];
        let frame = YuvFrame::i420(&y, &u, &v, 2, 2);
        assert!(matches!(
            process_frame(&frame, None),
            Err(Error::PlaneTooSmall {
                plane: PlaneKind::Luma,
                required: 4,
                actual: 3
            })
        ));

        // NV12 with a single chroma byte: V view is empty
        let y = [16u8; 4];
        let uv = [128u8];
        let frame = YuvFrame::nv12(&y, &uv, 2, 2);
        assert!(matches!(
            process_frame(&frame, None),
            Err(Error::PlaneTooSmall {
                plane: PlaneKind::ChromaV,
                actual: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_bad_geometry_rejected() {
        let y = [16u8; 4];
        let c = [128u8; 4];
        let empty = YuvFrame::i420(&y, &c, &c, 0, 2);
        assert!(matches!(process_frame(&empty, None), Err(Error::InvalidGeometry(_))));

        let narrow = YuvFrame::i420(&y, &c, &c, 2, 2).with_strides(1, 1);
        assert!(matches!(process_frame(&narrow, None), Err(Error::InvalidGeometry(_))));

        let mut zero_ps = YuvFrame::i420(&y, &c, &c, 2, 2);
        zero_ps.uv_pixel_stride = 0;
        assert!(matches!(process_frame(&zero_ps, None), Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_cube_is_applied() {
        let invert = ColorCube::from_fn(|[r, g, b]| [1.0 - r, 1.0 - g, 1.0 - b]);
        let data = solid_i420(2, 2, 16, 128, 128);
        let frame = YuvFrame::from_packed(&data, YuvLayout::I420, 2, 2).unwrap();
        let image = process_frame(&frame, Some(&invert)).unwrap();
        assert!(image.pixels().all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_processor_uses_active_filter_and_counts() {
        let registry = FilterRegistry::builder()
            .register("Invert", ColorCube::from_fn(|[r, g, b]| [1.0 - r, 1.0 - g, 1.0 - b]))
            .unwrap()
            .build();
        let context = Arc::new(FilterContext::new(registry));
        let processor = FrameProcessor::new(context.clone());

        let data = solid_i420(2, 2, 16, 128, 128);
        let frame = YuvFrame::from_packed(&data, YuvLayout::I420, 2, 2).unwrap();

        assert_eq!(processor.process(&frame).unwrap().pixel(0, 0), Some([0, 0, 0, 255]));
        context.activate("Invert").unwrap();
        assert_eq!(
            processor.process(&frame).unwrap().pixel(0, 0),
            Some([255, 255, 255, 255])
        );

        let broken = YuvFrame { y: None, ..frame };
        assert!(processor.process(&broken).is_err());

        let stats = processor.stats();
        assert_eq!(stats.frames_processed, 2);
        assert_eq!(stats.frames_failed, 1);
    }

    #[test]
    fn test_processor_orientation() {
        let context = Arc::new(FilterContext::new(FilterRegistry::builder().build()));
        let processor = FrameProcessor::new(context).with_orientation(Orientation {
            rotation: Rotation::Cw90,
            mirror: false,
        });
        let data = solid_i420(4, 2, 16, 128, 128);
        let frame = YuvFrame::from_packed(&data, YuvLayout::I420, 4, 2).unwrap();
        let image = processor.process(&frame).unwrap();
        assert_eq!((image.width, image.height), (2, 4));
    }
}
